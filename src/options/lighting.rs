use serde::{Deserialize, Serialize};

/// Light placement and intensities shared by both scenes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingOptions {
    /// Ambient light intensity (both scenes).
    pub ambient_intensity: f32,
    /// Point light intensity (main scene only).
    pub point_intensity: f32,
    /// Point light position (main scene only).
    pub point_position: [f32; 3],
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient_intensity: 1.0,
            point_intensity: 1.0,
            point_position: [0.0, 0.0, 0.0],
        }
    }
}
