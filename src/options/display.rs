use serde::{Deserialize, Serialize};

/// Output and material settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayOptions {
    /// Present linear color values (prefer a non-sRGB surface format).
    pub linear_output: bool,
    /// Frame-rate cap (0 = unlimited, vsync still applies).
    pub target_fps: u32,
    /// Linear RGB sphere color.
    pub sphere_color: [f32; 3],
    /// Sphere roughness.
    pub roughness: f32,
    /// Sphere metalness.
    pub metalness: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            linear_output: true,
            target_fps: 0,
            sphere_color: [1.0, 0.411_765, 0.705_882],
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}
