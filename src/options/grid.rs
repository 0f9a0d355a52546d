use serde::{Deserialize, Serialize};

/// How sphere instances are placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    /// Regular `size x size` grid on a plane.
    #[default]
    Grid,
    /// Uniformly scattered inside a cube around the origin.
    Scattered,
}

/// Sphere layout parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridOptions {
    /// Placement strategy.
    pub layout: GridLayout,
    /// Cells per grid side.
    pub size: u32,
    /// Distance between neighbouring grid cells.
    pub spacing: f64,
    /// Plane the grid lies on.
    pub z: f64,
    /// Per-instance scale for grid spheres.
    pub scale: f64,
    /// Number of spheres in the scattered layout.
    pub scattered_count: usize,
    /// RNG seed for the scattered layout; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            layout: GridLayout::Grid,
            size: 4,
            spacing: 20.0,
            z: 0.0,
            scale: 10.0,
            scattered_count: 15,
            seed: None,
        }
    }
}
