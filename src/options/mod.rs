//! Centralized scene/rendering options with TOML support.
//!
//! Every section uses `#[serde(default)]`, so a partial TOML file (for
//! example one that only overrides `[bloom]`) fills everything else from the
//! built-in constants.

mod camera;
mod display;
mod grid;
mod lighting;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::DisplayOptions;
pub use grid::{GridLayout, GridOptions};
pub use lighting::LightingOptions;
use serde::{Deserialize, Serialize};

pub use crate::compositor::BloomParameters;
use crate::error::GlowGridError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Sphere layout.
    pub grid: GridOptions,
    /// Bloom strength, radius and threshold.
    pub bloom: BloomParameters,
    /// Camera placement and orbit-control speeds.
    pub camera: CameraOptions,
    /// Output and material settings.
    pub display: DisplayOptions,
    /// Light intensities and placement.
    pub lighting: LightingOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GlowGridError::Io`] if the file cannot be read and
    /// [`GlowGridError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, GlowGridError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`GlowGridError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, GlowGridError> {
        toml::from_str(content)
            .map_err(|e| GlowGridError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`GlowGridError::OptionsParse`] if serialization fails and
    /// [`GlowGridError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), GlowGridError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GlowGridError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}
