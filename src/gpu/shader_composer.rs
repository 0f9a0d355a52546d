use std::borrow::Cow;
use std::fmt;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

/// Every pipeline shader in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shader {
    /// Ray-cast sphere impostors.
    Sphere,
    /// Luminosity high-pass.
    BloomThreshold,
    /// Separable Gaussian blur.
    BloomBlur,
    /// Scene + weighted blur levels.
    BloomCombine,
}

impl Shader {
    /// All shaders, for up-front validation.
    pub const ALL: [Self; 4] = [
        Self::Sphere,
        Self::BloomThreshold,
        Self::BloomBlur,
        Self::BloomCombine,
    ];

    fn source(self) -> &'static str {
        match self {
            Self::Sphere => {
                include_str!("../../assets/shaders/raster/sphere.wgsl")
            }
            Self::BloomThreshold => {
                include_str!("../../assets/shaders/screen/bloom_threshold.wgsl")
            }
            Self::BloomBlur => {
                include_str!("../../assets/shaders/screen/bloom_blur.wgsl")
            }
            Self::BloomCombine => {
                include_str!("../../assets/shaders/screen/bloom_combine.wgsl")
            }
        }
    }

    fn file_path(self) -> &'static str {
        match self {
            Self::Sphere => "raster/sphere.wgsl",
            Self::BloomThreshold => "screen/bloom_threshold.wgsl",
            Self::BloomBlur => "screen/bloom_blur.wgsl",
            Self::BloomCombine => "screen/bloom_combine.wgsl",
        }
    }

    /// Debug label used for the wgpu shader module.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sphere => "Sphere Shader",
            Self::BloomThreshold => "Bloom Threshold Shader",
            Self::BloomBlur => "Bloom Blur Shader",
            Self::BloomCombine => "Bloom Combine Shader",
        }
    }
}

/// A shared module or shader failed to compose.
#[derive(Debug)]
pub struct ShaderError {
    /// Path of the offending WGSL file.
    pub file_path: &'static str,
    /// Composer diagnostic.
    pub message: String,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader '{}' failed to compose: {}", self.file_path, self.message)
    }
}

impl std::error::Error for ShaderError {}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Shared WGSL modules are registered at construction time. Consuming
/// shaders use `#import glowgrid::module_name` to pull in shared code. The
/// composer produces `naga::Module` IR directly, skipping WGSL re-parse at
/// runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared modules in dependency order: (source, file path).
const MODULES: [(&str, &str); 4] = [
    (
        include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        "modules/fullscreen.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/camera.wgsl"),
        "modules/camera.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/lighting.wgsl"),
        "modules/lighting.wgsl",
    ),
    (
        include_str!("../../assets/shaders/modules/bloom.wgsl"),
        "modules/bloom.wgsl",
    ),
];

impl ShaderComposer {
    /// Register every shared module.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a shared module does not parse.
    pub fn new() -> Result<Self, ShaderError> {
        let mut composer = Composer::default();
        for (source, file_path) in MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source,
                    file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| ShaderError {
                    file_path,
                    message: e.to_string(),
                })?;
        }
        Ok(Self { composer })
    }

    /// Compose `shader` into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        let module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.label()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
        }))
    }

    /// Compose `shader` into a `naga::Module` without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, ShaderError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: shader.file_path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| ShaderError {
                file_path: shader.file_path(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let _ = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{e}"));
        }
    }

    #[test]
    fn bloom_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in [Shader::BloomThreshold, Shader::BloomBlur, Shader::BloomCombine]
        {
            assert!(
                composer.compose_naga(shader).is_ok(),
                "{shader:?} failed to compose"
            );
        }
    }

    #[test]
    fn shared_module_identifiers_survive_writeback() {
        // naga renames identifiers ending in `_<digits>`, which naga_oil
        // refuses inside composable modules.
        for (source, file_path) in MODULES {
            let offending: Vec<&str> = source
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .filter(|token| {
                    token.rsplit_once('_').is_some_and(|(_, tail)| {
                        !tail.is_empty()
                            && tail.chars().all(|c| c.is_ascii_digit())
                    })
                })
                .collect();
            assert!(offending.is_empty(), "{file_path}: {offending:?}");
        }
    }

    #[test]
    fn pipeline_shaders_expose_entry_points() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let names: Vec<&str> =
                module.entry_points.iter().map(|e| e.name.as_str()).collect();
            assert!(names.contains(&"vs_main"), "{shader:?}: {names:?}");
            assert!(names.contains(&"fs_main"), "{shader:?}: {names:?}");
        }
    }

    #[test]
    fn composed_modules_validate() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::default(),
            );
            let _ = validator
                .validate(&module)
                .unwrap_or_else(|e| panic!("{shader:?}: {e:?}"));
        }
    }
}
