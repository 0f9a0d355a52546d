//! wgpu rendering of the two sub-scenes.
//!
//! [`GpuBackend`] implements [`CompositeBackend`](crate::compositor::CompositeBackend):
//! it draws sphere impostors for a scene, runs the bloom chain for the bloom
//! pass and draws the main pass straight onto the framebuffer.

/// Frame bracketing and the [`CompositeBackend`](crate::compositor::CompositeBackend) impl.
pub mod backend;
/// Bright-pass, blur chain and combine.
pub mod bloom;
/// Lighting uniform built from scene light nodes.
pub mod lighting;
/// Sphere impostor pipeline and per-scene instance buffers.
pub mod sphere;

pub use backend::GpuBackend;

/// Format of every off-screen color target.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
