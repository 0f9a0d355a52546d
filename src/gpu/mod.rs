//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, growable instance buffers,
//! render targets, pipeline boilerplate, and shader composition.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers for screen-space pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Color and depth render-target textures.
pub mod texture;
