// -- Lint policy ---------------------------------------------------------
// Crate-wide lints live here and in the [lints] table of Cargo.toml.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Unused / redundant code
#![deny(unused_results)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! A grid of breathing spheres with an additive bloom, rendered on wgpu.
//!
//! Two independent sub-scenes are drawn every frame. The *bloom* scene is
//! rendered off-screen, run through a bright-pass / Gaussian blur / combine
//! chain and written to the framebuffer; the *main* scene is then drawn on
//! top of it after clearing only the depth buffer, so the glow stays visible
//! around the crisp spheres.
//!
//! # Key entry points
//!
//! - [`engine::GlowGridEngine`] - owns the GPU context, stage and frame loop
//! - [`scene::SceneGraph`] - retained node tree holding both sub-scenes
//! - [`schedule::FrameScheduler`] - priority-ordered per-frame handlers
//! - [`compositor::Compositor`] - pass ordering, depth-clear policy and
//!   bloom-target resizing
//! - [`options::Options`] - TOML-backed configuration
//!
//! # Frame order
//!
//! Every tick the scheduler runs, in ascending priority: sphere animation
//! (0), the bloom composite (1) and the main pass (2).

pub mod animation;
pub mod camera;
pub mod compositor;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod schedule;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::GlowGridEngine;
pub use error::GlowGridError;
pub use input::{InputEvent, MouseButton};
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
