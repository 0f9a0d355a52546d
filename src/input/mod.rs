//! Input handling: platform-agnostic events and the processor that turns
//! them into orbit-camera commands.

/// Platform-agnostic input events.
pub mod event;
/// Converts raw events into camera commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::{CameraCommand, InputProcessor};
