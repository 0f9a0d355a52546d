//! Perspective camera with orbit controls.
//!
//! The CPU-side [`controller::OrbitController`] owns the orbit state and is
//! fully testable; [`binding::CameraBinding`] mirrors it into a uniform
//! buffer for the sphere shader.

/// Uniform buffer and bind group for the camera.
pub mod binding;
/// Orbit controller: rotate, pan and zoom around a focus point.
pub mod controller;
/// Core camera struct and GPU uniform type.
pub mod core;
