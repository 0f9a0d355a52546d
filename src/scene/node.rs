//! Node payloads stored in the scene graph.

use glam::{DVec3, Vec3};

use super::populate::SphereInstance;
use super::GeometryId;

/// Shared unit-sphere geometry description.
///
/// Impostor rendering only needs the radius; the segment counts are kept so
/// a tessellating renderer could rebuild the same mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    /// Radius before per-instance scale.
    pub radius: f32,
    /// Longitudinal segments.
    pub width_segments: u32,
    /// Latitudinal segments.
    pub height_segments: u32,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 32,
        }
    }
}

/// Physically-inspired surface description (color + roughness).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    /// Linear RGB base color.
    pub color: Vec3,
    /// 0 = mirror, 1 = fully diffuse.
    pub roughness: f32,
    /// 0 = dielectric, 1 = metal.
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            // hotpink
            color: Vec3::new(1.0, 0.411_765, 0.705_882),
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// A light source attached to a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light reaching every surface equally.
    Ambient {
        /// Linear RGB color.
        color: Vec3,
        /// Scalar multiplier.
        intensity: f32,
    },
    /// Omnidirectional light at a point.
    Point {
        /// World-space position.
        position: Vec3,
        /// Linear RGB color.
        color: Vec3,
        /// Scalar multiplier.
        intensity: f32,
    },
}

impl Light {
    /// White ambient light.
    #[must_use]
    pub fn ambient(intensity: f32) -> Self {
        Self::Ambient {
            color: Vec3::ONE,
            intensity,
        }
    }

    /// White point light at `position`.
    #[must_use]
    pub fn point(position: Vec3, intensity: f32) -> Self {
        Self::Point {
            position,
            color: Vec3::ONE,
            intensity,
        }
    }
}

/// A sphere mesh: shared geometry, one instance, and its current transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    /// Geometry shared with the other meshes of the graph.
    pub geometry: GeometryId,
    /// Rest position and scale.
    pub instance: SphereInstance,
    /// Position drawn this frame; rewritten by the animator every tick.
    pub position: DVec3,
    /// Surface material.
    pub material: StandardMaterial,
}

impl SphereMesh {
    /// Mesh resting at the instance's base position.
    #[must_use]
    pub fn new(
        geometry: GeometryId,
        instance: SphereInstance,
        material: StandardMaterial,
    ) -> Self {
        Self {
            geometry,
            instance,
            position: instance.base_position,
            material,
        }
    }
}

/// What a node in the graph is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of an independently rendered sub-scene.
    Scene {
        /// Human-readable name, used in logs.
        label: String,
    },
    /// A light.
    Light(Light),
    /// A sphere mesh.
    Mesh(SphereMesh),
}
