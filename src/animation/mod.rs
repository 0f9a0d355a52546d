//! Per-instance "breathing" animation.
//!
//! Every sphere is offset from its base position by a single sine value that
//! depends on elapsed time and the sphere's scale. The same offset is added
//! to all three axes, so spheres drift along the `(1, 1, 1)` diagonal.

use glam::DVec3;

use crate::compositor::{CompositeBackend, Stage};
use crate::scene::{SceneGraph, SceneId, SphereInstance};
use crate::schedule::{FrameScheduler, FrameState, HandlerId};

/// Scheduler priority of the animation handler. Lower than both render
/// passes so positions are settled before anything is drawn.
pub const ANIMATION_PRIORITY: i32 = 0;

/// Animated position of `instance` after `elapsed` seconds.
///
/// `offset = sin(elapsed * scale / 2)`, added to every axis.
#[must_use]
pub fn update(instance: &SphereInstance, elapsed: f64) -> DVec3 {
    let offset = (elapsed * instance.scale / 2.0).sin();
    instance.base_position + DVec3::splat(offset)
}

/// Rewrite the render position of every mesh in `scene`.
///
/// Unknown scenes have no meshes, so nothing happens.
pub fn animate_scene(graph: &mut SceneGraph, scene: SceneId, elapsed: f64) {
    for mesh in graph.meshes_mut(scene) {
        mesh.position = update(&mesh.instance, elapsed);
    }
}

/// Install the animation handler, which animates every scene attached to
/// the stage's compositor.
pub fn register<B: CompositeBackend + 'static>(
    scheduler: &mut FrameScheduler<Stage<B>>,
) -> HandlerId {
    scheduler.register(
        "animate",
        ANIMATION_PRIORITY,
        |stage: &mut Stage<B>, frame: &FrameState| {
            for scene in stage.compositor.attached_scenes() {
                animate_scene(&mut stage.graph, scene, frame.elapsed);
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{build_grid, SphereGeometry, StandardMaterial};

    fn grid() -> Vec<SphereInstance> {
        build_grid(4, 20.0, 0.0, 10.0)
    }

    #[test]
    fn zero_time_is_base_position() {
        for instance in grid() {
            assert_eq!(update(&instance, 0.0), instance.base_position);
        }
    }

    #[test]
    fn offset_is_shared_across_axes() {
        let instance = SphereInstance::new(DVec3::new(1.0, -2.0, 3.5), 10.7);
        for step in 0..200 {
            let t = f64::from(step) * 0.037;
            let d = update(&instance, t) - instance.base_position;
            assert!((d.x - d.y).abs() < 1e-12, "t = {t}");
            assert!((d.y - d.z).abs() < 1e-12, "t = {t}");
        }
    }

    #[test]
    fn offset_follows_scaled_sine() {
        let instance = SphereInstance::new(DVec3::ZERO, 10.0);
        // sin(t * 10 / 2) peaks at t = pi / 10.
        let peak = update(&instance, std::f64::consts::PI / 10.0);
        assert!((peak.x - 1.0).abs() < 1e-12);
        let trough = update(&instance, 3.0 * std::f64::consts::PI / 10.0);
        assert!((trough.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn animate_scene_moves_only_that_scene() {
        let mut graph = SceneGraph::new();
        let geometry = graph.add_geometry(SphereGeometry::default());
        let a = graph.add_scene("a");
        let b = graph.add_scene("b");
        for scene in [a, b] {
            let _ = graph.populate(scene, geometry, &grid(), StandardMaterial::default());
        }

        animate_scene(&mut graph, a, 0.5);
        let expected = (0.5_f64 * 10.0 / 2.0).sin();
        for mesh in graph.meshes(a) {
            let d = mesh.position - mesh.instance.base_position;
            assert!((d.x - expected).abs() < 1e-12);
        }
        for mesh in graph.meshes(b) {
            assert_eq!(mesh.position, mesh.instance.base_position);
        }
    }
}
