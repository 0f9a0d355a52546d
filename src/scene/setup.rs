use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::populate::{build_grid, build_random, SphereInstance};
use super::{
    GeometryId, Light, SceneGraph, SceneId, SphereGeometry, StandardMaterial,
};
use crate::options::{GridLayout, GridOptions, Options};

/// The two sub-scenes composited every frame, plus the graph that owns them.
pub struct SceneSet {
    /// Graph holding both scenes.
    pub graph: SceneGraph,
    /// Scene drawn last, directly onto the framebuffer.
    pub main: SceneId,
    /// Scene drawn first, through the bloom chain.
    pub bloom: SceneId,
}

fn instances_for(grid: &GridOptions) -> Vec<SphereInstance> {
    match grid.layout {
        GridLayout::Grid => {
            build_grid(grid.size, grid.spacing, grid.z, grid.scale)
        }
        GridLayout::Scattered => match grid.seed {
            Some(seed) => build_random(
                grid.scattered_count,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => build_random(grid.scattered_count, &mut rand::rng()),
        },
    }
}

fn add_spheres(
    graph: &mut SceneGraph,
    scene: SceneId,
    geometry: GeometryId,
    options: &Options,
) {
    let material = StandardMaterial {
        color: Vec3::from(options.display.sphere_color),
        roughness: options.display.roughness,
        metalness: options.display.metalness,
    };
    // Every scene generates its own instances.
    let instances = instances_for(&options.grid);
    let meshes = graph.populate(scene, geometry, &instances, material);
    log::debug!(
        "scene {:?}: {} spheres",
        graph.scene_label(scene),
        meshes.len()
    );
}

/// Build the main and bloom scenes described by `options`.
///
/// The main scene gets a point light and an ambient light, the bloom scene
/// only an ambient light. Both share one sphere geometry but own separate
/// mesh nodes.
#[must_use]
pub fn build_scenes(options: &Options) -> SceneSet {
    let mut graph = SceneGraph::new();
    let geometry = graph.add_geometry(SphereGeometry::default());
    let lighting = &options.lighting;

    let main = graph.add_scene("main");
    let _ = graph.add_light(
        main,
        Light::point(
            Vec3::from(lighting.point_position),
            lighting.point_intensity,
        ),
    );
    let _ = graph.add_light(main, Light::ambient(lighting.ambient_intensity));
    add_spheres(&mut graph, main, geometry, options);

    let bloom = graph.add_scene("bloom");
    let _ = graph.add_light(bloom, Light::ambient(lighting.ambient_intensity));
    add_spheres(&mut graph, bloom, geometry, options);

    SceneSet { graph, main, bloom }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    #[test]
    fn default_scenes_hold_sixteen_spheres_each() {
        let set = build_scenes(&Options::default());
        assert_eq!(set.graph.meshes(set.main).count(), 16);
        assert_eq!(set.graph.meshes(set.bloom).count(), 16);
        assert_eq!(set.graph.lights(set.main).count(), 2);
        assert_eq!(set.graph.lights(set.bloom).count(), 1);
        assert!(matches!(
            set.graph.lights(set.bloom).next(),
            Some(Light::Ambient { .. })
        ));
    }

    #[test]
    fn bloom_and_main_positions_agree_but_are_separate_nodes() {
        let mut set = build_scenes(&Options::default());
        let main: Vec<DVec3> =
            set.graph.meshes(set.main).map(|m| m.position).collect();
        let bloom: Vec<DVec3> =
            set.graph.meshes(set.bloom).map(|m| m.position).collect();
        assert_eq!(main, bloom);

        if let Some(mesh) = set.graph.meshes_mut(set.main).next() {
            mesh.position = DVec3::splat(-1.0);
        }
        assert_eq!(set.graph.meshes(set.bloom).next().unwrap().position, DVec3::ZERO);
    }

    #[test]
    fn scattered_layout_uses_seed() {
        let mut options = Options::default();
        options.grid.layout = GridLayout::Scattered;
        options.grid.seed = Some(3);
        let a = build_scenes(&options);
        let b = build_scenes(&options);
        let pa: Vec<DVec3> = a.graph.meshes(a.main).map(|m| m.position).collect();
        let pb: Vec<DVec3> = b.graph.meshes(b.main).map(|m| m.position).collect();
        assert_eq!(pa.len(), 15);
        assert_eq!(pa, pb);
    }
}
