//! Sphere instance generators.
//!
//! Both generators are pure: every caller gets its own freshly allocated
//! instance list, so the main and bloom scenes never share instances.

use glam::DVec3;
use rand::Rng;

/// Half-extent of the cube that scattered spheres are drawn from.
const SCATTER_HALF_EXTENT: f64 = 50.0;

/// One sphere placed in a scene.
///
/// The base position never changes after creation; the position actually
/// drawn each frame is derived from it by
/// [`animation::update`](crate::animation::update).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereInstance {
    /// Rest position in world space.
    pub base_position: DVec3,
    /// Uniform scale applied to the shared unit-sphere geometry. Also sets
    /// the breathing frequency.
    pub scale: f64,
}

impl SphereInstance {
    /// Instance at `base_position` with the given scale.
    #[must_use]
    pub fn new(base_position: DVec3, scale: f64) -> Self {
        Self {
            base_position,
            scale,
        }
    }
}

/// Lay out `size * size` spheres on the plane `z`, `spacing` units apart.
///
/// Instances are produced in x-major order, so the sphere at grid cell
/// `(x, y)` sits at index `x * size + y`.
#[must_use]
pub fn build_grid(
    size: u32,
    spacing: f64,
    z: f64,
    scale: f64,
) -> Vec<SphereInstance> {
    let mut instances = Vec::with_capacity((size * size) as usize);
    for x in 0..size {
        for y in 0..size {
            instances.push(SphereInstance::new(
                DVec3::new(f64::from(x) * spacing, f64::from(y) * spacing, z),
                scale,
            ));
        }
    }
    instances
}

/// Scatter `count` spheres uniformly inside a 100-unit cube centred on the
/// origin, with scales in `[10, 11)`.
pub fn build_random<R: Rng + ?Sized>(
    count: usize,
    rng: &mut R,
) -> Vec<SphereInstance> {
    (0..count)
        .map(|_| {
            let position = DVec3::new(
                rng.random_range(-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT),
                rng.random_range(-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT),
                rng.random_range(-SCATTER_HALF_EXTENT..SCATTER_HALF_EXTENT),
            );
            SphereInstance::new(position, rng.random_range(10.0..11.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn grid_of_four_has_sixteen_spheres() {
        let grid = build_grid(4, 20.0, 0.0, 10.0);
        assert_eq!(grid.len(), 16);
        assert!(grid.iter().all(|s| s.scale == 10.0));
        assert!(grid.iter().all(|s| s.base_position.z == 0.0));
    }

    #[test]
    fn grid_index_is_x_major() {
        let grid = build_grid(4, 20.0, 0.0, 10.0);
        assert_eq!(grid[2 * 4 + 3].base_position, DVec3::new(40.0, 60.0, 0.0));
        assert_eq!(grid[0].base_position, DVec3::ZERO);
        assert_eq!(grid[15].base_position, DVec3::new(60.0, 60.0, 0.0));
    }

    #[test]
    fn grid_respects_plane_and_scale() {
        let grid = build_grid(2, 5.0, -3.0, 2.5);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[3].base_position, DVec3::new(5.0, 5.0, -3.0));
        assert_eq!(grid[3].scale, 2.5);
    }

    #[test]
    fn grid_calls_are_independent() {
        let mut a = build_grid(4, 20.0, 0.0, 10.0);
        let b = build_grid(4, 20.0, 0.0, 10.0);
        a[0].base_position.x = 999.0;
        assert_eq!(b[0].base_position, DVec3::ZERO);
    }

    #[test]
    fn empty_grid() {
        assert!(build_grid(0, 20.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn random_instances_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let scattered = build_random(200, &mut rng);
        assert_eq!(scattered.len(), 200);
        for s in &scattered {
            for c in s.base_position.to_array() {
                assert!((-50.0..50.0).contains(&c), "coordinate {c}");
            }
            assert!((10.0..11.0).contains(&s.scale), "scale {}", s.scale);
        }
    }

    #[test]
    fn random_is_reproducible_with_seed() {
        let a = build_random(15, &mut StdRng::seed_from_u64(42));
        let b = build_random(15, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
