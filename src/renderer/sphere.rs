//! Sphere impostors.
//!
//! Each sphere is drawn as one camera-facing quad (six vertices, no vertex
//! buffer) that the fragment shader ray-casts against the true sphere,
//! writing exact depth. Instances live in a storage buffer (group 0); the
//! camera is group 1 and the scene's lights group 2.

use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers;
use crate::scene::{SceneGraph, SceneId};

/// Vertices per impostor quad.
const QUAD_VERTICES: u32 = 6;

/// Per-instance data for the sphere impostor.
/// Must match the WGSL `SphereInstance` struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereGpu {
    /// xyz = world position, w = radius
    pub center: [f32; 4],
    /// rgb = albedo, a unused
    pub color: [f32; 4],
}

/// Instance data for every mesh in `scene`, in insertion order.
///
/// Radius is the shared geometry radius times the instance scale; meshes
/// whose geometry is missing fall back to a unit radius.
#[must_use]
pub fn collect_spheres(graph: &SceneGraph, scene: SceneId) -> Vec<SphereGpu> {
    graph
        .meshes(scene)
        .map(|mesh| {
            let base_radius =
                graph.geometry(mesh.geometry).map_or(1.0, |g| g.radius);
            #[allow(clippy::cast_possible_truncation)]
            let radius = base_radius * mesh.instance.scale as f32;
            let position = mesh.position.as_vec3();
            let color = mesh.material.color;
            SphereGpu {
                center: [position.x, position.y, position.z, radius],
                color: [color.x, color.y, color.z, 1.0],
            }
        })
        .collect()
}

/// Layout of the instance bind group.
#[must_use]
pub fn instance_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Sphere Instance Layout"),
        entries: &[pipeline_helpers::read_only_storage(0)],
    })
}

/// Impostor pipeline for one color target format.
pub struct SpherePipeline {
    pipeline: wgpu::RenderPipeline,
}

impl SpherePipeline {
    /// Build the pipeline rendering into `format` with the crate depth
    /// format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        bind_group_layouts: &[&wgpu::BindGroupLayout; 3],
        format: wgpu::TextureFormat,
    ) -> Self {
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sphere Pipeline Layout"),
                bind_group_layouts,
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Sphere Pipeline ({format:?})")),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: Some(pipeline_helpers::depth_stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        Self { pipeline }
    }
}

/// Instance storage buffer of one scene.
pub struct SphereBatch {
    instances: TypedBuffer<SphereGpu>,
    bind_group: wgpu::BindGroup,
    count: u32,
}

impl SphereBatch {
    /// Empty batch.
    #[must_use]
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        // Storage bindings must not be empty, so start with one zeroed slot.
        let instances = TypedBuffer::new_with_data(
            device,
            "Sphere Instances",
            &[bytemuck::Zeroable::zeroed()],
            wgpu::BufferUsages::STORAGE,
        );
        let bind_group = Self::bind(device, layout, &instances);
        Self {
            instances,
            bind_group,
            count: 0,
        }
    }

    fn bind(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        instances: &TypedBuffer<SphereGpu>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sphere Instance Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: instances.buffer().as_entire_binding(),
            }],
        })
    }

    /// Replace the instance data. Rebinds if the buffer had to grow.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        spheres: &[SphereGpu],
    ) {
        if spheres.is_empty() {
            self.count = 0;
            return;
        }
        if self.instances.write(device, queue, spheres) {
            self.bind_group = Self::bind(device, layout, &self.instances);
        }
        #[allow(clippy::cast_possible_truncation)]
        let count = self.instances.count() as u32;
        self.count = count;
    }

    /// Number of spheres drawn by [`Self::draw`].
    #[must_use]
    pub fn len(&self) -> u32 {
        self.count
    }

    /// Returns `true` if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Draw every instance with `pipeline`.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &SpherePipeline,
        camera: &wgpu::BindGroup,
        lighting: &wgpu::BindGroup,
    ) {
        if self.is_empty() {
            return;
        }
        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_bind_group(1, camera, &[]);
        pass.set_bind_group(2, lighting, &[]);
        pass.draw(0..QUAD_VERTICES, 0..self.count);
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::options::Options;
    use crate::scene::build_scenes;

    #[test]
    fn instance_layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SphereGpu>(), 32);
    }

    #[test]
    fn radius_is_geometry_times_scale() {
        let set = build_scenes(&Options::default());
        let spheres = collect_spheres(&set.graph, set.main);
        assert_eq!(spheres.len(), 16);
        assert!(spheres.iter().all(|s| (s.center[3] - 10.0).abs() < 1e-6));
        assert_eq!(spheres[11].center[..3], [40.0, 60.0, 0.0]);
        assert_eq!(spheres[0].color, [1.0, 0.411_765, 0.705_882, 1.0]);
    }

    #[test]
    fn follows_animated_position() {
        let mut set = build_scenes(&Options::default());
        for mesh in set.graph.meshes_mut(set.bloom) {
            mesh.position += DVec3::splat(0.5);
        }
        let spheres = collect_spheres(&set.graph, set.bloom);
        assert_eq!(spheres[0].center[..3], [0.5, 0.5, 0.5]);
        // The main scene is untouched.
        assert_eq!(collect_spheres(&set.graph, set.main)[0].center[..3], [0.0, 0.0, 0.0]);
    }
}
