use wgpu::util::DeviceExt;

use crate::gpu::pipeline_helpers;
use crate::scene::Light;

/// Point lights beyond this count are ignored by the shader.
pub const MAX_POINT_LIGHTS: usize = 4;

/// One point light as laid out in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightGpu {
    /// World-space position.
    pub position: [f32; 3],
    /// Scalar multiplier.
    pub intensity: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
    _pad: f32,
}

/// Lights of one scene: summed ambient term plus up to
/// [`MAX_POINT_LIGHTS`] point lights.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// Sum of every ambient light's `color * intensity`.
    pub ambient: [f32; 3],
    /// Number of valid entries in `points`.
    pub point_count: u32,
    /// Point lights in insertion order.
    pub points: [PointLightGpu; MAX_POINT_LIGHTS],
}

impl LightingUniform {
    /// Gather the lights of a scene.
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = Self::default();
        let mut ambient = glam::Vec3::ZERO;
        let mut count = 0usize;
        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => ambient += color * intensity,
                Light::Point {
                    position,
                    color,
                    intensity,
                } => {
                    if count == MAX_POINT_LIGHTS {
                        log::warn!(
                            "more than {MAX_POINT_LIGHTS} point lights; extra lights ignored"
                        );
                        continue;
                    }
                    uniform.points[count] = PointLightGpu {
                        position: position.to_array(),
                        intensity,
                        color: color.to_array(),
                        _pad: 0.0,
                    };
                    count += 1;
                }
            }
        }
        uniform.ambient = ambient.to_array();
        #[allow(clippy::cast_possible_truncation)]
        let point_count = count as u32;
        uniform.point_count = point_count;
        uniform
    }
}

/// Lighting uniform buffer and its bind group (group 2).
pub struct LightingBinding {
    uniform: LightingUniform,
    buffer: wgpu::Buffer,
    /// Bind group over the uniform buffer.
    pub bind_group: wgpu::BindGroup,
}

impl LightingBinding {
    /// Layout of the lighting bind group.
    #[must_use]
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Layout"),
            entries: &[pipeline_helpers::uniform_buffer(
                0,
                wgpu::ShaderStages::FRAGMENT,
            )],
        })
    }

    /// Allocate the uniform buffer initialized to `uniform`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform: LightingUniform,
    ) -> Self {
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }

    /// Upload `uniform` if it changed.
    pub fn update(&mut self, queue: &wgpu::Queue, uniform: LightingUniform) {
        if uniform == self.uniform {
            return;
        }
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<PointLightGpu>(), 32);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 144);
    }

    #[test]
    fn main_scene_lights() {
        let lights = [Light::point(Vec3::ZERO, 1.0), Light::ambient(1.0)];
        let uniform = LightingUniform::from_lights(&lights);
        assert_eq!(uniform.ambient, [1.0, 1.0, 1.0]);
        assert_eq!(uniform.point_count, 1);
        assert_eq!(uniform.points[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(uniform.points[0].intensity, 1.0);
    }

    #[test]
    fn ambient_lights_accumulate() {
        let lights = [Light::ambient(0.25), Light::ambient(0.5)];
        let uniform = LightingUniform::from_lights(&lights);
        assert_eq!(uniform.ambient, [0.75, 0.75, 0.75]);
        assert_eq!(uniform.point_count, 0);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let lights: Vec<Light> = (0..6)
            .map(|i| Light::point(Vec3::splat(i as f32), 1.0))
            .collect();
        let uniform = LightingUniform::from_lights(&lights);
        assert_eq!(uniform.point_count, 4);
        assert_eq!(uniform.points[3].position, [3.0, 3.0, 3.0]);
    }
}
