//! Bloom composer.
//!
//! Renders the bloom scene into an off-screen HDR target with its own depth
//! buffer, then:
//!
//! 1. **Bright pass** - a luminosity high-pass (`smoothstep(threshold,
//!    threshold + 0.01, luma)`) into a half-resolution target.
//! 2. **Blur chain** - five levels, each half the size of the previous one.
//!    Every level runs a separable Gaussian blur (horizontal into a ping
//!    target, vertical back out) with kernel radii 3, 5, 7, 9 and 11; each
//!    level reads the previous level's result, so the bilinear sampler does
//!    the downsampling.
//! 3. **Combine** - the scene color plus every blurred level weighted by
//!    `strength * lerp(f, 1.2 - f, radius)` for `f` in
//!    `1.0 0.8 0.6 0.4 0.2`, written to the framebuffer with additive
//!    blending after a clear.

use wgpu::util::DeviceExt;

use super::HDR_FORMAT;
use crate::compositor::BloomParameters;
use crate::gpu::pipeline_helpers::{self, ADDITIVE_BLEND};
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderError};
use crate::gpu::texture::RenderTarget;

/// Number of blur levels.
pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius per level.
pub const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Base contribution of each level before the radius lerp.
pub const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Width of the high-pass soft edge above the threshold.
pub const SMOOTH_WIDTH: f32 = 0.01;

/// Room for the largest kernel, four coefficients per vec4.
const MAX_COEFFICIENTS: usize = 12;

/// Final weight of each blur level.
#[must_use]
pub fn level_weights(params: &BloomParameters) -> [f32; MIP_COUNT] {
    BLOOM_FACTORS.map(|f| {
        let mirrored = 1.2 - f;
        params.strength * (f + (mirrored - f) * params.radius)
    })
}

/// Normalised-Gaussian coefficients for offsets `0..kernel_radius`, using
/// the radius as sigma. Unused slots are zero.
#[must_use]
pub fn gaussian_coefficients(kernel_radius: u32) -> [f32; MAX_COEFFICIENTS] {
    let mut coefficients = [0.0; MAX_COEFFICIENTS];
    #[allow(clippy::cast_precision_loss)]
    let sigma = kernel_radius as f32;
    for (i, c) in coefficients
        .iter_mut()
        .enumerate()
        .take(kernel_radius as usize)
    {
        #[allow(clippy::cast_precision_loss)]
        let x = i as f32;
        *c = 0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma;
    }
    coefficients
}

/// Size of every blur level for a `width x height` framebuffer. Level 0 is
/// half resolution (rounded), each further level halves again.
#[must_use]
pub fn mip_sizes(width: u32, height: u32) -> [(u32, u32); MIP_COUNT] {
    let half = |v: u32| v.div_ceil(2).max(1);
    let mut size = (half(width), half(height));
    let mut sizes = [(1, 1); MIP_COUNT];
    for slot in &mut sizes {
        *slot = size;
        size = (half(size.0), half(size.1));
    }
    sizes
}

/// Bright-pass and combine parameters. Must match WGSL `BloomUniform`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniform {
    /// Luminance cut-off.
    pub threshold: f32,
    /// Soft edge above the cut-off.
    pub smooth_width: f32,
    _pad: [f32; 2],
    /// Weights of levels 0-3.
    pub weights: [f32; 4],
    /// Weight of level 4.
    pub last_weight: f32,
    _pad2: [f32; 3],
}

impl From<&BloomParameters> for BloomUniform {
    fn from(params: &BloomParameters) -> Self {
        let [w0, w1, w2, w3, w4] = level_weights(params);
        Self {
            threshold: params.threshold,
            smooth_width: SMOOTH_WIDTH,
            _pad: [0.0; 2],
            weights: [w0, w1, w2, w3],
            last_weight: w4,
            _pad2: [0.0; 3],
        }
    }
}

/// One blur direction at one level. Must match WGSL `BlurParams`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    texel_size: [f32; 2],
    direction: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
    coefficients: [[f32; 4]; 3],
}

impl BlurUniform {
    fn new(level: usize, (width, height): (u32, u32), direction: [f32; 2]) -> Self {
        let kernel_radius = KERNEL_RADII[level];
        let flat = gaussian_coefficients(kernel_radius);
        let mut coefficients = [[0.0; 4]; 3];
        for (i, c) in flat.iter().enumerate() {
            coefficients[i / 4][i % 4] = *c;
        }
        #[allow(clippy::cast_precision_loss)]
        let texel_size = [1.0 / width as f32, 1.0 / height as f32];
        Self {
            texel_size,
            direction,
            kernel_radius,
            _pad: [0; 3],
            coefficients,
        }
    }
}

/// Resolution-dependent textures and the bind groups reading them.
struct BloomTargets {
    size: (u32, u32),
    scene: RenderTarget,
    depth: RenderTarget,
    bright: RenderTarget,
    horizontal: Vec<RenderTarget>,
    vertical: Vec<RenderTarget>,
    threshold_bind_group: wgpu::BindGroup,
    /// `[level][0 = horizontal, 1 = vertical]`
    blur_bind_groups: Vec<[wgpu::BindGroup; 2]>,
    combine_bind_group: wgpu::BindGroup,
}

/// Off-screen render + glow chain for the bloom scene.
pub struct BloomComposer {
    sampler: wgpu::Sampler,
    uniform: BloomUniform,
    uniform_buffer: wgpu::Buffer,

    threshold_pipeline: wgpu::RenderPipeline,
    threshold_layout: wgpu::BindGroupLayout,
    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    combine_pipeline: wgpu::RenderPipeline,
    combine_layout: wgpu::BindGroupLayout,

    targets: BloomTargets,
}

impl BloomComposer {
    /// Build the pipelines and size every target for a `size` framebuffer
    /// of format `output_format`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a bloom shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        output_format: wgpu::TextureFormat,
        size: (u32, u32),
        params: &BloomParameters,
    ) -> Result<Self, ShaderError> {
        let sampler = pipeline_helpers::linear_sampler(device, "Bloom Sampler");
        let uniform = BloomUniform::from(params);
        let uniform_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Uniform Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let sampled_with_params = [
            pipeline_helpers::texture_2d(0),
            pipeline_helpers::filtering_sampler(1),
            pipeline_helpers::uniform_buffer(2, wgpu::ShaderStages::FRAGMENT),
        ];
        let threshold_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Threshold Layout"),
                entries: &sampled_with_params,
            });
        let blur_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Blur Layout"),
                entries: &sampled_with_params,
            });
        let mut combine_entries = sampled_with_params.to_vec();
        for level in 0..MIP_COUNT {
            #[allow(clippy::cast_possible_truncation)]
            combine_entries.push(pipeline_helpers::texture_2d(3 + level as u32));
        }
        let combine_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Combine Layout"),
                entries: &combine_entries,
            });

        let threshold_shader =
            shader_composer.compose(device, Shader::BloomThreshold)?;
        let blur_shader = shader_composer.compose(device, Shader::BloomBlur)?;
        let combine_shader =
            shader_composer.compose(device, Shader::BloomCombine)?;

        let threshold_pipeline = pipeline_helpers::create_screen_space_pipeline(
            device,
            "Bloom Threshold",
            &threshold_shader,
            HDR_FORMAT,
            None,
            &[&threshold_layout],
        );
        let blur_pipeline = pipeline_helpers::create_screen_space_pipeline(
            device,
            "Bloom Blur",
            &blur_shader,
            HDR_FORMAT,
            None,
            &[&blur_layout],
        );
        let combine_pipeline = pipeline_helpers::create_screen_space_pipeline(
            device,
            "Bloom Combine",
            &combine_shader,
            output_format,
            Some(ADDITIVE_BLEND),
            &[&combine_layout],
        );

        let targets = BloomTargets::new(
            device,
            size,
            &sampler,
            &uniform_buffer,
            [&threshold_layout, &blur_layout, &combine_layout],
        );

        Ok(Self {
            sampler,
            uniform,
            uniform_buffer,
            threshold_pipeline,
            threshold_layout,
            blur_pipeline,
            blur_layout,
            combine_pipeline,
            combine_layout,
            targets,
        })
    }

    /// Framebuffer size the targets are built for.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.targets.size
    }

    /// Upload new strength / radius / threshold if they changed.
    pub fn set_params(&mut self, queue: &wgpu::Queue, params: &BloomParameters) {
        let uniform = BloomUniform::from(params);
        if uniform == self.uniform {
            return;
        }
        self.uniform = uniform;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[uniform]),
        );
    }

    /// Rebuild every resolution-dependent target.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        log::debug!("bloom targets {width}x{height}");
        self.targets = BloomTargets::new(
            device,
            (width, height),
            &self.sampler,
            &self.uniform_buffer,
            [&self.threshold_layout, &self.blur_layout, &self.combine_layout],
        );
    }

    /// Begin the off-screen pass the bloom scene is drawn in. Color and the
    /// bloom pass's own depth buffer are both cleared.
    pub fn begin_scene_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Bloom Scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.scene.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        })
    }

    /// Run bright pass, blur chain and combine, writing the result to
    /// `output`.
    pub fn composite(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
    ) {
        let targets = &self.targets;
        fullscreen_pass(
            encoder,
            "Bloom Threshold",
            &targets.bright.view,
            &self.threshold_pipeline,
            &targets.threshold_bind_group,
        );
        for (level, [h_bind_group, v_bind_group]) in
            targets.blur_bind_groups.iter().enumerate()
        {
            fullscreen_pass(
                encoder,
                "Bloom Blur H",
                &targets.horizontal[level].view,
                &self.blur_pipeline,
                h_bind_group,
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V",
                &targets.vertical[level].view,
                &self.blur_pipeline,
                v_bind_group,
            );
        }
        fullscreen_pass(
            encoder,
            "Bloom Combine",
            output,
            &self.combine_pipeline,
            &targets.combine_bind_group,
        );
    }
}

/// Clear `view` to black and draw one fullscreen triangle into it.
fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

fn sampled_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffer.as_entire_binding(),
            },
        ],
    })
}

impl BloomTargets {
    fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        [threshold_layout, blur_layout, combine_layout]: [&wgpu::BindGroupLayout; 3],
    ) -> Self {
        let (width, height) = size;
        let levels = mip_sizes(width, height);

        let scene =
            RenderTarget::new(device, "Bloom Scene", width, height, HDR_FORMAT);
        let depth = RenderTarget::depth(device, "Bloom Depth", width, height);
        let (bw, bh) = levels[0];
        let bright = RenderTarget::new(device, "Bloom Bright", bw, bh, HDR_FORMAT);

        let mut horizontal = Vec::with_capacity(MIP_COUNT);
        let mut vertical = Vec::with_capacity(MIP_COUNT);
        for (level, &(w, h)) in levels.iter().enumerate() {
            horizontal.push(RenderTarget::new(
                device,
                &format!("Bloom Horizontal {level}"),
                w,
                h,
                HDR_FORMAT,
            ));
            vertical.push(RenderTarget::new(
                device,
                &format!("Bloom Vertical {level}"),
                w,
                h,
                HDR_FORMAT,
            ));
        }

        let threshold_bind_group = sampled_bind_group(
            device,
            "Bloom Threshold Bind Group",
            threshold_layout,
            &scene.view,
            sampler,
            uniform_buffer,
        );

        let mut blur_bind_groups = Vec::with_capacity(MIP_COUNT);
        for (level, &level_size) in levels.iter().enumerate() {
            let source = if level == 0 {
                &bright.view
            } else {
                &vertical[level - 1].view
            };
            let [h_group, v_group] = [
                (source, [1.0, 0.0], "H"),
                (&horizontal[level].view, [0.0, 1.0], "V"),
            ]
            .map(|(view, direction, axis)| {
                let params = BlurUniform::new(level, level_size, direction);
                let buffer = device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Bloom Blur {axis} Params {level}")),
                        contents: bytemuck::cast_slice(&[params]),
                        usage: wgpu::BufferUsages::UNIFORM,
                    },
                );
                sampled_bind_group(
                    device,
                    &format!("Bloom Blur {axis} Bind Group {level}"),
                    blur_layout,
                    view,
                    sampler,
                    &buffer,
                )
            });
            blur_bind_groups.push([h_group, v_group]);
        }

        let mut combine_entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&scene.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform_buffer.as_entire_binding(),
            },
        ];
        for (level, target) in vertical.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            combine_entries.push(wgpu::BindGroupEntry {
                binding: 3 + level as u32,
                resource: wgpu::BindingResource::TextureView(&target.view),
            });
        }
        let combine_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Bloom Combine Bind Group"),
                layout: combine_layout,
                entries: &combine_entries,
            });

        Self {
            size,
            scene,
            depth,
            bright,
            horizontal,
            vertical,
            threshold_bind_group,
            blur_bind_groups,
            combine_bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<BloomUniform>(), 48);
        assert_eq!(std::mem::size_of::<BlurUniform>(), 80);
    }

    #[test]
    fn default_weights_favour_wide_levels() {
        // radius 1 mirrors every factor to 1.2 - f.
        let w = level_weights(&BloomParameters::default());
        let expected = [0.2, 0.4, 0.6, 0.8, 1.0].map(|f: f32| f * 1.5);
        for (a, b) in w.iter().zip(expected) {
            assert!(close(*a, b), "{w:?}");
        }
    }

    #[test]
    fn zero_radius_keeps_base_factors() {
        let params = BloomParameters {
            strength: 2.0,
            radius: 0.0,
            threshold: 0.0,
        };
        let w = level_weights(&params);
        for (a, f) in w.iter().zip(BLOOM_FACTORS) {
            assert!(close(*a, 2.0 * f));
        }
    }

    #[test]
    fn zero_strength_disables_glow() {
        let params = BloomParameters {
            strength: 0.0,
            ..BloomParameters::default()
        };
        assert!(level_weights(&params).iter().all(|w| *w == 0.0));
    }

    #[test]
    fn gaussian_peaks_at_center_and_stops_at_radius() {
        let c = gaussian_coefficients(3);
        assert!(close(c[0], 0.398_94 / 3.0));
        assert!(c[0] > c[1] && c[1] > c[2]);
        assert!(c[3..].iter().all(|v| *v == 0.0));
        let widest = gaussian_coefficients(11);
        assert!(widest[10] > 0.0);
        assert_eq!(widest[11], 0.0);
    }

    #[test]
    fn mip_chain_halves_with_rounding() {
        assert_eq!(
            mip_sizes(1280, 720),
            [(640, 360), (320, 180), (160, 90), (80, 45), (40, 23)]
        );
    }

    #[test]
    fn mip_chain_never_reaches_zero() {
        assert_eq!(mip_sizes(1, 1), [(1, 1); MIP_COUNT]);
        assert_eq!(mip_sizes(3, 2)[0], (2, 1));
    }

    #[test]
    fn uniform_packs_last_weight_separately() {
        let uniform = BloomUniform::from(&BloomParameters::default());
        assert!(close(uniform.last_weight, 1.5));
        assert!(close(uniform.weights[0], 0.3));
        assert!(close(uniform.smooth_width, SMOOTH_WIDTH));
    }

    #[test]
    fn blur_uniform_packs_coefficients() {
        let blur = BlurUniform::new(4, (40, 20), [1.0, 0.0]);
        assert_eq!(blur.kernel_radius, 11);
        assert!(close(blur.texel_size[0], 1.0 / 40.0));
        let flat = gaussian_coefficients(11);
        assert_eq!(blur.coefficients[2][2], flat[10]);
    }
}
