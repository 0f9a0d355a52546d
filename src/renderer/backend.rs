use std::collections::HashMap;

use super::bloom::BloomComposer;
use super::lighting::{LightingBinding, LightingUniform};
use super::sphere::{self, SphereBatch, SpherePipeline};
use super::HDR_FORMAT;
use crate::camera::binding::CameraBinding;
use crate::camera::core::Camera;
use crate::compositor::{BloomParameters, CompositeBackend, RenderPassSpec};
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderError};
use crate::gpu::texture::RenderTarget;
use crate::scene::{SceneGraph, SceneId};

/// GPU buffers owned by one scene.
struct SceneResources {
    spheres: SphereBatch,
    lighting: LightingBinding,
}

/// Encoder and framebuffer of the frame being recorded.
struct FrameTarget {
    encoder: wgpu::CommandEncoder,
    view: wgpu::TextureView,
    /// Set once a pass has written the framebuffer's color this frame.
    color_written: bool,
}

/// How the main pass loads framebuffer color.
///
/// A pass that keeps color still clears when nothing has been written yet
/// this frame, since the swapchain texture content is undefined.
#[must_use]
pub fn main_color_load(
    pass: &RenderPassSpec,
    color_written: bool,
) -> wgpu::LoadOp<wgpu::Color> {
    if pass.clears_color || !color_written {
        wgpu::LoadOp::Clear(wgpu::Color::BLACK)
    } else {
        wgpu::LoadOp::Load
    }
}

/// wgpu implementation of [`CompositeBackend`].
///
/// Calls are recorded into the encoder opened by [`Self::begin_frame`];
/// outside a frame they are skipped.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    instance_layout: wgpu::BindGroupLayout,
    lighting_layout: wgpu::BindGroupLayout,
    offscreen_pipeline: SpherePipeline,
    framebuffer_pipeline: SpherePipeline,
    camera: CameraBinding,

    scenes: HashMap<SceneId, SceneResources>,
    bloom: BloomComposer,
    depth: RenderTarget,
    frame: Option<FrameTarget>,
}

impl GpuBackend {
    /// Build pipelines and targets for a `size` framebuffer of `format`.
    ///
    /// # Errors
    ///
    /// Returns [`ShaderError`] if a shader fails to compose.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        camera: &Camera,
        params: &BloomParameters,
    ) -> Result<Self, ShaderError> {
        let mut composer = ShaderComposer::new()?;
        let sphere_shader = composer.compose(device, Shader::Sphere)?;

        let camera = CameraBinding::new(device, camera);
        let instance_layout = sphere::instance_layout(device);
        let lighting_layout = LightingBinding::layout(device);
        let layouts = [&instance_layout, &camera.layout, &lighting_layout];
        let offscreen_pipeline =
            SpherePipeline::new(device, &sphere_shader, &layouts, HDR_FORMAT);
        let framebuffer_pipeline =
            SpherePipeline::new(device, &sphere_shader, &layouts, format);

        let bloom =
            BloomComposer::new(device, &mut composer, format, size, params)?;
        let depth = RenderTarget::depth(device, "Main Depth", size.0, size.1);

        log::debug!("gpu backend ready ({format:?}, {}x{})", size.0, size.1);
        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            instance_layout,
            lighting_layout,
            offscreen_pipeline,
            framebuffer_pipeline,
            camera,
            scenes: HashMap::new(),
            bloom,
            depth,
            frame: None,
        })
    }

    /// Start recording a frame that renders into `view`.
    pub fn begin_frame(&mut self, view: wgpu::TextureView) {
        if self.frame.is_some() {
            log::warn!("begin_frame while a frame is open; dropping it");
        }
        let encoder =
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });
        self.frame = Some(FrameTarget {
            encoder,
            view,
            color_written: false,
        });
    }

    /// Close the current frame and hand back its encoder for submission.
    pub fn end_frame(&mut self) -> Option<wgpu::CommandEncoder> {
        self.frame.take().map(|frame| frame.encoder)
    }

    /// Upload the camera used by both passes.
    pub fn set_camera(&mut self, camera: &Camera) {
        self.camera.update(&self.queue, camera);
    }

    /// Rebuild the main pass depth buffer for a new framebuffer size.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.depth.size() == (width, height) {
            return;
        }
        self.depth = RenderTarget::depth(&self.device, "Main Depth", width, height);
    }

    /// Drop the GPU buffers cached for `scene`.
    pub fn release_scene(&mut self, scene: SceneId) -> bool {
        self.scenes.remove(&scene).is_some()
    }

    /// Upload the current sphere positions and lights of `scene`.
    fn prepare_scene(&mut self, graph: &SceneGraph, scene: SceneId) {
        let resources = self.scenes.entry(scene).or_insert_with(|| {
            log::debug!("allocating gpu buffers for {scene:?}");
            SceneResources {
                spheres: SphereBatch::new(&self.device, &self.instance_layout),
                lighting: LightingBinding::new(
                    &self.device,
                    &self.lighting_layout,
                    LightingUniform::default(),
                ),
            }
        });
        let spheres = sphere::collect_spheres(graph, scene);
        resources.spheres.upload(
            &self.device,
            &self.queue,
            &self.instance_layout,
            &spheres,
        );
        resources
            .lighting
            .update(&self.queue, LightingUniform::from_lights(graph.lights(scene)));
    }
}

impl CompositeBackend for GpuBackend {
    fn composite_bloom(
        &mut self,
        graph: &SceneGraph,
        scene: SceneId,
        params: &BloomParameters,
    ) {
        if self.frame.is_none() {
            log::trace!("bloom pass outside a frame; skipped");
            return;
        }
        self.bloom.set_params(&self.queue, params);
        self.prepare_scene(graph, scene);

        let (Some(frame), Some(resources)) =
            (self.frame.as_mut(), self.scenes.get(&scene))
        else {
            return;
        };
        {
            let mut pass = self.bloom.begin_scene_pass(&mut frame.encoder);
            resources.spheres.draw(
                &mut pass,
                &self.offscreen_pipeline,
                &self.camera.bind_group,
                &resources.lighting.bind_group,
            );
        }
        self.bloom.composite(&mut frame.encoder, &frame.view);
        frame.color_written = true;
    }

    fn draw_main(
        &mut self,
        graph: &SceneGraph,
        scene: SceneId,
        pass: &RenderPassSpec,
    ) {
        if self.frame.is_none() {
            log::trace!("main pass outside a frame; skipped");
            return;
        }
        self.prepare_scene(graph, scene);

        let (Some(frame), Some(resources)) =
            (self.frame.as_mut(), self.scenes.get(&scene))
        else {
            return;
        };
        let depth_load = if pass.clears_depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        {
            let mut render_pass =
                frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Main Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &frame.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: main_color_load(pass, frame.color_written),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: depth_load,
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });
            resources.spheres.draw(
                &mut render_pass,
                &self.framebuffer_pipeline,
                &self.camera.bind_group,
                &resources.lighting.bind_group,
            );
        }
        frame.color_written = true;
    }

    fn resize_bloom_targets(&mut self, width: u32, height: u32) {
        self.bloom.resize(&self.device, width, height);
    }
}
