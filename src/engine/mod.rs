//! The glowgrid engine: GPU context, stage and frame loop in one place.

mod input;

use web_time::Instant;

use crate::animation;
use crate::camera::controller::OrbitController;
use crate::camera::core::Camera;
use crate::compositor::{self, BloomParameters, Compositor, Stage};
use crate::error::GlowGridError;
use crate::gpu::render_context::RenderContext;
use crate::input::InputProcessor;
use crate::options::Options;
use crate::renderer::GpuBackend;
use crate::scene::{build_scenes, SceneGraph, SceneSet};
use crate::schedule::{FrameClock, FrameScheduler};

/// Owns everything needed to draw the sphere grid with bloom.
///
/// # Construction
///
/// Use [`GlowGridEngine::new`] with a window, or
/// [`GlowGridEngine::new_from_context`] with a pre-built [`RenderContext`]
/// for headless or embedded rendering.
///
/// # Frame loop
///
/// Each frame, call [`render`](Self::render) to advance the clock, run the
/// scheduler (animation, bloom pass, main pass) and present. Call
/// [`resize`](Self::resize) when the window size changes. Input is forwarded
/// via [`handle_input`](Self::handle_input).
pub struct GlowGridEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    /// Scene graph, compositor and GPU backend.
    stage: Stage<GpuBackend>,
    /// Animation and pass handlers, in priority order.
    scheduler: FrameScheduler<Stage<GpuBackend>>,
    /// Elapsed time and FPS.
    clock: FrameClock,
    /// Orbit camera.
    camera: OrbitController,
    /// Drag and modifier state.
    input: InputProcessor,
    /// Options the engine was built with.
    options: Options,
}

impl GlowGridEngine {
    /// Engine rendering to `window`.
    ///
    /// # Errors
    ///
    /// Returns [`GlowGridError`] if GPU initialization or shader
    /// composition fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, GlowGridError> {
        let context =
            RenderContext::new(window, size, options.display.linear_output)
                .await?;
        Self::new_from_context(context, options)
    }

    /// Engine from a pre-built [`RenderContext`].
    ///
    /// Use [`RenderContext::from_device`] to create a surface-less context
    /// and draw with [`render_to_texture`](Self::render_to_texture).
    ///
    /// # Errors
    ///
    /// Returns [`GlowGridError`] if shader composition fails.
    pub fn new_from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, GlowGridError> {
        let (width, height) = context.size();
        let camera = OrbitController::new(
            &options.camera,
            Camera::aspect_for(width, height),
        );
        let backend = GpuBackend::new(
            &context.device,
            &context.queue,
            context.format(),
            (width, height),
            camera.camera(),
            &options.bloom,
        )?;

        let SceneSet { graph, main, bloom } = build_scenes(&options);
        let mut compositor = Compositor::new(options.bloom);
        compositor.attach_bloom(bloom);
        compositor.attach_main(main);
        // The backend already built its bloom targets at this size.
        compositor.set_target_size(width, height);

        let mut scheduler: FrameScheduler<Stage<GpuBackend>> =
            FrameScheduler::new();
        let _ = animation::register(&mut scheduler);
        let _ = compositor::register(&mut scheduler);
        log::debug!("frame handlers: {:?}", scheduler.handlers());

        Ok(Self {
            context,
            stage: Stage::new(graph, compositor, backend),
            scheduler,
            clock: FrameClock::new(options.display.target_fps),
            camera,
            input: InputProcessor::new(),
            options,
        })
    }

    /// Draw one frame to the window surface and present it.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next swapchain texture cannot be
    /// acquired. Callers should [`resize`](Self::resize) on `Lost` or
    /// `Outdated`.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_texture(&view);
        frame.present();
        Ok(())
    }

    /// Draw one frame into `view`, which must have the context's format and
    /// size.
    pub fn render_to_texture(&mut self, view: &wgpu::TextureView) {
        let frame = self.clock.advance(Instant::now());
        self.stage.backend.set_camera(self.camera.camera());
        self.stage.backend.begin_frame(view.clone());
        self.scheduler.tick(&mut self.stage, &frame);
        if let Some(encoder) = self.stage.backend.end_frame() {
            self.context.submit(encoder);
        }
    }

    /// Returns `true` once the frame limiter allows another frame.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.clock.should_render(Instant::now())
    }

    /// Reconfigure the surface, main depth buffer, camera aspect and bloom
    /// targets for a new framebuffer size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.stage.backend.resize_surface(width, height);
        self.camera.resize(width, height);
        if !self.stage.resize(width, height) {
            log::trace!("bloom targets already {width}x{height}");
        }
    }

    /// Replace the glow parameters used from the next frame on.
    pub fn set_bloom_params(&mut self, params: BloomParameters) {
        self.options.bloom = params;
        self.stage.compositor.set_bloom_params(params);
    }

    /// Options the engine was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Seconds of animation time so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    /// The orbit camera.
    #[must_use]
    pub fn camera(&self) -> &OrbitController {
        &self.camera
    }

    /// Both sub-scenes.
    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.stage.graph
    }

    /// Pass policy and attached scenes.
    #[must_use]
    pub fn compositor(&self) -> &Compositor {
        &self.stage.compositor
    }
}
