//! Dual-pass compositing.
//!
//! Two independent sub-scenes are drawn every tick:
//!
//! 1. **Bloom** (priority 1): the bloom scene is rendered off-screen, run
//!    through bright-pass extraction, a Gaussian blur chain and a combine
//!    step, and the result is written to the framebuffer.
//! 2. **Main** (priority 2): automatic clearing is off; only the depth
//!    buffer is cleared, then the main scene is drawn straight onto the
//!    framebuffer over the bloom output.
//!
//! The [`Compositor`] owns the policy (which scene feeds which pass, pass
//! order, clear flags, resize de-duplication). The GPU work sits behind
//! [`CompositeBackend`] so the policy can be exercised without a device.

mod resize;

use serde::{Deserialize, Serialize};

pub use resize::ResizeGate;

use crate::scene::{SceneGraph, SceneId};
use crate::schedule::{FrameScheduler, FrameState, HandlerId};

/// Glow parameters of the bloom pass.
///
/// Single precision throughout: the values are uploaded as-is into the
/// bloom uniform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloomParameters {
    /// Multiplier applied to the combined blur levels.
    pub strength: f32,
    /// 0 favours the sharp mip levels, 1 pushes weight to the wide ones.
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl Default for BloomParameters {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 1.0,
            threshold: 0.0,
        }
    }
}

/// Which of the two passes a [`RenderPassSpec`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Off-screen render + glow, composited onto the framebuffer.
    Bloom,
    /// Direct render onto the framebuffer.
    Main,
}

/// Scheduling and clear policy of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPassSpec {
    /// Which pass this is.
    pub kind: PassKind,
    /// Scheduler priority; lower runs first.
    pub priority: i32,
    /// Clear the framebuffer color before drawing.
    pub clears_color: bool,
    /// Clear the depth buffer before drawing.
    pub clears_depth: bool,
}

/// The bloom pass overwrites the framebuffer and owns its own depth target.
pub const BLOOM_PASS: RenderPassSpec = RenderPassSpec {
    kind: PassKind::Bloom,
    priority: 1,
    clears_color: true,
    clears_depth: true,
};

/// The main pass keeps the bloom output and clears only depth.
pub const MAIN_PASS: RenderPassSpec = RenderPassSpec {
    kind: PassKind::Main,
    priority: 2,
    clears_color: false,
    clears_depth: true,
};

/// GPU side of the compositor.
///
/// Implementations may assume calls arrive in pass order within a tick.
pub trait CompositeBackend {
    /// Render `scene` off-screen, apply the glow chain and write the result
    /// to the framebuffer.
    fn composite_bloom(
        &mut self,
        graph: &SceneGraph,
        scene: SceneId,
        params: &BloomParameters,
    );

    /// Render `scene` directly onto the framebuffer honouring the clear
    /// flags in `pass`.
    fn draw_main(
        &mut self,
        graph: &SceneGraph,
        scene: SceneId,
        pass: &RenderPassSpec,
    );

    /// Rebuild the bloom pass's resolution-dependent targets.
    fn resize_bloom_targets(&mut self, width: u32, height: u32);
}

/// Pass policy for the two sub-scenes.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    main: Option<SceneId>,
    bloom: Option<SceneId>,
    params: BloomParameters,
    bloom_targets: ResizeGate,
}

impl Compositor {
    /// Compositor with no scenes attached yet.
    #[must_use]
    pub fn new(params: BloomParameters) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Feed `scene` to the main pass.
    pub fn attach_main(&mut self, scene: SceneId) {
        self.main = Some(scene);
    }

    /// Feed `scene` to the bloom pass.
    pub fn attach_bloom(&mut self, scene: SceneId) {
        self.bloom = Some(scene);
    }

    /// Stop drawing the main pass.
    pub fn detach_main(&mut self) -> Option<SceneId> {
        self.main.take()
    }

    /// Stop drawing the bloom pass.
    pub fn detach_bloom(&mut self) -> Option<SceneId> {
        self.bloom.take()
    }

    /// Scene currently feeding the main pass.
    #[must_use]
    pub fn main_scene(&self) -> Option<SceneId> {
        self.main
    }

    /// Scene currently feeding the bloom pass.
    #[must_use]
    pub fn bloom_scene(&self) -> Option<SceneId> {
        self.bloom
    }

    /// Attached scenes in pass order (bloom first).
    pub fn attached_scenes(&self) -> impl Iterator<Item = SceneId> {
        self.bloom.into_iter().chain(self.main)
    }

    /// Current glow parameters.
    #[must_use]
    pub fn bloom_params(&self) -> &BloomParameters {
        &self.params
    }

    /// Replace the glow parameters.
    pub fn set_bloom_params(&mut self, params: BloomParameters) {
        self.params = params;
    }

    /// Record that the backend already built its bloom targets at this
    /// size, so a resize event carrying the same size is a no-op.
    pub fn set_target_size(&mut self, width: u32, height: u32) {
        self.bloom_targets = ResizeGate::with_size(width, height);
    }

    /// Size the bloom targets were last built at.
    #[must_use]
    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.bloom_targets.size()
    }

    fn resolve(graph: &SceneGraph, scene: Option<SceneId>) -> Option<SceneId> {
        scene.filter(|&s| graph.contains_scene(s))
    }

    /// Run the bloom pass. Returns `false` (and draws nothing) when no
    /// bloom scene is attached yet.
    pub fn render_bloom<B: CompositeBackend + ?Sized>(
        &self,
        graph: &SceneGraph,
        backend: &mut B,
    ) -> bool {
        let Some(scene) = Self::resolve(graph, self.bloom) else {
            log::trace!("bloom pass skipped: no scene attached");
            return false;
        };
        backend.composite_bloom(graph, scene, &self.params);
        true
    }

    /// Run the main pass. Returns `false` (and draws nothing) when no main
    /// scene is attached yet.
    pub fn render_main<B: CompositeBackend + ?Sized>(
        &self,
        graph: &SceneGraph,
        backend: &mut B,
    ) -> bool {
        let Some(scene) = Self::resolve(graph, self.main) else {
            log::trace!("main pass skipped: no scene attached");
            return false;
        };
        backend.draw_main(graph, scene, &MAIN_PASS);
        true
    }

    /// Forward a surface resize to the bloom targets.
    ///
    /// Does nothing while no bloom scene is attached, for zero sizes, and
    /// when the targets already have this size. Returns `true` if the
    /// backend was asked to rebuild.
    pub fn resize<B: CompositeBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> bool {
        if self.bloom.is_none() {
            log::trace!("bloom resize skipped: no scene attached");
            return false;
        }
        if !self.bloom_targets.accept(width, height) {
            return false;
        }
        log::debug!("resizing bloom targets to {width}x{height}");
        backend.resize_bloom_targets(width, height);
        true
    }
}

/// Everything the per-frame handlers operate on.
pub struct Stage<B> {
    /// Both sub-scenes.
    pub graph: SceneGraph,
    /// Pass policy.
    pub compositor: Compositor,
    /// GPU (or test) backend.
    pub backend: B,
}

impl<B: CompositeBackend> Stage<B> {
    /// Bundle a graph, compositor and backend.
    pub fn new(graph: SceneGraph, compositor: Compositor, backend: B) -> Self {
        Self {
            graph,
            compositor,
            backend,
        }
    }

    /// Forward a surface resize to the compositor.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.compositor.resize(&mut self.backend, width, height)
    }
}

/// Install the bloom and main pass handlers at their pass priorities.
pub fn register<B: CompositeBackend + 'static>(
    scheduler: &mut FrameScheduler<Stage<B>>,
) -> [HandlerId; 2] {
    let bloom = scheduler.register(
        "bloom",
        BLOOM_PASS.priority,
        |stage: &mut Stage<B>, _: &FrameState| {
            let _ = stage.compositor.render_bloom(&stage.graph, &mut stage.backend);
        },
    );
    let main = scheduler.register(
        "main",
        MAIN_PASS.priority,
        |stage: &mut Stage<B>, _: &FrameState| {
            let _ = stage.compositor.render_main(&stage.graph, &mut stage.backend);
        },
    );
    [bloom, main]
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use web_time::Duration;

    use super::*;
    use crate::animation;
    use crate::options::Options;
    use crate::scene::build_scenes;
    use crate::schedule::FrameClock;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Bloom { positions: Vec<DVec3>, strength: f32 },
        Main { positions: Vec<DVec3>, pass: RenderPassSpec },
        Resize(u32, u32),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
    }

    impl CompositeBackend for RecordingBackend {
        fn composite_bloom(
            &mut self,
            graph: &SceneGraph,
            scene: SceneId,
            params: &BloomParameters,
        ) {
            self.calls.push(Call::Bloom {
                positions: graph.meshes(scene).map(|m| m.position).collect(),
                strength: params.strength,
            });
        }

        fn draw_main(
            &mut self,
            graph: &SceneGraph,
            scene: SceneId,
            pass: &RenderPassSpec,
        ) {
            self.calls.push(Call::Main {
                positions: graph.meshes(scene).map(|m| m.position).collect(),
                pass: *pass,
            });
        }

        fn resize_bloom_targets(&mut self, width: u32, height: u32) {
            self.calls.push(Call::Resize(width, height));
        }
    }

    fn attached_stage() -> Stage<RecordingBackend> {
        let set = build_scenes(&Options::default());
        let mut compositor = Compositor::new(BloomParameters::default());
        compositor.attach_main(set.main);
        compositor.attach_bloom(set.bloom);
        Stage::new(set.graph, compositor, RecordingBackend::default())
    }

    fn scheduler() -> FrameScheduler<Stage<RecordingBackend>> {
        let mut scheduler = FrameScheduler::new();
        let _ = animation::register(&mut scheduler);
        let _ = register(&mut scheduler);
        scheduler
    }

    #[test]
    fn pass_specs_encode_clear_policy() {
        assert!(BLOOM_PASS.priority < MAIN_PASS.priority);
        assert!(!MAIN_PASS.clears_color);
        assert!(MAIN_PASS.clears_depth);
        assert!(BLOOM_PASS.clears_color);
    }

    #[test]
    fn bloom_runs_before_main_each_tick() {
        let mut stage = attached_stage();
        let mut scheduler = scheduler();
        assert_eq!(
            scheduler.handlers(),
            [("animate", 0), ("bloom", 1), ("main", 2)]
        );

        scheduler.tick(&mut stage, &FrameState::default());
        assert_eq!(stage.backend.calls.len(), 2);
        assert!(matches!(stage.backend.calls[0], Call::Bloom { strength, .. } if strength == 1.5));
        assert!(matches!(
            stage.backend.calls[1],
            Call::Main { pass, .. } if pass == MAIN_PASS
        ));
    }

    #[test]
    fn unattached_scenes_are_skipped_silently() {
        let set = build_scenes(&Options::default());
        let mut stage = Stage::new(
            set.graph,
            Compositor::new(BloomParameters::default()),
            RecordingBackend::default(),
        );
        let mut scheduler = scheduler();

        scheduler.tick(&mut stage, &FrameState::default());
        assert!(stage.backend.calls.is_empty());

        // Attaching later starts drawing on the next tick.
        stage.compositor.attach_bloom(set.bloom);
        scheduler.tick(&mut stage, &FrameState::default());
        assert_eq!(stage.backend.calls.len(), 1);
        assert!(matches!(stage.backend.calls[0], Call::Bloom { .. }));
    }

    #[test]
    fn dangling_scene_handle_is_skipped() {
        let mut stage = attached_stage();
        let other = build_scenes(&Options::default());
        // A handle from a bigger graph that does not resolve here.
        let mut graph = crate::scene::SceneGraph::new();
        let lonely = graph.add_scene("only");
        stage.graph = graph;
        stage.compositor.attach_main(lonely);
        stage.compositor.attach_bloom(other.bloom);

        assert!(!stage.compositor.render_bloom(&stage.graph, &mut stage.backend));
        assert!(stage.compositor.render_main(&stage.graph, &mut stage.backend));
        assert_eq!(stage.backend.calls.len(), 1);
    }

    #[test]
    fn resize_same_size_twice_rebuilds_once() {
        let mut stage = attached_stage();
        assert!(stage.resize(1280, 720));
        assert!(!stage.resize(1280, 720));
        assert_eq!(stage.backend.calls, [Call::Resize(1280, 720)]);
        assert_eq!(stage.compositor.target_size(), Some((1280, 720)));
    }

    #[test]
    fn resize_matching_initial_targets_is_noop() {
        let mut stage = attached_stage();
        stage.compositor.set_target_size(800, 600);
        assert!(!stage.resize(800, 600));
        assert!(stage.backend.calls.is_empty());
    }

    #[test]
    fn resize_before_attach_is_skipped_then_applied() {
        let set = build_scenes(&Options::default());
        let mut stage = Stage::new(
            set.graph,
            Compositor::new(BloomParameters::default()),
            RecordingBackend::default(),
        );
        assert!(!stage.resize(640, 480));
        assert!(stage.backend.calls.is_empty());

        stage.compositor.attach_bloom(set.bloom);
        assert!(stage.resize(640, 480));
        assert_eq!(stage.backend.calls, [Call::Resize(640, 480)]);
    }

    #[test]
    fn first_frame_draws_base_positions() {
        let mut stage = attached_stage();
        let mut scheduler = scheduler();
        let mut clock = FrameClock::new(0);
        scheduler.tick(&mut stage, &clock.advance_by(Duration::from_millis(16)));

        let Call::Bloom { positions, .. } = &stage.backend.calls[0] else {
            panic!("expected bloom call first");
        };
        assert_eq!(positions[11], DVec3::new(40.0, 60.0, 0.0));
    }

    #[test]
    fn sixty_fixed_ticks_stay_within_unit_offset() {
        let mut stage = attached_stage();
        let mut scheduler = scheduler();
        let mut clock = FrameClock::new(0);
        let step = Duration::from_secs_f64(1.0 / 60.0);
        let bases: Vec<DVec3> = stage
            .graph
            .meshes(stage.compositor.main_scene().unwrap())
            .map(|m| m.instance.base_position)
            .collect();

        for _ in 0..60 {
            let frame = clock.advance_by(step);
            scheduler.tick(&mut stage, &frame);
        }

        assert_eq!(stage.backend.calls.len(), 120);
        for (i, call) in stage.backend.calls.iter().enumerate() {
            let positions = match call {
                Call::Bloom { positions, .. } => {
                    assert_eq!(i % 2, 0, "bloom must lead each tick");
                    positions
                }
                Call::Main { positions, .. } => {
                    assert_eq!(i % 2, 1, "main must follow bloom");
                    positions
                }
                Call::Resize(..) => panic!("unexpected resize"),
            };
            assert_eq!(positions.len(), bases.len());
            for (p, base) in positions.iter().zip(&bases) {
                let d = *p - *base;
                assert!(d.abs().max_element() <= 1.0, "offset {d}");
                assert!((d.x - d.y).abs() < 1e-12 && (d.y - d.z).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn bloom_params_reach_the_backend_exactly() {
        let params: BloomParameters =
            toml::from_str("strength = 0.8\nradius = 0.25\nthreshold = 0.6")
                .unwrap();
        assert_eq!(params.strength, 0.8_f32);
        assert_eq!(params.radius, 0.25_f32);
        assert_eq!(params.threshold, 0.6_f32);

        let mut stage = attached_stage();
        stage.compositor.set_bloom_params(params);
        let frame = FrameClock::new(0).advance_by(Duration::ZERO);
        scheduler().tick(&mut stage, &frame);
        assert!(matches!(
            stage.backend.calls.first(),
            Some(Call::Bloom { strength, .. }) if *strength == 0.8_f32
        ));
    }
}
