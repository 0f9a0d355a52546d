use web_time::{Duration, Instant};

use super::FrameState;

/// Animation clock with FPS smoothing and optional frame limiting.
///
/// Elapsed time starts at zero on the first tick, so every sphere sits at its
/// base position in the first rendered frame.
pub struct FrameClock {
    /// Target FPS (0 = unlimited)
    target_fps: u32,
    /// Minimum frame duration based on target FPS
    min_frame_duration: Duration,
    /// Wall-clock start, set on the first tick
    started: Option<Instant>,
    /// Last tick timestamp
    last_frame: Option<Instant>,
    /// Seconds of simulated time
    elapsed: f64,
    /// Ticks so far
    frame: u64,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameClock {
    /// Create a new clock with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            target_fps,
            min_frame_duration,
            started: None,
            last_frame: None,
            elapsed: 0.0,
            frame: 0,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Returns `true` if enough time has passed since the last tick to
    /// render another frame.
    #[must_use]
    pub fn should_render(&self, now: Instant) -> bool {
        if self.target_fps == 0 {
            return true;
        }
        self.last_frame.is_none_or(|last| {
            now.duration_since(last) >= self.min_frame_duration
        })
    }

    /// Advance to wall-clock time `now`.
    pub fn advance(&mut self, now: Instant) -> FrameState {
        let started = *self.started.get_or_insert(now);
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_frame = Some(now);
        self.elapsed = now.duration_since(started).as_secs_f64();
        self.finish_tick(delta)
    }

    /// Advance by a fixed step, independent of wall-clock time.
    pub fn advance_by(&mut self, step: Duration) -> FrameState {
        // The first tick always reports t = 0.
        let delta = if self.frame == 0 { Duration::ZERO } else { step };
        self.elapsed += delta.as_secs_f64();
        self.finish_tick(delta)
    }

    fn finish_tick(&mut self, delta: Duration) -> FrameState {
        let frame_time = delta.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        let state = FrameState {
            elapsed: self.elapsed,
            delta: delta.as_secs_f64(),
            frame: self.frame,
        };
        self.frame += 1;
        state
    }

    /// Seconds since the first tick.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_time_zero() {
        let mut clock = FrameClock::new(0);
        let state = clock.advance(Instant::now());
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.delta, 0.0);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn wall_clock_elapsed_accumulates() {
        let mut clock = FrameClock::new(0);
        let start = Instant::now();
        let _ = clock.advance(start);
        let state = clock.advance(start + Duration::from_millis(500));
        assert!((state.elapsed - 0.5).abs() < 1e-9);
        assert!((state.delta - 0.5).abs() < 1e-9);
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn fixed_step_sixty_ticks() {
        let mut clock = FrameClock::new(0);
        let step = Duration::from_secs_f64(1.0 / 60.0);
        let mut last = FrameState::default();
        for _ in 0..60 {
            last = clock.advance_by(step);
        }
        assert_eq!(last.frame, 59);
        assert!((last.elapsed - 59.0 * step.as_secs_f64()).abs() < 1e-9);
        assert!((last.elapsed - 59.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn fps_converges_toward_frame_rate() {
        let mut clock = FrameClock::new(0);
        let step = Duration::from_millis(10);
        for _ in 0..500 {
            let _ = clock.advance_by(step);
        }
        assert!((clock.fps() - 100.0).abs() < 1.0, "fps {}", clock.fps());
    }

    #[test]
    fn limiter_waits_for_min_duration() {
        let mut clock = FrameClock::new(50);
        let start = Instant::now();
        assert!(clock.should_render(start));
        let _ = clock.advance(start);
        assert!(!clock.should_render(start + Duration::from_millis(5)));
        assert!(clock.should_render(start + Duration::from_millis(20)));
    }

    #[test]
    fn unlimited_always_renders() {
        let mut clock = FrameClock::new(0);
        let now = Instant::now();
        let _ = clock.advance(now);
        assert!(clock.should_render(now));
    }
}
