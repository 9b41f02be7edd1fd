//! Frame driving.
//!
//! The browser hands out one callback per display refresh, stamped in
//! milliseconds; tests want to step a fixed number of frames. Both go through
//! [`FrameLoop`], which asks a [`FrameClock`] how many updates are due at a
//! timestamp and then presents once.

use crate::scene::SceneContext;

/// Nominal display refresh the scene constants are tuned for.
pub const DISPLAY_FRAME_MS: f64 = 1000.0 / 60.0;

pub trait FrameClock {
    /// Scene updates owed at `now_ms`.
    fn advance(&mut self, now_ms: f64) -> u32;
}

/// One update per call whatever the timestamp. Tests use it to step
/// deterministically.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedStepClock;

impl FrameClock for FixedStepClock {
    fn advance(&mut self, _now_ms: f64) -> u32 {
        1
    }
}

/// Converts wall-clock timestamps into whole steps of `step_ms`, so a
/// 120 Hz display animates at the same pace as a 60 Hz one.
///
/// The accumulator starts half a step full, which absorbs timestamp jitter
/// around the nominal rate. A gap longer than `max_steps` steps (a hidden
/// tab) is dropped instead of replayed.
#[derive(Debug, Clone, Copy)]
pub struct ElapsedClock {
    step_ms: f64,
    max_steps: u32,
    last_ms: Option<f64>,
    carry_ms: f64,
}

impl ElapsedClock {
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self { step_ms, max_steps: max_steps.max(1), last_ms: None, carry_ms: 0.0 }
    }
}

impl Default for ElapsedClock {
    fn default() -> Self {
        Self::new(DISPLAY_FRAME_MS, 4)
    }
}

impl FrameClock for ElapsedClock {
    fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            self.carry_ms = self.step_ms * 0.5;
            return 1;
        };
        let delta = now_ms - last;
        if delta.is_finite() && delta > 0.0 {
            self.carry_ms += delta;
        }
        let due = (self.carry_ms / self.step_ms).floor();
        if due > f64::from(self.max_steps) {
            self.carry_ms = self.step_ms * 0.5;
            return self.max_steps;
        }
        let steps = due as u32;
        self.carry_ms -= f64::from(steps) * self.step_ms;
        steps
    }
}

/// Receives the scene after each tick.
pub trait FrameSink {
    fn present(&mut self, scene: &mut SceneContext);
}

/// Discards frames.
impl FrameSink for () {
    fn present(&mut self, _scene: &mut SceneContext) {}
}

pub struct FrameLoop<C, S> {
    scene: SceneContext,
    clock: C,
    sink: S,
    /// Timeline used by [`FrameLoop::run_frames`].
    synthetic_ms: f64,
}

impl<C: FrameClock, S: FrameSink> FrameLoop<C, S> {
    pub fn new(scene: SceneContext, clock: C, sink: S) -> Self {
        Self { scene, clock, sink, synthetic_ms: 0.0 }
    }

    /// Runs the updates due at `now_ms`, then presents.
    pub fn tick(&mut self, now_ms: f64) {
        for _ in 0..self.clock.advance(now_ms) {
            self.scene.update();
        }
        self.sink.present(&mut self.scene);
    }

    /// Ticks `frames` times on a synthetic 60 Hz timeline.
    pub fn run_frames(&mut self, frames: usize) {
        for _ in 0..frames {
            self.tick(self.synthetic_ms);
            self.synthetic_ms += DISPLAY_FRAME_MS;
        }
    }

    pub fn scene(&self) -> &SceneContext {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneContext {
        &mut self.scene
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_clock_matches_nominal_rate() {
        let mut clock = ElapsedClock::default();
        let steps: u32 = (0..120).map(|i| clock.advance(f64::from(i) * DISPLAY_FRAME_MS)).sum();
        assert_eq!(steps, 120);
    }

    #[test]
    fn elapsed_clock_paces_a_120hz_display() {
        let mut clock = ElapsedClock::default();
        // One second of 120 Hz callbacks.
        let steps: Vec<u32> = (0..=120).map(|i| clock.advance(f64::from(i) * DISPLAY_FRAME_MS / 2.0)).collect();
        assert_eq!(steps.iter().sum::<u32>(), 61);
        assert!(steps.iter().all(|&s| s <= 1));
    }

    #[test]
    fn elapsed_clock_absorbs_jitter() {
        let mut clock = ElapsedClock::default();
        let mut now = 0.0;
        assert_eq!(clock.advance(now), 1);
        for i in 0..60 {
            now += if i % 2 == 0 { 15.0 } else { 18.3 };
            assert_eq!(clock.advance(now), 1);
        }
    }

    #[test]
    fn elapsed_clock_drops_long_gaps() {
        let mut clock = ElapsedClock::default();
        clock.advance(0.0);
        assert_eq!(clock.advance(10_000.0), 4);
        assert_eq!(clock.advance(10_000.0 + DISPLAY_FRAME_MS), 1);
    }

    #[test]
    fn elapsed_clock_ignores_time_going_backwards() {
        let mut clock = ElapsedClock::default();
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0);
        assert_eq!(clock.advance(50.0 + DISPLAY_FRAME_MS), 1);
    }
}
