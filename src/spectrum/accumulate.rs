use std::time::{Duration, Instant};

use image::GrayImage;

use super::reduce;

// ---------------------------------------------------------------------------
// Trigger policy
// ---------------------------------------------------------------------------

/// When a running accumulation cycle is finalized into a published spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Finalize every N frames. N == 0 pauses publication: accumulation
    /// continues but the spectrum never updates.
    Frames(u32),
    /// Finalize once this much wall-clock time has passed since the cycle
    /// started.
    Elapsed(Duration),
}

/// What a single `observe` call did.
#[derive(Debug, Clone, Copy, Default)]
pub struct Observation {
    /// The frame width or window configuration changed and in-flight
    /// accumulation was discarded.
    pub geometry_reset: bool,
    /// The current cycle was finalized; `finalized()` holds the new row.
    pub triggered: bool,
}

// ---------------------------------------------------------------------------
// AccumulationEngine
// ---------------------------------------------------------------------------

/// Owns the running column profile and the trigger bookkeeping.
///
/// Width 0 is the empty state before any frame has been seen; the first
/// `observe` performs a geometry reset and enters the accumulating state.
pub struct AccumulationEngine {
    profile: Vec<f64>,
    finalized: Vec<f64>,
    width: usize,
    window_rev: u64,
    frames_counter: u32,
    cycle_start: Instant,
    policy: TriggerPolicy,
}

impl AccumulationEngine {
    pub fn new(policy: TriggerPolicy) -> Self {
        AccumulationEngine {
            profile: Vec::new(),
            finalized: Vec::new(),
            width: 0,
            window_rev: 0,
            frames_counter: 0,
            cycle_start: Instant::now(),
            policy,
        }
    }

    /// Current profile width; 0 until the first frame arrives.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Takes effect at the next trigger evaluation; sums accumulated so far
    /// are kept as-is.
    pub fn set_policy(&mut self, policy: TriggerPolicy) {
        self.policy = policy;
    }

    /// The row finalized by the most recent trigger.
    pub fn finalized(&self) -> &[f64] {
        &self.finalized
    }

    /// Fold one windowed frame into the running profile.
    ///
    /// `window_rev` is the windower's configuration revision; together with
    /// the frame's own width it forms the geometry compared at the top of
    /// every call. Any mismatch discards the in-flight cycle.
    pub fn observe(&mut self, frame: &GrayImage, window_rev: u64) -> Observation {
        let mut observation = Observation::default();

        let width = frame.width() as usize;
        if width != self.width || window_rev != self.window_rev {
            self.reset_geometry(width, window_rev);
            observation.geometry_reset = true;
        }

        reduce::accumulate_columns(frame, &mut self.profile);

        observation.triggered = self.evaluate_trigger();
        if observation.triggered {
            self.finalized.clear();
            self.finalized.extend_from_slice(&self.profile);
            self.profile.fill(0.0);
            self.cycle_start = Instant::now();
        }
        observation
    }

    fn evaluate_trigger(&mut self) -> bool {
        match self.policy {
            TriggerPolicy::Frames(0) => {
                self.frames_counter = 0;
                false
            }
            TriggerPolicy::Frames(n) => {
                self.frames_counter = (self.frames_counter + 1) % n;
                self.frames_counter == 0
            }
            TriggerPolicy::Elapsed(window) => self.cycle_start.elapsed() >= window,
        }
    }

    fn reset_geometry(&mut self, width: usize, window_rev: u64) {
        log::debug!(
            "geometry reset: width {} → {width}, window rev {} → {window_rev}",
            self.width,
            self.window_rev
        );
        self.profile.clear();
        self.profile.resize(width, 0.0);
        self.width = width;
        self.window_rev = window_rev;
        self.frames_counter = 0;
        self.cycle_start = Instant::now();
    }

    #[cfg(test)]
    pub(crate) fn profile(&self) -> &[f64] {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn constant_frame(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn profile_is_zeroed_right_after_trigger() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Frames(2));
        let frame = constant_frame(4, 2, 100);

        assert!(!engine.observe(&frame, 0).triggered);
        assert!(engine.observe(&frame, 0).triggered);
        assert_eq!(engine.profile(), &[0.0; 4]);
        assert_eq!(engine.finalized(), &[200.0; 4]);
    }

    #[test]
    fn zero_divisor_never_triggers() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Frames(0));
        let frame = constant_frame(4, 2, 100);
        for _ in 0..10 {
            assert!(!engine.observe(&frame, 0).triggered);
        }
        // Accumulation itself keeps running while publication is paused.
        assert_eq!(engine.profile(), &[1000.0; 4]);
    }

    #[test]
    fn width_change_discards_in_flight_accumulation() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Frames(3));
        engine.observe(&constant_frame(4, 2, 100), 0);

        let observation = engine.observe(&constant_frame(6, 2, 50), 0);
        assert!(observation.geometry_reset);
        assert_eq!(engine.width(), 6);
        assert_eq!(engine.profile(), &[50.0; 6]);
    }

    #[test]
    fn window_revision_change_resets_even_at_same_width() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Frames(3));
        let frame = constant_frame(4, 2, 100);
        engine.observe(&frame, 0);
        let observation = engine.observe(&frame, 1);
        assert!(observation.geometry_reset);
        assert_eq!(engine.profile(), &[100.0; 4]);
    }

    #[test]
    fn divisor_change_applies_at_next_evaluation() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Frames(10));
        let frame = constant_frame(2, 2, 10);
        engine.observe(&frame, 0);
        engine.observe(&frame, 0);

        // Counter is at 2; with N=3 the next frame wraps it to 0.
        engine.set_policy(TriggerPolicy::Frames(3));
        assert!(engine.observe(&frame, 0).triggered);
        // Already-accumulated sums were not rescaled.
        assert_eq!(engine.finalized(), &[30.0; 2]);
    }

    #[test]
    fn elapsed_policy_triggers_once_window_has_passed() {
        let mut engine = AccumulationEngine::new(TriggerPolicy::Elapsed(Duration::ZERO));
        let frame = constant_frame(2, 2, 10);
        assert!(engine.observe(&frame, 0).triggered);
        assert_eq!(engine.finalized(), &[10.0; 2]);
    }
}
