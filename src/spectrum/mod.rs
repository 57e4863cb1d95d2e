//! Spectrum core: reduction, accumulation, calibration, and publication.
//!
//! Per-frame data flow:
//! ```text
//!  windowed frame
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reduce   │  column means → running profile
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │ accumulate  │  trigger policy, geometry resets
//!   └────────────┘
//!        │ on trigger
//!        ▼
//!   ┌───────────┐    ┌────────┐    ┌────────┐
//!   │ calibrate  │ →  │ store   │ →  │ notify  │
//!   └───────────┘    └────────┘    └────────┘
//! ```

pub mod accumulate;
pub mod calibrate;
pub mod notify;
pub mod reduce;
pub mod store;

use std::sync::Arc;

use image::GrayImage;

use self::accumulate::{AccumulationEngine, TriggerPolicy};
use self::calibrate::{CalibrationPoint, CalibrationSet};
use self::notify::{Notifier, SpectrumObserver};
use self::store::SpectrumStore;

// ---------------------------------------------------------------------------
// SpectrumModel – engine + calibration + store + notifier, wired together
// ---------------------------------------------------------------------------

/// The spectrum model driven once per captured frame by the acquisition loop.
///
/// `observe` is the single entry point: geometry changes are detected at its
/// top, the frame is folded into the running profile, and on a trigger the
/// finalized row is published and fanned out synchronously before control
/// returns to the frame loop.
pub struct SpectrumModel {
    engine: AccumulationEngine,
    calibration: CalibrationSet,
    wavelength: Vec<f64>,
    store: Arc<SpectrumStore>,
    notifier: Notifier,
}

impl SpectrumModel {
    pub fn new(calibration: CalibrationSet, policy: TriggerPolicy) -> Self {
        SpectrumModel {
            engine: AccumulationEngine::new(policy),
            calibration,
            wavelength: Vec::new(),
            store: Arc::new(SpectrumStore::new()),
            notifier: Notifier::new(),
        }
    }

    /// Process one windowed frame. `window_rev` is the windower's
    /// configuration revision, folded into geometry-change detection.
    pub fn observe(&mut self, frame: &GrayImage, window_rev: u64) {
        let observation = self.engine.observe(frame, window_rev);
        if observation.geometry_reset {
            self.wavelength = self.calibration.axis(self.engine.width());
        }
        if observation.triggered {
            self.store.publish(&self.wavelength, self.engine.finalized());
            self.notifier.notify(&self.store);
        }
    }

    /// Replace the calibration points and recompute the axis for the current
    /// width immediately.
    pub fn set_calibration(&mut self, points: Vec<CalibrationPoint>) {
        self.calibration = CalibrationSet::new(points);
        if self.engine.width() > 0 {
            self.wavelength = self.calibration.axis(self.engine.width());
        }
    }

    pub fn set_trigger(&mut self, policy: TriggerPolicy) {
        self.engine.set_policy(policy);
    }

    pub fn subscribe(&mut self, observer: &Arc<dyn SpectrumObserver>) {
        self.notifier.subscribe(observer);
    }

    pub fn unsubscribe(&mut self, observer: &Arc<dyn SpectrumObserver>) {
        self.notifier.unsubscribe(observer);
    }

    pub fn memorize(&self) {
        self.store.memorize();
    }

    pub fn clear_memory(&self) {
        self.store.clear_memory();
    }

    /// Shared handle to the published spectrum, safe to read from another
    /// thread while the frame loop keeps observing.
    pub fn store(&self) -> Arc<SpectrumStore> {
        Arc::clone(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl SpectrumObserver for Counter {
        fn on_data_updated(&self, _store: &SpectrumStore) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn constant_frame(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn publishes_accumulated_means_every_n_frames() {
        let mut model = SpectrumModel::new(CalibrationSet::default(), TriggerPolicy::Frames(2));
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let handle: Arc<dyn SpectrumObserver> = counter.clone();
        model.subscribe(&handle);

        let frame = constant_frame(4, 2, 100);
        model.observe(&frame, 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);

        model.observe(&frame, 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        let snapshot = model.store().read();
        assert_eq!(snapshot.live, vec![200.0; 4]);
        assert_eq!(snapshot.wavelength, vec![0.0, 1.0, 2.0, 3.0]);

        // Third frame starts a fresh cycle from zero.
        model.observe(&frame, 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        model.observe(&frame, 0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(model.store().read().live, vec![200.0; 4]);
    }

    #[test]
    fn notify_fires_exactly_once_per_n_observes() {
        let mut model = SpectrumModel::new(CalibrationSet::default(), TriggerPolicy::Frames(3));
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let handle: Arc<dyn SpectrumObserver> = counter.clone();
        model.subscribe(&handle);

        let frame = constant_frame(2, 2, 10);
        for _ in 0..9 {
            model.observe(&frame, 0);
        }
        assert_eq!(counter.0.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn width_change_resets_accumulation_and_axis() {
        let mut model = SpectrumModel::new(
            CalibrationSet::new(vec![
                CalibrationPoint {
                    pixel_x: 0,
                    wavelength: 400.0,
                },
                CalibrationPoint {
                    pixel_x: 2,
                    wavelength: 500.0,
                },
            ]),
            TriggerPolicy::Frames(1),
        );

        model.observe(&constant_frame(4, 2, 100), 0);
        assert_eq!(model.store().read().width(), 4);

        model.observe(&constant_frame(6, 2, 50), 0);
        let snapshot = model.store().read();
        assert_eq!(snapshot.width(), 6);
        // Accumulation restarted: one frame of mean 50, nothing carried over
        // from the previous cycle.
        assert_eq!(snapshot.live, vec![50.0; 6]);
        // Calibration was re-run over the new column domain.
        assert_eq!(snapshot.wavelength[0], 400.0);
        assert_eq!(snapshot.wavelength[2], 500.0);
        assert_eq!(snapshot.wavelength[5], 650.0);
    }

    #[test]
    fn calibration_change_applies_to_the_next_publish() {
        let mut model = SpectrumModel::new(CalibrationSet::default(), TriggerPolicy::Frames(1));
        let frame = constant_frame(4, 2, 10);
        model.observe(&frame, 0);
        assert_eq!(model.store().read().wavelength, vec![0.0, 1.0, 2.0, 3.0]);

        model.set_calibration(vec![
            CalibrationPoint {
                pixel_x: 0,
                wavelength: 100.0,
            },
            CalibrationPoint {
                pixel_x: 3,
                wavelength: 400.0,
            },
        ]);
        model.observe(&frame, 0);
        assert_eq!(
            model.store().read().wavelength,
            vec![100.0, 200.0, 300.0, 400.0]
        );
    }
}
