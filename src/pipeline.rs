use std::sync::Arc;

use image::GrayImage;

use crate::config::Options;
use crate::spectrum::calibrate::CalibrationSet;
use crate::spectrum::notify::SpectrumObserver;
use crate::spectrum::store::SpectrumStore;
use crate::spectrum::SpectrumModel;
use crate::window::{FrameWindower, Roi};

// ---------------------------------------------------------------------------
// AcquisitionPipeline – windowing transform in front, spectrum model behind
// ---------------------------------------------------------------------------

/// Owns the per-frame path. The windower's configuration revision is passed
/// into the model on every frame, so a ROI or rotation change and a physical
/// width change go through the same geometry-reset path.
pub struct AcquisitionPipeline {
    windower: FrameWindower,
    model: SpectrumModel,
}

impl AcquisitionPipeline {
    pub fn new(options: &Options) -> Self {
        AcquisitionPipeline {
            windower: FrameWindower::new(options.roi, options.rotation_deg),
            model: SpectrumModel::new(
                CalibrationSet::new(options.calibration.clone()),
                options.trigger.into(),
            ),
        }
    }

    /// Drive one captured frame through windowing and observation.
    pub fn process_frame(&mut self, frame: &GrayImage) {
        let windowed = self.windower.apply(frame);
        self.model.observe(&windowed, self.windower.revision());
    }

    pub fn set_roi(&mut self, roi: Roi) {
        self.windower.set_roi(roi);
    }

    pub fn set_rotation(&mut self, angle_deg: f64) {
        self.windower.set_rotation(angle_deg);
    }

    pub fn subscribe(&mut self, observer: &Arc<dyn SpectrumObserver>) {
        self.model.subscribe(observer);
    }

    pub fn memorize(&self) {
        self.model.memorize();
    }

    pub fn clear_memory(&self) {
        self.model.clear_memory();
    }

    pub fn store(&self) -> Arc<SpectrumStore> {
        self.model.store()
    }
}
