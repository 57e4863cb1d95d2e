use std::borrow::Cow;

use image::{imageops, GrayImage};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roi – rectangular region of interest in frame coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    /// An all-zero (or zero-area) rectangle stands for "no ROI".
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ---------------------------------------------------------------------------
// FrameWindower – ROI crop ∘ rotation, applied before reduction
// ---------------------------------------------------------------------------

/// Produces the sub-image the reducer consumes. While the configuration is
/// unchanged the output geometry is stable; every configuration change bumps
/// `revision`, which the accumulation engine treats as a geometry change.
pub struct FrameWindower {
    roi: Option<Roi>,
    angle_deg: f64,
    revision: u64,
}

impl FrameWindower {
    pub fn new(roi: Roi, angle_deg: f64) -> Self {
        FrameWindower {
            roi: (!roi.is_empty()).then_some(roi),
            angle_deg,
            revision: 0,
        }
    }

    pub fn set_roi(&mut self, roi: Roi) {
        let roi = (!roi.is_empty()).then_some(roi);
        if roi != self.roi {
            self.roi = roi;
            self.revision += 1;
        }
    }

    /// Rotation angle in degrees, positive is counter-clockwise.
    pub fn set_rotation(&mut self, angle_deg: f64) {
        if angle_deg != self.angle_deg {
            self.angle_deg = angle_deg;
            self.revision += 1;
        }
    }

    /// Configuration revision, bumped on every ROI/rotation change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn apply<'a>(&self, frame: &'a GrayImage) -> Cow<'a, GrayImage> {
        let rotated = self.angle_deg != 0.0;
        match (self.roi, rotated) {
            (None, false) => Cow::Borrowed(frame),
            (None, true) => Cow::Owned(rotate_about_center(frame, self.angle_deg)),
            (Some(roi), false) => Cow::Owned(crop_clamped(frame, roi)),
            (Some(roi), true) => Cow::Owned(self.crop_rotate_crop(frame, roi)),
        }
    }

    /// Rotating a ROI-sized patch directly would leave undefined border
    /// pixels inside the output, so cut a larger patch first, rotate it about
    /// its own center, then cut the ROI-sized result out of the middle.
    fn crop_rotate_crop(&self, frame: &GrayImage, roi: Roi) -> GrayImage {
        // Clamp the ROI itself first; an out-of-range rectangle straight from
        // the options file must not push the bounds past the frame.
        let roi = clamp_to_frame(roi, frame.width(), frame.height());
        let bounds = rotation_bounds(roi, self.angle_deg, frame.width(), frame.height());
        let patch = crop_clamped(frame, bounds);
        let rotated = rotate_about_center(&patch, self.angle_deg);
        center_crop(&rotated, roi.width, roi.height)
    }
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Union of the ROI and the axis-aligned bounding box of the rotated ROI,
/// both centered on the ROI center, clamped to the frame.
fn rotation_bounds(roi: Roi, angle_deg: f64, frame_width: u32, frame_height: u32) -> Roi {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let half_w = f64::from(roi.width) / 2.0;
    let half_h = f64::from(roi.height) / 2.0;
    // Half-extents of the rotated ROI's bounding box.
    let rot_half_w = half_w * cos.abs() + half_h * sin.abs();
    let rot_half_h = half_w * sin.abs() + half_h * cos.abs();
    let union_half_w = rot_half_w.max(half_w);
    let union_half_h = rot_half_h.max(half_h);

    let cx = f64::from(roi.x) + half_w;
    let cy = f64::from(roi.y) + half_h;
    let x0 = (cx - union_half_w).floor().max(0.0) as u32;
    let y0 = (cy - union_half_h).floor().max(0.0) as u32;
    let x1 = (cx + union_half_w).ceil().min(f64::from(frame_width)) as u32;
    let y1 = (cy + union_half_h).ceil().min(f64::from(frame_height)) as u32;
    Roi {
        x: x0.min(x1),
        y: y0.min(y1),
        width: x1.saturating_sub(x0),
        height: y1.saturating_sub(y0),
    }
}

/// Shrink a rectangle so it lies within the frame, keeping at least one
/// pixel in each direction.
fn clamp_to_frame(rect: Roi, frame_width: u32, frame_height: u32) -> Roi {
    let x = rect.x.min(frame_width.saturating_sub(1));
    let y = rect.y.min(frame_height.saturating_sub(1));
    Roi {
        x,
        y,
        width: rect.width.min(frame_width - x),
        height: rect.height.min(frame_height - y),
    }
}

/// Crop with the rectangle clamped to the frame bounds.
fn crop_clamped(frame: &GrayImage, rect: Roi) -> GrayImage {
    let rect = clamp_to_frame(rect, frame.width(), frame.height());
    imageops::crop_imm(frame, rect.x, rect.y, rect.width, rect.height).to_image()
}

fn center_crop(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    let width = width.min(image.width());
    let height = height.min(image.height());
    let x = (image.width() - width) / 2;
    let y = (image.height() - height) / 2;
    imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Rotate about the image center, keeping the canvas size. Nearest-neighbor
/// inverse mapping; destination pixels falling outside the source stay black.
fn rotate_about_center(src: &GrayImage, angle_deg: f64) -> GrayImage {
    let (width, height) = src.dimensions();
    let cx = (f64::from(width) - 1.0) / 2.0;
    let cy = (f64::from(height) - 1.0) / 2.0;
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    let mut dst = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            // Inverse rotation: map the destination pixel back into source
            // space and sample the nearest pixel.
            let sx = (cos * dx + sin * dy + cx).round();
            let sy = (-sin * dx + cos * dy + cy).round();
            if sx >= 0.0 && sy >= 0.0 && sx < f64::from(width) && sy < f64::from(height) {
                dst.put_pixel(x, y, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    dst
}
