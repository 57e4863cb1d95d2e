use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CalibrationPoint – one (pixel column, wavelength) correspondence
// ---------------------------------------------------------------------------

/// A known wavelength at a given pixel column, e.g. from a reference lamp line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub pixel_x: u32,
    pub wavelength: f64,
}

// ---------------------------------------------------------------------------
// CalibrationSet – up to three points, distinct pixel columns
// ---------------------------------------------------------------------------

/// Ordered calibration points with duplicate pixel columns dropped, keeping
/// the earliest occurrence. Only the first three points are ever used for the
/// fit, so a duplicate can silently lower the fit degree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationSet {
    points: Vec<CalibrationPoint>,
}

impl CalibrationSet {
    pub fn new(points: Vec<CalibrationPoint>) -> Self {
        let mut kept: Vec<CalibrationPoint> = Vec::with_capacity(points.len().min(3));
        for pt in points {
            if kept.iter().any(|p| p.pixel_x == pt.pixel_x) {
                log::warn!(
                    "dropping calibration point at duplicate pixel column {}",
                    pt.pixel_x
                );
                continue;
            }
            kept.push(pt);
        }
        CalibrationSet { points: kept }
    }

    /// Number of usable (distinct-column) points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Compute the wavelength axis for a spectrum of `width` columns.
    ///
    /// * 0 or 1 points – identity axis, the pixel index stands in for the
    ///   wavelength.
    /// * 2 points – the straight line through both points exactly.
    /// * 3+ points – the parabola through the first three points exactly.
    pub fn axis(&self, width: usize) -> Vec<f64> {
        match self.points.as_slice() {
            [] | [_] => (0..width).map(|i| i as f64).collect(),
            [p1, p2] => {
                let (x1, y1) = (f64::from(p1.pixel_x), p1.wavelength);
                let (x2, y2) = (f64::from(p2.pixel_x), p2.wavelength);
                let k = (y2 - y1) / (x2 - x1);
                // Average of the two point-implied intercepts; algebraically
                // the exact two-point line, not a least-squares fit.
                let b = ((y2 + y1) - k * (x2 + x1)) * 0.5;
                (0..width).map(|i| k * i as f64 + b).collect()
            }
            [p1, p2, p3, ..] => {
                let (x1, y1) = (f64::from(p1.pixel_x), p1.wavelength);
                let (x2, y2) = (f64::from(p2.pixel_x), p2.wavelength);
                let (x3, y3) = (f64::from(p3.pixel_x), p3.wavelength);
                // Closed-form solve of the 3x3 Vandermonde system; the
                // denominator factors as (x2-x1)(x3-x1)(x3-x2), non-zero for
                // distinct columns.
                let a = ((y3 - y1) * (x2 - x1) - (y2 - y1) * (x3 - x1))
                    / ((x3 * x3 - x1 * x1) * (x2 - x1) - (x2 * x2 - x1 * x1) * (x3 - x1));
                let b = (y2 - y1 - a * (x2 * x2 - x1 * x1)) / (x2 - x1);
                let c = y1 - (a * x1 * x1 + b * x1);
                (0..width)
                    .map(|i| {
                        let x = i as f64;
                        a * x * x + b * x + c
                    })
                    .collect()
            }
        }
    }
}
