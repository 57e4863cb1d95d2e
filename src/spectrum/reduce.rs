use image::GrayImage;

// ---------------------------------------------------------------------------
// Frame reduction: one windowed frame → one column-profile contribution
// ---------------------------------------------------------------------------

/// Add each column's mean sample value to the running profile, in place.
///
/// The per-column contribution uses integer-average semantics: the integer
/// sum over the column is divided by the frame height and truncated before it
/// is added to the floating accumulator. O(W·H), no allocation.
pub fn accumulate_columns(frame: &GrayImage, profile: &mut [f64]) {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    debug_assert_eq!(profile.len(), width);
    if height == 0 {
        return;
    }

    let raw = frame.as_raw();
    for (x, acc) in profile.iter_mut().enumerate() {
        let mut sum: u64 = 0;
        for y in 0..height {
            sum += u64::from(raw[y * width + x]);
        }
        *acc += (sum / height as u64) as f64;
    }
}
