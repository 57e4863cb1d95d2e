use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// SpectrumSnapshot – read-only copy handed to consumers
// ---------------------------------------------------------------------------

/// A published spectrum: wavelength axis, live intensities, and an optional
/// memorized row. All rows share the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSnapshot {
    pub wavelength: Vec<f64>,
    pub live: Vec<f64>,
    pub memorized: Option<Vec<f64>>,
}

impl SpectrumSnapshot {
    /// Number of pixel columns.
    pub fn width(&self) -> usize {
        self.wavelength.len()
    }

    /// 2 without a memorized spectrum, 3 with one. The only shape contract
    /// consumers may rely on.
    pub fn row_count(&self) -> usize {
        if self.memorized.is_some() { 3 } else { 2 }
    }

    pub fn rows(&self) -> Vec<&[f64]> {
        let mut rows: Vec<&[f64]> = vec![&self.wavelength, &self.live];
        if let Some(mem) = &self.memorized {
            rows.push(mem);
        }
        rows
    }
}

// ---------------------------------------------------------------------------
// SpectrumStore – double-buffered live / memorized spectrum
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Rows {
    wavelength: Vec<f64>,
    live: Vec<f64>,
    memorized: Vec<f64>,
    has_memory: bool,
}

/// Holds the last published spectrum. The mutex is scoped around the row
/// copies only; it is never held across notification or rendering.
#[derive(Default)]
pub struct SpectrumStore {
    rows: Mutex<Rows>,
}

impl SpectrumStore {
    pub fn new() -> Self {
        SpectrumStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, Rows> {
        // A panicking reader cannot leave the rows torn; recover the guard.
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the wavelength and live rows atomically.
    pub fn publish(&self, wavelength: &[f64], live: &[f64]) {
        let mut rows = self.lock();
        rows.wavelength.clear();
        rows.wavelength.extend_from_slice(wavelength);
        rows.live.clear();
        rows.live.extend_from_slice(live);
        // A geometry reset under a held memory leaves the memorized row at
        // the old width; blank it to the new width so rows stay aligned.
        if rows.has_memory && rows.memorized.len() != live.len() {
            rows.memorized.clear();
            rows.memorized.resize(live.len(), 0.0);
        }
    }

    /// Copy the current live row into the memorized row. No-op before the
    /// first publish.
    pub fn memorize(&self) {
        let mut rows = self.lock();
        if rows.live.is_empty() {
            return;
        }
        let Rows {
            live,
            memorized,
            has_memory,
            ..
        } = &mut *rows;
        memorized.clone_from(live);
        *has_memory = true;
    }

    /// Lazy clear: only the flag flips, the stored row is left to be
    /// overwritten or ignored.
    pub fn clear_memory(&self) {
        self.lock().has_memory = false;
    }

    /// Read-only snapshot of the published rows.
    pub fn read(&self) -> SpectrumSnapshot {
        let rows = self.lock();
        SpectrumSnapshot {
            wavelength: rows.wavelength.clone(),
            live: rows.live.clone(),
            memorized: rows.has_memory.then(|| rows.memorized.clone()),
        }
    }
}
