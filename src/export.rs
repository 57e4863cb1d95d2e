use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::spectrum::store::SpectrumSnapshot;

// ---------------------------------------------------------------------------
// CSV export of a spectrum snapshot
// ---------------------------------------------------------------------------

/// Write a snapshot as semicolon-separated text: header `nm;arb.u` (or
/// `nm;arb.u;arb.u(mem)` with a memorized row), wavelength to 2 decimal
/// places, intensities to 1, one row per pixel column.
pub fn write_csv(snapshot: &SpectrumSnapshot, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating export file {}", path.display()))?;
    write_to(snapshot, file)
}

pub fn write_to<W: Write>(snapshot: &SpectrumSnapshot, writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    match &snapshot.memorized {
        Some(_) => csv.write_record(["nm", "arb.u", "arb.u(mem)"]),
        None => csv.write_record(["nm", "arb.u"]),
    }
    .context("writing CSV header")?;

    for i in 0..snapshot.width() {
        let nm = format!("{:.2}", snapshot.wavelength[i]);
        let live = format!("{:.1}", snapshot.live[i]);
        match &snapshot.memorized {
            Some(memorized) => csv.write_record([nm, live, format!("{:.1}", memorized[i])]),
            None => csv.write_record([nm, live]),
        }
        .with_context(|| format!("writing CSV row {i}"))?;
    }
    csv.flush().context("flushing CSV export")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(snapshot: &SpectrumSnapshot) -> String {
        let mut buffer = Vec::new();
        write_to(snapshot, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn two_column_export_without_memory() {
        let snapshot = SpectrumSnapshot {
            wavelength: vec![400.0, 405.126],
            live: vec![12.34, 56.0],
            memorized: None,
        };
        assert_eq!(render(&snapshot), "nm;arb.u\n400.00;12.3\n405.13;56.0\n");
    }

    #[test]
    fn three_column_export_with_memory() {
        let snapshot = SpectrumSnapshot {
            wavelength: vec![400.0],
            live: vec![12.0],
            memorized: Some(vec![7.25]),
        };
        assert_eq!(
            render(&snapshot),
            "nm;arb.u;arb.u(mem)\n400.00;12.0;7.2\n"
        );
    }

    #[test]
    fn empty_snapshot_exports_header_only() {
        let snapshot = SpectrumSnapshot {
            wavelength: vec![],
            live: vec![],
            memorized: None,
        };
        assert_eq!(render(&snapshot), "nm;arb.u\n");
    }
}
