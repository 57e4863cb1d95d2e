use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use spectracq::capture::{FrameSource, ImageDirSource, SyntheticSource};
use spectracq::config::Options;
use spectracq::export;
use spectracq::pipeline::AcquisitionPipeline;
use spectracq::spectrum::notify::SpectrumObserver;
use spectracq::spectrum::store::SpectrumStore;

// ---------------------------------------------------------------------------
// Console subscriber – stands in for a plot view
// ---------------------------------------------------------------------------

/// Logs a one-line summary of every published spectrum.
struct ConsoleSubscriber;

impl SpectrumObserver for ConsoleSubscriber {
    fn on_data_updated(&self, store: &SpectrumStore) {
        let snapshot = store.read();
        let peak = snapshot
            .live
            .iter()
            .zip(&snapshot.wavelength)
            .max_by(|a, b| a.0.total_cmp(b.0));
        if let Some((intensity, nm)) = peak {
            log::info!(
                "spectrum updated: {} columns ({} rows), peak {intensity:.1} arb.u at {nm:.2} nm",
                snapshot.width(),
                snapshot.row_count()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

struct Cli {
    options: PathBuf,
    frames: Option<PathBuf>,
    count: u64,
    memorize_at: Option<u64>,
    out: PathBuf,
}

const USAGE: &str = "\
Usage: spectracq [OPTIONS]

  --options FILE      options file (default: spectracq.options.json)
  --frames DIR        read frames from an image directory instead of the
                      built-in synthetic source
  --count N           number of frames to process (default: 250)
  --memorize-at N     memorize the live spectrum after frame N; the export
                      then carries a third column
  --out FILE          CSV export path (default: spectrum.csv)";

fn parse_args() -> Result<Cli> {
    let mut cli = Cli {
        options: PathBuf::from("spectracq.options.json"),
        frames: None,
        count: 250,
        memorize_at: None,
        out: PathBuf::from("spectrum.csv"),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--options" => cli.options = PathBuf::from(value("--options")?),
            "--frames" => cli.frames = Some(PathBuf::from(value("--frames")?)),
            "--count" => cli.count = value("--count")?.parse().context("parsing --count")?,
            "--memorize-at" => {
                cli.memorize_at = Some(
                    value("--memorize-at")?
                        .parse()
                        .context("parsing --memorize-at")?,
                )
            }
            "--out" => cli.out = PathBuf::from(value("--out")?),
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}\n{USAGE}"),
        }
    }
    Ok(cli)
}

// ---------------------------------------------------------------------------
// Acquisition loop
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = parse_args()?;

    let options = Options::load(&cli.options);
    log::info!(
        "roi {:?}, rotation {} deg, {} calibration points, trigger {:?}",
        options.roi,
        options.rotation_deg,
        options.calibration.len(),
        options.trigger
    );

    let mut source: Box<dyn FrameSource> = match &cli.frames {
        Some(dir) => Box::new(
            ImageDirSource::new(dir, None)
                .with_context(|| format!("opening frame directory {}", dir.display()))?,
        ),
        None => Box::new(SyntheticSource::new(640, 80)),
    };
    log::info!("capture source: {}x{}", source.width(), source.height());

    let mut pipeline = AcquisitionPipeline::new(&options);
    let console: Arc<dyn SpectrumObserver> = Arc::new(ConsoleSubscriber);
    pipeline.subscribe(&console);

    for frame_no in 1..=cli.count {
        let frame = source.read().context("reading frame")?;
        pipeline.process_frame(&frame);
        if cli.memorize_at == Some(frame_no) {
            pipeline.memorize();
            log::info!("memorized the live spectrum after frame {frame_no}");
        }
    }

    let snapshot = pipeline.store().read();
    if snapshot.width() == 0 {
        log::warn!("no spectrum was published; nothing to export");
    } else {
        export::write_csv(&snapshot, &cli.out)?;
        log::info!(
            "exported {} columns to {}",
            snapshot.width(),
            cli.out.display()
        );
    }

    options.save(&cli.options).context("saving options file")?;
    Ok(())
}
