use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use image::{GrayImage, Luma};
use thiserror::Error;

// ---------------------------------------------------------------------------
// FrameSource – the capture collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no decodable frames in {0}")]
    EmptySource(PathBuf),
    #[error("failed to decode frame {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to scan frame directory")]
    Io(#[from] std::io::Error),
}

/// Supplies grayscale frames, one per `read` call. The frame's own width
/// field is what the core compares for geometry changes.
pub trait FrameSource {
    fn read(&mut self) -> Result<GrayImage, CaptureError>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

// ---------------------------------------------------------------------------
// ImageDirSource – looped playback of an image directory
// ---------------------------------------------------------------------------

const FRAME_EXTENSIONS: [&str; 2] = ["png", "jpg"];

/// Plays the image files of a directory in name order, looping at the end,
/// optionally paced to a fixed inter-frame delay.
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    next: usize,
    width: u32,
    height: u32,
    frame_delay: Option<Duration>,
}

impl ImageDirSource {
    pub fn new(dir: &Path, frame_delay: Option<Duration>) -> Result<Self, CaptureError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();

        let first = paths
            .first()
            .ok_or_else(|| CaptureError::EmptySource(dir.to_path_buf()))?;
        let probe = load_gray(first)?;
        log::info!(
            "frame directory {}: {} frames, {}x{}",
            dir.display(),
            paths.len(),
            probe.width(),
            probe.height()
        );
        Ok(ImageDirSource {
            width: probe.width(),
            height: probe.height(),
            paths,
            next: 0,
            frame_delay,
        })
    }
}

impl FrameSource for ImageDirSource {
    fn read(&mut self) -> Result<GrayImage, CaptureError> {
        if let Some(delay) = self.frame_delay {
            thread::sleep(delay);
        }
        let path = self.paths[self.next].clone();
        self.next = (self.next + 1) % self.paths.len();
        load_gray(&path)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

fn load_gray(path: &Path) -> Result<GrayImage, CaptureError> {
    let image = image::open(path).map_err(|source| CaptureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_luma8())
}

// ---------------------------------------------------------------------------
// SyntheticSource – deterministic stand-in for a camera
// ---------------------------------------------------------------------------

/// Emits frames with a handful of Gaussian emission lines plus a small
/// per-frame jitter, constant down each sensor column. Deterministic, so runs
/// are reproducible without hardware.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_no: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        SyntheticSource {
            width,
            height,
            frame_no: 0,
        }
    }
}

/// Emission lines as (center fraction of width, sigma in pixels, amplitude).
const LINES: [(f64, f64, f64); 3] = [(0.2, 6.0, 160.0), (0.55, 10.0, 220.0), (0.8, 4.0, 120.0)];

impl FrameSource for SyntheticSource {
    fn read(&mut self) -> Result<GrayImage, CaptureError> {
        self.frame_no += 1;
        let mut frame = GrayImage::new(self.width, self.height);
        for x in 0..self.width {
            let signal: f64 = LINES
                .iter()
                .map(|&(center, sigma, amplitude)| {
                    let mu = center * f64::from(self.width);
                    let d = f64::from(x) - mu;
                    amplitude * (-d * d / (2.0 * sigma * sigma)).exp()
                })
                .sum();
            let jitter = (mix(self.frame_no, u64::from(x)) % 9) as f64 - 4.0;
            let value = (signal + 10.0 + jitter).clamp(0.0, 255.0) as u8;
            for y in 0..self.height {
                frame.put_pixel(x, y, Luma([value]));
            }
        }
        Ok(frame)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// splitmix64-style hash, enough for pixel jitter.
fn mix(a: u64, b: u64) -> u64 {
    let mut z = a
        .wrapping_mul(0x9e3779b97f4a7c15)
        .wrapping_add(b)
        .wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
