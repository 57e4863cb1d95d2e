//! Writes a directory of synthetic spectrometer frames for use with
//! `spectracq --frames`. Each frame is a grayscale PNG whose columns carry a
//! few Gaussian emission lines plus per-pixel sensor noise.

use std::path::PathBuf;

use image::{GrayImage, Luma};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".to_string()));
    let count: u32 = args
        .next()
        .map(|v| v.parse().expect("count must be an integer"))
        .unwrap_or(100);

    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 80;

    // Emission lines as (pixel center, sigma, amplitude). The middle line
    // flickers slowly across frames so accumulation has something to average.
    let lines = [
        (130.0, 6.0, 150.0),
        (350.0, 10.0, 210.0),
        (510.0, 4.0, 110.0),
    ];

    std::fs::create_dir_all(&dir).expect("Failed to create frame directory");
    let mut rng = SimpleRng::new(42);

    for frame_no in 0..count {
        let flicker = 1.0 + 0.1 * (frame_no as f64 * 0.3).sin();
        let mut frame = GrayImage::new(WIDTH, HEIGHT);
        for x in 0..WIDTH {
            let signal: f64 = lines
                .iter()
                .enumerate()
                .map(|(i, &(mu, sigma, amp))| {
                    let amp = if i == 1 { amp * flicker } else { amp };
                    gaussian(f64::from(x), mu, sigma, amp)
                })
                .sum();
            for y in 0..HEIGHT {
                let value = (signal + 8.0 + rng.gauss(0.0, 2.5)).clamp(0.0, 255.0) as u8;
                frame.put_pixel(x, y, Luma([value]));
            }
        }
        let path = dir.join(format!("frame_{frame_no:04}.png"));
        frame.save(&path).expect("Failed to write frame");
    }

    println!(
        "Wrote {count} frames ({WIDTH}x{HEIGHT}) to {}",
        dir.display()
    );
}
