//! Turns a live monochrome video stream into a calibrated, time-accumulated
//! 1-D optical spectrum.
//!
//! Per captured frame: raw frame → [`window::FrameWindower`] →
//! [`spectrum::reduce`] → [`spectrum::accumulate::AccumulationEngine`] →
//! (on trigger) [`spectrum::calibrate`] → [`spectrum::store::SpectrumStore`]
//! → [`spectrum::notify::Notifier`].

pub mod capture;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod spectrum;
pub mod window;
