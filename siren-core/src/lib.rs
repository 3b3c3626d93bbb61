//! Siren Doppler speed estimator
//!
//! Continuously analyzes a microphone signal for Doppler-shifted tonal
//! peaks near a known siren base frequency, tracks the peak across
//! successive one-block FFTs, and converts the tracked frequency into a
//! vehicle speed in km/h.
//!
//! The typical entry point is [`SpeedSession::start`], which captures from
//! the default microphone and delivers one [`SpeedReading`] per block over
//! a channel. The per-block core is usable standalone through
//! [`TrackingPipeline`].

pub mod audio;
pub mod config;
pub mod session;
pub mod spectrum;
pub mod tracking;

pub use audio::{AudioError, BlockSource};
pub use config::SirenConfig;
pub use session::SpeedSession;
pub use spectrum::{SpectralAnalyzer, SpectralPeak, SpectrumBin};
pub use tracking::{doppler_speed, PeakTracker, SpeedReading, TrackError, TrackingPipeline};
