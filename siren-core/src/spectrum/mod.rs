//! Spectral analysis with FFT

pub mod fft;
pub mod peaks;

pub use fft::FftEngine;
pub use peaks::{SpectralAnalyzer, SpectralPeak, SpectrumBin};
