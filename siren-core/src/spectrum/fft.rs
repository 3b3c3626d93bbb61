//! FFT engine using realfft for real-valued audio blocks
//!
//! One engine instance is planned for a fixed block length and reused for
//! every block of the session.

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (one audio block, in samples)
    fft_size: usize,

    /// Sample rate in Hz, fixes the bin spacing
    sample_rate: f64,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<num_complex::Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - Block length in samples (any length, not only powers of 2)
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(fft_size: usize, sample_rate: f64) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = vec![0.0; fft_size];
        let output_buffer = vec![num_complex::Complex::new(0.0, 0.0); fft_size / 2 + 1];

        Self {
            fft_size,
            sample_rate,
            r2c,
            input_buffer,
            output_buffer,
        }
    }

    /// Compute FFT and return magnitude spectrum
    ///
    /// # Arguments
    /// * `signal` - Input block (zero-padded if shorter than fft_size)
    ///
    /// # Returns
    /// Magnitude spectrum |X[k]| for k = 0..fft_size/2 (positive frequencies only)
    pub fn compute_magnitude(&mut self, signal: &[f64]) -> Vec<f64> {
        let copy_len = signal.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&signal[..copy_len]);
        if copy_len < self.fft_size {
            self.input_buffer[copy_len..].fill(0.0);
        }

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .expect("FFT processing failed");

        self.output_buffer.iter().map(|c| c.norm()).collect()
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Frequency spacing between adjacent bins in Hz
    pub fn resolution(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Convert bin index to frequency in Hz
    pub fn bin_to_hz(&self, bin: usize) -> f64 {
        bin as f64 * self.resolution()
    }
}
