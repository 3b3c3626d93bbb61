//! Tonal peak extraction from a block's magnitude spectrum
//!
//! Finds local maxima inside the analysis band, rejects noise-level bumps
//! with separation/threshold/height criteria, and keeps only peaks inside
//! the narrower plausible-speed band.

use super::fft::FftEngine;
use crate::config::SirenConfig;

/// One `(frequency, magnitude)` point of the analysis band, exported for
/// diagnostic plotting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    pub frequency: f64,
    pub magnitude: f64,
}

/// A tonal peak candidate inside the plausible-speed band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Peak frequency in Hz
    pub frequency: f64,
    /// Spectrum magnitude at the peak bin
    pub magnitude: f64,
}

/// Per-block spectral peak detector
///
/// Planned once for a fixed block length; `analyze` is called once per block.
pub struct SpectralAnalyzer {
    fft: FftEngine,
    min_fft_freq: f64,
    max_fft_freq: f64,
    min_speed_freq: f64,
    max_speed_freq: f64,
    peak_distance: usize,
    peak_threshold: f64,
    peak_height: f64,

    /// Analysis-band spectrum of the most recent block
    band: Vec<SpectrumBin>,
}

impl SpectralAnalyzer {
    pub fn new(config: &SirenConfig) -> Self {
        Self {
            fft: FftEngine::new(config.block_len(), config.sample_rate),
            min_fft_freq: config.min_fft_freq,
            max_fft_freq: config.max_fft_freq,
            min_speed_freq: config.min_speed_freq,
            max_speed_freq: config.max_speed_freq,
            peak_distance: config.peak_distance,
            peak_threshold: config.peak_threshold,
            peak_height: config.peak_height,
            band: Vec::new(),
        }
    }

    /// Analyze one audio block and return its tonal peak candidates
    ///
    /// Returns peaks ordered by ascending frequency, every one strictly
    /// inside the plausible-speed band. Silence, or a block where no bin
    /// clears the height threshold, yields an empty vec.
    pub fn analyze(&mut self, samples: &[f64]) -> Vec<SpectralPeak> {
        let magnitude = self.fft.compute_magnitude(samples);

        // Restrict to the analysis band (strictly inside both bounds)
        self.band.clear();
        for (bin, &mag) in magnitude.iter().enumerate() {
            let freq = self.fft.bin_to_hz(bin);
            if freq > self.min_fft_freq && freq < self.max_fft_freq {
                self.band.push(SpectrumBin {
                    frequency: freq,
                    magnitude: mag,
                });
            }
        }

        let maxima = self.find_local_maxima();
        let kept = self.select_by_distance(maxima);

        // Peaks outside the speed band only served the prominence
        // comparison; they are not candidates for tracking
        let mut peaks: Vec<SpectralPeak> = kept
            .into_iter()
            .map(|i| {
                let bin = self.band[i];
                SpectralPeak {
                    frequency: bin.frequency,
                    magnitude: bin.magnitude,
                }
            })
            .filter(|p| p.frequency > self.min_speed_freq && p.frequency < self.max_speed_freq)
            .collect();
        peaks.sort_by(|a, b| a.frequency.partial_cmp(&b.frequency).unwrap());
        peaks
    }

    /// Analysis-band `(frequency, magnitude)` pairs from the most recent
    /// `analyze` call, for the diagnostic spectrum export
    pub fn band_spectrum(&self) -> &[SpectrumBin] {
        &self.band
    }

    /// Strict local maxima of the band clearing height and neighbor threshold
    fn find_local_maxima(&self) -> Vec<usize> {
        let mut maxima = Vec::new();
        if self.band.len() < 3 {
            return maxima;
        }
        for i in 1..self.band.len() - 1 {
            let prev = self.band[i - 1].magnitude;
            let here = self.band[i].magnitude;
            let next = self.band[i + 1].magnitude;
            if here > prev
                && here > next
                && here >= self.peak_height
                && here - prev >= self.peak_threshold
                && here - next >= self.peak_threshold
            {
                maxima.push(i);
            }
        }
        maxima
    }

    /// Enforce minimal bin separation: taller peaks win, ties go to the
    /// lower frequency
    fn select_by_distance(&self, maxima: Vec<usize>) -> Vec<usize> {
        let mut ranked = maxima;
        ranked.sort_by(|&a, &b| {
            self.band[b]
                .magnitude
                .partial_cmp(&self.band[a].magnitude)
                .unwrap()
                .then(a.cmp(&b))
        });

        let mut kept: Vec<usize> = Vec::new();
        for idx in ranked {
            if kept
                .iter()
                .all(|&k| idx.abs_diff(k) >= self.peak_distance)
            {
                kept.push(idx);
            }
        }
        kept.sort_unstable();
        kept
    }
}
