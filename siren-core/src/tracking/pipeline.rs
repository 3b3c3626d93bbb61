//! Per-block tracking pipeline
//!
//! Glue running once per audio block: spectrum analysis, peak selection,
//! Doppler conversion. Owns the only `PeakTracker` of a session.

use std::fmt;

use log::trace;

use super::speed::{doppler_speed, TrackError};
use super::tracker::PeakTracker;
use crate::config::SirenConfig;
use crate::spectrum::{SpectralAnalyzer, SpectrumBin};

/// One per-block result delivered to the reading sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedReading {
    /// Tracked speed rounded to the nearest km/h
    /// (half away from zero, `f64::round`)
    Speed(i64),

    /// No trackable peak in this block; a normal value, not an error
    NoSignal,
}

impl fmt::Display for SpeedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedReading::Speed(kmh) => write!(f, "{kmh} km/h"),
            SpeedReading::NoSignal => write!(f, "--"),
        }
    }
}

/// Block-cadence orchestrator: analyzer -> tracker -> speed
pub struct TrackingPipeline {
    analyzer: SpectralAnalyzer,
    tracker: PeakTracker,
    siren_freq: f64,
    sound_speed: f64,
}

impl TrackingPipeline {
    pub fn new(config: &SirenConfig) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(config),
            tracker: PeakTracker::new(config.freq_deviation),
            siren_freq: config.siren_freq,
            sound_speed: config.sound_speed,
        }
    }

    /// Process one audio block into a reading
    ///
    /// `Err` only on `InvalidFrequency`, which upstream filtering makes
    /// unreachable; callers treat it as fatal.
    pub fn process_block(&mut self, samples: &[f64]) -> Result<SpeedReading, TrackError> {
        let candidates = self.analyzer.analyze(samples);
        trace!("block: {} peak candidate(s)", candidates.len());

        match self.tracker.select(&candidates) {
            Some(freq) => {
                let kmh = doppler_speed(freq, self.siren_freq, self.sound_speed)?;
                trace!("tracking {freq:.1} Hz -> {kmh:.1} km/h");
                Ok(SpeedReading::Speed(kmh.round() as i64))
            }
            None => {
                trace!("no signal");
                Ok(SpeedReading::NoSignal)
            }
        }
    }

    /// Analysis-band spectrum of the most recent block, for diagnostic
    /// export to a plotting collaborator
    pub fn band_spectrum(&self) -> &[SpectrumBin] {
        self.analyzer.band_spectrum()
    }

    /// Drop the active track; the next block starts a fresh session
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine_block(freq_hz: f64, amplitude: f64, config: &SirenConfig) -> Vec<f64> {
        (0..config.block_len())
            .map(|n| amplitude * (2.0 * PI * freq_hz * n as f64 / config.sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_reference_block_rounds_to_40_kmh() {
        // 450 Hz heard against a 435 Hz siren at 330 m/s:
        // (1 - 435/450) * 330 * 3.6 = 39.6, rounds to 40
        let config = SirenConfig::default();
        let mut pipeline = TrackingPipeline::new(&config);

        let block = sine_block(450.0, 1000.0, &config);
        let reading = pipeline.process_block(&block).unwrap();
        assert_eq!(reading, SpeedReading::Speed(40));
    }

    #[test]
    fn test_silence_reads_no_signal() {
        let config = SirenConfig::default();
        let mut pipeline = TrackingPipeline::new(&config);

        let silence = vec![0.0; config.block_len()];
        let reading = pipeline.process_block(&silence).unwrap();
        assert_eq!(reading, SpeedReading::NoSignal);
    }

    #[test]
    fn test_track_survives_small_drift_then_loses_signal() {
        let config = SirenConfig::default();
        let mut pipeline = TrackingPipeline::new(&config);

        let first = pipeline
            .process_block(&sine_block(450.0, 1000.0, &config))
            .unwrap();
        assert_eq!(first, SpeedReading::Speed(40));

        // 448 Hz is within the 5 Hz deviation: track continues
        let second = pipeline
            .process_block(&sine_block(448.0, 1000.0, &config))
            .unwrap();
        assert!(matches!(second, SpeedReading::Speed(_)));

        // A 410 Hz tone is 38 Hz away: signal declared lost
        let third = pipeline
            .process_block(&sine_block(410.0, 1000.0, &config))
            .unwrap();
        assert_eq!(third, SpeedReading::NoSignal);

        // The same tone then starts a fresh track
        let fourth = pipeline
            .process_block(&sine_block(410.0, 1000.0, &config))
            .unwrap();
        assert!(matches!(fourth, SpeedReading::Speed(_)));
    }

    #[test]
    fn test_reset_drops_track() {
        let config = SirenConfig::default();
        let mut pipeline = TrackingPipeline::new(&config);

        let block = sine_block(450.0, 1000.0, &config);
        let _ = pipeline.process_block(&block).unwrap();
        pipeline.reset();

        // A frequency far from 450 is accepted immediately after reset
        let reading = pipeline
            .process_block(&sine_block(410.0, 1000.0, &config))
            .unwrap();
        assert!(matches!(reading, SpeedReading::Speed(_)));
    }

    #[test]
    fn test_band_spectrum_available_after_block() {
        let config = SirenConfig::default();
        let mut pipeline = TrackingPipeline::new(&config);

        let block = sine_block(450.0, 1000.0, &config);
        let _ = pipeline.process_block(&block).unwrap();
        assert!(!pipeline.band_spectrum().is_empty());
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(SpeedReading::Speed(40).to_string(), "40 km/h");
        assert_eq!(SpeedReading::Speed(-12).to_string(), "-12 km/h");
        assert_eq!(SpeedReading::NoSignal.to_string(), "--");
    }
}
