//! Session configuration
//!
//! All numeric parameters are supplied once at startup and never mutated
//! afterwards. Defaults match the reference deployment tuned for French
//! emergency-vehicle sirens.

/// Tracking session configuration
#[derive(Debug, Clone)]
pub struct SirenConfig {
    /// Base (emitted) siren frequency in Hz, used to compute speed
    pub siren_freq: f64,

    /// Audio sample rate in Hz
    pub sample_rate: f64,

    /// Duration of one analysis block in seconds
    pub block_duration: f64,

    /// Lower bound of the plausible-speed band in Hz; peaks below are outliers
    pub min_speed_freq: f64,

    /// Upper bound of the plausible-speed band in Hz
    pub max_speed_freq: f64,

    /// Lower bound of the FFT analysis band in Hz (wider than the speed band
    /// so prominence is judged against real neighbors, not a band edge)
    pub min_fft_freq: f64,

    /// Upper bound of the FFT analysis band in Hz
    pub max_fft_freq: f64,

    /// Minimal separation between accepted peaks, in frequency bins
    pub peak_distance: usize,

    /// Minimal magnitude excess of a peak over its immediate neighbors
    pub peak_threshold: f64,

    /// Minimal absolute magnitude of a peak
    pub peak_height: f64,

    /// Speed of sound in air, in m/s
    pub sound_speed: f64,

    /// Maximal allowed jump from the last tracked frequency, in Hz
    pub freq_deviation: f64,
}

impl Default for SirenConfig {
    fn default() -> Self {
        Self {
            siren_freq: 435.0,
            sample_rate: 44100.0,
            block_duration: 1.0,
            min_speed_freq: 405.0,
            max_speed_freq: 465.0,
            min_fft_freq: 350.0,
            max_fft_freq: 550.0,
            peak_distance: 60,
            peak_threshold: 500_000.0,
            peak_height: 500_000.0,
            sound_speed: 330.0,
            freq_deviation: 5.0,
        }
    }
}

impl SirenConfig {
    /// Number of samples in one analysis block
    pub fn block_len(&self) -> usize {
        (self.sample_rate * self.block_duration).round() as usize
    }
}
