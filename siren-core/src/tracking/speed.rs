//! Doppler frequency-to-speed conversion

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// The tracked frequency reaching the Doppler conversion was
    /// non-positive or non-finite. Upstream band filtering makes this
    /// unreachable; hitting it is a defect, not a user condition.
    #[error("invalid tracked frequency: {0} Hz")]
    InvalidFrequency(f64),
}

/// Convert a tracked siren frequency to a vehicle speed in km/h
///
/// Doppler relation for a moving source and stationary observer:
/// `speed = (1 - siren_freq / tracked_freq) * sound_speed * 3.6`.
/// Positive means the source approaches, negative means it recedes.
pub fn doppler_speed(
    tracked_freq: f64,
    siren_freq: f64,
    sound_speed: f64,
) -> Result<f64, TrackError> {
    if !tracked_freq.is_finite() || tracked_freq <= 0.0 {
        return Err(TrackError::InvalidFrequency(tracked_freq));
    }
    Ok((1.0 - siren_freq / tracked_freq) * sound_speed * 3.6)
}
