//! Peak-tracking state machine
//!
//! Decides, block after block, which spectral peak continues the siren's
//! track. Continuity wins over loudness: a real siren's frequency drifts
//! smoothly, while interference can dominate a single block, so the
//! nearest peak to the last tracked frequency is preferred and the loudest
//! peak is only a fallback. A jump larger than `freq_deviation` means the
//! signal was lost.

use crate::spectrum::SpectralPeak;

/// Stateful peak selector; one instance per tracking session
#[derive(Debug)]
pub struct PeakTracker {
    /// Maximal allowed block-to-block frequency jump in Hz
    freq_deviation: f64,

    /// Frequency selected in the most recent block that produced a track
    last_frequency: Option<f64>,
}

impl PeakTracker {
    pub fn new(freq_deviation: f64) -> Self {
        Self {
            freq_deviation,
            last_frequency: None,
        }
    }

    /// Frequency of the active track, if any
    pub fn last_frequency(&self) -> Option<f64> {
        self.last_frequency
    }

    /// Forget the active track; the next block starts a fresh session
    pub fn reset(&mut self) {
        self.last_frequency = None;
    }

    /// Select the candidate continuing the track, or declare the signal lost
    ///
    /// Priority order:
    /// 1. no candidates: track lost;
    /// 2. no prior track: the loudest candidate starts one;
    /// 3. prior track: the candidate nearest in frequency, if within
    ///    `freq_deviation`, else the loudest candidate if within
    ///    `freq_deviation`, else the track is lost.
    ///
    /// Magnitude ties and distance ties both break toward the lower
    /// frequency, so selection is deterministic for any input order.
    pub fn select(&mut self, candidates: &[SpectralPeak]) -> Option<f64> {
        let selected = self.pick(candidates);
        self.last_frequency = selected;
        selected
    }

    fn pick(&self, candidates: &[SpectralPeak]) -> Option<f64> {
        let loudest = Self::loudest(candidates)?;

        let last = match self.last_frequency {
            None => return Some(loudest.frequency),
            Some(f) => f,
        };

        let nearest = Self::nearest(candidates, last)?;
        if (nearest.frequency - last).abs() < self.freq_deviation {
            Some(nearest.frequency)
        } else if (loudest.frequency - last).abs() < self.freq_deviation {
            Some(loudest.frequency)
        } else {
            // Even a lone peak does not extend the track across a jump
            // larger than the physically plausible Doppler drift
            None
        }
    }

    fn loudest(candidates: &[SpectralPeak]) -> Option<&SpectralPeak> {
        candidates.iter().reduce(|best, p| {
            if p.magnitude > best.magnitude
                || (p.magnitude == best.magnitude && p.frequency < best.frequency)
            {
                p
            } else {
                best
            }
        })
    }

    fn nearest(candidates: &[SpectralPeak], target: f64) -> Option<&SpectralPeak> {
        candidates.iter().reduce(|best, p| {
            let d_p = (p.frequency - target).abs();
            let d_best = (best.frequency - target).abs();
            if d_p < d_best || (d_p == d_best && p.frequency < best.frequency) {
                p
            } else {
                best
            }
        })
    }
}
