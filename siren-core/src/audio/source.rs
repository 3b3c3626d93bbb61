//! Blocking per-block audio acquisition
//!
//! The tracking worker pulls exactly one fixed-duration block per
//! iteration through `BlockSource`. The production implementation drains
//! the capture ring buffer; tests substitute scripted sources.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::buffer::SampleReader;
use super::input::AudioError;

/// Blocking source of fixed-length audio blocks
pub trait BlockSource: Send {
    /// Capture the next block, blocking until it is complete
    ///
    /// `Err` means a fatal device failure; the session ends.
    fn next_block(&mut self) -> Result<Vec<f64>, AudioError>;

    /// Capture sample rate in Hz
    fn sample_rate(&self) -> f64;
}

/// Block source backed by the microphone capture buffer
pub struct MicrophoneSource {
    reader: SampleReader,
    failed: Arc<AtomicBool>,
    block_len: usize,
    sample_rate: f64,
}

impl MicrophoneSource {
    /// # Arguments
    /// * `reader` - Reading end of the capture ring buffer
    /// * `failed` - The input stream's failure flag
    /// * `block_len` - Block length in samples
    /// * `sample_rate` - Capture rate in Hz
    pub fn new(
        reader: SampleReader,
        failed: Arc<AtomicBool>,
        block_len: usize,
        sample_rate: f64,
    ) -> Self {
        Self {
            reader,
            failed,
            block_len,
            sample_rate,
        }
    }
}

impl BlockSource for MicrophoneSource {
    fn next_block(&mut self) -> Result<Vec<f64>, AudioError> {
        let mut block = vec![0.0; self.block_len];
        let mut filled = 0;

        while filled < self.block_len {
            let n = self.reader.read(&mut block[filled..]);
            filled += n;

            if n == 0 {
                if self.failed.load(Ordering::SeqCst) {
                    return Err(AudioError::StreamClosed);
                }
                // Capture runs in real time, so wait for more samples
                // without burning a core
                std::thread::sleep(Duration::from_micros(100));
            }
        }

        Ok(block)
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::SampleBuffer;

    #[test]
    fn test_microphone_source_assembles_block() {
        let (mut writer, reader) = SampleBuffer::new(1024).split();
        let failed = Arc::new(AtomicBool::new(false));
        let mut source = MicrophoneSource::new(reader, failed, 8, 44100.0);

        writer.write(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let block = source.next_block().unwrap();
        assert_eq!(block, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

        // The ninth sample stays buffered for the next block
        assert_eq!(source.reader.len(), 1);
    }

    #[test]
    fn test_microphone_source_reports_device_failure() {
        let (_writer, reader) = SampleBuffer::new(16).split();
        let failed = Arc::new(AtomicBool::new(true));
        let mut source = MicrophoneSource::new(reader, failed, 8, 44100.0);

        assert!(matches!(
            source.next_block(),
            Err(AudioError::StreamClosed)
        ));
    }

    #[test]
    fn test_sample_rate_passthrough() {
        let (_writer, reader) = SampleBuffer::new(16).split();
        let failed = Arc::new(AtomicBool::new(false));
        let source = MicrophoneSource::new(reader, failed, 8, 48000.0);
        assert_eq!(source.sample_rate(), 48000.0);
    }
}
