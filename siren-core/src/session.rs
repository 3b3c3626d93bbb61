//! Tracking session: worker thread, stop flag, and result handoff
//!
//! One dedicated worker runs the tracking pipeline in a tight loop, one
//! captured block per iteration. It is the sole owner of the tracking
//! state. Readings cross to the consumer through an mpsc channel, drained
//! on the consumer's own context (e.g. a UI loop) in production order.
//! The per-block analysis spectrum is published into a latest-value slot
//! for best-effort diagnostic plotting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{error, info};

use crate::audio::input::AudioDeviceInfo;
use crate::audio::{AudioError, BlockSource, MicrophoneInput, MicrophoneSource, SampleBuffer};
use crate::config::SirenConfig;
use crate::spectrum::SpectrumBin;
use crate::tracking::{SpeedReading, TrackingPipeline};

/// A running speed-tracking session
///
/// Dropping the session stops the worker and releases the audio device.
pub struct SpeedSession {
    input: Option<MicrophoneInput>,
    worker: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    spectrum: Arc<Mutex<Option<Vec<SpectrumBin>>>>,
}

impl SpeedSession {
    /// Start capturing from the default microphone and tracking
    ///
    /// Returns the session handle and the receiver delivering one
    /// `SpeedReading` per block, in production order.
    pub fn start(config: SirenConfig) -> Result<(Self, Receiver<SpeedReading>), AudioError> {
        let block_len = config.block_len();

        // Room for a few blocks so a slow consumer iteration cannot
        // starve the capture callback
        let buffer = SampleBuffer::new(block_len * 4);
        let (writer, reader) = buffer.split();

        let input = MicrophoneInput::from_default_device(writer, config.sample_rate as u32)?;
        let source = MicrophoneSource::new(
            reader,
            input.failure_flag(),
            block_len,
            config.sample_rate,
        );

        input.start()?;
        info!(
            "tracking session started on '{}' ({} Hz)",
            input.device_info().name,
            input.device_info().sample_rate
        );

        let (mut session, readings) = Self::start_with_source(config, source);
        session.input = Some(input);
        Ok((session, readings))
    }

    /// Start a session over an arbitrary block source
    ///
    /// The production path wraps the microphone; tests supply scripted
    /// sources.
    pub fn start_with_source<S>(config: SirenConfig, source: S) -> (Self, Receiver<SpeedReading>)
    where
        S: BlockSource + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let spectrum = Arc::new(Mutex::new(None));
        let (tx, rx) = mpsc::channel();

        let worker = spawn_worker(config, source, tx, Arc::clone(&running), Arc::clone(&spectrum));

        (
            Self {
                input: None,
                worker: Some(worker),
                running,
                spectrum,
            },
            rx,
        )
    }

    /// Analysis-band spectrum of the most recently processed block
    ///
    /// Best-effort diagnostic channel: later blocks supersede earlier
    /// ones, and `None` means no block has been processed yet.
    pub fn latest_spectrum(&self) -> Option<Vec<SpectrumBin>> {
        self.spectrum.lock().ok().and_then(|slot| slot.clone())
    }

    /// Capture device information, if this session owns a microphone
    pub fn device_info(&self) -> Option<&AudioDeviceInfo> {
        self.input.as_ref().map(|i| i.device_info())
    }

    /// Whether the worker is still producing readings
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the session
    ///
    /// The worker checks the flag once per iteration, before the next
    /// block's acquisition, so stopping takes at most one block duration.
    /// No in-flight block is aborted mid-analysis.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        if let Some(input) = &self.input {
            let _ = input.pause();
        }

        self.input = None;
    }
}

impl Drop for SpeedSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_worker<S>(
    config: SirenConfig,
    mut source: S,
    readings: Sender<SpeedReading>,
    running: Arc<AtomicBool>,
    spectrum: Arc<Mutex<Option<Vec<SpectrumBin>>>>,
) -> JoinHandle<()>
where
    S: BlockSource + 'static,
{
    std::thread::spawn(move || {
        let mut pipeline = TrackingPipeline::new(&config);

        while running.load(Ordering::SeqCst) {
            let block = match source.next_block() {
                Ok(block) => block,
                Err(e) => {
                    error!("audio capture failed, ending session: {e}");
                    break;
                }
            };

            let reading = match pipeline.process_block(&block) {
                Ok(reading) => reading,
                Err(e) => {
                    // InvalidFrequency cannot happen with correct band
                    // filtering; treat it as a defect and stop loudly
                    error!("tracking defect, ending session: {e}");
                    break;
                }
            };

            if let Ok(mut slot) = spectrum.lock() {
                *slot = Some(pipeline.band_spectrum().to_vec());
            }

            if readings.send(reading).is_err() {
                info!("reading sink disconnected, ending session");
                break;
            }
        }

        running.store(false, Ordering::SeqCst);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::f64::consts::PI;
    use std::time::Duration;

    /// Plays back a fixed list of blocks, then fails like a dead device
    struct ScriptedSource {
        blocks: VecDeque<Vec<f64>>,
        sample_rate: f64,
    }

    impl BlockSource for ScriptedSource {
        fn next_block(&mut self) -> Result<Vec<f64>, AudioError> {
            self.blocks.pop_front().ok_or(AudioError::StreamClosed)
        }

        fn sample_rate(&self) -> f64 {
            self.sample_rate
        }
    }

    /// Produces silent blocks forever, with a short delay per block
    struct EndlessSilence {
        block_len: usize,
    }

    impl BlockSource for EndlessSilence {
        fn next_block(&mut self) -> Result<Vec<f64>, AudioError> {
            std::thread::sleep(Duration::from_millis(1));
            Ok(vec![0.0; self.block_len])
        }

        fn sample_rate(&self) -> f64 {
            44100.0
        }
    }

    fn sine_block(freq_hz: f64, amplitude: f64, config: &SirenConfig) -> Vec<f64> {
        (0..config.block_len())
            .map(|n| amplitude * (2.0 * PI * freq_hz * n as f64 / config.sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_readings_delivered_in_production_order() {
        let config = SirenConfig::default();
        let source = ScriptedSource {
            blocks: VecDeque::from(vec![
                sine_block(450.0, 1000.0, &config),
                sine_block(448.0, 1000.0, &config),
                vec![0.0; config.block_len()],
            ]),
            sample_rate: config.sample_rate,
        };

        let (mut session, readings) = SpeedSession::start_with_source(config, source);
        let collected: Vec<SpeedReading> = readings.iter().collect();
        session.stop();

        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0], SpeedReading::Speed(40));
        assert!(matches!(collected[1], SpeedReading::Speed(_)));
        assert_eq!(collected[2], SpeedReading::NoSignal);
    }

    #[test]
    fn test_device_failure_ends_session() {
        let config = SirenConfig::default();
        let source = ScriptedSource {
            blocks: VecDeque::from(vec![sine_block(450.0, 1000.0, &config)]),
            sample_rate: config.sample_rate,
        };

        let (mut session, readings) = SpeedSession::start_with_source(config, source);

        // One reading, then the channel closes as the worker dies
        assert_eq!(readings.recv().unwrap(), SpeedReading::Speed(40));
        assert!(readings.recv().is_err());

        session.stop();
        assert!(!session.is_running());
    }

    #[test]
    fn test_stop_exits_promptly() {
        let config = SirenConfig {
            // Tiny blocks keep this test fast
            block_duration: 0.01,
            ..SirenConfig::default()
        };
        let block_len = config.block_len();
        let (mut session, readings) =
            SpeedSession::start_with_source(config, EndlessSilence { block_len });

        // Let the worker produce at least one reading
        assert_eq!(readings.recv().unwrap(), SpeedReading::NoSignal);

        session.stop();
        assert!(!session.is_running());
    }

    #[test]
    fn test_latest_spectrum_published() {
        let config = SirenConfig::default();
        let source = ScriptedSource {
            blocks: VecDeque::from(vec![sine_block(450.0, 1000.0, &config)]),
            sample_rate: config.sample_rate,
        };

        let min_fft = config.min_fft_freq;
        let max_fft = config.max_fft_freq;
        let (mut session, readings) = SpeedSession::start_with_source(config, source);

        // Spectrum is published before the reading is sent
        let _ = readings.recv().unwrap();
        let band = session.latest_spectrum().unwrap();
        assert!(!band.is_empty());
        assert!(band
            .iter()
            .all(|b| b.frequency > min_fft && b.frequency < max_fft));

        session.stop();
    }

    #[test]
    fn test_dropped_receiver_stops_worker() {
        let config = SirenConfig {
            block_duration: 0.01,
            ..SirenConfig::default()
        };
        let block_len = config.block_len();
        let (mut session, readings) =
            SpeedSession::start_with_source(config, EndlessSilence { block_len });

        drop(readings);
        if let Some(handle) = session.worker.take() {
            handle.join().unwrap();
        }
        assert!(!session.is_running());
    }
}
