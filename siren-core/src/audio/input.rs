//! Microphone capture using cpal
//!
//! Builds the input stream feeding the sample buffer. Multi-channel
//! devices are folded down to mono, since the analysis runs on a single
//! channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::error;
use thiserror::Error;

use super::buffer::SampleWriter;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Device does not support {expected} Hz (found: {found} Hz). Please change device sample rate in system settings.")]
    UnsupportedSampleRate { expected: u32, found: u32 },

    #[error("Audio stream stopped delivering samples")]
    StreamClosed,
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Microphone input stream
pub struct MicrophoneInput {
    stream: Stream,
    device_info: AudioDeviceInfo,
    failed: Arc<AtomicBool>,
}

impl MicrophoneInput {
    /// Create microphone input from the default device
    ///
    /// # Arguments
    /// * `writer` - Sample buffer writer receiving captured mono audio
    /// * `sample_rate` - Required capture rate in Hz; other device rates
    ///   are refused rather than resampled
    pub fn from_default_device(writer: SampleWriter, sample_rate: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, writer, sample_rate)
    }

    /// Create microphone input from a specific device
    pub fn from_device(
        device: Device,
        writer: SampleWriter,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let device_rate = config.sample_rate().0;
        if device_rate != sample_rate {
            return Err(AudioError::UnsupportedSampleRate {
                expected: sample_rate,
                found: device_rate,
            });
        }

        let channels = config.channels();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();

        let writer = Arc::new(Mutex::new(writer));
        let failed = Arc::new(AtomicBool::new(false));

        let writer_clone = Arc::clone(&writer);
        let failed_clone = Arc::clone(&failed);
        let n_channels = channels as usize;
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Fold interleaved frames down to mono f64
                    let samples: Vec<f64> = data
                        .chunks_exact(n_channels)
                        .map(|frame| {
                            frame.iter().map(|&s| s as f64).sum::<f64>() / n_channels as f64
                        })
                        .collect();

                    if let Ok(mut w) = writer_clone.lock() {
                        w.write(&samples);
                    }
                },
                move |err| {
                    error!("audio input error: {err}");
                    failed_clone.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
            failed,
        })
    }

    /// Start capturing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio capture
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }

    /// Flag set by the stream's error callback on device failure;
    /// the capture side polls it to turn a silent stall into an error
    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.failed)
    }
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_input_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}
