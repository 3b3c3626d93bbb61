//! Audio capture with cpal

pub mod buffer;
pub mod input;
pub mod source;

pub use buffer::SampleBuffer;
pub use input::{AudioDeviceInfo, AudioError, MicrophoneInput};
pub use source::{BlockSource, MicrophoneSource};
