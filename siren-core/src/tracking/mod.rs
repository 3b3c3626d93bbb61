//! Peak tracking and Doppler speed estimation

pub mod pipeline;
pub mod speed;
pub mod tracker;

pub use pipeline::{SpeedReading, TrackingPipeline};
pub use speed::{doppler_speed, TrackError};
pub use tracker::PeakTracker;
