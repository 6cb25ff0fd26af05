//! Animated playback of the forecast time series.

mod scheduler;
mod speed;

pub use scheduler::{PlaybackPhase, PlaybackScheduler};
pub use speed::{InvalidSpeed, PlaybackSpeed};
