//! Playback speed settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Frame interval for animated playback.
///
/// The control surface only admits these four settings; the scheduler
/// itself never validates raw millisecond values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    /// 300 ms per frame.
    X4,
    /// 500 ms per frame.
    X2,
    /// 1000 ms per frame.
    #[default]
    X1,
    /// 2000 ms per frame.
    Half,
}

impl PlaybackSpeed {
    /// Milliseconds between frames.
    pub fn as_millis(&self) -> u64 {
        match self {
            PlaybackSpeed::X4 => 300,
            PlaybackSpeed::X2 => 500,
            PlaybackSpeed::X1 => 1000,
            PlaybackSpeed::Half => 2000,
        }
    }

    /// Frame interval as a [`Duration`].
    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    /// The setting for a millisecond interval, rejecting anything outside
    /// the enumerated set.
    pub fn from_millis(millis: u64) -> Option<Self> {
        match millis {
            300 => Some(PlaybackSpeed::X4),
            500 => Some(PlaybackSpeed::X2),
            1000 => Some(PlaybackSpeed::X1),
            2000 => Some(PlaybackSpeed::Half),
            _ => None,
        }
    }

    /// Display label matching the playback control.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackSpeed::X4 => "4x",
            PlaybackSpeed::X2 => "2x",
            PlaybackSpeed::X1 => "1x",
            PlaybackSpeed::Half => "0.5x",
        }
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unsupported speed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSpeed(pub String);

impl fmt::Display for InvalidSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid playback speed '{}' (expected 4x, 2x, 1x, or 0.5x)", self.0)
    }
}

impl std::error::Error for InvalidSpeed {}

impl FromStr for PlaybackSpeed {
    type Err = InvalidSpeed;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "4x" => Ok(PlaybackSpeed::X4),
            "2x" => Ok(PlaybackSpeed::X2),
            "1x" => Ok(PlaybackSpeed::X1),
            "0.5x" | "half" => Ok(PlaybackSpeed::Half),
            other => Err(InvalidSpeed(other.to_string())),
        }
    }
}
