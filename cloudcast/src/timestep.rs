//! Forecast time steps.
//!
//! Each step is a 15-minute offset from the dataset's initialization time.
//! The forecast horizon is fixed at 3 hours, giving `MAX_TIME_STEPS = 12`
//! valid steps (`0..12`).

use std::fmt;

/// Number of forecast steps served per variable (3 hours at 15-minute
/// intervals).
pub const MAX_TIME_STEPS: u8 = 12;

/// Minutes of forecast lead time per step.
pub const STEP_MINUTES: u32 = 15;

/// A validated forecast step index in `[0, MAX_TIME_STEPS)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeStep(u8);

impl TimeStep {
    /// Create a step, returning `None` when `index` is out of range.
    pub fn new(index: u8) -> Option<Self> {
        (index < MAX_TIME_STEPS).then_some(Self(index))
    }

    /// The first step (analysis time).
    pub const ZERO: TimeStep = TimeStep(0);

    /// The raw step index.
    pub fn index(&self) -> u8 {
        self.0
    }

    /// The next step, wrapping back to 0 after the last one.
    pub fn wrapping_next(&self) -> TimeStep {
        TimeStep((self.0 + 1) % MAX_TIME_STEPS)
    }

    /// All steps in ascending order.
    pub fn all() -> impl Iterator<Item = TimeStep> {
        (0..MAX_TIME_STEPS).map(TimeStep)
    }

    /// Forecast lead time in minutes.
    pub fn offset_minutes(&self) -> u32 {
        self.0 as u32 * STEP_MINUTES
    }

    /// Human-readable forecast offset: `+45min`, `+1h`, `+2h 30m`.
    pub fn format_offset(&self) -> String {
        let minutes = self.offset_minutes();
        let hours = minutes / 60;
        let remaining = minutes % 60;

        if hours == 0 {
            format!("+{}min", remaining)
        } else if remaining == 0 {
            format!("+{}h", hours)
        } else {
            format!("+{}h {}m", hours, remaining)
        }
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
