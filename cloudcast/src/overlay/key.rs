//! Overlay identity.

use std::fmt;

use crate::timestep::TimeStep;
use crate::variable::VariableId;

/// Unique identity of one decoded overlay: a variable at a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayKey {
    pub variable: VariableId,
    pub step: TimeStep,
}

impl OverlayKey {
    pub fn new(variable: VariableId, step: TimeStep) -> Self {
        Self { variable, step }
    }

    /// The host-side layer identifier for this overlay.
    pub fn layer_id(&self) -> LayerId {
        LayerId(format!("cloud-layer-{}-{}", self.variable, self.step))
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.variable, self.step)
    }
}

/// Identifier of a layer registered with the overlay host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(String);

impl LayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
