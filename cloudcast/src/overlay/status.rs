//! Shared overlay pipeline status for display surfaces.

use std::sync::Arc;

use parking_lot::RwLock;

/// Snapshot of the overlay pipeline's observable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayStatusSnapshot {
    /// A fetch or preload is in progress.
    pub loading: bool,
    /// The most recent user-facing pipeline error, if any.
    pub error: Option<String>,
    /// Preload progress in `[0, 100]`; `None` when no preload has run.
    pub preload_progress: Option<f32>,
}

/// Thread-safe status shared between the overlay pipeline and whatever
/// renders progress and errors to the user.
#[derive(Debug, Default)]
pub struct SharedOverlayStatus {
    inner: RwLock<OverlayStatusSnapshot>,
}

impl SharedOverlayStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.write().loading = loading;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().error = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.inner.write().error = None;
    }

    pub fn set_preload_progress(&self, progress: f32) {
        self.inner.write().preload_progress = Some(progress);
    }

    /// Get a snapshot of the current status.
    pub fn snapshot(&self) -> OverlayStatusSnapshot {
        self.inner.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_updates() {
        let status = SharedOverlayStatus::new();
        assert_eq!(status.snapshot(), OverlayStatusSnapshot::default());

        status.set_loading(true);
        status.set_preload_progress(50.0);
        let snap = status.snapshot();
        assert!(snap.loading);
        assert_eq!(snap.preload_progress, Some(50.0));

        status.set_error("boom");
        assert_eq!(status.snapshot().error.as_deref(), Some("boom"));
        status.clear_error();
        assert!(status.snapshot().error.is_none());
    }
}
