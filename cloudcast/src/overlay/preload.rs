//! Eager population of a variable's full time series.
//!
//! Run before playback starts so the animation never stutters on a fetch.
//! Preload is best-effort: one bad frame must not block playback of the
//! others.

use std::sync::Arc;

use tracing::{info, warn};

use super::cache::LayerCache;
use super::host::OverlayHost;
use super::key::OverlayKey;
use super::registry::PublishedLayers;
use super::source::OverlaySource;
use super::status::SharedOverlayStatus;
use crate::timestep::{TimeStep, MAX_TIME_STEPS};
use crate::variable::VariableId;

/// Walks every time step of a variable, populating the layer cache and
/// registering layers without forcing visibility.
pub struct PreloadCoordinator<S, H> {
    cache: Arc<LayerCache<S>>,
    layers: Arc<PublishedLayers<H>>,
    status: Arc<SharedOverlayStatus>,
}

impl<S: OverlaySource + 'static, H: OverlayHost> PreloadCoordinator<S, H> {
    pub fn new(
        cache: Arc<LayerCache<S>>,
        layers: Arc<PublishedLayers<H>>,
        status: Arc<SharedOverlayStatus>,
    ) -> Self {
        Self {
            cache,
            layers,
            status,
        }
    }

    /// Preload all steps of `variable`, leaving only `active_step` visible.
    ///
    /// Progress is reported through the shared status after every step and
    /// reaches exactly 100 on completion. Per-step failures are logged and
    /// skipped. Idempotent: with everything cached this performs no network
    /// I/O and still runs the visibility pass.
    pub async fn preload_all(&self, variable: VariableId, active_step: TimeStep) {
        info!(variable = %variable, "preloading all time steps");
        self.status.set_loading(true);
        self.status.set_preload_progress(0.0);

        // Keep the host clean while frames trickle in.
        self.layers.hide_variable(variable);

        for step in TimeStep::all() {
            let key = OverlayKey::new(variable, step);
            match self.cache.get_or_compute(key).await {
                Ok(overlay) => {
                    self.layers
                        .ensure_registered(key, &overlay, step == active_step);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "failed to preload step");
                }
            }

            let progress = (step.index() + 1) as f32 / MAX_TIME_STEPS as f32 * 100.0;
            self.status.set_preload_progress(progress);
        }

        // The loop suspended many times; re-assert the active frame in case
        // a concurrent mutation hid it.
        self.layers
            .set_visible(OverlayKey::new(variable, active_step), true);
        self.status.set_loading(false);

        info!(variable = %variable, "preload complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HttpError;
    use crate::overlay::error::OverlayError;
    use crate::overlay::host::tests::RecordingHost;
    use crate::raster::{BoundingQuad, DecodedOverlay};
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that fails for a configured set of steps and records the
    /// progress visible at each fetch.
    struct FakeSource {
        fetches: AtomicUsize,
        fail_steps: Vec<u8>,
        progress_seen: Mutex<Vec<f32>>,
        status: Arc<SharedOverlayStatus>,
    }

    impl FakeSource {
        fn new(status: Arc<SharedOverlayStatus>, fail_steps: Vec<u8>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail_steps,
                progress_seen: Mutex::new(Vec::new()),
                status,
            }
        }
    }

    impl OverlaySource for FakeSource {
        async fn fetch_and_decode(&self, key: OverlayKey) -> Result<DecodedOverlay, OverlayError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(progress) = self.status.snapshot().preload_progress {
                self.progress_seen.lock().push(progress);
            }
            if self.fail_steps.contains(&key.step.index()) {
                return Err(OverlayError::Fetch(HttpError::status(500, "http://t")));
            }
            Ok(DecodedOverlay {
                image: Bytes::from_static(b"png"),
                quad: BoundingQuad {
                    top_left: (0.0, 1.0),
                    top_right: (1.0, 1.0),
                    bottom_right: (1.0, 0.0),
                    bottom_left: (0.0, 0.0),
                },
            })
        }
    }

    struct Fixture {
        source: Arc<FakeSource>,
        host: Arc<RecordingHost>,
        status: Arc<SharedOverlayStatus>,
        cache: Arc<LayerCache<FakeSource>>,
        preloader: PreloadCoordinator<FakeSource, Arc<RecordingHost>>,
    }

    fn fixture(fail_steps: Vec<u8>) -> Fixture {
        let status = SharedOverlayStatus::new();
        let source = Arc::new(FakeSource::new(Arc::clone(&status), fail_steps));
        let host = Arc::new(RecordingHost::new());
        let cache = Arc::new(LayerCache::new(Arc::clone(&source)));
        let preloader = PreloadCoordinator::new(
            Arc::clone(&cache),
            Arc::new(PublishedLayers::new(Arc::clone(&host))),
            Arc::clone(&status),
        );
        Fixture {
            source,
            host,
            status,
            cache,
            preloader,
        }
    }

    fn step(index: u8) -> TimeStep {
        TimeStep::new(index).unwrap()
    }

    #[tokio::test]
    async fn test_preload_registers_all_steps_with_only_active_visible() {
        let fx = fixture(vec![]);

        fx.preloader.preload_all(VariableId::Ir016, step(4)).await;

        assert_eq!(fx.host.registered_count(), 12);
        assert_eq!(fx.host.visible_layers(), vec!["cloud-layer-IR_016-4".to_string()]);
        assert_eq!(fx.source.fetches.load(Ordering::SeqCst), 12);
        assert!(fx.cache.is_variable_complete(VariableId::Ir016));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_100() {
        let fx = fixture(vec![]);

        fx.preloader.preload_all(VariableId::Ir016, step(0)).await;

        let seen = fx.source.progress_seen.lock().clone();
        assert!(
            seen.windows(2).all(|w| w[0] <= w[1]),
            "progress must be non-decreasing: {:?}",
            seen
        );
        assert_eq!(fx.status.snapshot().preload_progress, Some(100.0));
        assert!(!fx.status.snapshot().loading);
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort_the_batch() {
        let fx = fixture(vec![5]);

        fx.preloader.preload_all(VariableId::Ir016, step(0)).await;

        // Eleven good frames registered, the bad one skipped.
        assert_eq!(fx.host.registered_count(), 11);
        assert!(!fx.host.is_registered("cloud-layer-IR_016-5"));
        assert!(!fx.cache.contains(OverlayKey::new(VariableId::Ir016, step(5))));

        // Progress still completed.
        assert_eq!(fx.status.snapshot().preload_progress, Some(100.0));
    }

    #[tokio::test]
    async fn test_second_preload_is_idempotent_and_offline() {
        let fx = fixture(vec![]);

        fx.preloader.preload_all(VariableId::Ir016, step(2)).await;
        let fetches_after_first = fx.source.fetches.load(Ordering::SeqCst);

        fx.preloader.preload_all(VariableId::Ir016, step(7)).await;

        assert_eq!(fx.source.fetches.load(Ordering::SeqCst), fetches_after_first);
        // Visibility pass still ran: the new active step is the visible one.
        assert_eq!(fx.host.visible_layers(), vec!["cloud-layer-IR_016-7".to_string()]);
    }
}
