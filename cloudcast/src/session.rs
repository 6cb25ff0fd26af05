//! Session facade over the overlay engine.
//!
//! Wires the client, cache, controller, preloader, and scheduler together
//! and runs the consume loop that turns requested-step changes (timer ticks
//! and scrubbing alike) into host updates.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::{AsyncHttpClient, CloudcastClient};
use crate::datainfo::{DataInfoPoller, PollerHandle};
use crate::overlay::{
    CacheStats, LayerCache, OverlayController, OverlayError, OverlayHost, PreloadCoordinator,
    PublishedLayers, RasterSource, SharedOverlayStatus,
};
use crate::playback::{PlaybackPhase, PlaybackScheduler};
use crate::timestep::TimeStep;
use crate::variable::VariableId;

/// One user-facing overlay session: a current variable, a requested step,
/// and the machinery to keep the host showing them.
pub struct CloudcastSession<C, H> {
    client: Arc<CloudcastClient<C>>,
    cache: Arc<LayerCache<RasterSource<C>>>,
    layers: Arc<PublishedLayers<H>>,
    controller: OverlayController<RasterSource<C>, H>,
    preloader: PreloadCoordinator<RasterSource<C>, H>,
    scheduler: PlaybackScheduler,
    status: Arc<SharedOverlayStatus>,
    variable: Mutex<VariableId>,
}

impl<C: AsyncHttpClient + 'static, H: OverlayHost> CloudcastSession<C, H> {
    /// Assemble a session over an API client and an overlay host.
    pub fn new(client: Arc<CloudcastClient<C>>, host: H) -> Self {
        let source = Arc::new(RasterSource::new(Arc::clone(&client)));
        let cache = Arc::new(LayerCache::new(source));
        let layers = Arc::new(PublishedLayers::new(host));
        let status = SharedOverlayStatus::new();

        let controller = OverlayController::new(
            Arc::clone(&cache),
            Arc::clone(&layers),
            Arc::clone(&status),
        );
        let preloader = PreloadCoordinator::new(
            Arc::clone(&cache),
            Arc::clone(&layers),
            Arc::clone(&status),
        );

        Self {
            client,
            cache,
            layers,
            controller,
            preloader,
            scheduler: PlaybackScheduler::new(),
            status,
            variable: Mutex::new(VariableId::Ir016),
        }
    }

    /// Observable pipeline status (loading, errors, preload progress).
    pub fn status(&self) -> Arc<SharedOverlayStatus> {
        Arc::clone(&self.status)
    }

    /// The playback scheduler (phase, speed, scrubbing).
    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn current_variable(&self) -> VariableId {
        *self.variable.lock()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Start the metadata poller for this session's API.
    pub fn start_data_info_poller(&self) -> PollerHandle {
        DataInfoPoller::new(Arc::clone(&self.client)).start()
    }

    /// Show the currently requested `(variable, step)` overlay.
    pub async fn show_current(&self) -> Result<(), OverlayError> {
        let variable = self.current_variable();
        self.controller
            .show_layer(variable, self.scheduler.current_step())
            .await
    }

    /// Switch the active variable.
    ///
    /// Forces playback to stop, then shows the new variable at the current
    /// step; the controller's cleanup pass drops the old variable's host
    /// layers (their decoded overlays stay cached).
    pub async fn select_variable(&self, variable: VariableId) -> Result<(), OverlayError> {
        {
            let mut current = self.variable.lock();
            if *current == variable {
                return Ok(());
            }
            *current = variable;
        }
        info!(variable = %variable, "variable changed");
        self.scheduler.stop();
        self.show_current().await
    }

    /// Scrub to a step. The running consume loop applies it to the host.
    pub fn select_step(&self, step: TimeStep) {
        self.scheduler.set_step(step);
    }

    /// Toggle playback.
    ///
    /// Pauses when playing. When idle or paused, plays immediately if every
    /// frame of the active variable is cached, otherwise preloads first and
    /// then plays; a variable change that lands mid-preload wins and
    /// playback does not start.
    pub async fn toggle_play(&self) {
        match self.scheduler.phase() {
            PlaybackPhase::Playing => self.scheduler.pause(),
            PlaybackPhase::Preloading => {}
            PlaybackPhase::Idle | PlaybackPhase::Paused => {
                let variable = self.current_variable();
                if self.cache.is_variable_complete(variable) {
                    self.scheduler.play();
                } else if self.scheduler.begin_preload() {
                    self.preloader
                        .preload_all(variable, self.scheduler.current_step())
                        .await;
                    if !self.scheduler.finish_preload() {
                        debug!("preload superseded, playback not started");
                    }
                }
            }
        }
    }

    /// Consume requested-step changes until cancelled.
    ///
    /// Each change (tick or scrub) shows the corresponding layer; pipeline
    /// failures are already recorded in the shared status and do not stop
    /// the loop.
    pub async fn run(&self, token: CancellationToken) {
        let mut steps = self.scheduler.subscribe();
        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,

                changed = steps.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let step = *steps.borrow_and_update();
                    let variable = self.current_variable();
                    let _ = self.controller.show_layer(variable, step).await;
                }
            }
        }
    }

    /// Tear the session down: stop playback and remove every published
    /// layer from the host.
    pub fn shutdown(&self) {
        self.scheduler.stop();
        self.layers.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::tests::MockAsyncHttpClient;
    use crate::auth::CredentialCache;
    use crate::overlay::RecordingHost;
    use crate::raster::test_support::encode_geotiff;
    use std::time::Duration;

    fn session() -> (
        Arc<MockAsyncHttpClient>,
        Arc<RecordingHost>,
        CloudcastSession<MockAsyncHttpClient, Arc<RecordingHost>>,
    ) {
        let tif = encode_geotiff(2, 2, &[0.1, 0.2, 0.3, 0.4], -17.0, 73.0, 14.0, 14.5);
        let http = Arc::new(MockAsyncHttpClient::ok(tif));
        let credentials = Arc::new(CredentialCache::new(Arc::clone(&http), None));
        let client = Arc::new(CloudcastClient::new(
            Arc::clone(&http),
            credentials,
            "http://api.test/api/cloudcasting",
        ));
        let host = Arc::new(RecordingHost::new());
        let session = CloudcastSession::new(client, Arc::clone(&host));
        (http, host, session)
    }

    #[tokio::test]
    async fn test_toggle_play_preloads_then_plays() {
        let (http, host, session) = session();

        session.toggle_play().await;

        assert_eq!(session.scheduler().phase(), PlaybackPhase::Playing);
        assert_eq!(host.registered_count(), 12);
        assert_eq!(http.total_calls(), 12);
        assert_eq!(
            session.status().snapshot().preload_progress,
            Some(100.0)
        );

        session.toggle_play().await;
        assert_eq!(session.scheduler().phase(), PlaybackPhase::Paused);
    }

    #[tokio::test]
    async fn test_toggle_play_skips_preload_when_cached() {
        let (http, _host, session) = session();

        session.toggle_play().await;
        session.toggle_play().await;
        let calls = http.total_calls();

        // Fully cached: resuming performs no further network I/O.
        session.toggle_play().await;
        assert_eq!(session.scheduler().phase(), PlaybackPhase::Playing);
        assert_eq!(http.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_select_variable_stops_playback_and_swaps_layers() {
        let (_http, host, session) = session();

        session.toggle_play().await;
        session.select_variable(VariableId::Wv073).await.unwrap();

        assert_eq!(session.scheduler().phase(), PlaybackPhase::Idle);
        assert_eq!(session.current_variable(), VariableId::Wv073);
        assert!(!host.is_registered("cloud-layer-IR_016-0"));
        let step = session.scheduler().current_step();
        assert!(host.is_registered(&format!("cloud-layer-WV_073-{}", step)));

        // The old variable's overlays stay cached: re-selecting it fetches
        // nothing new.
        let calls = _http.total_calls();
        session.select_variable(VariableId::Ir016).await.unwrap();
        assert_eq!(_http.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_run_loop_applies_scrubbed_steps() {
        let (_http, host, session) = session();
        let session = Arc::new(session);

        let token = CancellationToken::new();
        let loop_session = Arc::clone(&session);
        let loop_token = token.clone();
        let run = tokio::spawn(async move { loop_session.run(loop_token).await });

        // Let the spawned loop subscribe to the step channel before scrubbing,
        // otherwise the scrub is sent before there is a receiver to observe it.
        tokio::task::yield_now().await;
        session.select_step(TimeStep::new(3).unwrap());

        // The decode runs on a blocking thread; poll until the loop has
        // published the scrubbed frame.
        let expected = vec!["cloud-layer-IR_016-3".to_string()];
        for _ in 0..200 {
            if host.visible_layers() == expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(host.visible_layers(), expected);

        token.cancel();
        run.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_removes_all_layers() {
        let (_http, host, session) = session();

        session.toggle_play().await;
        session.shutdown();

        assert_eq!(session.scheduler().phase(), PlaybackPhase::Idle);
        assert_eq!(host.registered_count(), 0);
    }
}
