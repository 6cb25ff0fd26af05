//! Periodic dataset-metadata polling.
//!
//! Metadata (initialization time, availability, file stats) refreshes on a
//! fixed cadence, independent of the overlay pipeline. Failures never
//! surface as blocking errors: they are folded into the snapshot's `error`
//! field and logged, and the next poll happens on schedule regardless.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{AsyncHttpClient, CloudcastClient, DataInfo};

/// Time between metadata polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(120);

/// The most recent poll result, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct DataInfoSnapshot {
    /// The fetched record; its `error` field is set when the poll failed.
    pub info: DataInfo,
    /// When this poll completed.
    pub fetched_at: DateTime<Utc>,
}

type SnapshotSlot = Arc<RwLock<Option<DataInfoSnapshot>>>;

/// Polls the data-info endpoint: once immediately on start, then every
/// [`POLL_INTERVAL`], indefinitely, until cancelled.
pub struct DataInfoPoller<C> {
    client: Arc<CloudcastClient<C>>,
}

impl<C: AsyncHttpClient + 'static> DataInfoPoller<C> {
    pub fn new(client: Arc<CloudcastClient<C>>) -> Self {
        Self { client }
    }

    /// Start polling. The returned handle is the cancellation handle and
    /// the access point for the latest snapshot.
    pub fn start(self) -> PollerHandle {
        let snapshot: SnapshotSlot = Arc::new(RwLock::new(None));
        let token = CancellationToken::new();

        let task_snapshot = Arc::clone(&snapshot);
        let task_token = token.clone();
        let client = self.client;

        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("data-info poller started");

            loop {
                tokio::select! {
                    biased;

                    _ = task_token.cancelled() => {
                        info!("data-info poller shutting down");
                        break;
                    }

                    _ = interval.tick() => {
                        let info = client.fetch_data_info().await;
                        if let Some(error) = &info.error {
                            // Metadata is advisory: log, never surface.
                            warn!(error = error.as_str(), "data-info poll failed");
                        } else {
                            debug!("data-info refreshed");
                        }
                        *task_snapshot.write() = Some(DataInfoSnapshot {
                            info,
                            fetched_at: Utc::now(),
                        });
                    }
                }
            }
        });

        PollerHandle {
            snapshot,
            token,
            join,
        }
    }
}

/// Cancellation handle for a running poller, and the reader side of its
/// snapshot slot.
pub struct PollerHandle {
    snapshot: SnapshotSlot,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// The most recent poll result, or `None` before the first completes.
    pub fn snapshot(&self) -> Option<DataInfoSnapshot> {
        self.snapshot.read().clone()
    }

    /// Stop polling. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Stop polling and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        let _ = (&mut self.join).await;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::tests::MockAsyncHttpClient;
    use crate::api::HttpError;
    use crate::auth::CredentialCache;

    fn poller_with(
        http: Arc<MockAsyncHttpClient>,
    ) -> DataInfoPoller<MockAsyncHttpClient> {
        let credentials = Arc::new(CredentialCache::new(Arc::clone(&http), None));
        let client = Arc::new(CloudcastClient::new(
            http,
            credentials,
            "http://api.test/api/cloudcasting",
        ));
        DataInfoPoller::new(client)
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_first_poll() {
        let http = Arc::new(MockAsyncHttpClient::ok(
            br#"{"file_exists":true,"file_size_mb":1.0}"#.to_vec(),
        ));
        let handle = poller_with(Arc::clone(&http)).start();

        tokio::time::sleep(Duration::from_millis(10)).await;

        let snapshot = handle.snapshot().expect("first poll should have run");
        assert!(snapshot.info.file_exists);
        assert!(snapshot.info.error.is_none());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_recorded_and_polling_continues() {
        let http = Arc::new(MockAsyncHttpClient::failing(HttpError::status(
            500,
            "http://api.test/api/cloudcasting/data-info",
        )));
        let handle = poller_with(Arc::clone(&http)).start();

        tokio::time::sleep(Duration::from_millis(10)).await;

        let snapshot = handle.snapshot().unwrap();
        assert!(!snapshot.info.file_exists);
        assert!(snapshot.info.error.as_deref().unwrap().contains("500"));

        // The next scheduled poll still happens.
        tokio::time::sleep(POLL_INTERVAL).await;
        assert_eq!(http.total_calls(), 2);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let http = Arc::new(MockAsyncHttpClient::ok(b"{}".to_vec()));
        let handle = poller_with(Arc::clone(&http)).start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(http.total_calls(), 1);

        handle.cancel();
        tokio::time::sleep(POLL_INTERVAL * 3).await;
        assert_eq!(http.total_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_replaced_wholesale() {
        let http = Arc::new(MockAsyncHttpClient::ok(
            br#"{"file_exists":true,"file_size_mb":2.5}"#.to_vec(),
        ));
        let handle = poller_with(Arc::clone(&http)).start();

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = handle.snapshot().unwrap();

        tokio::time::sleep(POLL_INTERVAL).await;
        let second = handle.snapshot().unwrap();

        assert_eq!(first.info, second.info);
        assert!(second.fetched_at >= first.fetched_at);
        handle.shutdown().await;
    }
}
