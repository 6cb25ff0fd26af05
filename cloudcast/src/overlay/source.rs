//! The fetch-and-decode seam behind the layer cache.

use std::future::Future;
use std::sync::Arc;

use super::error::OverlayError;
use super::key::OverlayKey;
use crate::api::{AsyncHttpClient, CloudcastClient};
use crate::raster::{decode_overlay, DecodeError, DecodedOverlay};

/// Produces a decoded overlay for a key.
///
/// The production implementation fetches over HTTP and decodes; tests
/// substitute counting fakes. Outputs must be deterministic per key, so
/// racing two computations for the same key is safe even where the cache's
/// single-flight guard does not apply.
pub trait OverlaySource: Send + Sync {
    fn fetch_and_decode(
        &self,
        key: OverlayKey,
    ) -> impl Future<Output = Result<DecodedOverlay, OverlayError>> + Send;
}

/// Fetches raster bytes through the API client and decodes them off the
/// async threads.
pub struct RasterSource<C> {
    client: Arc<CloudcastClient<C>>,
}

impl<C> RasterSource<C> {
    pub fn new(client: Arc<CloudcastClient<C>>) -> Self {
        Self { client }
    }
}

impl<C: AsyncHttpClient + 'static> OverlaySource for RasterSource<C> {
    async fn fetch_and_decode(&self, key: OverlayKey) -> Result<DecodedOverlay, OverlayError> {
        let bytes = self.client.fetch_layer(key.variable, key.step).await?;

        // Decode is CPU-bound; keep it off the cooperative threads.
        let overlay = tokio::task::spawn_blocking(move || decode_overlay(&bytes))
            .await
            .map_err(|e| OverlayError::Decode(DecodeError::Internal(e.to_string())))??;

        Ok(overlay)
    }
}
