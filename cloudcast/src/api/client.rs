//! Authenticated client for the cloudcasting layer API.

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::ApiError;
use super::http::AsyncHttpClient;
use super::types::DataInfo;
use crate::auth::{AuthError, CredentialCache};
use crate::timestep::TimeStep;
use crate::variable::VariableId;

/// Client for the layer and data-info endpoints.
///
/// Layer fetches carry a bearer credential from the [`CredentialCache`].
/// When no credential source is configured the request is sent without an
/// `Authorization` header, preserving the unauthenticated local-development
/// flow; a configured acquisition that fails aborts the fetch instead of
/// hiding the failure behind a 401.
pub struct CloudcastClient<C> {
    http: Arc<C>,
    credentials: Arc<CredentialCache<C>>,
    layers_base_url: String,
    data_info_url: String,
}

impl<C: AsyncHttpClient + 'static> CloudcastClient<C> {
    /// Create a client for the API rooted at `api_base_url`
    /// (e.g. `http://0.0.0.0:8000/api/cloudcasting`).
    pub fn new(
        http: Arc<C>,
        credentials: Arc<CredentialCache<C>>,
        api_base_url: impl AsRef<str>,
    ) -> Self {
        let base = api_base_url.as_ref().trim_end_matches('/');
        Self {
            http,
            credentials,
            layers_base_url: format!("{}/layers", base),
            data_info_url: format!("{}/data-info", base),
        }
    }

    /// URL of one layer raster.
    pub fn layer_url(&self, variable: VariableId, step: TimeStep) -> String {
        format!("{}/{}/{}.tif", self.layers_base_url, variable, step)
    }

    /// Fetch the raw raster bytes for one `(variable, step)`.
    pub async fn fetch_layer(
        &self,
        variable: VariableId,
        step: TimeStep,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.layer_url(variable, step);
        debug!(url = url.as_str(), "fetching cloud layer");

        let bytes = match self.bearer_token().await? {
            Some(token) => self.http.get_with_bearer(&url, &token).await?,
            None => self.http.get(&url).await?,
        };
        Ok(bytes)
    }

    /// Fetch dataset metadata.
    ///
    /// Never fails: transport errors, bad statuses, bad payloads, and auth
    /// failures all collapse into a [`DataInfo`] carrying an error
    /// description. Metadata is advisory and must not block playback.
    pub async fn fetch_data_info(&self) -> DataInfo {
        debug!(url = self.data_info_url.as_str(), "fetching data info");

        let token = match self.credentials.get_token().await {
            Ok(cred) => Some(cred.token),
            Err(AuthError::NotConfigured) => None,
            Err(e) => {
                warn!(error = %e, "data-info fetch proceeding unauthenticated");
                None
            }
        };

        let result = match token {
            Some(token) => self.http.get_with_bearer(&self.data_info_url, &token).await,
            None => self.http.get(&self.data_info_url).await,
        };

        match result {
            Ok(body) => serde_json::from_slice(&body).unwrap_or_else(|e| {
                warn!(error = %e, "data-info payload did not parse");
                DataInfo::unavailable(format!("Invalid data-info payload: {}", e))
            }),
            Err(e) => {
                warn!(error = %e, "data-info fetch failed");
                DataInfo::unavailable(format!("API error: {}", e))
            }
        }
    }

    async fn bearer_token(&self) -> Result<Option<String>, AuthError> {
        match self.credentials.get_token().await {
            Ok(cred) => Ok(Some(cred.token)),
            Err(AuthError::NotConfigured) => {
                debug!("no credential source configured, fetching unauthenticated");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::tests::MockAsyncHttpClient;
    use crate::api::HttpError;
    use std::sync::atomic::Ordering;

    const BASE: &str = "http://api.test/api/cloudcasting";

    fn client_with(http: Arc<MockAsyncHttpClient>) -> CloudcastClient<MockAsyncHttpClient> {
        let credentials = Arc::new(CredentialCache::new(Arc::clone(&http), None));
        CloudcastClient::new(http, credentials, BASE)
    }

    #[test]
    fn test_layer_url_template() {
        let http = Arc::new(MockAsyncHttpClient::ok(vec![]));
        let client = client_with(http);
        let step = TimeStep::new(3).unwrap();
        assert_eq!(
            client.layer_url(VariableId::Ir016, step),
            "http://api.test/api/cloudcasting/layers/IR_016/3.tif"
        );
    }

    #[tokio::test]
    async fn test_fetch_layer_unauthenticated_when_not_configured() {
        let http = Arc::new(MockAsyncHttpClient::ok(vec![0xAB, 0xCD]));
        let client = client_with(Arc::clone(&http));

        let bytes = client
            .fetch_layer(VariableId::Ir016, TimeStep::ZERO)
            .await
            .unwrap();

        assert_eq!(bytes, vec![0xAB, 0xCD]);
        assert_eq!(http.get_calls.load(Ordering::SeqCst), 1);
        assert_eq!(http.bearer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_layer_error_carries_status() {
        let http = Arc::new(MockAsyncHttpClient::failing(HttpError::status(
            404,
            "http://api.test/api/cloudcasting/layers/IR_016/0.tif",
        )));
        let client = client_with(http);

        let err = client
            .fetch_layer(VariableId::Ir016, TimeStep::ZERO)
            .await
            .unwrap_err();

        match err {
            ApiError::Fetch(http_err) => assert_eq!(http_err.status, Some(404)),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_data_info_absorbs_http_failure() {
        let http = Arc::new(MockAsyncHttpClient::failing(HttpError::status(
            500,
            "http://api.test/api/cloudcasting/data-info",
        )));
        let client = client_with(http);

        let info = client.fetch_data_info().await;
        assert!(!info.file_exists);
        let error = info.error.expect("error should be recorded");
        assert!(error.contains("500"), "got: {}", error);
    }

    #[tokio::test]
    async fn test_data_info_absorbs_bad_payload() {
        let http = Arc::new(MockAsyncHttpClient::ok(b"not json".to_vec()));
        let client = client_with(http);

        let info = client.fetch_data_info().await;
        assert!(info.error.is_some());
    }

    #[tokio::test]
    async fn test_data_info_parses_valid_payload() {
        let body = br#"{
            "file_exists": true,
            "init_time": "2025-03-12T06:45:00+00:00",
            "forecast_steps": [0,1,2,3,4,5,6,7,8,9,10,11],
            "variables": ["IR_016"],
            "file_size_mb": 12.5,
            "last_modified": null,
            "time_range": null,
            "error": null
        }"#;
        let http = Arc::new(MockAsyncHttpClient::ok(body.to_vec()));
        let client = client_with(http);

        let info = client.fetch_data_info().await;
        assert!(info.file_exists);
        assert_eq!(info.forecast_steps.len(), 12);
        assert!(info.error.is_none());
    }
}
