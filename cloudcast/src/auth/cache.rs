//! Bearer credential cache with single-flight acquisition.
//!
//! Layer and metadata fetches authenticate with a short-lived bearer token.
//! Acquiring one costs a network round-trip, so the cache hands out a stored
//! credential while it remains comfortably fresh and collapses concurrent
//! refreshes into one request: every caller that arrives while an acquisition
//! is in flight awaits the same shared future and receives the same result,
//! success or failure. A failed acquisition leaves the cache empty so the
//! next call retries; there is no automatic retry loop.

use std::sync::Arc;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::AuthError;
use super::jwt::expiry_from_jwt;
use crate::api::AsyncHttpClient;

/// Refuse to hand out a credential within this many milliseconds of expiry.
const EXPIRY_MARGIN_MS: i64 = 60_000;

/// A cached bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque bearer token.
    pub token: String,
    /// Expiry as epoch milliseconds.
    pub expires_at_ms: i64,
}

impl Credential {
    /// Whether the credential is still usable at `now_ms`, keeping the
    /// 60-second safety margin before expiry.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms - EXPIRY_MARGIN_MS
    }
}

/// Where credentials come from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Internal proxy endpoint that performs the identity-provider exchange
    /// server-side: `GET {url}` returns the token response directly.
    Proxy {
        /// Full URL of the proxy token endpoint.
        url: String,
    },
    /// Direct client-credentials grant against the identity provider.
    IdentityProvider {
        /// Issuer base URL, e.g. `https://tenant.eu.auth0.com`.
        issuer_base_url: String,
        client_id: String,
        client_secret: String,
        /// API audience to request access for.
        audience: Option<String>,
    },
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[allow(dead_code)]
    token_type: Option<String>,
}

type PendingAcquisition = Shared<BoxFuture<'static, Result<Credential, AuthError>>>;

#[derive(Default)]
struct State {
    cached: Option<Credential>,
    pending: Option<PendingAcquisition>,
}

/// Caches a bearer credential and deduplicates concurrent acquisitions.
///
/// At most one acquisition is in flight process-wide; this is a hard
/// invariant, enforced by registering the pending future under the state
/// lock before any caller awaits it.
pub struct CredentialCache<C> {
    http: Arc<C>,
    source: Option<TokenSource>,
    state: Mutex<State>,
}

impl<C: AsyncHttpClient + 'static> CredentialCache<C> {
    /// Create a cache over the given HTTP client and credential source.
    ///
    /// With `source = None` every [`get_token`](Self::get_token) call fails
    /// with [`AuthError::NotConfigured`]; callers decide whether to proceed
    /// unauthenticated.
    pub fn new(http: Arc<C>, source: Option<TokenSource>) -> Self {
        Self {
            http,
            source,
            state: Mutex::new(State::default()),
        }
    }

    /// Get a valid credential, acquiring or refreshing as needed.
    pub async fn get_token(&self) -> Result<Credential, AuthError> {
        let pending = {
            let mut state = self.state.lock();

            if let Some(pending) = &state.pending {
                pending.clone()
            } else {
                if let Some(cred) = &state.cached {
                    if cred.is_fresh(Utc::now().timestamp_millis()) {
                        return Ok(cred.clone());
                    }
                }

                let source = self.source.clone().ok_or(AuthError::NotConfigured)?;
                let pending = acquire(Arc::clone(&self.http), source).boxed().shared();
                state.pending = Some(pending.clone());
                pending
            }
        };

        let result = pending.clone().await;

        {
            let mut state = self.state.lock();
            // Only the waiters of this acquisition may clear the slot; a
            // newer acquisition may already occupy it.
            if state.pending.as_ref().is_some_and(|p| p.ptr_eq(&pending)) {
                state.pending = None;
                match &result {
                    Ok(cred) => state.cached = Some(cred.clone()),
                    Err(_) => state.cached = None,
                }
            }
        }

        result
    }
}

/// Perform one acquisition against the configured source.
async fn acquire<C: AsyncHttpClient>(
    http: Arc<C>,
    source: TokenSource,
) -> Result<Credential, AuthError> {
    let body = match &source {
        TokenSource::Proxy { url } => {
            debug!(url = url.as_str(), "acquiring token via proxy endpoint");
            http.get(url).await?
        }
        TokenSource::IdentityProvider {
            issuer_base_url,
            client_id,
            client_secret,
            audience,
        } => {
            let url = format!("{}/oauth/token", issuer_base_url.trim_end_matches('/'));
            debug!(url = url.as_str(), "acquiring token via identity provider");
            let request = serde_json::json!({
                "client_id": client_id,
                "client_secret": client_secret,
                "audience": audience,
                "grant_type": "client_credentials",
            });
            http.post_json(&url, &request.to_string()).await?
        }
    };

    let response: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    // Prefer the expiry embedded in the token itself; fall back to the
    // endpoint-reported lifetime.
    let expires_at_ms = match expiry_from_jwt(&response.access_token) {
        Some(exp) => exp,
        None => {
            warn!("token has no decodable expiry claim, using expires_in");
            Utc::now().timestamp_millis() + response.expires_in * 1000
        }
    };

    Ok(Credential {
        token: response.access_token,
        expires_at_ms,
    })
}
