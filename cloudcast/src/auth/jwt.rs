//! Minimal JWT payload inspection.
//!
//! The credential cache only needs the `exp` claim to schedule refreshes;
//! signature verification is the resource server's job, not ours.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// Extract the expiry of a JWT as epoch milliseconds.
///
/// Returns `None` when the token is not a decodable JWT or carries no `exp`
/// claim; callers fall back to the endpoint's `expires_in` field.
pub(crate) fn expiry_from_jwt(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp * 1000)
}
