//! Credential acquisition and caching.
//!
//! Overlay and metadata fetches are authenticated with short-lived bearer
//! tokens. [`CredentialCache`] owns the token lifecycle: lazy acquisition,
//! reuse while fresh, refresh inside the expiry margin, and deduplication of
//! concurrent acquisitions.

mod cache;
mod error;
mod jwt;

pub use cache::{Credential, CredentialCache, TokenSource};
pub use error::AuthError;
