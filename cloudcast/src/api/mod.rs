//! Cloudcasting API access.
//!
//! [`CloudcastClient`] talks to the layer and data-info endpoints over an
//! injectable [`AsyncHttpClient`], so tests can substitute mock transports.

mod client;
mod error;
pub(crate) mod http;
mod types;

pub use client::CloudcastClient;
pub use error::ApiError;
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpError};
pub use types::DataInfo;
