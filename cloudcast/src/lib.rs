//! Cloudcast - Cloud-forecast raster overlays for interactive maps
//!
//! This library provides the core functionality for scrubbing and animating
//! a time series of cloud-forecast rasters on a map: authenticated layer
//! fetching, GeoTIFF decoding into geo-referenced PNG overlays, session
//! caching, preloading, timer-driven playback, and dataset-metadata polling.
//! The map surface itself stays behind the [`overlay::OverlayHost`] trait.
//!
//! # High-Level API
//!
//! For most use cases, the [`session`] module provides a simplified facade:
//!
//! ```ignore
//! use std::sync::Arc;
//! use cloudcast::api::{AsyncReqwestClient, CloudcastClient};
//! use cloudcast::auth::CredentialCache;
//! use cloudcast::config::Config;
//! use cloudcast::session::CloudcastSession;
//!
//! let config = Config::load();
//! let http = Arc::new(AsyncReqwestClient::new()?);
//! let credentials = Arc::new(CredentialCache::new(Arc::clone(&http), config.token_source()));
//! let client = Arc::new(CloudcastClient::new(http, credentials, &config.api.base_url));
//!
//! let session = CloudcastSession::new(client, host);
//! session.toggle_play().await;
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod datainfo;
pub mod logging;
pub mod overlay;
pub mod playback;
pub mod raster;
pub mod session;
pub mod timestep;
pub mod variable;

/// Version of the Cloudcast library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
