#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounds-scoped queries against the headless content store.
//!
//! The [`BoundsQueryService`] trait is the only thing the rest of the
//! workspace knows about the store: give it a rectangle and get back a
//! page of items plus the total count inside that rectangle. Two
//! implementations live here:
//!
//! * [`client::ContentStoreClient`] talks to the hosted store's GROQ
//!   query endpoint over HTTP.
//! * [`memory::InMemoryStore`] answers the same queries from a local
//!   list, for tests and offline fixtures.

pub mod client;
pub mod config;
pub mod image;
pub mod memory;

use async_trait::async_trait;
use poi_map_poi_models::{GeoBounds, Item, Page};

pub use config::ContentConfig;

/// Errors that can occur while querying the content store.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store answered with a non-success status.
    #[error("Content store returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body, if any.
        message: String,
    },

    /// A required configuration value is absent. Nothing can ever be
    /// fetched without it, so callers should abort startup.
    #[error("Missing required configuration: {name}")]
    ConfigurationMissing {
        /// Name of the missing environment variable.
        name: &'static str,
    },
}

/// Query service scoped by geographic bounds.
///
/// Results are ordered by descending creation time. Implementations must
/// be `Send + Sync` so the fetch controller can share them across the
/// tasks it spawns.
#[async_trait]
pub trait BoundsQueryService: Send + Sync {
    /// Fetches up to `page_size` items starting at `offset`, plus the
    /// total number of items inside `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the query fails.
    async fn fetch_page(
        &self,
        bounds: &GeoBounds,
        offset: u64,
        page_size: u64,
    ) -> Result<Page, ContentError>;

    /// Fetches every item inside `bounds`. Used for map markers.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the query fails.
    async fn fetch_all(&self, bounds: &GeoBounds) -> Result<Vec<Item>, ContentError>;
}
