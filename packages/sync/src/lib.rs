#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keeps the result list, map markers and page URL in step with the map.
//!
//! [`FetchController`] is fed viewport and pagination events by the page
//! and turns them into debounced bounds queries and URL rewrites. Readers
//! observe the outcome through [`BrowseSnapshot`]s, either on demand or
//! via a [`tokio::sync::watch`] channel.

pub mod controller;

use poi_map_pagination::PaginationState;
use poi_map_poi_models::Item;

pub use controller::{Debounce, FetchController};

/// Errors returned by [`FetchController`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A caller passed a value outside the operation's domain. Nothing
    /// was scheduled.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// What the list and map should currently show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseSnapshot {
    /// Result cards, in display order.
    pub items: Vec<Item>,
    /// Items inside the current bounds across all pages.
    pub total_count: u64,
    /// Every item inside the bounds, for map markers.
    pub markers: Vec<Item>,
    /// Pagination position.
    pub pagination: PaginationState,
    /// Set from the moment a fetch is scheduled until its response lands.
    pub loading: bool,
}
