//! HTTP client for the content store's GROQ query endpoint.
//!
//! Every query filters `poiOrEvent` documents by location against the
//! four bounds parameters (`$neLat`, `$neLng`, `$swLat`, `$swLng`) and
//! orders them newest first. A page fetch issues the sliced query and the
//! matching `count(...)` query concurrently.

use std::time::Duration;

use async_trait::async_trait;
use poi_map_poi_models::{GeoBounds, Item, Page};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{BoundsQueryService, ContentConfig, ContentError};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BOUNDS_FILTER: &str = "_type == \"poiOrEvent\" && \
     location.lat >= $swLat && location.lat <= $neLat && \
     location.lng >= $swLng && location.lng <= $neLng";

const PROJECTION: &str = "{ _id, _createdAt, title, town, location, image, markerType }";

/// Envelope the query endpoint wraps every result in.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Queries the hosted content store.
pub struct ContentStoreClient {
    http: reqwest::Client,
    config: ContentConfig,
}

impl ContentStoreClient {
    /// Creates a client for the given project configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ContentConfig) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration this client queries with.
    #[must_use]
    pub const fn config(&self) -> &ContentConfig {
        &self.config
    }

    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        bounds: &GeoBounds,
    ) -> Result<T, ContentError> {
        let mut params = vec![("query".to_string(), groq.to_string())];
        params.extend(bounds_params(bounds));

        let response = self
            .http
            .get(self.config.query_url())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body: QueryResponse<T> = serde_json::from_str(&text)?;
        Ok(body.result)
    }
}

#[async_trait]
impl BoundsQueryService for ContentStoreClient {
    async fn fetch_page(
        &self,
        bounds: &GeoBounds,
        offset: u64,
        page_size: u64,
    ) -> Result<Page, ContentError> {
        let page_query = page_query(offset, page_size);
        let count_query = count_query();

        log::debug!("Fetching page at offset {offset} (size {page_size}) within {bounds:?}");

        let (items, total_count) = tokio::try_join!(
            self.query::<Vec<Item>>(&page_query, bounds),
            self.query::<u64>(&count_query, bounds),
        )?;

        Ok(Page { items, total_count })
    }

    async fn fetch_all(&self, bounds: &GeoBounds) -> Result<Vec<Item>, ContentError> {
        log::debug!("Fetching all places within {bounds:?}");
        self.query(&all_query(), bounds).await
    }
}

/// GROQ slice for `page_size` results starting at `offset`. Both ends of
/// a GROQ `..` slice are inclusive, so offset 6 with size 6 is `[6..11]`.
#[must_use]
pub fn page_range(offset: u64, page_size: u64) -> String {
    let last = offset.saturating_add(page_size.max(1) - 1);
    format!("[{offset}..{last}]")
}

/// Query for one page of items inside the bounds, newest first.
#[must_use]
pub fn page_query(offset: u64, page_size: u64) -> String {
    format!(
        "*[{BOUNDS_FILTER}]{PROJECTION} | order(_createdAt desc){}",
        page_range(offset, page_size)
    )
}

/// Query for the number of items inside the bounds.
#[must_use]
pub fn count_query() -> String {
    format!("count(*[{BOUNDS_FILTER}])")
}

/// Query for every item inside the bounds, newest first.
#[must_use]
pub fn all_query() -> String {
    format!("*[{BOUNDS_FILTER}]{PROJECTION} | order(_createdAt desc)")
}

/// GROQ parameters are passed as `$name` query pairs with JSON values.
fn bounds_params(bounds: &GeoBounds) -> [(String, String); 4] {
    [
        ("$neLat".to_string(), json_number(bounds.north_east_lat)),
        ("$neLng".to_string(), json_number(bounds.north_east_lng)),
        ("$swLat".to_string(), json_number(bounds.south_west_lat)),
        ("$swLng".to_string(), json_number(bounds.south_west_lng)),
    ]
}

fn json_number(value: f64) -> String {
    serde_json::Value::from(value).to_string()
}

/// Pulls `error.description` out of an error body, falling back to the
/// raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use poi_map_poi_models::LatLng;

    use super::*;

    #[test]
    fn first_page_range() {
        assert_eq!(page_range(0, 6), "[0..5]");
    }

    #[test]
    fn later_page_range() {
        assert_eq!(page_range(6, 6), "[6..11]");
        assert_eq!(page_range(36, 18), "[36..53]");
    }

    #[test]
    fn page_range_at_end_of_offsets() {
        assert_eq!(
            page_range(u64::MAX, 18),
            format!("[{}..{}]", u64::MAX, u64::MAX)
        );
    }

    #[test]
    fn page_query_orders_then_slices() {
        let q = page_query(0, 6);
        assert!(q.starts_with("*[_type == \"poiOrEvent\""));
        assert!(q.ends_with("| order(_createdAt desc)[0..5]"));
        assert!(q.contains("location.lat >= $swLat"));
        assert!(q.contains("location.lng <= $neLng"));
    }

    #[test]
    fn count_query_wraps_filter() {
        let q = count_query();
        assert!(q.starts_with("count(*["));
        assert!(q.ends_with("])"));
    }

    #[test]
    fn bounds_params_are_json_numbers() {
        let bounds = GeoBounds::new(LatLng::new(31.5, 73.25), LatLng::new(-1.0, 73.0));
        let params = bounds_params(&bounds);
        assert_eq!(params[0], ("$neLat".to_string(), "31.5".to_string()));
        assert_eq!(params[1], ("$neLng".to_string(), "73.25".to_string()));
        assert_eq!(params[2], ("$swLat".to_string(), "-1.0".to_string()));
    }

    #[test]
    fn extracts_error_description() {
        let body = r#"{"error":{"description":"param $neLat referenced, but not provided","type":"queryParseError"}}"#;
        assert_eq!(
            error_message(body),
            "param $neLat referenced, but not provided"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn decodes_query_envelope() {
        let body = r#"{"ms":3,"query":"count(*)","result":42}"#;
        let parsed: QueryResponse<u64> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result, 42);
    }
}
