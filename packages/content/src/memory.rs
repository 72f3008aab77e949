//! In-process [`BoundsQueryService`] over a fixed list of items.
//!
//! Applies the same bounds predicate and newest-first ordering as the
//! hosted store, so code driven by it behaves the same way it does
//! against the real endpoint.

use std::path::Path;

use async_trait::async_trait;
use poi_map_poi_models::{GeoBounds, Item, Page};

use crate::{BoundsQueryService, ContentError};

/// A content store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Vec<Item>,
}

impl InMemoryStore {
    /// Creates a store over `items`, sorted newest first. Items without a
    /// creation time sort last, keeping their relative order.
    #[must_use]
    pub fn new(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { items }
    }

    /// Loads a store from a JSON array of content store documents.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Json`] if the file is not a valid array of
    /// items.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Loads a store from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Json`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path).map_err(serde_json::Error::io)?;
        Self::from_json(&json)
    }

    /// Number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the store holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn within<'a>(&'a self, bounds: &'a GeoBounds) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| bounds.contains(item.location))
    }
}

#[async_trait]
impl BoundsQueryService for InMemoryStore {
    async fn fetch_page(
        &self,
        bounds: &GeoBounds,
        offset: u64,
        page_size: u64,
    ) -> Result<Page, ContentError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);

        let items = self.within(bounds).skip(skip).take(take).cloned().collect();
        let total_count = self.within(bounds).count() as u64;

        Ok(Page { items, total_count })
    }

    async fn fetch_all(&self, bounds: &GeoBounds) -> Result<Vec<Item>, ContentError> {
        Ok(self.within(bounds).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use poi_map_poi_models::LatLng;

    use super::*;

    fn item(id: &str, lat: f64, lng: f64, day: u32) -> Item {
        Item {
            id: id.to_string(),
            title: format!("Place {id}"),
            town: "Faisalabad".to_string(),
            location: LatLng::new(lat, lng),
            image: None,
            marker_type: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
        }
    }

    fn bounds() -> GeoBounds {
        GeoBounds::new(LatLng::new(32.0, 74.0), LatLng::new(31.0, 73.0))
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new(
            (1..=20)
                .map(|day| item(&format!("in-{day}"), 31.5, 73.5, day))
                .chain([item("out", 40.0, 73.5, 25)])
                .collect(),
        )
    }

    #[tokio::test]
    async fn pages_newest_first() {
        let page = store().fetch_page(&bounds(), 0, 6).await.unwrap();
        assert_eq!(page.total_count, 20);
        let ids: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["in-20", "in-19", "in-18", "in-17", "in-16", "in-15"]);
    }

    #[tokio::test]
    async fn last_page_is_short() {
        let page = store().fetch_page(&bounds(), 18, 6).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 20);
    }

    #[tokio::test]
    async fn offset_past_end_is_empty() {
        let page = store().fetch_page(&bounds(), 60, 6).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 20);
    }

    #[tokio::test]
    async fn fetch_all_filters_by_bounds() {
        let all = store().fetch_all(&bounds()).await.unwrap();
        assert_eq!(all.len(), 20);
        assert!(all.iter().all(|i| i.id != "out"));
    }

    #[test]
    fn loads_json_fixture() {
        let store = InMemoryStore::from_json(
            r#"[{"_id":"a","title":"A","town":"T","location":{"lat":1.0,"lng":2.0}}]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
    }
}
