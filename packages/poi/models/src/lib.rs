#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Point of interest types shared across the poi-map workspace.
//!
//! These are the shapes returned by the content store: individual
//! [`Item`]s, the [`Page`] wrapper carrying the bounds-wide total count,
//! and the [`GeoBounds`] rectangle every query is scoped to. Field names
//! on the wire follow the content store's document schema (`_id`,
//! `markerType`, `_createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The rectangular region currently visible on the map.
///
/// The north-east corner is expected to be at or above the south-west
/// corner on both axes. Nothing here enforces that; the content store
/// query simply returns no rows for an inverted rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBounds {
    /// Northern latitude boundary.
    pub north_east_lat: f64,
    /// Eastern longitude boundary.
    pub north_east_lng: f64,
    /// Southern latitude boundary.
    pub south_west_lat: f64,
    /// Western longitude boundary.
    pub south_west_lng: f64,
}

impl GeoBounds {
    /// Creates bounds from the north-east and south-west corners.
    #[must_use]
    pub const fn new(north_east: LatLng, south_west: LatLng) -> Self {
        Self {
            north_east_lat: north_east.lat,
            north_east_lng: north_east.lng,
            south_west_lat: south_west.lat,
            south_west_lng: south_west.lng,
        }
    }

    /// The north-east corner.
    #[must_use]
    pub const fn north_east(&self) -> LatLng {
        LatLng::new(self.north_east_lat, self.north_east_lng)
    }

    /// The south-west corner.
    #[must_use]
    pub const fn south_west(&self) -> LatLng {
        LatLng::new(self.south_west_lat, self.south_west_lng)
    }

    /// Returns `true` if `point` lies inside the rectangle, edges included.
    ///
    /// This is the same predicate the content store query applies, so an
    /// in-process store filtering with it returns the same rows.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west_lat
            && point.lat <= self.north_east_lat
            && point.lng >= self.south_west_lng
            && point.lng <= self.north_east_lng
    }
}

/// Category of a point of interest, which selects its map marker icon.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerType {
    /// Places to eat.
    Eat,
    /// Places to stay.
    Stay,
    /// Things to do.
    Do,
}

/// Reference to an image asset held by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// The referenced asset.
    pub asset: AssetRef,
}

/// The `_ref` pointer inside an [`ImageRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Asset document ID, e.g. `image-<hash>-800x600-jpg`.
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// A point of interest as fetched from the content store.
///
/// Items are immutable once fetched; identity is [`Item::id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Document ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Town the place is in. Projections return `null` for documents
    /// without one, which becomes an empty string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub town: String,
    /// Where the place is.
    pub location: LatLng,
    /// Card image.
    #[serde(default)]
    pub image: Option<ImageRef>,
    /// Marker category. Documents without one, or with a category this
    /// crate does not know, get a blank marker.
    #[serde(default, deserialize_with = "known_marker_type")]
    pub marker_type: Option<MarkerType>,
    /// Document creation time, which drives result ordering.
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn known_marker_type<'de, D>(deserializer: D) -> Result<Option<MarkerType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        value.parse().ok().or_else(|| {
            log::debug!("Unknown marker type {value:?}");
            None
        })
    }))
}

/// One page of bounds query results.
///
/// `items` is ordered by descending creation time. `total_count` counts
/// every item intersecting the bounds, regardless of pagination, so
/// `items.len() <= total_count` always holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Items on this page.
    pub items: Vec<Item>,
    /// Number of items inside the queried bounds.
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> GeoBounds {
        GeoBounds::new(LatLng::new(32.0, 74.0), LatLng::new(31.0, 73.0))
    }

    #[test]
    fn contains_interior_point() {
        assert!(bounds().contains(LatLng::new(31.5, 73.5)));
    }

    #[test]
    fn contains_edges() {
        assert!(bounds().contains(LatLng::new(32.0, 73.0)));
        assert!(bounds().contains(LatLng::new(31.0, 74.0)));
    }

    #[test]
    fn rejects_outside_point() {
        assert!(!bounds().contains(LatLng::new(30.9, 73.5)));
        assert!(!bounds().contains(LatLng::new(31.5, 74.1)));
    }

    #[test]
    fn parses_marker_type() {
        assert_eq!("do".parse::<MarkerType>().unwrap(), MarkerType::Do);
        assert_eq!(MarkerType::Stay.to_string(), "stay");
    }

    #[test]
    fn deserializes_content_store_document() {
        let body = serde_json::json!({
            "_id": "abc",
            "title": "Old Fort",
            "town": "Lahore",
            "location": { "lat": 31.58, "lng": 74.31 },
            "image": { "asset": { "_ref": "image-f00-800x600-jpg" } },
            "markerType": "do",
            "_createdAt": "2024-05-01T10:00:00Z"
        });
        let item: Item = serde_json::from_value(body).unwrap();
        assert_eq!(item.id, "abc");
        assert_eq!(item.marker_type, Some(MarkerType::Do));
        assert_eq!(
            item.image.unwrap().asset.reference,
            "image-f00-800x600-jpg"
        );
        assert!(item.created_at.is_some());
    }

    #[test]
    fn deserializes_document_without_optional_fields() {
        let body = serde_json::json!({
            "_id": "abc",
            "title": "Old Fort",
            "town": null,
            "location": { "lat": 31.58, "lng": 74.31 },
            "markerType": null
        });
        let item: Item = serde_json::from_value(body).unwrap();
        assert!(item.town.is_empty());
        assert!(item.marker_type.is_none());
        assert!(item.image.is_none());
    }

    #[test]
    fn unknown_marker_type_does_not_fail_the_page() {
        let body = serde_json::json!([
            {
                "_id": "a",
                "title": "Bazaar",
                "location": { "lat": 31.4, "lng": 73.1 },
                "markerType": "shop"
            },
            {
                "_id": "b",
                "title": "Karahi House",
                "location": { "lat": 31.4, "lng": 73.1 },
                "markerType": "eat"
            }
        ]);
        let items: Vec<Item> = serde_json::from_value(body).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].marker_type.is_none());
        assert_eq!(items[1].marker_type, Some(MarkerType::Eat));
    }
}
