#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Viewport state carried in the page URL.
//!
//! The query string holds `centerLat`, `centerLng` and `zoom`, plus
//! `neLat`, `neLng`, `swLat` and `swLng` when exact bounds are persisted.
//! It is read once when the map mounts and rewritten (with replace
//! semantics, so history does not grow per pan) whenever the viewport
//! settles. Decoding never fails: anything missing or unparsable falls
//! back to the default center and zoom.

pub mod sink;

use poi_map_poi_models::{GeoBounds, LatLng};
use url::{Url, form_urlencoded};

pub use sink::{MemoryUrlSink, UrlSink};

/// Center used when the URL carries none.
pub const DEFAULT_CENTER: LatLng = LatLng::new(31.464_656_329_970_605, 73.253_938_6);

/// Zoom used when the URL carries none.
pub const DEFAULT_ZOOM: f64 = 12.0;

const CENTER_LAT: &str = "centerLat";
const CENTER_LNG: &str = "centerLng";
const ZOOM: &str = "zoom";
const NE_LAT: &str = "neLat";
const NE_LNG: &str = "neLng";
const SW_LAT: &str = "swLat";
const SW_LNG: &str = "swLng";

/// Viewport parameters restored from, and written to, the query string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportUrlState {
    /// Map center.
    pub center: LatLng,
    /// Map zoom level.
    pub zoom: f64,
    /// Exact visible bounds, when all four corners were present.
    pub bounds: Option<GeoBounds>,
}

impl Default for ViewportUrlState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            bounds: None,
        }
    }
}

impl ViewportUrlState {
    /// State for a viewport centered at `center` with `zoom`, without
    /// persisted bounds.
    #[must_use]
    pub const fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            bounds: None,
        }
    }

    /// Attaches exact bounds to persist alongside the center.
    #[must_use]
    pub const fn with_bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

#[derive(Default)]
struct RawParams {
    center_lat: Option<f64>,
    center_lng: Option<f64>,
    zoom: Option<f64>,
    ne_lat: Option<f64>,
    ne_lng: Option<f64>,
    sw_lat: Option<f64>,
    sw_lng: Option<f64>,
}

/// Parses a query string, with or without the leading `?`.
///
/// Each field is read independently: a missing or non-numeric center
/// coordinate or zoom takes its default, and bounds are only restored
/// when all four corners parse. When a parameter repeats, the first
/// occurrence wins.
#[must_use]
pub fn decode(query: &str) -> ViewportUrlState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut raw = RawParams::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            CENTER_LAT => &mut raw.center_lat,
            CENTER_LNG => &mut raw.center_lng,
            ZOOM => &mut raw.zoom,
            NE_LAT => &mut raw.ne_lat,
            NE_LNG => &mut raw.ne_lng,
            SW_LAT => &mut raw.sw_lat,
            SW_LNG => &mut raw.sw_lng,
            _ => continue,
        };
        if slot.is_none() {
            *slot = parse_number(&value);
            if slot.is_none() {
                log::debug!("Ignoring non-numeric URL parameter {key}={value}");
            }
        }
    }

    let bounds = match (raw.ne_lat, raw.ne_lng, raw.sw_lat, raw.sw_lng) {
        (Some(ne_lat), Some(ne_lng), Some(sw_lat), Some(sw_lng)) => Some(GeoBounds::new(
            LatLng::new(ne_lat, ne_lng),
            LatLng::new(sw_lat, sw_lng),
        )),
        _ => None,
    };

    ViewportUrlState {
        center: LatLng::new(
            raw.center_lat.unwrap_or(DEFAULT_CENTER.lat),
            raw.center_lng.unwrap_or(DEFAULT_CENTER.lng),
        ),
        zoom: raw.zoom.unwrap_or(DEFAULT_ZOOM),
        bounds,
    }
}

/// Serializes the state to a fresh query string (no leading `?`).
///
/// Only the viewport parameters are written; anything else that was in
/// the previous URL is dropped. Numbers use the shortest representation
/// that parses back to the same value, so `encode(&decode(qs)) == qs`
/// for query strings written by this function.
#[must_use]
pub fn encode(state: &ViewportUrlState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer
        .append_pair(CENTER_LAT, &state.center.lat.to_string())
        .append_pair(CENTER_LNG, &state.center.lng.to_string())
        .append_pair(ZOOM, &state.zoom.to_string());

    if let Some(bounds) = state.bounds {
        serializer
            .append_pair(NE_LAT, &bounds.north_east_lat.to_string())
            .append_pair(NE_LNG, &bounds.north_east_lng.to_string())
            .append_pair(SW_LAT, &bounds.south_west_lat.to_string())
            .append_pair(SW_LNG, &bounds.south_west_lng.to_string());
    }

    serializer.finish()
}

/// Path plus encoded query, the form handed to a replace navigation.
#[must_use]
pub fn location(path: &str, state: &ViewportUrlState) -> String {
    format!("{path}?{}", encode(state))
}

/// Builds the full shareable URL from the page origin.
///
/// # Errors
///
/// Returns [`url::ParseError`] if `origin` is not an absolute URL.
pub fn to_url(origin: &str, path: &str, state: &ViewportUrlState) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(origin)?;
    url.set_path(path);
    url.set_query(Some(&encode(state)));
    url.set_fragment(None);
    Ok(url)
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_uses_defaults() {
        let state = decode("");
        assert_eq!(state, ViewportUrlState::default());
        assert!((state.center.lat - 31.464_656_329_970_605).abs() < f64::EPSILON);
        assert!((state.center.lng - 73.253_938_6).abs() < f64::EPSILON);
        assert!((state.zoom - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_center_and_zoom() {
        let state = decode("?centerLat=51.5&centerLng=-0.12&zoom=14");
        assert_eq!(state.center, LatLng::new(51.5, -0.12));
        assert!((state.zoom - 14.0).abs() < f64::EPSILON);
        assert!(state.bounds.is_none());
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let state = decode("centerLat=abc&centerLng=10.5&zoom=");
        assert!((state.center.lat - DEFAULT_CENTER.lat).abs() < f64::EPSILON);
        assert!((state.center.lng - 10.5).abs() < f64::EPSILON);
        assert!((state.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_values_fall_back() {
        let state = decode("centerLat=NaN&centerLng=inf&zoom=-infinity");
        assert_eq!(state, ViewportUrlState::default());
    }

    #[test]
    fn first_repeated_parameter_wins() {
        let state = decode("zoom=9&zoom=15");
        assert!((state.zoom - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bounds_need_all_four_corners() {
        assert!(decode("neLat=1&neLng=2&swLat=0").bounds.is_none());
        let bounds = decode("neLat=1&neLng=2&swLat=0&swLng=-1.5").bounds.unwrap();
        assert_eq!(bounds.north_east(), LatLng::new(1.0, 2.0));
        assert_eq!(bounds.south_west(), LatLng::new(0.0, -1.5));
    }

    #[test]
    fn encode_drops_unrelated_parameters() {
        let state = decode("utm_source=mail&centerLat=1.5&centerLng=2.5&zoom=10");
        assert_eq!(encode(&state), "centerLat=1.5&centerLng=2.5&zoom=10");
    }

    #[test]
    fn round_trips_center_and_zoom() {
        for qs in [
            "centerLat=31.464656329970605&centerLng=73.2539386&zoom=12",
            "centerLat=-33.8688&centerLng=151.2093&zoom=7",
            "centerLat=0&centerLng=-0.5&zoom=12.5",
        ] {
            assert_eq!(encode(&decode(qs)), qs);
        }
    }

    #[test]
    fn round_trips_with_bounds() {
        let qs = "centerLat=31.5&centerLng=73.25&zoom=12&neLat=31.6&neLng=73.4&swLat=31.4&swLng=73.1";
        assert_eq!(encode(&decode(qs)), qs);
    }

    #[test]
    fn builds_location_and_url() {
        let state = ViewportUrlState::new(LatLng::new(1.5, 2.5), 10.0);
        assert_eq!(location("/", &state), "/?centerLat=1.5&centerLng=2.5&zoom=10");

        let url = to_url("https://example.com/somewhere?stale=1#frag", "/", &state).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/?centerLat=1.5&centerLng=2.5&zoom=10"
        );
    }

    #[test]
    fn rejects_relative_origin() {
        let state = ViewportUrlState::default();
        assert!(to_url("not a url", "/", &state).is_err());
    }
}
