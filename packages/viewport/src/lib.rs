#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map viewport access and the state that hangs off it.
//!
//! The map widget itself is out of reach; everything here talks to it
//! through [`ViewportProvider`]. [`state::ViewportState`] is a headless
//! provider for tests and the browse binary. The rest of the crate is the
//! glue the page needs around the map: seeding it from the URL, the zoom
//! buttons, device-size classification ([`classifier`]) and the
//! highlighted item ([`selection`]).

pub mod classifier;
pub mod marker;
pub mod selection;
pub mod state;

use poi_map_poi_models::{GeoBounds, LatLng};
use poi_map_url_state::ViewportUrlState;

pub use classifier::{BrowseConfig, DeviceClass, ViewportClassifier};
pub use selection::SelectionState;
pub use state::ViewportState;

/// Furthest the zoom-in button goes.
pub const MAX_ZOOM: f64 = 20.0;

/// Furthest the zoom-out button goes, and the floor for zoom levels
/// restored from a URL.
pub const MIN_ZOOM: f64 = 5.0;

/// Zoom levels added by one press of the zoom-in button.
const ZOOM_IN_STEP: f64 = 1.0;

/// Zoom levels removed by one press of the zoom-out button.
const ZOOM_OUT_STEP: f64 = 2.0;

/// Errors from viewport controls.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ViewportError {
    /// Already at [`MAX_ZOOM`].
    #[error("Maximum zoom reached ({0})")]
    MaxZoomReached(f64),

    /// Already at [`MIN_ZOOM`].
    #[error("Minimum zoom reached ({0})")]
    MinZoomReached(f64),
}

/// Read and write access to the map's viewport.
///
/// Methods take `&self`; implementations use interior mutability so the
/// provider can be shared between the page, the fetch controller and the
/// selection state.
pub trait ViewportProvider: Send + Sync {
    /// Visible bounds, or `None` until the map has laid itself out.
    fn bounds(&self) -> Option<GeoBounds>;

    /// Current center.
    fn center(&self) -> LatLng;

    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Moves the map to `center`.
    fn set_center(&self, center: LatLng);

    /// Changes the zoom level.
    fn set_zoom(&self, zoom: f64);
}

/// Applies URL state to a freshly mounted map.
///
/// Zoom levels below [`MIN_ZOOM`] are raised to it.
pub fn seed_viewport(provider: &dyn ViewportProvider, url_state: &ViewportUrlState) {
    let zoom = url_state.zoom.max(MIN_ZOOM);
    log::debug!(
        "Seeding viewport at {:?} zoom {zoom}",
        url_state.center
    );
    provider.set_center(url_state.center);
    provider.set_zoom(zoom);
}

/// Snapshot of the viewport in URL form.
///
/// When `include_bounds` is set and the map has bounds, they are
/// persisted alongside the center.
#[must_use]
pub fn url_state_of(provider: &dyn ViewportProvider, include_bounds: bool) -> ViewportUrlState {
    let state = ViewportUrlState::new(provider.center(), provider.zoom());
    match provider.bounds() {
        Some(bounds) if include_bounds => state.with_bounds(bounds),
        _ => state,
    }
}

/// Zooms in one level.
///
/// # Errors
///
/// Returns [`ViewportError::MaxZoomReached`] if the map is already at
/// [`MAX_ZOOM`].
pub fn zoom_in(provider: &dyn ViewportProvider) -> Result<f64, ViewportError> {
    let current = provider.zoom();
    if current >= MAX_ZOOM {
        return Err(ViewportError::MaxZoomReached(MAX_ZOOM));
    }
    let zoom = (current + ZOOM_IN_STEP).min(MAX_ZOOM);
    provider.set_zoom(zoom);
    Ok(zoom)
}

/// Zooms out two levels, stopping at [`MIN_ZOOM`].
///
/// # Errors
///
/// Returns [`ViewportError::MinZoomReached`] if the map is already at
/// [`MIN_ZOOM`].
pub fn zoom_out(provider: &dyn ViewportProvider) -> Result<f64, ViewportError> {
    let current = provider.zoom();
    if current <= MIN_ZOOM {
        return Err(ViewportError::MinZoomReached(MIN_ZOOM));
    }
    let zoom = (current - ZOOM_OUT_STEP).max(MIN_ZOOM);
    provider.set_zoom(zoom);
    Ok(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(zoom: f64) -> ViewportState {
        ViewportState::new(LatLng::new(31.46, 73.25), zoom, 800, 600)
    }

    #[test]
    fn seeding_clamps_low_zoom() {
        let vp = viewport(12.0);
        seed_viewport(&vp, &ViewportUrlState::new(LatLng::new(10.0, 20.0), 2.0));
        assert_eq!(vp.center(), LatLng::new(10.0, 20.0));
        assert!((vp.zoom() - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn seeding_keeps_valid_zoom() {
        let vp = viewport(12.0);
        seed_viewport(&vp, &ViewportUrlState::new(LatLng::new(10.0, 20.0), 14.0));
        assert!((vp.zoom() - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_in_stops_at_max() {
        let vp = viewport(19.5);
        assert!((zoom_in(&vp).unwrap() - MAX_ZOOM).abs() < f64::EPSILON);
        assert_eq!(zoom_in(&vp), Err(ViewportError::MaxZoomReached(MAX_ZOOM)));
    }

    #[test]
    fn zoom_out_takes_two_levels() {
        let vp = viewport(12.0);
        assert!((zoom_out(&vp).unwrap() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_out_stops_at_min() {
        let vp = viewport(6.0);
        assert!((zoom_out(&vp).unwrap() - MIN_ZOOM).abs() < f64::EPSILON);
        assert_eq!(zoom_out(&vp), Err(ViewportError::MinZoomReached(MIN_ZOOM)));
    }

    #[test]
    fn url_state_includes_bounds_on_request() {
        let vp = viewport(12.0);
        assert!(url_state_of(&vp, false).bounds.is_none());
        assert_eq!(url_state_of(&vp, true).bounds, vp.bounds());
    }
}
