//! Headless viewport using Web Mercator tile math.
//!
//! Bounds are derived from the center, zoom and the viewport's pixel
//! size the same way slippy-map widgets do it: the world is
//! `256 * 2^zoom` pixels wide and the visible rectangle is the viewport
//! size centered on the projected center.

use std::f64::consts::PI;
use std::sync::Mutex;

use poi_map_poi_models::{GeoBounds, LatLng};

use crate::ViewportProvider;

const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy)]
struct Inner {
    center: LatLng,
    zoom: f64,
    width_px: u32,
    height_px: u32,
    loaded: bool,
}

/// A viewport held in memory.
#[derive(Debug)]
pub struct ViewportState {
    inner: Mutex<Inner>,
}

impl ViewportState {
    /// Creates a loaded viewport of `width_px` by `height_px`.
    #[must_use]
    pub const fn new(center: LatLng, zoom: f64, width_px: u32, height_px: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                center,
                zoom,
                width_px,
                height_px,
                loaded: true,
            }),
        }
    }

    /// Creates a viewport that reports no bounds until
    /// [`ViewportState::mark_loaded`] is called, like a map widget that
    /// has not finished its first layout.
    #[must_use]
    pub const fn unloaded(center: LatLng, zoom: f64, width_px: u32, height_px: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                center,
                zoom,
                width_px,
                height_px,
                loaded: false,
            }),
        }
    }

    /// Marks the map as laid out so it starts reporting bounds.
    pub fn mark_loaded(&self) {
        self.lock().loaded = true;
    }

    /// Changes the viewport's pixel size.
    pub fn resize(&self, width_px: u32, height_px: u32) {
        let mut inner = self.lock();
        inner.width_px = width_px;
        inner.height_px = height_px;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // The guarded data is plain `Copy` state, so a poisoned lock still
        // holds a usable value.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ViewportProvider for ViewportState {
    fn bounds(&self) -> Option<GeoBounds> {
        let inner = *self.lock();
        inner.loaded.then(|| {
            mercator_bounds(
                inner.center,
                inner.zoom,
                f64::from(inner.width_px),
                f64::from(inner.height_px),
            )
        })
    }

    fn center(&self) -> LatLng {
        self.lock().center
    }

    fn zoom(&self) -> f64 {
        self.lock().zoom
    }

    fn set_center(&self, center: LatLng) {
        self.lock().center = center;
    }

    fn set_zoom(&self, zoom: f64) {
        self.lock().zoom = zoom;
    }
}

/// Visible bounds of a `width` by `height` pixel viewport.
#[must_use]
pub fn mercator_bounds(center: LatLng, zoom: f64, width: f64, height: f64) -> GeoBounds {
    let world = TILE_SIZE * zoom.exp2();
    let (cx, cy) = project(center, world);

    let north_east = unproject(cx + width / 2.0, cy - height / 2.0, world);
    let south_west = unproject(cx - width / 2.0, cy + height / 2.0, world);

    GeoBounds::new(north_east, south_west)
}

fn project(point: LatLng, world: f64) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * world;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
    (x, y)
}

fn unproject(x: f64, y: f64, world: f64) -> LatLng {
    let lng = (x / world).mul_add(360.0, -180.0);
    let n = PI * 2.0f64.mul_add(-(y / world), 1.0);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        lng.clamp(-180.0, 180.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_surround_center() {
        let center = LatLng::new(31.46, 73.25);
        let vp = ViewportState::new(center, 12.0, 800, 600);
        let bounds = vp.bounds().unwrap();
        assert!(bounds.contains(center));
        assert!(bounds.north_east_lat > bounds.south_west_lat);
        assert!(bounds.north_east_lng > bounds.south_west_lng);
    }

    #[test]
    fn bounds_width_matches_zoom() {
        // 256 px per world at zoom 0, so 800 px at zoom 12 spans
        // 800 / (256 * 4096) of 360 degrees.
        let bounds = mercator_bounds(LatLng::new(0.0, 0.0), 12.0, 800.0, 600.0);
        let span = bounds.north_east_lng - bounds.south_west_lng;
        let expected = 800.0 / (256.0 * 4096.0) * 360.0;
        assert!((span - expected).abs() < 1e-9);
    }

    #[test]
    fn equator_bounds_are_symmetric() {
        let bounds = mercator_bounds(LatLng::new(0.0, 0.0), 10.0, 400.0, 400.0);
        assert!((bounds.north_east_lat + bounds.south_west_lat).abs() < 1e-9);
        assert!((bounds.north_east_lng + bounds.south_west_lng).abs() < 1e-9);
    }

    #[test]
    fn zooming_in_shrinks_bounds() {
        let vp = ViewportState::new(LatLng::new(31.46, 73.25), 10.0, 800, 600);
        let wide = vp.bounds().unwrap();
        vp.set_zoom(11.0);
        let narrow = vp.bounds().unwrap();
        assert!(
            narrow.north_east_lng - narrow.south_west_lng
                < wide.north_east_lng - wide.south_west_lng
        );
    }

    #[test]
    fn low_zoom_clamps_to_world() {
        let bounds = mercator_bounds(LatLng::new(0.0, 0.0), 0.0, 2000.0, 2000.0);
        assert!((bounds.north_east_lng - 180.0).abs() < f64::EPSILON);
        assert!((bounds.south_west_lat + MAX_LATITUDE).abs() < f64::EPSILON);
    }

    #[test]
    fn unloaded_viewport_has_no_bounds() {
        let vp = ViewportState::unloaded(LatLng::new(31.46, 73.25), 12.0, 800, 600);
        assert!(vp.bounds().is_none());
        vp.mark_loaded();
        assert!(vp.bounds().is_some());
    }
}
