//! The highlighted item and hovered marker.
//!
//! List hovers and marker clicks both highlight an item and move the map
//! to it. Hovering a marker only enlarges that marker.

use poi_map_poi_models::Item;

use crate::ViewportProvider;
use crate::marker::{MarkerIcon, marker_icon};

/// Item highlight and marker hover state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    highlighted: Option<Item>,
    hovered: Option<String>,
}

impl SelectionState {
    /// Nothing highlighted or hovered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlights `item` and centers the map on it.
    pub fn highlight(&mut self, item: &Item, viewport: &dyn ViewportProvider) {
        log::debug!("Highlighting item {}", item.id);
        viewport.set_center(item.location);
        self.highlighted = Some(item.clone());
    }

    /// Highlights the marker with `id` from the current marker set.
    ///
    /// Returns `false` and leaves the selection untouched if `id` is not
    /// among `markers`.
    pub fn select_marker(
        &mut self,
        id: &str,
        markers: &[Item],
        viewport: &dyn ViewportProvider,
    ) -> bool {
        let Some(item) = markers.iter().find(|item| item.id == id) else {
            log::debug!("Ignoring click on unknown marker {id}");
            return false;
        };
        self.highlight(item, viewport);
        true
    }

    /// Sets or clears the hovered marker.
    pub fn hover(&mut self, id: Option<&str>) {
        self.hovered = id.map(ToOwned::to_owned);
    }

    /// Drops the highlight and hover.
    pub fn clear(&mut self) {
        self.highlighted = None;
        self.hovered = None;
    }

    /// The highlighted item, if any.
    #[must_use]
    pub const fn highlighted(&self) -> Option<&Item> {
        self.highlighted.as_ref()
    }

    /// Returns `true` if the item with `id` is highlighted.
    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.highlighted.as_ref().is_some_and(|item| item.id == id)
    }

    /// Returns `true` if the marker with `id` is hovered.
    #[must_use]
    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered.as_deref() == Some(id)
    }

    /// Icon for `item` given the current highlight and hover.
    #[must_use]
    pub fn icon_for(&self, item: &Item) -> MarkerIcon {
        marker_icon(
            item.marker_type,
            self.is_active(&item.id),
            self.is_hovered(&item.id),
        )
    }
}

#[cfg(test)]
mod tests {
    use poi_map_poi_models::{LatLng, MarkerType};

    use super::*;
    use crate::ViewportState;
    use crate::marker::{DEFAULT_SIZE, EMPHASIZED_SIZE};

    fn item(id: &str, lat: f64, lng: f64) -> Item {
        Item {
            id: id.to_string(),
            title: format!("Item {id}"),
            town: "Faisalabad".to_string(),
            location: LatLng::new(lat, lng),
            image: None,
            marker_type: Some(MarkerType::Eat),
            created_at: None,
        }
    }

    fn viewport() -> ViewportState {
        ViewportState::new(LatLng::new(0.0, 0.0), 12.0, 800, 600)
    }

    #[test]
    fn highlight_recenters_map() {
        let vp = viewport();
        let mut selection = SelectionState::new();
        let target = item("a", 31.4, 73.1);

        selection.highlight(&target, &vp);

        assert_eq!(vp.center(), target.location);
        assert_eq!(selection.highlighted(), Some(&target));
        assert!(selection.is_active("a"));
    }

    #[test]
    fn marker_click_resolves_against_markers() {
        let vp = viewport();
        let mut selection = SelectionState::new();
        let markers = vec![item("a", 1.0, 2.0), item("b", 3.0, 4.0)];

        assert!(selection.select_marker("b", &markers, &vp));
        assert!(selection.is_active("b"));
        assert_eq!(vp.center(), LatLng::new(3.0, 4.0));
    }

    #[test]
    fn unknown_marker_is_ignored() {
        let vp = viewport();
        let mut selection = SelectionState::new();
        let markers = vec![item("a", 1.0, 2.0)];
        selection.highlight(&markers[0], &vp);

        assert!(!selection.select_marker("missing", &markers, &vp));
        assert!(selection.is_active("a"));
        assert_eq!(vp.center(), LatLng::new(1.0, 2.0));
    }

    #[test]
    fn icons_follow_selection() {
        let vp = viewport();
        let mut selection = SelectionState::new();
        let a = item("a", 1.0, 2.0);
        let b = item("b", 3.0, 4.0);

        selection.highlight(&a, &vp);
        selection.hover(Some("b"));

        assert_eq!(selection.icon_for(&a).url, "place-to-eat_active.svg");
        assert_eq!(selection.icon_for(&b).size, EMPHASIZED_SIZE);
        assert_eq!(selection.icon_for(&b).url, "place-to-eat.svg");

        selection.clear();
        assert!(selection.highlighted().is_none());
        assert_eq!(selection.icon_for(&a).size, DEFAULT_SIZE);
        assert_eq!(selection.icon_for(&b).size, DEFAULT_SIZE);
    }
}
