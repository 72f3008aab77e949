//! Map marker icons per item category.

use poi_map_poi_models::MarkerType;

/// Marker edge length, in pixels, for active or hovered markers.
pub const EMPHASIZED_SIZE: u32 = 30;

/// Marker edge length, in pixels, otherwise.
pub const DEFAULT_SIZE: u32 = 20;

const ICON_EXT: &str = ".svg";

/// Icon to draw for a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    /// Icon file, empty for items without a known category.
    pub url: String,
    /// Square size in pixels.
    pub size: u32,
}

const fn icon_name(marker_type: MarkerType) -> &'static str {
    match marker_type {
        MarkerType::Eat => "place-to-eat",
        MarkerType::Stay => "place-to-stay",
        MarkerType::Do => "things-to-do",
    }
}

/// Picks the icon for a marker.
///
/// Active markers use the `_active` variant of the icon; active or
/// hovered markers are drawn larger. Items without a category get a blank
/// default-sized marker.
#[must_use]
pub fn marker_icon(marker_type: Option<MarkerType>, active: bool, hovered: bool) -> MarkerIcon {
    let Some(marker_type) = marker_type else {
        return MarkerIcon {
            url: String::new(),
            size: DEFAULT_SIZE,
        };
    };

    let name = icon_name(marker_type);
    let url = if active {
        format!("{name}_active{ICON_EXT}")
    } else {
        format!("{name}{ICON_EXT}")
    };

    MarkerIcon {
        url,
        size: if active || hovered {
            EMPHASIZED_SIZE
        } else {
            DEFAULT_SIZE
        },
    }
}
