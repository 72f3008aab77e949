//! Device-size classification and the browse configuration it selects.
//!
//! Width thresholds live here and nowhere else. Components ask for a
//! [`BrowseConfig`] instead of re-deriving "is this mobile" from the
//! window width themselves.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Narrowest width, in CSS pixels, treated as a tablet.
pub const TABLET_MIN_WIDTH: u32 = 768;

/// Narrowest width, in CSS pixels, treated as a desktop.
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

/// Cards per page on phones and tablets.
pub const COMPACT_PAGE_SIZE: u64 = 6;

/// Cards per page on desktops.
pub const DESKTOP_PAGE_SIZE: u64 = 18;

/// Layout class derived from the window width.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceClass {
    /// Narrower than [`TABLET_MIN_WIDTH`].
    Mobile,
    /// From [`TABLET_MIN_WIDTH`] up to [`DESKTOP_MIN_WIDTH`].
    Tablet,
    /// [`DESKTOP_MIN_WIDTH`] and wider.
    Desktop,
}

/// How the browse page behaves for a layout class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseConfig {
    /// Results per page.
    pub page_size: u64,
    /// Append forward pages to the list ("load more") instead of
    /// replacing it.
    pub append_on_paginate: bool,
    /// Show the pagination control under the list on tablets.
    pub show_tablet_pagination: bool,
    /// Fetch every item in the bounds for map markers on each settle.
    pub load_markers: bool,
    /// Persist the exact bounds in the URL alongside the center.
    pub persist_bounds: bool,
}

impl BrowseConfig {
    /// The configuration for `class`.
    #[must_use]
    pub const fn for_device(class: DeviceClass) -> Self {
        match class {
            DeviceClass::Mobile => Self {
                page_size: COMPACT_PAGE_SIZE,
                append_on_paginate: true,
                show_tablet_pagination: false,
                load_markers: true,
                persist_bounds: false,
            },
            DeviceClass::Tablet => Self {
                page_size: COMPACT_PAGE_SIZE,
                append_on_paginate: false,
                show_tablet_pagination: true,
                load_markers: true,
                persist_bounds: false,
            },
            DeviceClass::Desktop => Self {
                page_size: DESKTOP_PAGE_SIZE,
                append_on_paginate: false,
                show_tablet_pagination: false,
                load_markers: true,
                persist_bounds: false,
            },
        }
    }

    /// Same configuration with bounds persisted in the URL.
    #[must_use]
    pub const fn with_persisted_bounds(mut self) -> Self {
        self.persist_bounds = true;
        self
    }

    /// Same configuration without the marker query.
    #[must_use]
    pub const fn without_markers(mut self) -> Self {
        self.load_markers = false;
        self
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self::for_device(DeviceClass::Desktop)
    }
}

/// Maps window widths to [`DeviceClass`]es.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportClassifier {
    tablet_min_width: u32,
    desktop_min_width: u32,
}

impl Default for ViewportClassifier {
    fn default() -> Self {
        Self {
            tablet_min_width: TABLET_MIN_WIDTH,
            desktop_min_width: DESKTOP_MIN_WIDTH,
        }
    }
}

impl ViewportClassifier {
    /// Classifies a window width in CSS pixels.
    #[must_use]
    pub const fn classify(&self, width: u32) -> DeviceClass {
        if width < self.tablet_min_width {
            DeviceClass::Mobile
        } else if width < self.desktop_min_width {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    /// The browse configuration for a window width.
    #[must_use]
    pub const fn config_for(&self, width: u32) -> BrowseConfig {
        BrowseConfig::for_device(self.classify(width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_at_thresholds() {
        let classifier = ViewportClassifier::default();
        assert_eq!(classifier.classify(0), DeviceClass::Mobile);
        assert_eq!(classifier.classify(767), DeviceClass::Mobile);
        assert_eq!(classifier.classify(768), DeviceClass::Tablet);
        assert_eq!(classifier.classify(1023), DeviceClass::Tablet);
        assert_eq!(classifier.classify(1024), DeviceClass::Desktop);
    }

    #[test]
    fn mobile_appends_small_pages() {
        let config = ViewportClassifier::default().config_for(375);
        assert_eq!(config.page_size, 6);
        assert!(config.append_on_paginate);
        assert!(!config.show_tablet_pagination);
    }

    #[test]
    fn tablet_replaces_with_its_own_pagination() {
        let config = ViewportClassifier::default().config_for(900);
        assert_eq!(config.page_size, 6);
        assert!(!config.append_on_paginate);
        assert!(config.show_tablet_pagination);
    }

    #[test]
    fn desktop_uses_large_pages() {
        let config = ViewportClassifier::default().config_for(1440);
        assert_eq!(config.page_size, 18);
        assert!(!config.append_on_paginate);
    }

    #[test]
    fn device_class_names() {
        assert_eq!(DeviceClass::Tablet.to_string(), "tablet");
        assert_eq!("desktop".parse::<DeviceClass>().unwrap(), DeviceClass::Desktop);
    }
}
