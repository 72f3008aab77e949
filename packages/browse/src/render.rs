//! Plain-text rendering of a browse session.

use std::fmt::Write as _;

use poi_map_content::ContentConfig;
use poi_map_content::image::image_url;
use poi_map_pagination::{PageEntry, PageWindow};
use poi_map_poi_models::Item;
use poi_map_viewport::marker::marker_icon;

/// One line per result card.
#[must_use]
pub fn item_lines(items: &[Item], images: Option<&ContentConfig>) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut line = format!("{:>3}. {}", i + 1, item.title);
            if !item.town.is_empty() {
                write!(line, " ({})", item.town).ok();
            }

            let icon = marker_icon(item.marker_type, false, false);
            if !icon.url.is_empty() {
                write!(line, " [{}]", icon.url).ok();
            }

            if let Some(url) = images
                .zip(item.image.as_ref())
                .and_then(|(config, image)| image_url(config, image))
            {
                write!(line, " {url}").ok();
            }
            line
        })
        .collect()
}

/// The pagination control as text, e.g. `< 1 … 9 [10] 11 … 18 >`.
///
/// Disabled arrows are drawn as `|`.
#[must_use]
pub fn page_window(window: &PageWindow) -> String {
    let mut parts = Vec::with_capacity(window.entries.len() + 2);
    parts.push(if window.left_disabled { "|" } else { "<" }.to_string());
    parts.extend(window.entries.iter().map(|entry| match entry {
        PageEntry::Page {
            number,
            active: true,
        } => format!("[{number}]"),
        PageEntry::Page { number, .. } => number.to_string(),
        PageEntry::Ellipsis => "…".to_string(),
    }));
    parts.push(if window.right_disabled { "|" } else { ">" }.to_string());
    parts.join(" ")
}
