#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pagination for the result list.
//!
//! [`PaginationEngine`] turns `(total_count, current_page, page_size)`
//! into the page numbers to show and whether the arrow buttons are
//! usable. Rendering is a pure function of [`PaginationState`]; the only
//! mutation is [`PaginationEngine::navigate`].
//!
//! Page windows keep the first and last page visible and elide the rest
//! with ellipses, e.g. for 18 pages:
//!
//! ```text
//! current 1:  1 2 3 4 5 … 18
//! current 10: 1 … 9 10 11 … 18
//! current 18: 1 … 15 16 17 18
//! ```

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Window sizes above this many pages get ellipses.
const FULL_WINDOW_MAX: u64 = 6;

/// Highest current page that still shows the leading run `2..=5`.
const LEADING_RUN_MAX: u64 = 4;

/// Last page number of the leading run.
const LEADING_RUN_END: u64 = 5;

/// Pages from the end at which the window snaps to the trailing run.
const TRAILING_RUN_LEN: u64 = 3;

/// Pagination position for a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// 1-based page being shown.
    pub current_page: u64,
    /// Page shown before the last navigation (`0` before any).
    pub previous_page: u64,
    /// Number of results across all pages.
    pub total_count: u64,
    /// Set while a fetch is pending; blocks navigation.
    pub disabled: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PaginationState {
    /// State on the first page of `total_count` results.
    #[must_use]
    pub const fn new(total_count: u64) -> Self {
        Self {
            current_page: 1,
            previous_page: 0,
            total_count,
            disabled: false,
        }
    }

    /// 0-based index of the current page.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.current_page.saturating_sub(1)
    }

    /// Returns `true` if the last navigation moved exactly one page
    /// forward.
    #[must_use]
    pub const fn stepped_forward(&self) -> bool {
        self.current_page == self.previous_page + 1
    }
}

/// A navigation request from the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum Navigation {
    /// Arrow button: move by the given number of pages (`-1` or `1`).
    Arrow(i64),
    /// Page number button: jump to the given 1-based page.
    Direct(u64),
}

/// One slot in the rendered page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    /// A selectable page number.
    Page {
        /// 1-based page number.
        number: u64,
        /// Whether this is the current page.
        active: bool,
    },
    /// Elided pages.
    Ellipsis,
}

impl PageEntry {
    /// The page number, or `None` for an ellipsis.
    #[must_use]
    pub const fn number(&self) -> Option<u64> {
        match self {
            Self::Page { number, .. } => Some(*number),
            Self::Ellipsis => None,
        }
    }

    /// Returns `true` for the current page.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Page { active: true, .. })
    }
}

/// Everything the pagination control needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Total number of pages.
    pub page_count: u64,
    /// Page numbers and ellipses, left to right.
    pub entries: Vec<PageEntry>,
    /// Whether the previous-page arrow is disabled.
    pub left_disabled: bool,
    /// Whether the next-page arrow is disabled.
    pub right_disabled: bool,
}

/// Derives page windows and applies navigation for a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationEngine {
    page_size: u64,
}

impl PaginationEngine {
    /// Creates an engine for `page_size` results per page. A page size of
    /// zero is treated as one.
    #[must_use]
    pub const fn new(page_size: u64) -> Self {
        Self {
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    /// Results per page.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// `ceil(total_count / page_size)`.
    #[must_use]
    pub const fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size)
    }

    /// Result offset of a 0-based page index.
    #[must_use]
    pub const fn offset(&self, index: u64) -> u64 {
        index.saturating_mul(self.page_size)
    }

    /// Returns `true` if the previous-page arrow is disabled.
    #[must_use]
    pub const fn left_disabled(&self, state: &PaginationState) -> bool {
        state.disabled || state.current_page <= 1
    }

    /// Returns `true` if the next-page arrow is disabled.
    #[must_use]
    pub const fn right_disabled(&self, state: &PaginationState) -> bool {
        state.disabled || state.current_page >= self.page_count(state.total_count)
    }

    /// Renders the control, or `None` when everything fits on one page.
    #[must_use]
    pub fn render(&self, state: &PaginationState) -> Option<PageWindow> {
        let page_count = self.page_count(state.total_count);
        if page_count <= 1 {
            return None;
        }

        Some(PageWindow {
            page_count,
            entries: page_entries(page_count, state.current_page),
            left_disabled: self.left_disabled(state),
            right_disabled: self.right_disabled(state),
        })
    }

    /// Applies a navigation request.
    ///
    /// The target page is clamped to `1..=page_count`. On a change,
    /// `previous_page` becomes the page before navigating and the new page
    /// is returned. Returns `None`, leaving `state` untouched, when
    /// navigation is disabled or the page would not change.
    pub fn navigate(&self, state: &mut PaginationState, navigation: Navigation) -> Option<u64> {
        if state.disabled {
            return None;
        }

        let last = self.page_count(state.total_count).max(1);
        let target = match navigation {
            Navigation::Arrow(step) => state.current_page.saturating_add_signed(step),
            Navigation::Direct(page) => page,
        }
        .clamp(1, last);

        if target == state.current_page {
            return None;
        }

        state.previous_page = state.current_page;
        state.current_page = target;
        Some(target)
    }
}

/// The page window for `current` out of `page_count` pages.
#[must_use]
pub fn page_entries(page_count: u64, current: u64) -> Vec<PageEntry> {
    let page = |number: u64| PageEntry::Page {
        number,
        active: number == current,
    };

    let mut entries = vec![page(1)];
    if page_count <= 1 {
        return entries;
    }

    if current <= LEADING_RUN_MAX || page_count <= FULL_WINDOW_MAX {
        entries.extend((2..=LEADING_RUN_END.min(page_count - 1)).map(page));
        if page_count > FULL_WINDOW_MAX {
            entries.push(PageEntry::Ellipsis);
        }
    } else if current >= page_count - TRAILING_RUN_LEN {
        entries.push(PageEntry::Ellipsis);
        entries.extend((page_count - TRAILING_RUN_LEN..page_count).map(page));
    } else {
        entries.push(PageEntry::Ellipsis);
        entries.extend(
            (current - 1..=current + 1)
                .filter(|&n| n > 1 && n < page_count)
                .map(page),
        );
        entries.push(PageEntry::Ellipsis);
    }

    entries.push(page(page_count));
    entries
}
