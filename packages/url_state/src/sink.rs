//! Destination for URL rewrites.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives rewritten page locations.
///
/// Writes always replace the current history entry; panning and zooming
/// must never grow the back/forward stack.
pub trait UrlSink: Send + Sync {
    /// Replaces the current location with `location` (path plus query).
    fn replace(&self, location: &str);
}

/// A [`UrlSink`] backed by an in-memory history stack.
///
/// Starts with a single entry. [`UrlSink::replace`] overwrites the top
/// entry, so [`MemoryUrlSink::history_len`] only changes through
/// [`MemoryUrlSink::push`].
#[derive(Debug)]
pub struct MemoryUrlSink {
    entries: Mutex<Vec<String>>,
    writes: AtomicU64,
}

impl MemoryUrlSink {
    /// Creates a history whose only entry is `initial`.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
            writes: AtomicU64::new(0),
        }
    }

    /// The current location.
    ///
    /// # Panics
    ///
    /// Panics if the history mutex is poisoned.
    #[must_use]
    pub fn current(&self) -> String {
        self.entries
            .lock()
            .expect("URL history mutex poisoned")
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Number of history entries.
    ///
    /// # Panics
    ///
    /// Panics if the history mutex is poisoned.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.entries.lock().expect("URL history mutex poisoned").len()
    }

    /// Number of replace writes received.
    #[must_use]
    pub fn replace_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Adds a new history entry, as a link click would.
    ///
    /// # Panics
    ///
    /// Panics if the history mutex is poisoned.
    pub fn push(&self, location: impl Into<String>) {
        self.entries
            .lock()
            .expect("URL history mutex poisoned")
            .push(location.into());
    }
}

impl Default for MemoryUrlSink {
    fn default() -> Self {
        Self::new("/")
    }
}

impl UrlSink for MemoryUrlSink {
    fn replace(&self, location: &str) {
        log::debug!("Replacing location with {location}");
        {
            let mut entries = self.entries.lock().expect("URL history mutex poisoned");
            match entries.last_mut() {
                Some(top) => location.clone_into(top),
                None => entries.push(location.to_string()),
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}
