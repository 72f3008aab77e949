//! Debounced bounds fetching and URL rewriting.
//!
//! Every notification restarts a quiet-period timer. When a timer fires,
//! the query it starts runs in its own task and is never cancelled;
//! instead each query carries a sequence number and only the response to
//! the most recently issued query is applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use poi_map_content::{BoundsQueryService, ContentError};
use poi_map_pagination::{Navigation, PageWindow, PaginationEngine, PaginationState};
use poi_map_poi_models::{GeoBounds, Item, Page};
use poi_map_url_state::{UrlSink, location};
use poi_map_viewport::{BrowseConfig, ViewportProvider, url_state_of};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{BrowseSnapshot, SyncError};

/// Quiet period before a bounds or page change is fetched.
pub const FETCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Quiet period before the URL is rewritten.
pub const URL_DEBOUNCE: Duration = Duration::from_millis(500);

/// Quiet periods used by a [`FetchController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    /// Delay between the last bounds or page change and the query.
    pub fetch: Duration,
    /// Delay between the last bounds change and the URL rewrite.
    pub url: Duration,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            fetch: FETCH_DEBOUNCE,
            url: URL_DEBOUNCE,
        }
    }
}

struct Timer {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct State {
    fetch_timer: Option<Timer>,
    url_timer: Option<Timer>,
    last_timer_id: u64,
    bounds: Option<GeoBounds>,
    offset: u64,
    refresh_markers: bool,
    region_changed: bool,
    items: Vec<Item>,
    markers: Vec<Item>,
    pagination: PaginationState,
    loading: bool,
    applied_seq: u64,
    disposed: bool,
}

impl State {
    const fn next_timer_id(&mut self) -> u64 {
        self.last_timer_id += 1;
        self.last_timer_id
    }

    fn snapshot(&self) -> BrowseSnapshot {
        BrowseSnapshot {
            items: self.items.clone(),
            total_count: self.pagination.total_count,
            markers: self.markers.clone(),
            pagination: self.pagination,
            loading: self.loading,
        }
    }
}

fn is_timer(timer: Option<&Timer>, id: u64) -> bool {
    timer.is_some_and(|timer| timer.id == id)
}

/// A query issued when the fetch timer fired.
#[derive(Debug, Clone, Copy)]
struct FetchRequest {
    seq: u64,
    bounds: GeoBounds,
    offset: u64,
    append: bool,
    include_markers: bool,
}

struct Inner {
    service: Arc<dyn BoundsQueryService>,
    viewport: Arc<dyn ViewportProvider>,
    sink: Arc<dyn UrlSink>,
    path: String,
    config: BrowseConfig,
    engine: PaginationEngine,
    debounce: Debounce,
    state: Mutex<State>,
    issued: AtomicU64,
    snapshot_tx: watch::Sender<BrowseSnapshot>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("Fetch controller state mutex poisoned")
    }

    fn publish(&self, state: &State) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    fn spawn_timer(self: &Arc<Self>, delay: Duration, id: u64, fire: fn(&Arc<Self>, u64)) -> Timer {
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                fire(&inner, id);
            }
        });
        Timer { id, handle }
    }

    fn schedule_fetch(self: &Arc<Self>, state: &mut State) {
        let id = state.next_timer_id();
        let timer = self.spawn_timer(self.debounce.fetch, id, Self::fire_fetch);
        if let Some(previous) = state.fetch_timer.replace(timer) {
            previous.handle.abort();
        }
    }

    fn schedule_url(self: &Arc<Self>, state: &mut State) {
        let id = state.next_timer_id();
        let timer = self.spawn_timer(self.debounce.url, id, Self::fire_url);
        if let Some(previous) = state.url_timer.replace(timer) {
            previous.handle.abort();
        }
    }

    fn change_page(self: &Arc<Self>, state: &mut State, index: u64) {
        if state.disposed {
            log::debug!("Ignoring page change after dispose");
            return;
        }
        if state.bounds.is_none() {
            log::debug!("Ignoring page change before the map reported bounds");
            return;
        }

        let page = index + 1;
        if state.pagination.current_page != page {
            state.pagination.previous_page = state.pagination.current_page;
            state.pagination.current_page = page;
        }
        state.offset = self.engine.offset(index);
        state.pagination.disabled = true;
        state.loading = true;

        log::debug!("Scheduling page {page} at offset {}", state.offset);
        self.schedule_fetch(state);
        self.publish(state);
    }

    fn fire_fetch(self: &Arc<Self>, id: u64) {
        let request = {
            let mut state = self.lock();
            if state.disposed || !is_timer(state.fetch_timer.as_ref(), id) {
                return;
            }
            state.fetch_timer = None;

            let Some(bounds) = state.bounds else {
                state.loading = false;
                state.pagination.disabled = false;
                self.publish(&state);
                return;
            };

            // Items from a previous region are never extended.
            let region_changed = std::mem::take(&mut state.region_changed);
            let append = state.offset > 0
                && self.config.append_on_paginate
                && !region_changed
                && !state.items.is_empty()
                && state.pagination.stepped_forward();

            FetchRequest {
                seq: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
                bounds,
                offset: state.offset,
                append,
                include_markers: std::mem::take(&mut state.refresh_markers),
            }
        };

        log::debug!(
            "Issuing query #{} at offset {} (append={}, markers={})",
            request.seq,
            request.offset,
            request.append,
            request.include_markers,
        );
        tokio::spawn(Arc::clone(self).run(request));
    }

    async fn run(self: Arc<Self>, request: FetchRequest) {
        let page = self
            .service
            .fetch_page(&request.bounds, request.offset, self.engine.page_size());

        let (page, markers) = if request.include_markers {
            let (page, markers) = tokio::join!(page, self.service.fetch_all(&request.bounds));
            (page, Some(markers))
        } else {
            (page.await, None)
        };

        self.apply(&request, page, markers);
    }

    fn apply(
        &self,
        request: &FetchRequest,
        page: Result<Page, ContentError>,
        markers: Option<Result<Vec<Item>, ContentError>>,
    ) {
        let mut state = self.lock();
        if state.disposed {
            return;
        }

        let latest = self.issued.load(Ordering::SeqCst);
        if request.seq != latest || request.seq <= state.applied_seq {
            log::debug!(
                "Discarding stale response #{} (latest #{latest})",
                request.seq
            );
            return;
        }
        state.applied_seq = request.seq;

        match page {
            Ok(page) => {
                log::info!(
                    "Fetched {} of {} items at offset {}",
                    page.items.len(),
                    page.total_count,
                    request.offset,
                );
                if request.append {
                    state.items.extend(page.items);
                } else {
                    state.items = page.items;
                }
                state.pagination.total_count = page.total_count;
            }
            Err(e) => {
                log::warn!("Bounds query at offset {} failed: {e}", request.offset);
            }
        }

        match markers {
            Some(Ok(markers)) => {
                log::debug!("Loaded {} markers", markers.len());
                state.markers = markers;
            }
            Some(Err(e)) => log::warn!("Marker query failed: {e}"),
            None => {}
        }

        let pending = state.fetch_timer.is_some();
        state.loading = pending;
        if !pending {
            state.pagination.disabled = false;
        }
        self.publish(&state);
    }

    fn fire_url(self: &Arc<Self>, id: u64) {
        {
            let mut state = self.lock();
            if state.disposed || !is_timer(state.url_timer.as_ref(), id) {
                return;
            }
            state.url_timer = None;
        }

        let url_state = url_state_of(self.viewport.as_ref(), self.config.persist_bounds);
        let location = location(&self.path, &url_state);
        log::debug!("Replacing URL with {location}");
        self.sink.replace(&location);
    }
}

/// Debounced fetch and URL controller for the browse page.
///
/// Cloning yields another handle to the same controller.
///
/// All notification methods spawn timers and must be called from within
/// a Tokio runtime. They panic if the internal state mutex is poisoned.
#[derive(Clone)]
pub struct FetchController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FetchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchController")
            .field("path", &self.inner.path)
            .field("config", &self.inner.config)
            .field("debounce", &self.inner.debounce)
            .finish_non_exhaustive()
    }
}

impl FetchController {
    /// Creates a controller with the default quiet periods.
    #[must_use]
    pub fn new(
        service: Arc<dyn BoundsQueryService>,
        viewport: Arc<dyn ViewportProvider>,
        sink: Arc<dyn UrlSink>,
        path: impl Into<String>,
        config: BrowseConfig,
    ) -> Self {
        Self::with_debounce(service, viewport, sink, path, config, Debounce::default())
    }

    /// Creates a controller with custom quiet periods.
    #[must_use]
    pub fn with_debounce(
        service: Arc<dyn BoundsQueryService>,
        viewport: Arc<dyn ViewportProvider>,
        sink: Arc<dyn UrlSink>,
        path: impl Into<String>,
        config: BrowseConfig,
        debounce: Debounce,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(BrowseSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                service,
                viewport,
                sink,
                path: path.into(),
                config,
                engine: PaginationEngine::new(config.page_size),
                debounce,
                state: Mutex::new(State::default()),
                issued: AtomicU64::new(0),
                snapshot_tx,
            }),
        }
    }

    /// The configuration this controller was built with.
    #[must_use]
    pub fn config(&self) -> BrowseConfig {
        self.inner.config
    }

    /// Handles a settled viewport change.
    ///
    /// Reads the map's current bounds, resets pagination to the first
    /// page, disables it until the new region's results land and restarts
    /// both the fetch and URL timers. Bounds are not read until the map
    /// has laid itself out; before that only the URL timer restarts.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if the state mutex is
    /// poisoned.
    pub fn notify_bounds_changed(&self) {
        let bounds = self.inner.viewport.bounds();
        let mut state = self.inner.lock();
        if state.disposed {
            log::debug!("Ignoring bounds change after dispose");
            return;
        }

        self.inner.schedule_url(&mut state);

        let Some(bounds) = bounds else {
            log::debug!("Map has no bounds yet, skipping fetch");
            return;
        };

        log::debug!("Bounds changed to {bounds:?}");
        state.bounds = Some(bounds);
        state.offset = 0;
        state.refresh_markers = self.inner.config.load_markers;
        state.region_changed = true;
        state.pagination = PaginationState {
            disabled: true,
            ..PaginationState::new(state.pagination.total_count)
        };
        state.loading = true;

        self.inner.schedule_fetch(&mut state);
        self.inner.publish(&state);
    }

    /// Handles a page selection by 0-based `index`.
    ///
    /// Disables pagination until the page arrives. Ignored before the map
    /// has reported bounds and after [`FetchController::dispose`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidArgument`] if `index` is negative or
    /// its result offset does not fit in a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if the state mutex is
    /// poisoned.
    pub fn notify_page_changed(&self, index: i64) -> Result<(), SyncError> {
        let index = u64::try_from(index).map_err(|_| {
            SyncError::InvalidArgument(format!("page index must not be negative, got {index}"))
        })?;
        let page_size = self.inner.engine.page_size();
        if index.checked_mul(page_size).is_none() {
            return Err(SyncError::InvalidArgument(format!(
                "page index {index} is out of range for page size {page_size}"
            )));
        }

        let mut state = self.inner.lock();
        self.inner.change_page(&mut state, index);
        Ok(())
    }

    /// Applies a pagination control action.
    ///
    /// Returns the new 1-based page, or `None` if nothing changed because
    /// pagination is disabled, the page is already showing, or the
    /// controller was disposed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if the state mutex is
    /// poisoned.
    pub fn navigate(&self, navigation: Navigation) -> Option<u64> {
        let mut state = self.inner.lock();
        if state.disposed {
            return None;
        }

        let page = self.inner.engine.navigate(&mut state.pagination, navigation)?;
        log::debug!("Navigated to page {page} via {navigation}");
        self.inner.change_page(&mut state, page - 1);
        Some(page)
    }

    /// Loads the next page, appending it in append mode.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if the state mutex is
    /// poisoned.
    pub fn load_more(&self) -> Option<u64> {
        self.navigate(Navigation::Arrow(1))
    }

    /// Cancels pending timers. Later notifications and in-flight
    /// responses are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the state mutex is poisoned.
    pub fn dispose(&self) {
        let mut state = self.inner.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;

        for timer in [state.fetch_timer.take(), state.url_timer.take()]
            .into_iter()
            .flatten()
        {
            timer.handle.abort();
        }

        state.loading = false;
        state.pagination.disabled = false;
        self.inner.publish(&state);
        log::debug!("Fetch controller for {} disposed", self.inner.path);
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BrowseSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// A receiver notified on every snapshot change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BrowseSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The pagination control for the current snapshot, or `None` when
    /// everything fits on one page.
    #[must_use]
    pub fn page_window(&self) -> Option<PageWindow> {
        self.inner.engine.render(&self.snapshot().pagination)
    }
}
