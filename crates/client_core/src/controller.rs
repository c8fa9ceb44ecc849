//! Search session controller: owns the query state, decides when to fetch,
//! and publishes only the newest response.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{
    domain::{CategoryTag, Stat},
    protocol::ResultPage,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    debounce::{Debouncer, DEFAULT_QUIET_INTERVAL},
    pagination::{total_pages, PaginationView, DEFAULT_WINDOW_SIZE},
    query::{build_request, QueryState, SearchParams, SortKey, DEFAULT_PAGE_SIZE},
    CatalogSearch,
};

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub page_size: u32,
    pub quiet_interval: Duration,
    pub window_size: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            quiet_interval: DEFAULT_QUIET_INTERVAL,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Everything a view needs to render one applied response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub token: u64,
    pub state: QueryState,
    pub page: ResultPage,
    pub total_pages: u32,
    pub pagination: Option<PaginationView>,
    /// Set when the request failed and `page` is the empty fallback.
    pub failure: Option<String>,
}

impl SearchSnapshot {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum SearchEvent {
    RequestIssued { token: u64 },
    ResultsApplied(SearchSnapshot),
}

#[derive(Default)]
struct Tracker {
    /// Bumped on every state change; a debounced fetch only fires if nothing
    /// changed since it was scheduled.
    revision: u64,
    /// Token of the most recently issued request.
    latest_token: u64,
    applied: Option<SearchSnapshot>,
}

struct Shared {
    catalog: Arc<dyn CatalogSearch>,
    tracker: Mutex<Tracker>,
    events: broadcast::Sender<SearchEvent>,
    window_size: u32,
}

impl Shared {
    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self, tracker: &mut Tracker) -> u64 {
        tracker.latest_token += 1;
        let token = tracker.latest_token;
        let _ = self.events.send(SearchEvent::RequestIssued { token });
        token
    }

    async fn fetch(&self, token: u64, state: QueryState, params: SearchParams) {
        let (page, failure) = match self.catalog.search(&params).await {
            Ok(page) => (page, None),
            Err(err) => {
                warn!(token, error = %err, "catalog search failed; showing empty result");
                (ResultPage::empty(), Some(err.to_string()))
            }
        };

        let pages = total_pages(page.total_count, state.page_size());
        let snapshot = SearchSnapshot {
            token,
            pagination: PaginationView::build(state.page(), pages, self.window_size),
            total_pages: pages,
            state,
            page,
            failure,
        };

        let mut tracker = self.tracker();
        if tracker.latest_token != token {
            debug!(
                token,
                latest = tracker.latest_token,
                "discarding stale search response"
            );
            return;
        }
        tracker.applied = Some(snapshot.clone());
        let _ = self.events.send(SearchEvent::ResultsApplied(snapshot));
    }
}

/// Drives one search session.
///
/// Mutators never block and never fail: discrete actions fetch right away,
/// text and stat entry are debounced. Every request gets an increasing
/// token and only the response for the latest token is applied. Must be
/// used from within a Tokio runtime.
pub struct SearchController {
    state: QueryState,
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn CatalogSearch>, options: SearchOptions) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: QueryState::new(options.page_size),
            shared: Arc::new(Shared {
                catalog,
                tracker: Mutex::new(Tracker::default()),
                events,
                window_size: options.window_size,
            }),
            debouncer: Debouncer::new(options.quiet_interval),
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SearchEvent> {
        self.shared.events.subscribe()
    }

    /// Last applied response, if any.
    pub fn snapshot(&self) -> Option<SearchSnapshot> {
        self.shared.tracker().applied.clone()
    }

    pub fn latest_token(&self) -> u64 {
        self.shared.tracker().latest_token
    }

    /// Page count from the last applied response, as long as that response
    /// was for the current filters and sort. Any later filter change makes
    /// the count unknown until its own response lands.
    pub fn known_total_pages(&self) -> Option<u32> {
        self.shared
            .tracker()
            .applied
            .as_ref()
            .filter(|snapshot| snapshot.state.same_query(&self.state))
            .map(|snapshot| snapshot.total_pages)
    }

    /// Fetches the current state immediately, e.g. when the session opens.
    pub fn refresh(&mut self) -> u64 {
        self.fetch_now()
    }

    pub fn set_text_query(&mut self, text: &str) {
        self.state.set_text_query(text);
        self.fetch_debounced();
    }

    pub fn toggle_type_filter(&mut self, tag: CategoryTag) -> u64 {
        self.state.toggle_type_filter(tag);
        self.fetch_now()
    }

    pub fn clear_type_filters(&mut self) -> u64 {
        self.state.clear_type_filters();
        self.fetch_now()
    }

    pub fn set_minimum_stat(&mut self, stat: Stat, input: &str) {
        self.state.set_minimum_stat(stat, input);
        self.fetch_debounced();
    }

    pub fn set_exclude_restricted(&mut self, flag: bool) -> u64 {
        self.state.set_exclude_restricted(flag);
        self.fetch_now()
    }

    pub fn set_sort(&mut self, key: SortKey) -> u64 {
        self.state.set_sort(key);
        self.fetch_now()
    }

    pub fn set_page(&mut self, n: u32) -> u64 {
        let known = self.known_total_pages();
        self.state.set_page(n, known);
        self.fetch_now()
    }

    pub fn reset(&mut self) -> u64 {
        self.state.reset();
        self.fetch_now()
    }

    /// Issues a request for the current state right away. Any pending
    /// debounced fetch is dropped since this request already covers it.
    fn fetch_now(&mut self) -> u64 {
        self.debouncer.cancel();
        let params = build_request(&self.state);
        let state = self.state.clone();
        let token = {
            let mut tracker = self.shared.tracker();
            tracker.revision += 1;
            self.shared.issue(&mut tracker)
        };
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.fetch(token, state, params).await;
        });
        token
    }

    fn fetch_debounced(&mut self) {
        let params = build_request(&self.state);
        let state = self.state.clone();
        let scheduled_revision = {
            let mut tracker = self.shared.tracker();
            tracker.revision += 1;
            tracker.revision
        };
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(async move {
            let token = {
                let mut tracker = shared.tracker();
                if tracker.revision != scheduled_revision {
                    return;
                }
                shared.issue(&mut tracker)
            };
            // Issued requests live outside the debouncer; rescheduling only
            // cancels the timer.
            tokio::spawn(async move {
                shared.fetch(token, state, params).await;
            });
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
