//! Debounced product search
//!
//! Every call to [`SearchSession::set_query`] bumps a generation counter stored
//! inside the watched state and aborts the pending lookup. A lookup only writes
//! its results back if the generation it was spawned with is still current, and
//! the check happens under the channel's write lock, so an outdated query can
//! never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::aggregates::Coffee;
use crate::gateway::CatalogGateway;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Coffee>,
    pub is_searching: bool,
    generation: u64,
}

impl SearchState {
    /// The customer has typed something other than whitespace.
    pub fn is_active(&self) -> bool { !self.query.trim().is_empty() }
    pub fn generation(&self) -> u64 { self.generation }
}

pub struct SearchSession<C> {
    catalog: Arc<C>,
    debounce: Duration,
    state: Arc<watch::Sender<SearchState>>,
    pending: Option<JoinHandle<()>>,
}

impl<C: CatalogGateway + 'static> SearchSession<C> {
    pub fn new(catalog: Arc<C>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self { catalog, debounce, state: Arc::new(state), pending: None }
    }

    pub fn snapshot(&self) -> SearchState { self.state.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> { self.state.subscribe() }

    /// Trailing-edge debounce. A blank query clears results right away.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.cancel_pending();

        let term = query.trim().to_string();
        let blank = term.is_empty();
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.query = query;
            s.is_searching = !blank;
            if blank { s.results.clear(); }
        });
        if blank { return; }

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let results = match catalog.search_by_name(&term).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(error = %e, term = %term, "Error searching coffees");
                    Vec::new()
                }
            };
            let applied = state.send_if_modified(|s| {
                if s.generation != generation { return false; }
                s.results = results;
                s.is_searching = false;
                true
            });
            if !applied { debug!(generation, "discarding stale search results"); }
        }));
    }

    pub fn clear(&mut self) {
        self.cancel_pending();
        self.state.send_modify(|s| {
            s.generation += 1;
            s.query.clear();
            s.results.clear();
            s.is_searching = false;
        });
    }

    /// Resolves once no lookup is outstanding and returns the settled state.
    pub async fn settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|s| !s.is_searching).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() { handle.abort(); }
    }
}

impl<C> Drop for SearchSession<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() { handle.abort(); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::gateway::{GatewayError, InMemoryCatalog};

    /// Records every name lookup; optionally slow or failing.
    #[derive(Default)]
    struct Recording {
        inner: InMemoryCatalog,
        lookups: Mutex<Vec<String>>,
        latency: Duration,
        fail: bool,
    }

    impl Recording {
        fn seeded() -> Self { Self { inner: InMemoryCatalog::seed(), ..Self::default() } }
        fn lookups(&self) -> Vec<String> { self.lookups.lock().unwrap().clone() }
    }

    impl CatalogGateway for Recording {
        async fn fetch_all(&self) -> Result<Vec<Coffee>, GatewayError> { self.inner.fetch_all().await }
        async fn fetch_by_id(&self, id: i64) -> Result<Coffee, GatewayError> { self.inner.fetch_by_id(id).await }
        async fn fetch_by_tag(&self, tag: &str) -> Result<Vec<Coffee>, GatewayError> { self.inner.fetch_by_tag(tag).await }
        async fn fetch_top_rated(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> { self.inner.fetch_top_rated(limit).await }
        async fn fetch_most_purchased(&self, limit: usize) -> Result<Vec<Coffee>, GatewayError> { self.inner.fetch_most_purchased(limit).await }
        async fn search_by_name(&self, term: &str) -> Result<Vec<Coffee>, GatewayError> {
            self.lookups.lock().unwrap().push(term.to_string());
            tokio::time::sleep(self.latency).await;
            if self.fail { return Err(GatewayError::Unavailable("offline".into())); }
            self.inner.search_by_name(term).await
        }
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_collapse_into_one_lookup() {
        let catalog = Arc::new(Recording::seeded());
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);

        search.set_query("c");
        tokio::time::sleep(ms(100)).await;
        search.set_query("co");
        tokio::time::sleep(ms(100)).await;
        search.set_query("cof");
        assert!(search.snapshot().is_searching);

        tokio::time::sleep(ms(299)).await;
        assert!(catalog.lookups().is_empty());

        let state = search.settled().await;
        assert_eq!(catalog.lookups(), vec!["cof".to_string()]);
        assert_eq!(state.query, "cof");
        assert!(!state.is_searching);
        assert!(state.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_for_trimmed_query() {
        let catalog = Arc::new(Recording::seeded());
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);
        search.set_query("  latte ");
        let state = search.settled().await;
        assert_eq!(catalog.lookups(), vec!["latte".to_string()]);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Iced Latte");
        assert!(state.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_immediately() {
        let catalog = Arc::new(Recording::seeded());
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);
        search.set_query("mocha");
        assert_eq!(search.settled().await.results.len(), 1);

        search.set_query("ca");
        search.set_query("   ");
        let state = search.snapshot();
        assert!(state.results.is_empty());
        assert!(!state.is_searching);
        assert!(!state.is_active());

        tokio::time::sleep(ms(1_000)).await;
        assert_eq!(catalog.lookups(), vec!["mocha".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_never_overwrites_newer_query() {
        let catalog = Arc::new(Recording { latency: ms(500), ..Recording::seeded() });
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);

        search.set_query("brew");
        tokio::time::sleep(ms(400)).await;
        assert_eq!(catalog.lookups(), vec!["brew".to_string()]);

        search.set_query("white");
        let state = search.settled().await;
        assert_eq!(state.query, "white");
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].name, "Flat White");

        tokio::time::sleep(ms(1_000)).await;
        assert_eq!(search.snapshot().results[0].name, "Flat White");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_error_yields_empty_results() {
        let catalog = Arc::new(Recording { fail: true, ..Recording::seeded() });
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);
        search.set_query("mocha");
        let state = search.settled().await;
        assert!(state.results.is_empty());
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_lookup() {
        let catalog = Arc::new(Recording::seeded());
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);
        search.set_query("espresso");
        drop(search);
        tokio::time::sleep(ms(1_000)).await;
        assert!(catalog.lookups().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_state() {
        let catalog = Arc::new(Recording::seeded());
        let mut search = SearchSession::new(Arc::clone(&catalog), DEFAULT_DEBOUNCE);
        search.set_query("cold");
        search.settled().await;
        search.clear();
        let state = search.snapshot();
        assert_eq!(state, SearchState { generation: state.generation(), ..SearchState::default() });
    }
}
