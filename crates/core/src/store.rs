//! Catalog state container with derived search and pagination views.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{error, info};

use crate::models::{Game, ListParams};

/// Number of games shown per catalog page.
pub const PAGE_SIZE: usize = 12;

/// The seam between the state container and whatever supplies game
/// records.
///
/// The production implementation ([`CatalogClient`](crate::client::CatalogClient))
/// never returns an error: every failure degrades to the offline dataset
/// inside the client. The fallible signatures exist for sources that
/// cannot make that guarantee; their errors surface through
/// [`CatalogStore::error_message`].
pub trait CatalogSource: Send + Sync {
    /// Full catalog listing.
    fn list_games(&self, params: ListParams) -> impl Future<Output = Result<Vec<Game>>> + Send;

    /// Fixed-size subset designated for prominent display.
    fn list_featured_games(&self) -> impl Future<Output = Result<Vec<Game>>> + Send;

    /// Single game lookup by catalog id.
    fn game_by_id(&self, id: i64) -> impl Future<Output = Result<Option<Game>>> + Send;
}

#[derive(Debug)]
struct StoreState {
    all_games: Vec<Game>,
    featured_games: Vec<Game>,
    current_game: Option<Game>,
    is_loading: bool,
    error_message: Option<String>,
    search_query: String,
    current_page: usize,
    total_pages: usize,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            all_games: Vec::new(),
            featured_games: Vec::new(),
            current_game: None,
            is_loading: false,
            error_message: None,
            search_query: String::new(),
            current_page: 1,
            total_pages: 0,
        }
    }
}

struct Inner<S> {
    source: S,
    state: RwLock<StoreState>,
}

/// Session-scoped catalog state shared between the frontend and the
/// fetch operations.
///
/// Cloning yields another handle onto the same state. The lock is never
/// held across an await, so overlapping fetches interleave with
/// last-write-wins semantics on the shared fields rather than data
/// races; there is no coordination between overlapping calls and no
/// cancellation of in-flight ones.
pub struct CatalogStore<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for CatalogStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CatalogSource> CatalogStore<S> {
    /// Create a store backed by the given source.
    pub fn new(source: S) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: RwLock::new(StoreState::default()),
            }),
        }
    }

    /// Every fetched game, in response order.
    pub fn all_games(&self) -> Vec<Game> {
        self.inner.state.read().all_games.clone()
    }

    /// Games designated for prominent display, independent of the main
    /// catalog list.
    pub fn featured_games(&self) -> Vec<Game> {
        self.inner.state.read().featured_games.clone()
    }

    /// The game being viewed in detail, if any.
    pub fn current_game(&self) -> Option<Game> {
        self.inner.state.read().current_game.clone()
    }

    /// Whether a catalog or detail fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.state.read().is_loading
    }

    /// Failure message from the most recent fetch, if it failed.
    pub fn error_message(&self) -> Option<String> {
        self.inner.state.read().error_message.clone()
    }

    /// The active search text.
    pub fn search_query(&self) -> String {
        self.inner.state.read().search_query.clone()
    }

    /// The current 1-based page index.
    pub fn current_page(&self) -> usize {
        self.inner.state.read().current_page
    }

    /// Page count derived from the unfiltered catalog size (see
    /// [`Self::paged_games`] for the filter interaction).
    pub fn total_pages(&self) -> usize {
        self.inner.state.read().total_pages
    }

    /// Games matching the active search query: the whole catalog when the
    /// query is empty, otherwise a case-insensitive substring match on
    /// the name.
    pub fn filtered_games(&self) -> Vec<Game> {
        let state = self.inner.state.read();
        filter_by_name(&state.all_games, &state.search_query)
    }

    /// The current page slice of the filtered games: up to [`PAGE_SIZE`]
    /// entries starting at `(current_page - 1) * PAGE_SIZE`, empty for
    /// out-of-range pages.
    ///
    /// Note that [`Self::total_pages`] is computed from the unfiltered
    /// catalog, so an active search changes this slice without changing
    /// the reported page count. Kept for compatibility with the page
    /// controls this store was built against.
    pub fn paged_games(&self) -> Vec<Game> {
        let state = self.inner.state.read();
        let filtered = filter_by_name(&state.all_games, &state.search_query);
        page_slice(&filtered, state.current_page)
    }

    /// Fetch the full catalog and replace the cached list, recomputing
    /// the page count. A failure is recorded as a plain message for the
    /// frontend; the loading flag is released on every exit path.
    pub async fn load_games(&self, params: ListParams) {
        {
            let mut state = self.inner.state.write();
            state.is_loading = true;
            state.error_message = None;
        }

        let result = self.inner.source.list_games(params).await;

        let mut state = self.inner.state.write();
        match result {
            Ok(games) => {
                state.total_pages = total_pages_for(games.len());
                info!(total = games.len(), "catalog loaded");
                state.all_games = games;
            }
            Err(err) => {
                error!(%err, "catalog load failed");
                state.error_message = Some(err.to_string());
            }
        }
        state.is_loading = false;
    }

    /// Fetch the featured subset. A failure leaves prior state untouched
    /// and is only logged; the loading flag is not involved.
    pub async fn load_featured_games(&self) {
        match self.inner.source.list_featured_games().await {
            Ok(games) => {
                info!(total = games.len(), "featured games loaded");
                self.inner.state.write().featured_games = games;
            }
            Err(err) => error!(%err, "featured games load failed"),
        }
    }

    /// Fetch a single game into the detail slot, with the same
    /// loading/error lifecycle as [`Self::load_games`]. A `None` result
    /// clears the slot.
    pub async fn load_game_by_id(&self, id: i64) {
        {
            let mut state = self.inner.state.write();
            state.is_loading = true;
            state.error_message = None;
        }

        let result = self.inner.source.game_by_id(id).await;

        let mut state = self.inner.state.write();
        match result {
            Ok(game) => state.current_game = game,
            Err(err) => {
                error!(%err, game_id = id, "game load failed");
                state.error_message = Some(err.to_string());
            }
        }
        state.is_loading = false;
    }

    /// Set the active search text. A new search always starts at page 1.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let mut state = self.inner.state.write();
        state.search_query = query.into();
        state.current_page = 1;
    }

    /// Jump to the given 1-based page. No bounds check against
    /// [`Self::total_pages`]; the caller decides what is navigable.
    pub fn set_page(&self, page: usize) {
        self.inner.state.write().current_page = page;
    }

    /// Empty the detail slot.
    pub fn clear_current_game(&self) {
        self.inner.state.write().current_game = None;
    }
}

fn filter_by_name(games: &[Game], query: &str) -> Vec<Game> {
    if query.is_empty() {
        return games.to_vec();
    }
    let needle = query.to_lowercase();
    games
        .iter()
        .filter(|game| game.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

fn page_slice(games: &[Game], page: usize) -> Vec<Game> {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    games.iter().skip(start).take(PAGE_SIZE).cloned().collect()
}

fn total_pages_for(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::{collections::VecDeque, time::Duration};

    fn sample_games(count: usize) -> Vec<Game> {
        (0..count)
            .map(|idx| {
                Game::from_raw(json!({
                    "id": idx as i64 + 1,
                    "name": format!("Sample Game {:02}", idx + 1),
                    "slug": format!("sample-game-{:02}", idx + 1),
                }))
            })
            .collect()
    }

    /// Source answering each operation from a queue of scripted results.
    /// An exhausted queue errors, which keeps accidental extra calls
    /// visible in assertions.
    #[derive(Default)]
    struct ScriptedSource {
        listings: Mutex<VecDeque<Result<Vec<Game>>>>,
        featured: Mutex<VecDeque<Result<Vec<Game>>>>,
        lookups: Mutex<VecDeque<Result<Option<Game>>>>,
    }

    impl ScriptedSource {
        fn with_listings(results: Vec<Result<Vec<Game>>>) -> Self {
            Self {
                listings: Mutex::new(results.into()),
                ..Self::default()
            }
        }
    }

    impl CatalogSource for ScriptedSource {
        async fn list_games(&self, _params: ListParams) -> Result<Vec<Game>> {
            self.listings
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted listing left")))
        }

        async fn list_featured_games(&self) -> Result<Vec<Game>> {
            self.featured
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted featured listing left")))
        }

        async fn game_by_id(&self, _id: i64) -> Result<Option<Game>> {
            self.lookups
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted lookup left")))
        }
    }

    /// Source whose listing call sleeps for `page_size` milliseconds and
    /// returns `index` games, so tests can order overlapping calls.
    struct DelayedSource;

    impl CatalogSource for DelayedSource {
        async fn list_games(&self, params: ListParams) -> Result<Vec<Game>> {
            let delay = u64::from(params.page_size.unwrap_or(0));
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(sample_games(params.index.unwrap_or(0) as usize))
        }

        async fn list_featured_games(&self) -> Result<Vec<Game>> {
            Ok(Vec::new())
        }

        async fn game_by_id(&self, _id: i64) -> Result<Option<Game>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn load_replaces_catalog_and_recomputes_pages() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));

        store.load_games(ListParams::default()).await;

        assert_eq!(store.all_games().len(), 25);
        assert_eq!(store.total_pages(), 3);
        assert!(!store.is_loading());
        assert!(store.error_message().is_none());
    }

    #[tokio::test]
    async fn failed_load_records_error_and_keeps_prior_catalog() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![
            Ok(sample_games(5)),
            Err(anyhow!("source exploded")),
        ]));

        store.load_games(ListParams::default()).await;
        store.load_games(ListParams::default()).await;

        assert_eq!(store.all_games().len(), 5);
        assert_eq!(store.error_message().as_deref(), Some("source exploded"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn successful_load_clears_previous_error() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![
            Err(anyhow!("first try failed")),
            Ok(sample_games(1)),
        ]));

        store.load_games(ListParams::default()).await;
        assert!(store.error_message().is_some());

        store.load_games(ListParams::default()).await;
        assert!(store.error_message().is_none());
    }

    #[tokio::test]
    async fn featured_failure_leaves_prior_state_untouched() {
        let source = ScriptedSource {
            featured: Mutex::new(
                vec![Ok(sample_games(6)), Err(anyhow!("featured down"))].into(),
            ),
            ..ScriptedSource::default()
        };
        let store = CatalogStore::new(source);

        store.load_featured_games().await;
        assert_eq!(store.featured_games().len(), 6);

        store.load_featured_games().await;
        assert_eq!(store.featured_games().len(), 6);
        assert!(store.error_message().is_none());
    }

    #[tokio::test]
    async fn search_query_resets_to_first_page() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(30))]));
        store.load_games(ListParams::default()).await;

        store.set_page(3);
        assert_eq!(store.current_page(), 3);

        store.set_search_query("x");
        assert_eq!(store.current_page(), 1);
    }

    #[tokio::test]
    async fn page_slice_length_follows_the_window() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));
        store.load_games(ListParams::default()).await;

        store.set_page(1);
        assert_eq!(store.paged_games().len(), 12);
        store.set_page(2);
        assert_eq!(store.paged_games().len(), 12);
        store.set_page(3);
        assert_eq!(store.paged_games().len(), 1);

        // Out-of-range pages yield an empty slice, not an error.
        store.set_page(4);
        assert!(store.paged_games().is_empty());
        store.set_page(100);
        assert!(store.paged_games().is_empty());
    }

    #[tokio::test]
    async fn page_slices_do_not_overlap() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));
        store.load_games(ListParams::default()).await;

        store.set_page(1);
        let first = store.paged_games();
        store.set_page(2);
        let second = store.paged_games();

        assert_eq!(first[0].id, 1);
        assert_eq!(second[0].id, 13);
    }

    #[tokio::test]
    async fn total_pages_ignores_the_active_filter() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));
        store.load_games(ListParams::default()).await;
        assert_eq!(store.total_pages(), 3);

        store.set_search_query("Sample Game 01");
        assert_eq!(store.filtered_games().len(), 1);
        // The page count still reflects the unfiltered catalog.
        assert_eq!(store.total_pages(), 3);
    }

    #[tokio::test]
    async fn zero_match_query_empties_the_views_only() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));
        store.load_games(ListParams::default()).await;

        store.set_search_query("no such game");
        assert!(store.filtered_games().is_empty());
        assert!(store.paged_games().is_empty());
        assert_eq!(store.total_pages(), 3);
    }

    #[tokio::test]
    async fn filter_matches_names_case_insensitively() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(15))]));
        store.load_games(ListParams::default()).await;

        store.set_search_query("sample game 0");
        assert_eq!(store.filtered_games().len(), 9);

        store.set_search_query("SAMPLE GAME 15");
        assert_eq!(store.filtered_games().len(), 1);
    }

    #[tokio::test]
    async fn empty_query_returns_the_whole_catalog() {
        let store = CatalogStore::new(ScriptedSource::with_listings(vec![Ok(sample_games(25))]));
        store.load_games(ListParams::default()).await;

        store.set_search_query("");
        assert_eq!(store.filtered_games().len(), 25);
    }

    #[tokio::test]
    async fn overlapping_loads_resolve_last_write_wins() {
        let store = CatalogStore::new(DelayedSource);

        // The slow call (200ms, 10 games) starts first; the fast call
        // (50ms, 25 games) starts second and resolves first.
        let slow = store.load_games(ListParams {
            index: Some(10),
            page_size: Some(200),
        });
        let fast = store.load_games(ListParams {
            index: Some(25),
            page_size: Some(50),
        });
        tokio::join!(slow, fast);

        assert_eq!(store.all_games().len(), 10);
        assert_eq!(store.total_pages(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn detail_lookup_follows_the_load_lifecycle() {
        let game = sample_games(1).remove(0);
        let source = ScriptedSource {
            lookups: Mutex::new(
                vec![
                    Ok(Some(game.clone())),
                    Ok(None),
                    Err(anyhow!("lookup failed")),
                ]
                .into(),
            ),
            ..ScriptedSource::default()
        };
        let store = CatalogStore::new(source);

        store.load_game_by_id(game.id).await;
        assert_eq!(store.current_game().map(|g| g.id), Some(game.id));
        assert!(!store.is_loading());

        store.load_game_by_id(999).await;
        assert!(store.current_game().is_none());
        assert!(store.error_message().is_none());

        store.load_game_by_id(game.id).await;
        assert_eq!(store.error_message().as_deref(), Some("lookup failed"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn clearing_the_detail_slot_empties_it() {
        let game = sample_games(1).remove(0);
        let source = ScriptedSource {
            lookups: Mutex::new(vec![Ok(Some(game.clone()))].into()),
            ..ScriptedSource::default()
        };
        let store = CatalogStore::new(source);

        store.load_game_by_id(game.id).await;
        assert!(store.current_game().is_some());

        store.clear_current_game();
        assert!(store.current_game().is_none());
    }
}
