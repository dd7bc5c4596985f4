//! Incremental, cached product listing.
//!
//! [`ProductFetcher`] drives the page sequence for one `(category, sort)`
//! key at a time. The first request asks for `initial_page_size` items;
//! every later request asks for `page_size`, with indices computed by
//! [`PagingConfig::next_page`]. Results accumulate in request order.
//!
//! Errors never escape the fetcher: they are recorded in the state and the
//! caller observes them through [`ProductFetcher::snapshot`].
//!
//! All methods take `&self`. State sits behind a mutex that is only held
//! between suspension points, so concurrent callers on the same task (or
//! runtime) interleave exactly at `.await`s. At most one request is in
//! flight per fetcher; a `fetch_next_page` issued meanwhile is dropped.
//! Each request is tagged with the key and epoch it was issued under, and
//! its response is discarded if the key changed while it was in flight.

mod cache;
mod source;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopfront_core::paging::START_PAGE;
use shopfront_core::{Page, PagingConfig, Product, ProductQuery, QueryKey, SortDirection};

use crate::error::ClientError;

pub use cache::QueryCache;
pub use source::ProductSource;

/// Identifies the key generation a request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestTag {
    key: QueryKey,
    epoch: u64,
}

#[derive(Debug, Default)]
struct FetchState {
    key: QueryKey,
    /// Bumped on every key change; stale responses carry an older epoch.
    epoch: u64,
    pages: Vec<Page<Product>>,
    in_flight: Option<RequestTag>,
    error: Option<Arc<ClientError>>,
}

impl FetchState {
    fn tag(&self) -> RequestTag {
        RequestTag {
            key: self.key.clone(),
            epoch: self.epoch,
        }
    }

    fn is_current(&self, tag: &RequestTag) -> bool {
        self.epoch == tag.epoch && self.key == tag.key
    }

    fn is_last_page(&self) -> bool {
        self.pages.last().is_some_and(|p| p.last)
    }

    /// First page for the current key is in flight.
    fn is_loading(&self) -> bool {
        self.in_flight.is_some() && self.pages.is_empty()
    }

    fn is_fetching_next_page(&self) -> bool {
        self.in_flight.is_some() && !self.pages.is_empty()
    }
}

/// Point-in-time view of a [`ProductFetcher`].
#[derive(Debug, Clone)]
pub struct ProductsView {
    /// Every product fetched so far for the current key, in page order.
    pub products: Vec<Product>,
    /// True only while nothing has been loaded yet for the current key.
    pub is_loading: bool,
    /// True while a further page is requested on top of loaded ones.
    pub is_fetching_next_page: bool,
    pub error: Option<Arc<ClientError>>,
    /// Number of pages fetched so far.
    pub page: usize,
    pub is_last_page: bool,
    pub category: Option<String>,
    pub sort: SortDirection,
}

pub struct ProductFetcher<S> {
    source: S,
    cache: QueryCache,
    paging: PagingConfig,
    state: Mutex<FetchState>,
}

impl<S: ProductSource> ProductFetcher<S> {
    /// Creates a fetcher for all categories sorted by ascending price.
    /// Nothing is requested until [`load`](Self::load) or
    /// [`fetch_next_page`](Self::fetch_next_page) is called.
    pub fn new(source: S, cache: QueryCache, paging: PagingConfig) -> Self {
        Self {
            source,
            cache,
            paging,
            state: Mutex::new(FetchState::default()),
        }
    }

    /// Starts with `category` and `sort` instead of the defaults.
    #[must_use]
    pub fn with_key(self, category: &str, sort: SortDirection) -> Self {
        self.lock().key = QueryKey::new(category, sort);
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> ProductsView {
        let state = self.lock();
        ProductsView {
            products: state
                .pages
                .iter()
                .flat_map(|p| p.content.iter().cloned())
                .collect(),
            is_loading: state.is_loading(),
            is_fetching_next_page: state.is_fetching_next_page(),
            error: state.error.clone(),
            page: state.pages.len(),
            is_last_page: state.is_last_page(),
            category: state.key.category.clone(),
            sort: state.key.sort,
        }
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.snapshot().products
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    #[must_use]
    pub fn is_fetching_next_page(&self) -> bool {
        self.lock().is_fetching_next_page()
    }

    #[must_use]
    pub fn error(&self) -> Option<Arc<ClientError>> {
        self.lock().error.clone()
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.lock().pages.len()
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.lock().is_last_page()
    }

    #[must_use]
    pub fn query_key(&self) -> QueryKey {
        self.lock().key.clone()
    }

    /// Loads the first page for the current key.
    ///
    /// A fresh cached sequence for the key is adopted without a request.
    /// Does nothing if pages are already loaded or a request is in flight.
    pub async fn load(&self) {
        let planned = {
            let mut state = self.lock();
            if state.in_flight.is_some() || !state.pages.is_empty() {
                None
            } else if let Some(pages) = self.cache.get(&state.key) {
                tracing::debug!(
                    category = ?state.key.category,
                    sort = %state.key.sort,
                    pages = pages.len(),
                    "reusing cached product pages"
                );
                state.pages = pages;
                state.error = None;
                None
            } else {
                Some(self.begin(&mut state, START_PAGE))
            }
        };

        if let Some((tag, query)) = planned {
            self.run(tag, query).await;
        }
    }

    /// Requests the page after the last one received.
    ///
    /// No-op while a request is in flight or once the last page has been
    /// seen. With nothing loaded yet this behaves like [`load`](Self::load).
    pub async fn fetch_next_page(&self) {
        let planned = {
            let mut state = self.lock();
            if state.in_flight.is_some() {
                tracing::debug!("fetch already in flight: ignoring next-page request");
                return;
            }
            let next = state
                .pages
                .last()
                .map(|last| self.paging.next_page(last.number, last.last));
            match next {
                None => None,
                Some(Some(page)) => Some(self.begin(&mut state, page)),
                Some(None) => return,
            }
        };

        match planned {
            Some((tag, query)) => self.run(tag, query).await,
            None => self.load().await,
        }
    }

    /// Switches the category filter and restarts from page 0.
    /// An empty category means all categories. Setting the current
    /// category again does nothing.
    pub async fn set_category(&self, category: &str) {
        let sort = self.lock().key.sort;
        self.switch_key(QueryKey::new(category, sort)).await;
    }

    /// Switches the price ordering and restarts from page 0.
    pub async fn set_sort(&self, sort: SortDirection) {
        let category = self.lock().key.category.clone().unwrap_or_default();
        self.switch_key(QueryKey::new(&category, sort)).await;
    }

    /// Drops the cached sequence for the current key and loads page 0 again.
    pub async fn reload(&self) {
        {
            let mut state = self.lock();
            self.cache.invalidate(&state.key);
            let key = state.key.clone();
            Self::reset(&mut state, key);
        }
        self.load().await;
    }

    async fn switch_key(&self, key: QueryKey) {
        {
            let mut state = self.lock();
            if state.key == key {
                return;
            }
            tracing::debug!(
                category = ?key.category,
                sort = %key.sort,
                "product query key changed: restarting pagination"
            );
            Self::reset(&mut state, key);
        }
        self.load().await;
    }

    /// Discards accumulated pages and any in-flight request.
    fn reset(state: &mut FetchState, key: QueryKey) {
        state.key = key;
        state.epoch += 1;
        state.pages.clear();
        state.in_flight = None;
        state.error = None;
    }

    /// Marks a request for page `page` as in flight and returns its tag and
    /// parameters.
    fn begin(&self, state: &mut FetchState, page: u32) -> (RequestTag, ProductQuery) {
        let tag = state.tag();
        state.in_flight = Some(tag.clone());
        let query = state.key.query(page, self.paging.size_for(page));
        (tag, query)
    }

    async fn run(&self, tag: RequestTag, query: ProductQuery) {
        let result = self.source.fetch_page(&query).await;

        let mut state = self.lock();
        if !state.is_current(&tag) {
            tracing::warn!(
                category = ?tag.key.category,
                sort = %tag.key.sort,
                page = query.page,
                "discarding product page for a superseded query key"
            );
            return;
        }
        state.in_flight = None;

        match result {
            Ok(page) => {
                tracing::debug!(
                    page = page.number,
                    items = page.content.len(),
                    last = page.last,
                    "received product page"
                );
                state.error = None;
                state.pages.push(page);
                self.cache.store(state.key.clone(), state.pages.clone());
            }
            Err(err) => {
                tracing::warn!(page = query.page, error = %err, "product page request failed");
                state.error = Some(Arc::new(err));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../fetcher_test.rs"]
mod tests;
