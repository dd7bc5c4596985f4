use std::future::Future;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use shopfront_core::{Page, PagingConfig, Product, ProductQuery, SortDirection};

use super::*;

/// Category sizes of the 100-product test catalog.
const CATEGORIES: [(&str, usize); 6] = [
    ("fashion", 20),
    ("beverage", 1),
    ("electronics", 20),
    ("kitchen", 20),
    ("fitness", 20),
    ("books", 19),
];

/// In-memory stand-in for the `/products` endpoint: filters by category,
/// sorts by price, and slices `page * size .. page * size + size`.
#[derive(Clone, Default)]
struct Catalog {
    products: Arc<Vec<Product>>,
    requests: Arc<StdMutex<Vec<ProductQuery>>>,
    fail_with: Arc<StdMutex<Option<u16>>>,
    /// Requests for this category (`None` = all) sleep before answering.
    slow: Option<(Option<String>, Duration)>,
}

impl Catalog {
    fn new() -> Self {
        let mut products = Vec::new();
        let mut id = 0u64;
        for (category, count) in CATEGORIES {
            for _ in 0..count {
                id += 1;
                products.push(Product {
                    id,
                    name: format!("{category} item {id}"),
                    price: (id * 7_919) % 97_000 + 1_000,
                    image_url: None,
                    category: category.to_owned(),
                });
            }
        }
        Self {
            products: Arc::new(products),
            ..Self::default()
        }
    }

    fn slow_for(mut self, category: Option<&str>, delay: Duration) -> Self {
        self.slow = Some((category.map(str::to_owned), delay));
        self
    }

    fn fail_with(&self, status: Option<u16>) {
        *self.fail_with.lock().unwrap() = status;
    }

    fn requests(&self) -> Vec<ProductQuery> {
        self.requests.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn page(&self, query: &ProductQuery) -> Page<Product> {
        let mut matching: Vec<Product> = self
            .products
            .iter()
            .filter(|p| query.category.as_deref().is_none_or(|c| p.category == c))
            .cloned()
            .collect();
        matching.sort_by_key(|p| (p.price, p.id));
        if query.sort == SortDirection::Desc {
            matching.reverse();
        }

        let size = query.size as usize;
        let offset = query.page as usize * size;
        let content = matching.iter().skip(offset).take(size).cloned().collect();
        Page {
            content,
            number: query.page,
            last: offset + size >= matching.len(),
        }
    }
}

impl ProductSource for Catalog {
    fn fetch_page(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Page<Product>, ClientError>> + Send {
        let this = self.clone();
        let query = query.clone();
        async move {
            this.requests.lock().unwrap().push(query.clone());
            if let Some((category, delay)) = &this.slow {
                if *category == query.category {
                    tokio::time::sleep(*delay).await;
                }
            }
            let failure = *this.fail_with.lock().unwrap();
            match failure {
                Some(status) => Err(ClientError::Status { status }),
                None => Ok(this.page(&query)),
            }
        }
    }
}

fn fetcher(catalog: &Catalog) -> ProductFetcher<Catalog> {
    ProductFetcher::new(catalog.clone(), QueryCache::new(), PagingConfig::default())
}

fn prices(view: &ProductsView) -> Vec<u64> {
    view.products.iter().map(|p| p.price).collect()
}

// ---------------------------------------------------------------------------
// Initial load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_fetches_initial_page_of_twenty() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;

    let view = fetcher.snapshot();
    assert_eq!(view.products.len(), 20);
    assert_eq!(view.page, 1);
    assert!(!view.is_loading);
    assert!(view.error.is_none());
    assert!(!view.is_last_page);

    let requests = catalog.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].page, 0);
    assert_eq!(requests[0].size, 20);
    assert_eq!(requests[0].sort, SortDirection::Asc);
    assert_eq!(requests[0].category, None);
}

#[tokio::test]
async fn nothing_is_requested_before_first_load() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    let view = fetcher.snapshot();
    assert!(view.products.is_empty());
    assert_eq!(view.page, 0);
    assert!(!view.is_last_page);
    assert_eq!(catalog.request_count(), 0);
}

#[tokio::test]
async fn load_twice_does_not_refetch() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.load().await;

    assert_eq!(catalog.request_count(), 1);
    assert_eq!(fetcher.page(), 1);
}

#[tokio::test]
async fn is_loading_while_request_in_flight() {
    let catalog = Catalog::new().slow_for(None, Duration::from_millis(100));
    let fetcher = fetcher(&catalog);

    let ((), observed) = tokio::join!(fetcher.load(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.is_loading()
    });

    assert!(observed, "expected is_loading during the request");
    assert!(!fetcher.is_loading());
}

#[tokio::test]
async fn next_page_request_is_not_reported_as_initial_loading() {
    let catalog = Catalog::new().slow_for(None, Duration::from_millis(100));
    let fetcher = fetcher(&catalog);
    fetcher.load().await;

    let ((), during) = tokio::join!(fetcher.fetch_next_page(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.snapshot()
    });

    assert!(!during.is_loading);
    assert!(during.is_fetching_next_page);
    assert_eq!(during.products.len(), 20, "loaded products stay visible");

    let after = fetcher.snapshot();
    assert!(!after.is_fetching_next_page);
    assert_eq!(after.products.len(), 24);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_next_page_appends_four_items() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;

    let view = fetcher.snapshot();
    assert_eq!(view.products.len(), 24);
    assert_eq!(view.page, 2);

    let second = &catalog.requests()[1];
    assert_eq!(second.page, 5, "first increment skips indices covered by page 0");
    assert_eq!(second.size, 4);
}

#[tokio::test]
async fn later_increments_step_by_one_index() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.fetch_next_page().await;
    fetcher.fetch_next_page().await;

    let pages: Vec<u32> = catalog.requests().iter().map(|q| q.page).collect();
    assert_eq!(pages, vec![0, 5, 6, 7]);
}

#[tokio::test]
async fn accumulated_products_are_contiguous_and_unique() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    for _ in 0..3 {
        fetcher.fetch_next_page().await;
    }

    let view = fetcher.snapshot();
    let mut ids: Vec<u64> = view.products.iter().map(|p| p.id).collect();
    let expected: Vec<u64> = catalog
        .page(&shopfront_core::QueryKey::default().query(0, 32))
        .content
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, expected, "no gaps or repeats across the size change");
    ids.dedup();
    assert_eq!(ids.len(), 32);
}

#[tokio::test]
async fn fetch_next_page_without_pages_performs_initial_load() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.fetch_next_page().await;

    assert_eq!(fetcher.page(), 1);
    assert_eq!(fetcher.products().len(), 20);
    assert_eq!(catalog.requests()[0].page, 0);
}

#[tokio::test]
async fn stops_requesting_after_last_page() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    for i in 1..=20 {
        fetcher.fetch_next_page().await;
        let view = fetcher.snapshot();
        assert_eq!(view.products.len(), 20 + i * 4);
        assert_eq!(view.page, i + 1);
    }

    assert!(fetcher.is_last_page());
    let requests_at_end = catalog.request_count();

    fetcher.fetch_next_page().await;
    fetcher.fetch_next_page().await;

    let view = fetcher.snapshot();
    assert_eq!(view.products.len(), 100);
    assert_eq!(view.page, 21);
    assert!(view.is_last_page);
    assert_eq!(catalog.request_count(), requests_at_end);
}

#[tokio::test]
async fn overlapping_next_page_requests_are_ignored() {
    let catalog = Catalog::new().slow_for(None, Duration::from_millis(50));
    let fetcher = fetcher(&catalog);
    fetcher.load().await;

    tokio::join!(fetcher.fetch_next_page(), fetcher.fetch_next_page());

    assert_eq!(catalog.request_count(), 2, "second call must not issue a request");
    assert_eq!(fetcher.page(), 2);
    assert_eq!(fetcher.products().len(), 24);
}

// ---------------------------------------------------------------------------
// Sorting and filtering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ascending_sort_is_monotonic_across_pages() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.set_sort(SortDirection::Asc).await;
    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.fetch_next_page().await;

    let prices = prices(&fetcher.snapshot());
    assert_eq!(prices.len(), 28);
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
}

#[tokio::test]
async fn descending_sort_is_monotonic_across_pages() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.set_sort(SortDirection::Desc).await;
    fetcher.fetch_next_page().await;
    fetcher.fetch_next_page().await;

    let view = fetcher.snapshot();
    assert_eq!(view.sort, SortDirection::Desc);
    let prices = prices(&view);
    assert!(prices.windows(2).all(|w| w[0] >= w[1]), "{prices:?}");
    assert!(catalog
        .requests()
        .iter()
        .all(|q| q.sort_expression() == "price,desc"));
}

#[tokio::test]
async fn category_filter_returns_only_matching_products() {
    let cases = [
        ("", 20),
        ("fashion", 20),
        ("beverage", 1),
        ("electronics", 20),
        ("kitchen", 20),
        ("fitness", 20),
        ("books", 19),
    ];

    for (category, expected) in cases {
        let catalog = Catalog::new();
        let fetcher = fetcher(&catalog);

        fetcher.set_category(category).await;
        fetcher.load().await;

        let view = fetcher.snapshot();
        assert_eq!(view.products.len(), expected, "category {category:?}");
        if !category.is_empty() {
            assert!(
                view.products.iter().all(|p| p.category == category),
                "category {category:?} leaked other products"
            );
        }
    }
}

#[tokio::test]
async fn small_category_is_last_page_immediately() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.set_category("beverage").await;

    assert!(fetcher.is_last_page());
    fetcher.fetch_next_page().await;
    assert_eq!(catalog.request_count(), 1);
}

#[tokio::test]
async fn with_key_sets_initial_filters() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog).with_key("books", SortDirection::Desc);

    fetcher.load().await;

    let request = &catalog.requests()[0];
    assert_eq!(request.category.as_deref(), Some("books"));
    assert_eq!(request.sort, SortDirection::Desc);
    assert_eq!(fetcher.products().len(), 19);
}

// ---------------------------------------------------------------------------
// Key changes and caching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn category_change_resets_accumulated_pages() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    assert_eq!(fetcher.page(), 2);

    fetcher.set_category("fitness").await;

    let view = fetcher.snapshot();
    assert_eq!(view.page, 1);
    assert_eq!(view.products.len(), 20);
    assert!(view.products.iter().all(|p| p.category == "fitness"));
    assert_eq!(view.category.as_deref(), Some("fitness"));
    assert_eq!(catalog.requests().last().unwrap().page, 0);
}

#[tokio::test]
async fn sort_change_resets_accumulated_pages() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.set_sort(SortDirection::Desc).await;

    let view = fetcher.snapshot();
    assert_eq!(view.page, 1);
    assert_eq!(view.products.len(), 20);
    let prices = prices(&view);
    assert!(prices.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn setting_same_key_is_a_no_op() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.set_category("").await;
    fetcher.set_sort(SortDirection::Asc).await;

    assert_eq!(catalog.request_count(), 2);
    assert_eq!(fetcher.page(), 2);
}

#[tokio::test]
async fn returning_to_a_seen_key_reuses_cached_pages() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.set_category("kitchen").await;
    let before = catalog.request_count();

    fetcher.set_category("").await;

    assert_eq!(catalog.request_count(), before, "cached key must not refetch");
    let view = fetcher.snapshot();
    assert_eq!(view.page, 2);
    assert_eq!(view.products.len(), 24);

    // Pagination continues from the cached position.
    fetcher.fetch_next_page().await;
    assert_eq!(catalog.requests().last().unwrap().page, 6);
}

#[tokio::test]
async fn fetchers_sharing_a_cache_share_results() {
    let catalog = Catalog::new();
    let cache = QueryCache::new();
    let first = ProductFetcher::new(catalog.clone(), cache.clone(), PagingConfig::default());
    let second = ProductFetcher::new(catalog.clone(), cache, PagingConfig::default());

    first.load().await;
    second.load().await;

    assert_eq!(catalog.request_count(), 1);
    assert_eq!(second.products(), first.products());
}

#[tokio::test]
async fn stale_cache_entry_is_refetched() {
    let catalog = Catalog::new();
    let cache = QueryCache::with_stale_after(Duration::ZERO);
    let first = ProductFetcher::new(catalog.clone(), cache.clone(), PagingConfig::default());
    let second = ProductFetcher::new(catalog.clone(), cache, PagingConfig::default());

    first.load().await;
    second.load().await;

    assert_eq!(catalog.request_count(), 2);
}

#[tokio::test]
async fn reload_restarts_from_first_page() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);

    fetcher.load().await;
    fetcher.fetch_next_page().await;
    fetcher.reload().await;

    assert_eq!(catalog.request_count(), 3);
    assert_eq!(catalog.requests()[2].page, 0);
    assert_eq!(fetcher.page(), 1);
    assert_eq!(fetcher.products().len(), 20);
}

#[tokio::test]
async fn response_for_abandoned_key_is_discarded() {
    let catalog = Catalog::new().slow_for(None, Duration::from_millis(100));
    let fetcher = fetcher(&catalog);
    fetcher.load().await;

    tokio::join!(fetcher.fetch_next_page(), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.set_category("fashion").await;
    });

    let view = fetcher.snapshot();
    assert_eq!(view.page, 1);
    assert_eq!(view.products.len(), 20);
    assert!(view.products.iter().all(|p| p.category == "fashion"));
    assert!(!view.is_loading);

    // The stale page must not have been cached under its old key either.
    fetcher.set_category("").await;
    assert_eq!(fetcher.page(), 1);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_is_captured_as_state() {
    let catalog = Catalog::new();
    catalog.fail_with(Some(500));
    let fetcher = fetcher(&catalog);

    fetcher.load().await;

    let view = fetcher.snapshot();
    let err = view.error.expect("expected error state");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "500");
    assert!(!view.is_loading);
    assert!(view.products.is_empty());
    assert_eq!(view.page, 0);
}

#[tokio::test]
async fn failed_increment_keeps_accumulated_products() {
    let catalog = Catalog::new();
    let fetcher = fetcher(&catalog);
    fetcher.load().await;

    catalog.fail_with(Some(503));
    fetcher.fetch_next_page().await;

    let view = fetcher.snapshot();
    assert!(view.error.is_some());
    assert!(!view.is_loading);
    assert_eq!(view.products.len(), 20);
    assert_eq!(view.page, 1);
}

#[tokio::test]
async fn successful_fetch_after_failure_clears_error() {
    let catalog = Catalog::new();
    catalog.fail_with(Some(500));
    let fetcher = fetcher(&catalog);
    fetcher.load().await;
    assert!(fetcher.error().is_some());

    catalog.fail_with(None);
    fetcher.fetch_next_page().await;

    assert!(fetcher.error().is_none());
    assert_eq!(fetcher.products().len(), 20);
    assert_eq!(catalog.request_count(), 2, "fetcher itself never retries");
}

/// Always answers with a single product on page `u32::MAX`.
#[derive(Clone, Default)]
struct EndlessSource {
    requests: Arc<StdMutex<usize>>,
}

impl ProductSource for EndlessSource {
    fn fetch_page(
        &self,
        _query: &ProductQuery,
    ) -> impl Future<Output = Result<Page<Product>, ClientError>> + Send {
        let requests = Arc::clone(&self.requests);
        async move {
            *requests.lock().unwrap() += 1;
            Ok(Page {
                content: vec![Product {
                    id: 1,
                    name: "Product 1".to_owned(),
                    price: 1_000,
                    image_url: None,
                    category: "books".to_owned(),
                }],
                number: u32::MAX,
                last: false,
            })
        }
    }
}

#[tokio::test]
async fn page_index_overflow_stops_paging() {
    let source = EndlessSource::default();
    let fetcher = ProductFetcher::new(source.clone(), QueryCache::new(), PagingConfig::default());
    fetcher.load().await;

    fetcher.fetch_next_page().await;

    assert_eq!(*source.requests.lock().unwrap(), 1);
    assert_eq!(fetcher.page(), 1);
    assert!(!fetcher.is_loading());
    assert!(fetcher.error().is_none());
}
