use shopfront_client::{ProductFetcher, ProductsView, QueryCache, StoreClient};
use shopfront_core::{AppConfig, Product, SortDirection};

/// Loads the first page plus up to `more` further pages and prints them.
///
/// Stops early at the last page or on the first failed request; a failure
/// is reported after printing whatever was loaded before it.
pub(crate) async fn run_products(
    client: StoreClient,
    config: &AppConfig,
    category: &str,
    sort: SortDirection,
    more: usize,
) -> anyhow::Result<()> {
    let fetcher = ProductFetcher::new(client, QueryCache::from_config(config), config.paging)
        .with_key(category, sort);

    fetcher.load().await;
    for _ in 0..more {
        if fetcher.is_last_page() || fetcher.error().is_some() {
            break;
        }
        fetcher.fetch_next_page().await;
    }

    let view = fetcher.snapshot();
    tracing::info!(
        products = view.products.len(),
        pages = view.page,
        last = view.is_last_page,
        "product listing loaded"
    );

    for product in &view.products {
        println!("{}", format_product(product));
    }
    println!("{}", format_summary(&view));

    if let Some(err) = view.error {
        anyhow::bail!("failed to fetch products: {err}");
    }
    Ok(())
}

fn format_product(product: &Product) -> String {
    format!(
        "{:>6}  {:<12} {:>10}  {}",
        product.id, product.category, product.price, product.name
    )
}

fn format_summary(view: &ProductsView) -> String {
    let category = view.category.as_deref().unwrap_or("all");
    let more = if view.is_last_page {
        "end of list"
    } else {
        "more available"
    };
    format!(
        "{} products, {} pages (category: {category}, sort: {}), {more}",
        view.products.len(),
        view.page,
        view.sort
    )
}
