use std::future::Future;
use std::sync::Arc;

use shopfront_core::{Page, Product, ProductQuery};

use crate::client::StoreClient;
use crate::error::ClientError;

/// Anything that can serve one page of the product listing.
///
/// [`StoreClient`] is the production implementation; tests plug in an
/// in-memory catalog.
pub trait ProductSource {
    fn fetch_page(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Page<Product>, ClientError>> + Send;
}

impl ProductSource for StoreClient {
    async fn fetch_page(&self, query: &ProductQuery) -> Result<Page<Product>, ClientError> {
        self.fetch_products_page(query).await
    }
}

impl<S: ProductSource> ProductSource for Arc<S> {
    fn fetch_page(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Page<Product>, ClientError>> + Send {
        (**self).fetch_page(query)
    }
}
