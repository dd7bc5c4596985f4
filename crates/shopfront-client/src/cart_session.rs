//! In-memory cart state for one session.

use shopfront_core::CartItem;

use crate::client::StoreClient;
use crate::error::ClientError;

/// Default `size` for the cart listing request.
pub const DEFAULT_CART_PAGE_SIZE: u32 = 100;

/// The session's view of the shopping cart.
///
/// Every mutation goes to the backend first and then re-reads the cart, so
/// `items()` always reflects what the server holds. Errors are returned to
/// the caller and leave the local list untouched.
#[derive(Debug, Clone)]
pub struct CartSession {
    client: StoreClient,
    page_size: u32,
    items: Vec<CartItem>,
}

impl CartSession {
    #[must_use]
    pub fn new(client: StoreClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_CART_PAGE_SIZE,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Re-reads the cart from the backend.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`StoreClient::fetch_cart_items`].
    pub async fn refresh(&mut self) -> Result<&[CartItem], ClientError> {
        self.items = self.client.fetch_cart_items(self.page_size).await?;
        Ok(&self.items)
    }

    /// Adds a product with quantity 1, then refreshes.
    ///
    /// # Errors
    ///
    /// Propagates any error from the add call or the refresh.
    pub async fn add(&mut self, product_id: u64) -> Result<(), ClientError> {
        self.client.add_cart_item(product_id).await?;
        self.refresh().await?;
        Ok(())
    }

    /// Sets a cart item's quantity, then refreshes.
    ///
    /// # Errors
    ///
    /// Propagates any error from the update call or the refresh.
    pub async fn update_quantity(
        &mut self,
        cart_item_id: u64,
        quantity: u32,
    ) -> Result<(), ClientError> {
        self.client
            .update_cart_item_quantity(cart_item_id, quantity)
            .await?;
        self.refresh().await?;
        Ok(())
    }

    /// Removes a cart item, then refreshes.
    ///
    /// # Errors
    ///
    /// Propagates any error from the remove call or the refresh.
    pub async fn remove(&mut self, cart_item_id: u64) -> Result<(), ClientError> {
        self.client.remove_cart_item(cart_item_id).await?;
        self.refresh().await?;
        Ok(())
    }

    #[must_use]
    pub fn find_by_product(&self, product_id: u64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    #[must_use]
    pub fn contains_product(&self, product_id: u64) -> bool {
        self.find_by_product(product_id).is_some()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn total_price(&self) -> u64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
