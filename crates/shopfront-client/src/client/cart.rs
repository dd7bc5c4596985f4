//! `/cart-items` endpoints for `StoreClient`.
//!
//! Unlike product listing, cart calls surface failures to the caller as
//! `Err` values; nothing is captured as state here.

use reqwest::Method;
use serde::Serialize;

use shopfront_core::{CartItem, Page};

use crate::error::ClientError;
use crate::query::QueryParams;

use super::{StoreClient, CART_ITEMS_PATH};

/// Quantity every newly added cart item starts with.
pub const INITIAL_QUANTITY: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCartItemBody {
    product_id: u64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateQuantityBody {
    quantity: u32,
}

impl StoreClient {
    /// Lists the cart with a single `GET /cart-items?size={size}` request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] for any non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a valid page.
    pub async fn fetch_cart_items(&self, size: u32) -> Result<Vec<CartItem>, ClientError> {
        let url = self.endpoint_url(CART_ITEMS_PATH, &QueryParams::new().push("size", size))?;
        let page: Page<CartItem> = self.get_json(url, "cart items").await?;
        Ok(page.content)
    }

    /// Adds `product_id` to the cart with quantity 1.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] for any non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    pub async fn add_cart_item(&self, product_id: u64) -> Result<(), ClientError> {
        let url = self.endpoint_url(CART_ITEMS_PATH, &QueryParams::new())?;
        let body = AddCartItemBody {
            product_id,
            quantity: INITIAL_QUANTITY,
        };
        self.send(Method::POST, url, Some(&body)).await?;
        tracing::debug!(product_id, "added cart item");
        Ok(())
    }

    /// Sets the quantity of an existing cart item.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidQuantity`] if `quantity` is zero; no request is sent.
    /// - [`ClientError::Status`] for any non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    pub async fn update_cart_item_quantity(
        &self,
        cart_item_id: u64,
        quantity: u32,
    ) -> Result<(), ClientError> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity { quantity });
        }
        let url = self.cart_item_url(cart_item_id)?;
        self.send(Method::PATCH, url, Some(&UpdateQuantityBody { quantity }))
            .await?;
        tracing::debug!(cart_item_id, quantity, "updated cart item quantity");
        Ok(())
    }

    /// Deletes a cart item.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] for any non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    pub async fn remove_cart_item(&self, cart_item_id: u64) -> Result<(), ClientError> {
        let url = self.cart_item_url(cart_item_id)?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        tracing::debug!(cart_item_id, "removed cart item");
        Ok(())
    }

    fn cart_item_url(&self, cart_item_id: u64) -> Result<reqwest::Url, ClientError> {
        self.endpoint_url(
            &format!("{CART_ITEMS_PATH}/{cart_item_id}"),
            &QueryParams::new(),
        )
    }
}
