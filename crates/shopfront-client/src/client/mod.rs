//! HTTP client for the storefront REST backend.

mod cart;

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use shopfront_core::{AppConfig, Page, Product, ProductQuery};

use crate::error::ClientError;
use crate::query::QueryParams;
use crate::retry::retry_with_backoff;

pub(crate) const PRODUCTS_PATH: &str = "products";
pub(crate) const CART_ITEMS_PATH: &str = "cart-items";

/// HTTP client for the storefront's `/products` and `/cart-items` endpoints.
///
/// Every non-2xx response becomes [`ClientError::Status`] carrying only the
/// status code. Paged responses are decoded into [`Page`], which requires
/// `content`, `number` and `last`.
///
/// Transient failures (timeouts, connect errors, 5xx) are retried with
/// exponential backoff up to `max_retries` additional attempts. The default
/// from configuration is zero.
#[derive(Debug, Clone)]
pub struct StoreClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) max_retries: u32,
    pub(super) backoff_base_ms: u64,
}

impl StoreClient {
    /// Creates a client rooted at `base_url` with no retries.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] if the `reqwest::Client` cannot be constructed.
    /// - [`ClientError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends to the base
        // path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`StoreClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(
            Self::new(&config.api_base_url, config.request_timeout_secs, &config.user_agent)?
                .with_retries(config.max_retries, config.retry_backoff_base_ms),
        )
    }

    /// Enables retries on transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches one page of `GET /products`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Status`] for any non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a valid page.
    pub async fn fetch_products_page(
        &self,
        query: &ProductQuery,
    ) -> Result<Page<Product>, ClientError> {
        let url = self.endpoint_url(PRODUCTS_PATH, &QueryParams::from(query))?;
        self.get_json(url, "products page").await
    }

    /// Builds `{base}/{path}?{params}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `path` cannot be joined.
    pub(crate) fn endpoint_url(&self, path: &str, params: &QueryParams) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&params.encode()));
        }
        Ok(url)
    }

    /// Sends a GET request and decodes the JSON body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, ClientError> {
        let body = self.send(Method::GET, url.clone(), None::<&()>).await?;
        serde_json::from_str::<T>(&body).map_err(|e| ClientError::Deserialize {
            context: format!("{context} from {url}"),
            source: e,
        })
    }

    /// Sends a request with an optional JSON body, asserts a 2xx status and
    /// returns the raw body text.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<String, ClientError> {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClientError::Serialize {
                context: format!("request body for {method} {url}"),
                source: e,
            })?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let method = method.clone();
            let url = url.clone();
            let payload = payload.clone();
            async move {
                tracing::debug!(%method, %url, "storefront request");
                let mut request = self
                    .client
                    .request(method, url)
                    .header(reqwest::header::ACCEPT, "application/json");
                if let Some(bytes) = payload {
                    request = request
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(bytes);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ClientError::Status {
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
