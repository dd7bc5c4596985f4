use thiserror::Error;

/// Errors returned by the storefront REST client.
///
/// The taxonomy is deliberately flat: callers get either a transport
/// failure or the bare HTTP status code, never a parsed error body.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Any response outside the 2xx range.
    #[error("{status}")]
    Status { status: u16 },

    /// The body did not match the expected schema.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded as JSON.
    #[error("JSON serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// Cart quantities must be at least one.
    #[error("invalid cart quantity {quantity}: must be at least 1")]
    InvalidQuantity { quantity: u32 },
}

impl ClientError {
    /// HTTP status carried by this error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
