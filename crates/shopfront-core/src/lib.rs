pub mod app_config;
pub mod cart;
pub mod config;
pub mod paging;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::CartItem;
pub use config::{load_app_config, load_app_config_from_env};
pub use paging::{Page, PagingConfig};
pub use products::{Product, ProductQuery, QueryKey, SortDirection};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid paging configuration: {reason}")]
    InvalidPaging { reason: String },
}
