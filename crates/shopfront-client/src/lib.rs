pub mod cart_session;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod query;
mod retry;

pub use cart_session::CartSession;
pub use client::StoreClient;
pub use error::ClientError;
pub use fetcher::{ProductFetcher, ProductSource, ProductsView, QueryCache};
pub use query::QueryParams;
