use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Field the backend sorts the product listing by.
pub const SORT_FIELD: &str = "price";

/// A product as returned by the `/products` listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category label, e.g. `"fashion"` or `"books"`.
    pub category: String,
}

/// Price ordering requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction \"{other}\" (expected asc or desc)")),
        }
    }
}

/// Identity of one product result sequence: the `(category, sort)` pair.
///
/// An empty category is normalized to `None` ("all categories") so that
/// `""` and an absent filter share one cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub category: Option<String>,
    pub sort: SortDirection,
}

impl QueryKey {
    #[must_use]
    pub fn new(category: &str, sort: SortDirection) -> Self {
        let trimmed = category.trim();
        Self {
            category: (!trimmed.is_empty()).then(|| trimmed.to_owned()),
            sort,
        }
    }

    /// Builds the request parameters for page `page` of this sequence.
    #[must_use]
    pub fn query(&self, page: u32, size: u32) -> ProductQuery {
        ProductQuery {
            category: self.category.clone(),
            sort: self.sort,
            page,
            size,
        }
    }
}

/// Parameters for one `GET /products` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub sort: SortDirection,
    pub page: u32,
    pub size: u32,
}

impl ProductQuery {
    /// The backend sort expression, e.g. `"price,desc"`.
    #[must_use]
    pub fn sort_expression(&self) -> String {
        format!("{SORT_FIELD},{}", self.sort)
    }
}
