//! Query-string construction for listing endpoints.
//!
//! [`QueryParams`] keeps parameters in insertion order and serializes them
//! with `application/x-www-form-urlencoded` escaping: alphanumerics and
//! `*-._` pass through, space becomes `+`, everything else is
//! percent-encoded. Two parameter sets with the same content but different
//! insertion order serialize differently; callers push keys in the order
//! they want on the wire.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use shopfront_core::ProductQuery;

const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Ordered list of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value`, stringifying `value` with its `Display` impl.
    #[must_use]
    pub fn push(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.pairs.push((key.to_owned(), value.to_string()));
        self
    }

    /// Appends `key=value` when `value` is `Some`; absent values are omitted.
    #[must_use]
    pub fn push_opt<V: fmt::Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterates `(key, value)` pairs in insertion order, unescaped.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes to `k1=v1&k2=v2`, without a leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", escape(key), escape(value))?;
        }
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    utf8_percent_encode(raw, FORM_VALUE)
        .to_string()
        .replace("%20", "+")
}

impl From<&ProductQuery> for QueryParams {
    /// Parameters for `GET /products`: `page`, `size`, `sort`, then
    /// `category` when filtering.
    fn from(query: &ProductQuery) -> Self {
        QueryParams::new()
            .push("page", query.page)
            .push("size", query.size)
            .push("sort", query.sort_expression())
            .push_opt("category", query.category.as_deref())
    }
}
