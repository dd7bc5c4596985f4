//! Page-number arithmetic for offset-paged listings.
//!
//! The first request of a sequence uses a larger page size than the
//! requests that follow it, so the first screen shows a full batch while
//! later increments stay small. Page indices are always expressed in
//! steady-state page units: an initial page of 20 items with a page size of
//! 4 "uses up" indices 0 through 4, and the next request is index 5.
//!
//! ```text
//! initial = 20, size = 4
//! index:  0 (20 items) -> 5 (4 items) -> 6 (4 items) -> ...
//! items:  0..20           20..24         24..28
//! ```

use serde::Deserialize;

use crate::ConfigError;

/// Index of the first page of every sequence.
pub const START_PAGE: u32 = 0;
pub const DEFAULT_INITIAL_PAGE_SIZE: u32 = 20;
pub const DEFAULT_PAGE_SIZE: u32 = 4;

/// One page of a paged listing, e.g. `GET /products` or `GET /cart-items`.
///
/// All three fields are required; a body missing any of them fails to
/// deserialize instead of being defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index as reported by the backend.
    pub number: u32,
    pub last: bool,
}

/// Initial and steady-state page sizes for a paging sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    initial_page_size: u32,
    page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            initial_page_size: DEFAULT_INITIAL_PAGE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PagingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPaging`] if `page_size` is zero, or if
    /// `initial_page_size` is not a positive multiple of `page_size`. A
    /// non-multiple would make the second request skip or repeat items.
    pub fn new(initial_page_size: u32, page_size: u32) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::InvalidPaging {
                reason: "page size must be greater than zero".to_owned(),
            });
        }
        if initial_page_size < page_size {
            return Err(ConfigError::InvalidPaging {
                reason: format!(
                    "initial page size {initial_page_size} is smaller than page size {page_size}"
                ),
            });
        }
        if initial_page_size % page_size != 0 {
            return Err(ConfigError::InvalidPaging {
                reason: format!(
                    "initial page size {initial_page_size} is not a multiple of page size {page_size}"
                ),
            });
        }
        Ok(Self {
            initial_page_size,
            page_size,
        })
    }

    #[must_use]
    pub fn initial_page_size(&self) -> u32 {
        self.initial_page_size
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items to request for page index `page`.
    #[must_use]
    pub fn size_for(&self, page: u32) -> u32 {
        if page == START_PAGE {
            self.initial_page_size
        } else {
            self.page_size
        }
    }

    /// Index of the page after one reporting `number` / `last`, or `None`
    /// once the backend has reported the last page. An index that would
    /// overflow `u32` also yields `None`.
    #[must_use]
    pub fn next_page(&self, number: u32, last: bool) -> Option<u32> {
        if last {
            return None;
        }
        if number == START_PAGE {
            number.checked_add(self.initial_page_size / self.page_size)
        } else {
            number.checked_add(1)
        }
    }
}
