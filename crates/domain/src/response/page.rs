//! Connection page types
//!
//! A connection endpoint returns one page of elements plus paging metadata.
//! The URL the page was fetched from is not part of the payload; the client
//! records it after decoding so cursor-based continuation URLs can be built.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Cursor positions around a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    /// Cursor pointing before the first element of this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Cursor pointing after the last element of this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Paging metadata of a connection page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Explicit URL of the previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Explicit URL of the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Cursors for cursor-based paging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursors: Option<Cursors>,
}

impl Paging {
    /// Returns the `after` cursor, if any.
    #[must_use]
    pub fn after_cursor(&self) -> Option<&str> {
        self.cursors.as_ref().and_then(|c| c.after.as_deref())
    }

    /// Returns the `before` cursor, if any.
    #[must_use]
    pub fn before_cursor(&self) -> Option<&str> {
        self.cursors.as_ref().and_then(|c| c.before.as_deref())
    }
}

/// One page of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Elements on this page, in remote order
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Paging metadata, absent on single-page connections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
    #[serde(skip)]
    origin_url: OnceLock<String>,
}

impl<T> Page<T> {
    /// Creates a page from elements and paging metadata.
    #[must_use]
    pub const fn new(data: Vec<T>, paging: Option<Paging>) -> Self {
        Self {
            data,
            paging,
            origin_url: OnceLock::new(),
        }
    }

    /// Returns the URL this page was fetched from, once recorded.
    #[must_use]
    pub fn origin_url(&self) -> Option<&str> {
        self.origin_url.get().map(String::as_str)
    }

    /// Records the URL this page was fetched from.
    ///
    /// The URL can be set only once; returns false if it was already set.
    pub fn set_origin_url(&self, url: impl Into<String>) -> bool {
        self.origin_url.set(url.into()).is_ok()
    }

    /// Returns true if the page holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of elements on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}
