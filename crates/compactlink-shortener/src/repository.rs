pub mod memory;

use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the mapping was created.
    pub created_at: Timestamp,
    /// When the record expires, if ever.
    pub expire_at: Option<Timestamp>,
    /// How many times the short code has been resolved.
    pub click_count: u64,
}

impl UrlRecord {
    /// Whether the record has expired as of `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }
}

/// Storage for short code to URL mappings.
///
/// Expired records stay visible to [`get`](Repository::get) and
/// [`find_by_original_url`](Repository::find_by_original_url) so callers can
/// tell "expired" from "missing", but they count as free for
/// [`exists`](Repository::exists) and [`insert`](Repository::insert).
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new URL record. Returns `Err(AliasConflict)` if the code already exists.
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()>;

    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Deletes the URL record for a given short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Checks whether a short code is taken by an unexpired record.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Looks up a mapping by its original URL.
    async fn find_by_original_url(&self, url: &str) -> Result<Option<(ShortCode, UrlRecord)>>;

    /// Increments the click counter. Returns `false` if the code does not exist.
    async fn record_click(&self, code: &ShortCode) -> Result<bool>;
}
