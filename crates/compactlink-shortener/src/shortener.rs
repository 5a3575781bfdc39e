use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;
use std::time::Duration;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone)]
pub enum ExpirationPolicy {
    /// The shortened URL never expires.
    Never,
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(Duration),
    /// The shortened URL expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
    /// Optional custom alias for the shortened URL.
    pub custom_alias: Option<ShortCode>,
}

impl ShortenParams {
    /// A never-expiring mapping with a generated code.
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            expiration: ExpirationPolicy::Never,
            custom_alias: None,
        }
    }
}

/// The outcome of a shorten request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortenedUrl {
    pub code: ShortCode,
    /// `base_url/code`.
    pub short_url: String,
    pub original_url: String,
    pub created_at: Timestamp,
    pub expire_at: Option<Timestamp>,
}

/// Usage statistics of one short code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlStats {
    pub code: ShortCode,
    pub original_url: String,
    pub click_count: u64,
    pub created_at: Timestamp,
    pub expire_at: Option<Timestamp>,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL, or returns the active mapping that already
    /// exists for the same original URL.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl>;

    /// Resolves a short code to its original URL and counts the click.
    ///
    /// Fails with `NotFound` for unknown codes and `Expired` for expired ones.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Returns usage statistics, including for expired mappings.
    async fn stats(&self, code: &ShortCode) -> Result<UrlStats>;

    /// Deletes a shortened URL. Fails with `NotFound` if it does not exist.
    async fn delete(&self, code: &ShortCode) -> Result<()>;
}
