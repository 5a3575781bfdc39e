use crate::error::{Result, ShortenerError};
use crate::generator::Generator;
use crate::repository::{Repository, UrlRecord};
use crate::shortcode::ShortCode;
use crate::shortener::{ExpirationPolicy, ShortenParams, ShortenedUrl, Shortener, UrlStats};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How many freshly minted codes are tried before giving up on collisions.
pub const MAX_GENERATION_ATTEMPTS: usize = 8;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - Short code generation (auto-generated or custom)
/// - Expiration policy conversion
/// - URL validation
///
/// Generated codes are unique per generator instance, but two instances
/// misconfigured with the same machine id would collide, so every generated
/// code is checked against the repository before it is used.
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    base_url: String,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            base_url: self.base_url.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService`. Short URLs are rendered as
    /// `base_url/code`.
    pub fn new(repository: R, generator: G, base_url: impl Into<String>) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            base_url: base_url.into(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates that the URL has a valid format: an http(s) scheme, a host
    /// that is `localhost`, a dotted name ending in an alphabetic top-level
    /// label or a dotted-quad IPv4 address, an optional numeric port, and
    /// nothing after the authority unless it starts with `/`.
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if url.chars().any(char::is_whitespace) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain whitespace: {}",
                url
            )));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        // queries and fragments are only allowed after a path
        let authority = match rest.find('/') {
            Some(index) => &rest[..index],
            None => rest,
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        };

        if let Some(port) = port {
            if port.is_empty() || port.len() > 5 || !port.chars().all(|c| c.is_ascii_digit())
            {
                return Err(ShortenerError::InvalidUrl(format!(
                    "URL port must be numeric: {}",
                    url
                )));
            }
        }

        if !Self::valid_host(host) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid host: {}",
                url
            )));
        }

        Ok(())
    }

    fn valid_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        let labels: Vec<&str> = host.split('.').collect();
        let is_ipv4 = labels.len() == 4
            && labels
                .iter()
                .all(|l| (1..=3).contains(&l.len()) && l.chars().all(|c| c.is_ascii_digit()));
        if is_ipv4 {
            return true;
        }

        let Some((tld, names)) = labels.split_last() else {
            return false;
        };
        !names.is_empty()
            && names.iter().all(|label| {
                !label.is_empty()
                    && label
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-')
            })
            && tld.len() >= 2
            && tld.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// Mints one code. The generator may block, so it runs off the async
    /// worker threads.
    async fn generate_code(&self) -> Result<ShortCode> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || generator.generate())
            .await
            .map_err(|e| ShortenerError::GeneratorUnavailable(e.to_string()))?
    }

    /// Mints codes until one is not yet taken in the repository.
    async fn generate_unique_code(&self) -> Result<ShortCode> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = self.generate_code().await?;
            if !self.repository.exists(&code).await? {
                if attempt > 1 {
                    info!(
                        code = %code,
                        collisions = attempt - 1,
                        "resolved short code collisions"
                    );
                }
                return Ok(code);
            }
            warn!(code = %code, attempt, "generated short code already in use");
        }

        Err(ShortenerError::CollisionLimit {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    fn expire_at(now: Timestamp, expiration: ExpirationPolicy) -> Result<Option<Timestamp>> {
        match expiration {
            ExpirationPolicy::Never => Ok(None),
            ExpirationPolicy::AfterDuration(duration) => {
                let duration = SignedDuration::try_from(duration)
                    .map_err(|e| ShortenerError::InvalidExpiration(e.to_string()))?;
                let expire_at = now
                    .checked_add(duration)
                    .map_err(|e| ShortenerError::InvalidExpiration(e.to_string()))?;
                Ok(Some(expire_at))
            }
            ExpirationPolicy::AtTimestamp(timestamp) => Ok(Some(timestamp)),
        }
    }

    fn shortened(&self, code: ShortCode, record: UrlRecord) -> ShortenedUrl {
        ShortenedUrl {
            short_url: code.to_url(&self.base_url),
            code,
            original_url: record.original_url,
            created_at: record.created_at,
            expire_at: record.expire_at,
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortenedUrl> {
        Self::validate_url(&params.original_url)?;

        let now = Timestamp::now();

        let code = match params.custom_alias {
            Some(alias) => {
                if self.repository.exists(&alias).await? {
                    warn!(alias = %alias, "custom alias already in use");
                    return Err(ShortenerError::AliasConflict(alias.to_string()));
                }
                alias
            }
            None => {
                if let Some((code, record)) = self
                    .repository
                    .find_by_original_url(&params.original_url)
                    .await?
                {
                    if !record.is_expired_at(now) {
                        info!(code = %code, "returning existing short code for url");
                        return Ok(self.shortened(code, record));
                    }
                }
                self.generate_unique_code().await?
            }
        };

        let record = UrlRecord {
            original_url: params.original_url,
            created_at: now,
            expire_at: Self::expire_at(now, params.expiration)?,
            click_count: 0,
        };

        self.repository.insert(&code, record.clone()).await?;
        info!(code = %code, expire_at = ?record.expire_at, "url shortened");

        Ok(self.shortened(code, record))
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        let Some(record) = self.repository.get(code).await? else {
            debug!(code = %code, "short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        if record.is_expired() {
            debug!(code = %code, "short code expired");
            return Err(ShortenerError::Expired(code.to_string()));
        }

        if !self.repository.record_click(code).await? {
            debug!(code = %code, "short code removed before click was recorded");
        }
        Ok(record.original_url)
    }

    async fn stats(&self, code: &ShortCode) -> Result<UrlStats> {
        let record = self
            .repository
            .get(code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound(code.to_string()))?;

        Ok(UrlStats {
            code: code.clone(),
            original_url: record.original_url,
            click_count: record.click_count,
            created_at: record.created_at,
            expire_at: record.expire_at,
        })
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        if !self.repository.delete(code).await? {
            warn!(code = %code, "cannot delete unknown short code");
            return Err(ShortenerError::NotFound(code.to_string()));
        }
        info!(code = %code, "short url deleted");
        Ok(())
    }
}
