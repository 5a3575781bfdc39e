use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("alias already exists: {0}")]
    AliasConflict(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("url not found for short code: {0}")]
    NotFound(String),
    #[error("url has expired for short code: {0}")]
    Expired(String),
    #[error("no free short code after {attempts} attempts")]
    CollisionLimit { attempts: usize },
    #[error("id generator failed: {0}")]
    Generator(#[from] compactlink_idgen::Error),
    #[error("id generator task did not complete: {0}")]
    GeneratorUnavailable(String),
}
