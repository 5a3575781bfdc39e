//! URL shortener workflow built on compact ids.
//!
//! This crate is the caller of `compactlink_idgen`: it turns minted codes into
//! stored URL mappings, re-checking every generated code against the
//! repository before using it.

pub mod error;
pub mod generator;
pub mod repository;
pub mod service;
pub mod shortcode;
pub mod shortener;

pub use error::{Result, ShortenerError};
pub use generator::Generator;
pub use repository::{memory::InMemoryRepository, Repository, UrlRecord};
pub use service::ShortenerService;
pub use shortcode::ShortCode;
pub use shortener::{ExpirationPolicy, ShortenParams, ShortenedUrl, Shortener, UrlStats};
