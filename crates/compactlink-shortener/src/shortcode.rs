use crate::error::ShortenerError;
use compactlink_idgen::ShortCodeBase62;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// A short code identifying a shortened URL.
///
/// Custom aliases must be 3-32 characters long and contain only
/// alphanumeric characters, hyphens, or underscores.
///
/// Serialized as the bare code string. Two codes are equal when their
/// strings are, whichever variant they came from, matching how records are
/// keyed in storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShortCode {
    /// A system-generated short code minted by the id generator.
    Generated(ShortCodeBase62),
    /// A user-provided custom short code.
    Custom(String),
}

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 32;

impl ShortCode {
    /// Wraps a minted base62 code.
    pub fn generated(code: impl Into<ShortCodeBase62>) -> Self {
        Self::Generated(code.into())
    }

    /// Creates a custom `ShortCode` after validating the input.
    ///
    /// Valid codes are 3-32 characters and contain only `[a-zA-Z0-9_-]`.
    pub fn new(code: impl Into<String>) -> std::result::Result<Self, ShortenerError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self::Custom(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self::Custom(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShortCode::Generated(code) => code.as_str(),
            ShortCode::Custom(s) => s.as_str(),
        }
    }

    fn validate(code: &str) -> std::result::Result<(), ShortenerError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(ShortenerError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ShortenerError::InvalidShortCode(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl PartialEq for ShortCode {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ShortCode {}

impl Hash for ShortCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortCode::Generated(code) => write!(f, "{}", code),
            ShortCode::Custom(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("abc").is_ok());
        assert!(ShortCode::new("Abc-123_xyz").is_ok());
        assert!(ShortCode::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn too_short() {
        assert!(ShortCode::new("ab").is_err());
        assert!(ShortCode::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc!def").is_err());
    }

    #[test]
    fn display_custom() {
        let code = ShortCode::new("my-code").unwrap();
        assert_eq!(code.to_string(), "my-code");
    }

    #[test]
    fn display_generated() {
        let minted = compactlink_idgen::base62::encode(61).unwrap();
        let code = ShortCode::generated(minted);
        assert_eq!(code.to_string(), "000000z");
        assert_eq!(code.as_str(), "000000z");
    }

    #[test]
    fn serializes_as_plain_string() {
        let generated = ShortCode::generated(compactlink_idgen::base62::encode(62).unwrap());
        assert_eq!(serde_json::to_string(&generated).unwrap(), "\"0000010\"");

        let parsed: ShortCode = serde_json::from_str("\"0000010\"").unwrap();
        assert_eq!(parsed, generated);

        let custom: ShortCode = serde_json::from_str("\"my-alias\"").unwrap();
        assert_eq!(custom, ShortCode::new_unchecked("my-alias"));
    }

    #[test]
    fn equality_follows_the_code_string() {
        use std::collections::HashSet;

        let minted = compactlink_idgen::base62::encode(62).unwrap();
        let generated = ShortCode::generated(minted);
        let custom = ShortCode::new("0000010").unwrap();
        assert_eq!(generated, custom);

        let set: HashSet<_> = [generated, custom].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert_ne!(ShortCode::new("abc").unwrap(), ShortCode::new("abd").unwrap());
    }

    #[test]
    fn custom_alias_survives_json_round_trip() {
        let custom = ShortCode::new("abc1234").unwrap();
        let json = serde_json::to_string(&custom).unwrap();
        assert_eq!(json, "\"abc1234\"");

        let back: ShortCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
        assert_eq!(back.as_str(), "abc1234");
    }

    #[test]
    fn to_url_custom() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(code.to_url("http://localhost:8080"), "http://localhost:8080/abc123");
        assert_eq!(
            code.to_url("http://localhost:8080/"),
            "http://localhost:8080/abc123"
        );
    }
}
