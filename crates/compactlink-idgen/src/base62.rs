//! Fixed-width base62 rendering of compact ids.
//!
//! Every code is exactly [`CODE_LENGTH`] symbols from [`ALPHABET`], left-padded
//! with `'0'`. The encodable domain is `[0, 62^7)`, which is narrower than the
//! 42-bit id space: values at or above `62^7` are rejected with
//! [`Error::Unencodable`] rather than widened or truncated. With the 2024 epoch
//! the first such ids appear 214_942_297 seconds in (2030-10-23).

use crate::compact_id::CompactId;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;
use std::str::FromStr;

pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
pub const CODE_LENGTH: usize = 7;

const BASE: u64 = ALPHABET.len() as u64;

/// Largest id that still fits in [`CODE_LENGTH`] symbols, `62^7 - 1`.
pub const MAX_ENCODABLE: u64 = BASE.pow(CODE_LENGTH as u32) - 1;

/// Encodes `id` as a 7-character base62 code.
pub fn encode(id: u64) -> Result<ShortCodeBase62, Error> {
    if id > MAX_ENCODABLE {
        return Err(Error::Unencodable { id });
    }

    let mut digits = [ALPHABET[0]; CODE_LENGTH];
    let mut rest = id;
    // fill from the right; untouched slots keep the '0' padding
    for slot in digits.iter_mut().rev() {
        if rest == 0 {
            break;
        }
        *slot = ALPHABET[(rest % BASE) as usize];
        rest /= BASE;
    }

    Ok(ShortCodeBase62(
        digits.iter().copied().map(char::from).collect(),
    ))
}

/// Decodes a 7-character base62 code back into its numeric id.
pub fn decode(code: &str) -> Result<u64, Error> {
    if code.len() != CODE_LENGTH {
        return Err(Error::InvalidCode(format!(
            "expected {} characters, got {}",
            CODE_LENGTH,
            code.len()
        )));
    }

    code.bytes().try_fold(0_u64, |acc, byte| {
        let digit = digit_of(byte).ok_or_else(|| {
            Error::InvalidCode(format!("'{}' is not a base62 symbol in '{}'", byte as char, code))
        })?;
        Ok(acc * BASE + digit)
    })
}

fn digit_of(byte: u8) -> Option<u64> {
    let digit = match byte {
        b'0'..=b'9' => byte - b'0',
        b'A'..=b'Z' => byte - b'A' + 10,
        b'a'..=b'z' => byte - b'a' + 36,
        _ => return None,
    };
    Some(u64::from(digit))
}

/// A short code encoded as a fixed-width base62 string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortCodeBase62(SmolStr);

impl ShortCodeBase62 {
    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric id this code renders.
    pub fn decode(&self) -> Result<u64, Error> {
        decode(&self.0)
    }
}

impl std::fmt::Debug for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCodeBase62").field(&self.0).finish()
    }
}

impl Display for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShortCodeBase62 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)?;
        Ok(Self(SmolStr::new(s)))
    }
}

impl TryFrom<CompactId> for ShortCodeBase62 {
    type Error = Error;

    fn try_from(id: CompactId) -> Result<Self, Self::Error> {
        encode(id.as_u64())
    }
}

impl TryFrom<&ShortCodeBase62> for CompactId {
    type Error = Error;

    fn try_from(code: &ShortCodeBase62) -> Result<Self, Self::Error> {
        CompactId::from_u64(code.decode()?)
    }
}

impl Serialize for ShortCodeBase62 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortCodeBase62 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
