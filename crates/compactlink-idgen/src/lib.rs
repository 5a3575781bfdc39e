//! Compact, machine-partitioned identifier generation.
//!
//! A [`CompactIdGenerator`] mints 42-bit [`CompactId`]s
//! (`timestamp:28 | machine_id:8 | sequence:6`) and renders them as
//! fixed-width, 7-character base-62 short codes.
//!
//! Uniqueness across processes relies on every deployed instance being
//! configured with a distinct machine id. Nothing here detects two
//! instances sharing one.

pub mod base62;
mod clock;
mod compact_id;
pub mod error;
mod generator;

pub use base62::ShortCodeBase62;
pub use clock::{Clock, SystemClock};
pub use compact_id::{CompactId, EPOCH, MAX_MACHINE_ID, MAX_SEQUENCE, MAX_TIMESTAMP_OFFSET};
pub use error::Error;
pub use generator::{CompactIdGenerator, CompactIdSettings};
