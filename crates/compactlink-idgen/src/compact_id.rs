use crate::error::Error;
use jiff::{SignedDuration, Timestamp};
use modular_bitfield::prelude::*;
use std::cmp::Ordering;
use std::fmt;

/// 2024-01-01T00:00:00Z, the zero point of the timestamp field.
pub const EPOCH: Timestamp = Timestamp::constant(1_704_067_200, 0);

const SEQUENCE_BITS: u32 = 6;
const MACHINE_ID_BITS: u32 = 8;
const TIMESTAMP_BITS: u32 = 28;

const MACHINE_ID_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + MACHINE_ID_BITS;

/// Largest value representable by the 42 id bits.
pub(crate) const MAX_ID: u64 = (1_u64 << (TIMESTAMP_BITS + MACHINE_ID_BITS + SEQUENCE_BITS)) - 1;

pub const MAX_MACHINE_ID: u8 = u8::MAX;
pub const MAX_SEQUENCE: u8 = (1 << SEQUENCE_BITS) - 1;
pub const MAX_TIMESTAMP_OFFSET: i64 = (1 << TIMESTAMP_BITS) - 1;

/// A 42-bit identifier, laid out from the least significant bit upwards.
///
/// Numerically the id equals `(timestamp << 14) | (machine_id << 6) | sequence`,
/// so ids minted later by the same generator compare greater.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactId {
    /// 6 bits for sequence number (resets every second).
    pub sequence: B6,
    /// 8 bits for machine ID (allows up to 256 instances).
    pub machine_id: B8,
    /// 28 bits for timestamp (seconds since [`EPOCH`]).
    pub timestamp: B28,
    #[skip]
    __: B6,
}

impl CompactId {
    /// Packs the three fields. Callers guarantee each value fits its width.
    pub(crate) fn pack(timestamp: u32, machine_id: u8, sequence: u8) -> Self {
        CompactId::new()
            .with_timestamp(timestamp)
            .with_machine_id(machine_id)
            .with_sequence(sequence)
    }

    /// Returns the numeric value of the id.
    pub fn as_u64(&self) -> u64 {
        (u64::from(self.timestamp()) << TIMESTAMP_SHIFT)
            | (u64::from(self.machine_id()) << MACHINE_ID_SHIFT)
            | u64::from(self.sequence())
    }

    /// Unpacks a numeric id, rejecting values wider than 42 bits.
    pub fn from_u64(value: u64) -> Result<Self, Error> {
        if value > MAX_ID {
            return Err(Error::IdOutOfRange { value });
        }

        Ok(Self::pack(
            (value >> TIMESTAMP_SHIFT) as u32,
            ((value >> MACHINE_ID_SHIFT) & u64::from(MAX_MACHINE_ID)) as u8,
            (value & u64::from(MAX_SEQUENCE)) as u8,
        ))
    }

    /// The second this id was minted in.
    pub fn issued_at(&self) -> Timestamp {
        EPOCH + SignedDuration::from_secs(i64::from(self.timestamp()))
    }
}

impl From<CompactId> for u64 {
    fn from(id: CompactId) -> Self {
        id.as_u64()
    }
}

impl TryFrom<u64> for CompactId {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        CompactId::from_u64(value)
    }
}

impl PartialOrd for CompactId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompactId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_u64().cmp(&other.as_u64())
    }
}

impl fmt::Debug for CompactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactId")
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
