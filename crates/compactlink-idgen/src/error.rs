use jiff::Timestamp;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by generator construction, id minting and code encoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid machine id {machine_id}; expected 0..={max_machine_id}")]
    InvalidMachineId { machine_id: i64, max_machine_id: u8 },
    #[error("epoch is ahead of current clock time: epoch={epoch}, now={now}")]
    EpochAhead { epoch: Timestamp, now: Timestamp },
    #[error(
        "clock moved backwards by {regression_seconds}s (last={last}, now={now}); refusing to mint"
    )]
    ClockRegression {
        last: i64,
        now: i64,
        regression_seconds: i64,
    },
    #[error("clock did not pass second {last} within {waited:?} after sequence exhaustion")]
    ClockStalled { last: i64, waited: Duration },
    #[error("overtime limit: timestamp offset {offset}s does not fit 28 bits")]
    OverTimeLimit { offset: i64 },
    #[error("id {id} cannot be encoded in 7 base62 characters")]
    Unencodable { id: u64 },
    #[error("value {value} does not fit in 42 bits")]
    IdOutOfRange { value: u64 },
    #[error("invalid base62 short code: {0}")]
    InvalidCode(String),
    #[error("generator state lock is poisoned")]
    StatePoisoned,
}

impl Error {
    /// Whether this error comes from misconfiguration detected at construction.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::InvalidMachineId { .. } | Error::EpochAhead { .. })
    }
}
