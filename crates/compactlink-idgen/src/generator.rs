use crate::{
    base62::{self, ShortCodeBase62},
    clock::{Clock, SystemClock},
    compact_id::{CompactId, EPOCH, MAX_MACHINE_ID, MAX_SEQUENCE, MAX_TIMESTAMP_OFFSET},
    error::Error,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(2);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Configures a compact id generator instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CompactIdSettings {
    /// Operator-assigned machine id in the range `[0, 255]`.
    ///
    /// Taken as a plain integer so out-of-range configuration values are
    /// reported instead of wrapping.
    pub machine_id: i64,
    /// How long to sleep between clock reads while waiting out an exhausted
    /// second.
    #[builder(default = DEFAULT_POLL_INTERVAL)]
    pub poll_interval: Duration,
    /// Upper bound on that wait. A clock that has not advanced by then is
    /// treated as broken.
    #[builder(default = DEFAULT_MAX_WAIT)]
    pub max_wait: Duration,
}

#[derive(Debug, Default)]
struct GeneratorState {
    /// Unix second of the last successful mint.
    last_timestamp: Option<i64>,
    sequence: u8,
}

/// Snowflake-style generator of 42-bit [`CompactId`]s.
///
/// Mints on one instance serialize on an internal mutex. Within a second the
/// sequence counts up to 63; the 65th mint in the same second polls the clock
/// until the next second starts.
pub struct CompactIdGenerator<C: Clock = SystemClock> {
    machine_id: u8,
    clock: C,
    poll_interval: Duration,
    max_wait: Duration,
    state: Mutex<GeneratorState>,
    total_generated: AtomicU64,
}

impl CompactIdGenerator<SystemClock> {
    /// Creates a generator backed by the real system clock.
    pub fn new(settings: CompactIdSettings) -> Result<Self, Error> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> CompactIdGenerator<C> {
    /// Creates a generator reading time from `clock`.
    pub fn with_clock(settings: CompactIdSettings, clock: C) -> Result<Self, Error> {
        let machine_id = u8::try_from(settings.machine_id).map_err(|_| {
            error!(
                machine_id = settings.machine_id,
                max_machine_id = MAX_MACHINE_ID,
                "invalid machine id"
            );
            Error::InvalidMachineId {
                machine_id: settings.machine_id,
                max_machine_id: MAX_MACHINE_ID,
            }
        })?;

        let now = clock.now();
        if EPOCH > now {
            return Err(Error::EpochAhead { epoch: EPOCH, now });
        }

        info!(
            machine_id,
            max_per_second = u32::from(MAX_SEQUENCE) + 1,
            "compact id generator initialized"
        );

        Ok(Self {
            machine_id,
            clock,
            poll_interval: settings.poll_interval.max(MIN_POLL_INTERVAL),
            max_wait: settings.max_wait,
            state: Mutex::new(GeneratorState::default()),
            total_generated: AtomicU64::new(0),
        })
    }

    pub fn machine_id(&self) -> u8 {
        self.machine_id
    }

    /// Number of ids minted so far. Observational only.
    pub fn total_generated(&self) -> u64 {
        self.total_generated.load(Ordering::Relaxed)
    }

    /// Mints the next id and renders it as a 7-character base62 code.
    ///
    /// Fails with [`Error::Unencodable`] once ids outgrow `62^7`; see
    /// [`base62`] for when that happens.
    pub fn mint_short_code(&self) -> Result<ShortCodeBase62, Error> {
        let id = self.mint_id()?;
        let code = base62::encode(id.as_u64())?;
        debug!(id = id.as_u64(), code = %code, "minted short code");
        Ok(code)
    }

    /// Mints the next unique [`CompactId`].
    ///
    /// - a clock that moved backwards is reported, never waited out
    /// - an exhausted sequence waits for the next second
    ///
    /// On error the generator state is left exactly as it was.
    pub fn mint_id(&self) -> Result<CompactId, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        let reading = self.clock.now();
        let mut now = reading.as_second();

        let sequence = match state.last_timestamp {
            None => 0,
            Some(last) if now < last => {
                let regression_seconds = last - now;
                error!(
                    machine_id = self.machine_id,
                    last,
                    now,
                    regression_seconds,
                    "clock moved backwards, refusing to mint"
                );
                return Err(Error::ClockRegression {
                    last,
                    now,
                    regression_seconds,
                });
            }
            Some(last) if now == last => {
                let next = (state.sequence + 1) & MAX_SEQUENCE;
                if next == 0 {
                    warn!(
                        machine_id = self.machine_id,
                        per_second = u32::from(MAX_SEQUENCE) + 1,
                        "sequence exhausted, waiting for next second"
                    );
                    now = self.wait_for_next_second(last)?;
                }
                next
            }
            Some(_) => {
                if state.sequence > 0 {
                    debug!(
                        previous_second_count = u32::from(state.sequence) + 1,
                        "new second started"
                    );
                }
                0
            }
        };

        let offset = now - EPOCH.as_second();
        if offset < 0 {
            return Err(Error::EpochAhead {
                epoch: EPOCH,
                now: reading,
            });
        }
        if offset > MAX_TIMESTAMP_OFFSET {
            return Err(Error::OverTimeLimit { offset });
        }

        let id = CompactId::pack(offset as u32, self.machine_id, sequence);

        state.last_timestamp = Some(now);
        state.sequence = sequence;
        let total = self.total_generated.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(
            id = id.as_u64(),
            sequence,
            total_generated = total,
            "minted compact id"
        );

        Ok(id)
    }

    /// Polls the clock until it reads a second strictly after `last`.
    fn wait_for_next_second(&self, last: i64) -> Result<i64, Error> {
        let mut waited = Duration::ZERO;
        loop {
            if waited >= self.max_wait {
                error!(
                    machine_id = self.machine_id,
                    last,
                    waited_ms = waited.as_millis() as u64,
                    "clock did not advance while waiting for next second"
                );
                return Err(Error::ClockStalled { last, waited });
            }

            self.clock.sleep(self.poll_interval);
            waited += self.poll_interval;

            let now = self.clock.now().as_second();
            if now > last {
                debug!(waited_ms = waited.as_millis() as u64, now, "resumed after wait");
                return Ok(now);
            }
        }
    }
}
