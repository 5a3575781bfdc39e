use jiff::Timestamp;
use std::time::Duration;

/// Time source consulted by the generator.
///
/// Injected so the sequence-exhaustion wait can be driven by a simulated
/// clock instead of real sleeps.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
    /// Suspend the calling thread for roughly `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time backed by [`Timestamp::now`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
