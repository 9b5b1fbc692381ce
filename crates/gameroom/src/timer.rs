use dealroom_core::OFFER_TIMEOUT;
use dealroom_core::TURN_TIMEOUT;
use std::time::Duration;
use tokio::time::Instant;

/// Tracks a single deadline (turn or offer). A room owns at most one of each
/// kind at a time; arming a new one simply overwrites the old deadline, and
/// callers are responsible for cancelling whatever `tokio` task was sleeping
/// on the previous value (see `dealroom-hosting`'s per-room timer handles).
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Self(Instant::now() + duration)
    }
    pub fn turn() -> Self {
        Self::after(TURN_TIMEOUT)
    }
    pub fn offer() -> Self {
        Self::after(OFFER_TIMEOUT)
    }
    pub fn instant(&self) -> Instant {
        self.0
    }
    pub fn expired(&self) -> bool {
        Instant::now() >= self.0
    }
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
    /// Epoch milliseconds for the wire. Computed relative to wall-clock `now`
    /// so the monotonic `Instant` deadline can be projected into a timestamp
    /// clients can render a countdown against.
    pub fn epoch_ms(&self, now_ms: u64) -> u64 {
        now_ms + self.remaining().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_deadline_is_not_expired() {
        let deadline = Deadline::turn();
        assert!(!deadline.expired());
        assert!(deadline.remaining() <= TURN_TIMEOUT);
    }

    #[test]
    fn past_deadline_is_expired() {
        let deadline = Deadline::after(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(deadline.expired());
    }

    #[test]
    fn epoch_ms_is_in_the_future() {
        let deadline = Deadline::offer();
        let now_ms = 1_000_000u64;
        assert!(deadline.epoch_ms(now_ms) >= now_ms);
    }
}
