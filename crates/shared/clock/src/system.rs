use chrono::Utc;
use priceguard_core::Timestamp;
use priceguard_ports::Clock;

/// Real UTC wall clock
///
/// Stamps `fetched_at` on snapshots and drives the scheduler's last-check
/// bookkeeping in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_utc_now() {
        let clock = SystemClock::new();
        let before = Utc::now();
        let observed = clock.now();
        let after = Utc::now();

        assert!(before <= observed && observed <= after);
    }
}
