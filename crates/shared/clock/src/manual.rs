use chrono::Duration;
use priceguard_core::Timestamp;
use priceguard_ports::Clock;
use std::sync::{Arc, RwLock};

/// Clock that only advances when explicitly moved
pub struct ManualClock {
    current_time: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(initial_time: Timestamp) -> Arc<Self> {
        Arc::new(Self {
            current_time: RwLock::new(initial_time),
        })
    }

    /// Move time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += duration;
    }

    /// Jump to an explicit instant
    pub fn set_time(&self, time: Timestamp) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
