use chrono::{DateTime, Utc};

/// Time-injection seam used by the controller so cooldown and daily-reset
/// logic can be exercised in tests without real wall-clock delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only advances when told to. Lives outside `#[cfg(test)]`
/// so other crates in the workspace can use it in their own test modules.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: std::sync::Arc::new(std::sync::Mutex::new(start)),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.current.lock().expect("manual clock poisoned");
        *guard += duration;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.current.lock().expect("manual clock poisoned");
        *guard = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("manual clock poisoned")
    }
}
