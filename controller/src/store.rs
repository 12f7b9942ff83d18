use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::ServiceState;

/// Single-writer map from service name to its control state. Entries are
/// created lazily on first observation; nothing here is shared beyond the
/// controller loop that owns it.
#[derive(Default)]
pub struct ServiceStateStore {
    states: HashMap<String, ServiceState>,
}

impl ServiceStateStore {
    pub fn new() -> Self {
        Self { states: HashMap::new() }
    }

    pub fn get_or_create(&mut self, service_name: &str, now: DateTime<Utc>) -> &mut ServiceState {
        self.states
            .entry(service_name.to_string())
            .or_insert_with(|| ServiceState::new(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lazily_creates_state_on_first_access() {
        let mut store = ServiceStateStore::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(store.states.len(), 0);
        let state = store.get_or_create("checkout", now);
        state.consecutive_high_cpu = 2;
        assert_eq!(store.states.len(), 1);

        let state_again = store.get_or_create("checkout", now);
        assert_eq!(state_again.consecutive_high_cpu, 2, "same entry reused, not reset");
    }
}
