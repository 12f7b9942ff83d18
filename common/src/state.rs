use chrono::{DateTime, Utc};

/// Per-service control state, created lazily on first observation.
///
/// Mutated only by the controller loop (single writer) — see
/// `controller::store::ServiceStateStore`.
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub consecutive_high_cpu: u32,
    pub consecutive_low_cpu: u32,
    pub consecutive_high_memory: u32,
    pub consecutive_low_memory: u32,
    pub last_adjustment: Option<DateTime<Utc>>,
    pub adjustments_today: u32,
    pub last_reset: DateTime<Utc>,
}

impl ServiceState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            consecutive_high_cpu: 0,
            consecutive_low_cpu: 0,
            consecutive_high_memory: 0,
            consecutive_low_memory: 0,
            last_adjustment: None,
            adjustments_today: 0,
            last_reset: now,
        }
    }

    /// Resets all four hysteresis counters, e.g. after a successful actuation.
    pub fn reset_counters(&mut self) {
        self.consecutive_high_cpu = 0;
        self.consecutive_low_cpu = 0;
        self.consecutive_high_memory = 0;
        self.consecutive_low_memory = 0;
    }

    /// Records a successful actuation at `now`.
    pub fn record_actuation(&mut self, now: DateTime<Utc>) {
        self.reset_counters();
        self.last_adjustment = Some(now);
        self.adjustments_today += 1;
    }

    /// Resets the daily counter if `now` falls on a different calendar day
    /// than `last_reset`.
    pub fn roll_day_if_needed(&mut self, now: DateTime<Utc>) {
        if self.last_reset.date_naive() != now.date_naive() {
            self.adjustments_today = 0;
            self.last_reset = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_actuation_resets_counters_and_bumps_daily_count() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut state = ServiceState::new(start);
        state.consecutive_high_cpu = 3;
        state.consecutive_low_memory = 2;

        let actuated_at = start + chrono::Duration::minutes(5);
        state.record_actuation(actuated_at);

        assert_eq!(state.consecutive_high_cpu, 0);
        assert_eq!(state.consecutive_low_memory, 0);
        assert_eq!(state.last_adjustment, Some(actuated_at));
        assert_eq!(state.adjustments_today, 1);
    }

    #[test]
    fn roll_day_if_needed_resets_only_on_date_change() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 23, 0, 0).unwrap();
        let mut state = ServiceState::new(start);
        state.adjustments_today = 4;

        state.roll_day_if_needed(start + chrono::Duration::minutes(30));
        assert_eq!(state.adjustments_today, 4, "same day: no reset");

        let next_day = start + chrono::Duration::hours(2);
        state.roll_day_if_needed(next_day);
        assert_eq!(state.adjustments_today, 0, "new day: reset");
        assert_eq!(state.last_reset, next_day);
    }
}
