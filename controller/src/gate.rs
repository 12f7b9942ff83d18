use chrono::{DateTime, Utc};
use common::{Action, AdjustmentDecision, ServiceState};
use settings::AdjustmentSettings;
use tracing::info;

pub struct Gate;

impl Gate {
    /// Ordered checks per `SPEC_FULL.md` §4.5. Day-rollover happens
    /// unconditionally before the cooldown/cap checks, regardless of what
    /// they decide.
    pub fn should_adjust(
        decision: &AdjustmentDecision,
        state: &mut ServiceState,
        adjustment: &AdjustmentSettings,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if decision.action == Action::None {
            return false;
        }

        state.roll_day_if_needed(now);

        if let Some(last) = state.last_adjustment {
            let elapsed = (now - last).num_seconds().max(0) as u64;
            if elapsed < adjustment.cooldown_period {
                info!(
                    service = %decision.service_name,
                    remaining_secs = adjustment.cooldown_period - elapsed,
                    "cooldown active, gate denies actuation"
                );
                return false;
            }
        }

        if state.adjustments_today >= adjustment.max_adjustments_per_day {
            info!(
                service = %decision.service_name,
                adjustments_today = state.adjustments_today,
                "daily adjustment cap reached, gate denies actuation"
            );
            return false;
        }

        if dry_run {
            info!(
                service = %decision.service_name,
                action = ?decision.action,
                resource_type = ?decision.resource_type,
                new_cpu = decision.new_cpu,
                new_memory = %decision.new_memory,
                "[DRY RUN] would actuate, gate denies"
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ResourceType;

    fn adjustment() -> AdjustmentSettings {
        AdjustmentSettings {
            increase_factor_configured: 1.5,
            decrease_factor_configured: 0.75,
            min_cpu: 0.1,
            max_cpu: 4.0,
            min_memory: "64M".to_string(),
            max_memory: "4096M".to_string(),
            cooldown_period: 300,
            max_adjustments_per_day: 2,
        }
    }

    fn increase_decision() -> AdjustmentDecision {
        AdjustmentDecision {
            service_name: "checkout".to_string(),
            action: Action::Increase,
            resource_type: ResourceType::Cpu,
            current_cpu: 1.0,
            current_memory: "512M".to_string(),
            new_cpu: 1.5,
            new_memory: "512M".to_string(),
            reason: "test".to_string(),
        }
    }

    #[test]
    fn none_action_is_always_denied() {
        let mut state = ServiceState::new(Utc::now());
        let decision = AdjustmentDecision::none("checkout", 1.0, "512M".into(), "ok");
        assert!(!Gate::should_adjust(&decision, &mut state, &adjustment(), false, Utc::now()));
    }

    #[test]
    fn cooldown_blocks_second_actuation() {
        let now = Utc::now();
        let mut state = ServiceState::new(now);
        state.last_adjustment = Some(now);
        assert!(!Gate::should_adjust(&increase_decision(), &mut state, &adjustment(), false, now + chrono::Duration::seconds(60)));
    }

    #[test]
    fn daily_cap_denies_third_actuation() {
        let now = Utc::now();
        let mut state = ServiceState::new(now);
        state.adjustments_today = 2;
        state.last_adjustment = Some(now - chrono::Duration::seconds(400));
        assert!(!Gate::should_adjust(&increase_decision(), &mut state, &adjustment(), false, now));
    }

    #[test]
    fn dry_run_denies_but_preserves_counters() {
        let now = Utc::now();
        let mut state = ServiceState::new(now);
        state.consecutive_high_cpu = 3;
        assert!(!Gate::should_adjust(&increase_decision(), &mut state, &adjustment(), true, now));
        assert_eq!(state.consecutive_high_cpu, 3, "dry run must not reset counters");
    }

    #[test]
    fn eligible_decision_is_admitted() {
        let now = Utc::now();
        let mut state = ServiceState::new(now);
        assert!(Gate::should_adjust(&increase_decision(), &mut state, &adjustment(), false, now));
    }
}
