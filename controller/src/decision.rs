//! Threshold evaluation and decision assembly. Stateless beyond the
//! `ServiceState` counters it mutates — every threshold and factor is
//! re-resolved from `settings` on each call so that environment overrides
//! (see `settings::ThresholdSettings`/`AdjustmentSettings`) take effect live.

use common::units::bytes_to_mb;
use common::{Action, AdjustmentDecision, ResourceMetrics, ResourceType, ServiceState};
use settings::{AdjustmentSettings, ServicesSettings, ThresholdSettings};

pub struct DecisionEngine;

impl DecisionEngine {
    pub fn evaluate(
        service_name: &str,
        metrics: &ResourceMetrics,
        state: &mut ServiceState,
        thresholds: &ThresholdSettings,
        adjustment: &AdjustmentSettings,
        services: &ServicesSettings,
    ) -> AdjustmentDecision {
        let k = thresholds.consecutive_checks;

        update_counter(
            metrics.cpu_percent(),
            thresholds.cpu_high(),
            thresholds.cpu_low(),
            &mut state.consecutive_high_cpu,
            &mut state.consecutive_low_cpu,
        );
        update_counter(
            metrics.memory_percent(),
            thresholds.memory_high(),
            thresholds.memory_low(),
            &mut state.consecutive_high_memory,
            &mut state.consecutive_low_memory,
        );

        let current_cpu = metrics.cpu_limit;
        let current_memory_bytes = metrics.memory_limit as u64;
        let current_memory = bytes_to_mb(current_memory_bytes);

        let mut action = Action::None;
        let mut resource_type = ResourceType::None;

        if state.consecutive_high_cpu >= k {
            action = Action::Increase;
            resource_type = ResourceType::Cpu;
        }
        if state.consecutive_high_memory >= k {
            if action == Action::Increase {
                resource_type = ResourceType::Both;
            } else {
                action = Action::Increase;
                resource_type = ResourceType::Memory;
            }
        }

        if action == Action::None {
            let critical = services.is_critical(service_name);
            if state.consecutive_low_cpu >= k && !critical {
                action = Action::Decrease;
                resource_type = ResourceType::Cpu;
            }
            if state.consecutive_low_memory >= k && !critical {
                if action == Action::Decrease {
                    resource_type = ResourceType::Both;
                } else {
                    action = Action::Decrease;
                    resource_type = ResourceType::Memory;
                }
            }
        }

        if action == Action::None {
            return AdjustmentDecision::none(
                service_name,
                current_cpu,
                current_memory,
                "within thresholds",
            );
        }

        let affects_cpu = matches!(resource_type, ResourceType::Cpu | ResourceType::Both);
        let affects_memory = matches!(resource_type, ResourceType::Memory | ResourceType::Both);

        let (baseline_cpu, baseline_memory_bytes) =
            services.baseline_for(service_name, adjustment.min_cpu);

        let new_cpu = if affects_cpu {
            match action {
                Action::Increase => round2((current_cpu * adjustment.increase_factor()).min(adjustment.max_cpu)),
                Action::Decrease => round2(
                    (current_cpu * adjustment.decrease_factor())
                        .max(adjustment.min_cpu.max(baseline_cpu)),
                ),
                Action::None => current_cpu,
            }
        } else {
            current_cpu
        };

        let new_memory_bytes = if affects_memory {
            match action {
                Action::Increase => {
                    ((current_memory_bytes as f64 * adjustment.increase_factor()) as u64)
                        .min(adjustment.max_memory_bytes())
                }
                Action::Decrease => {
                    ((current_memory_bytes as f64 * adjustment.decrease_factor()) as u64)
                        .max(adjustment.min_memory_bytes().max(baseline_memory_bytes))
                }
                Action::None => current_memory_bytes,
            }
        } else {
            current_memory_bytes
        };

        let reason = format!(
            "{action:?}/{resource_type:?}: cpu={:.2}% mem={:.2}% (K={k})",
            metrics.cpu_percent() * 100.0,
            metrics.memory_percent() * 100.0,
        );

        AdjustmentDecision {
            service_name: service_name.to_string(),
            action,
            resource_type,
            current_cpu,
            current_memory,
            new_cpu,
            new_memory: bytes_to_mb(new_memory_bytes),
            reason,
        }
    }
}

fn update_counter(percent: f64, high: f64, low: f64, consecutive_high: &mut u32, consecutive_low: &mut u32) {
    if percent > high {
        *consecutive_high += 1;
        *consecutive_low = 0;
    } else if percent < low {
        *consecutive_low += 1;
        *consecutive_high = 0;
    } else {
        *consecutive_high = 0;
        *consecutive_low = 0;
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
