use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    None,
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    None,
    Cpu,
    Memory,
    Both,
}

/// Output of one Decision Engine evaluation for one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentDecision {
    pub service_name: String,
    pub action: Action,
    pub resource_type: ResourceType,
    pub current_cpu: f64,
    pub current_memory: String,
    pub new_cpu: f64,
    pub new_memory: String,
    pub reason: String,
}

impl AdjustmentDecision {
    /// A decision that changes nothing for `service_name`, carrying the
    /// current readings through unchanged so a caller can still log them.
    pub fn none(service_name: impl Into<String>, current_cpu: f64, current_memory: String, reason: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            action: Action::None,
            resource_type: ResourceType::None,
            current_cpu,
            current_memory: current_memory.clone(),
            new_cpu: current_cpu,
            new_memory: current_memory,
            reason: reason.into(),
        }
    }
}
