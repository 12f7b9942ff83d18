use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{Action, ResourceType};

/// Well-known event-type names, used both as the `event` field value and as
/// entries in `notifications.events` allow-lists.
pub mod event_kind {
    pub const RESOURCE_ADJUSTMENT: &str = "resource_adjustment";
    pub const BLUE_GREEN_DEPLOYMENT: &str = "blue_green_deployment";
    pub const DEPLOYMENT_FAILURE: &str = "deployment_failure";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub event: String,
    pub service: String,
    pub action: Action,
    pub resource_type: ResourceType,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        event: impl Into<String>,
        service: impl Into<String>,
        action: Action,
        resource_type: ResourceType,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event: event.into(),
            service: service.into(),
            action,
            resource_type,
            reason: reason.into(),
            timestamp,
        }
    }
}
