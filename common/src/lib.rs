pub mod clock;
pub mod decision;
pub mod metrics;
pub mod notification;
pub mod state;
pub mod units;

pub use clock::{Clock, ManualClock, SystemClock};
pub use decision::{Action, AdjustmentDecision, ResourceType};
pub use metrics::ResourceMetrics;
pub use notification::{event_kind, NotificationEvent};
pub use state::ServiceState;
