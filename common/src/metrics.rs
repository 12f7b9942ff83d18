use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single point-in-time reading for one monitored service.
///
/// `cpu_limit`/`memory_limit` of `0.0` mean "unknown" — callers must treat
/// the corresponding percent as 0 and not act on that resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub cpu_limit: f64,
    pub memory_limit: f64,
    pub timestamp: DateTime<Utc>,
}

impl ResourceMetrics {
    pub fn unknown(timestamp: DateTime<Utc>) -> Self {
        Self {
            cpu_usage: 0.0,
            memory_usage: 0.0,
            cpu_limit: 0.0,
            memory_limit: 0.0,
            timestamp,
        }
    }

    pub fn cpu_percent(&self) -> f64 {
        if self.cpu_limit > 0.0 {
            self.cpu_usage / self.cpu_limit
        } else {
            0.0
        }
    }

    pub fn memory_percent(&self) -> f64 {
        if self.memory_limit > 0.0 {
            self.memory_usage / self.memory_limit
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_zero_when_limit_unknown() {
        let m = ResourceMetrics {
            cpu_usage: 1.5,
            memory_usage: 1024.0,
            cpu_limit: 0.0,
            memory_limit: 0.0,
            timestamp: Utc::now(),
        };
        assert_eq!(m.cpu_percent(), 0.0);
        assert_eq!(m.memory_percent(), 0.0);
    }

    #[test]
    fn percent_divides_usage_by_limit() {
        let m = ResourceMetrics {
            cpu_usage: 0.9,
            memory_usage: 512.0,
            cpu_limit: 1.0,
            memory_limit: 1024.0,
            timestamp: Utc::now(),
        };
        assert_eq!(m.cpu_percent(), 0.9);
        assert_eq!(m.memory_percent(), 0.5);
    }
}
