//! Actuator variants that enact an `AdjustmentDecision`: a direct in-place
//! update against the container runtime, or an external blue/green script
//! invocation. Both expose `apply(decision) -> bool`; the caller (the
//! controller loop) is responsible for updating service state on success.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::UpdateContainerOptions;
use bollard::Docker;
use common::units::parse_memory;
use common::AdjustmentDecision;
use tokio::process::Command;
use tracing::{error, info, warn};

#[async_trait]
pub trait Actuator: Send + Sync {
    async fn apply(&self, decision: &AdjustmentDecision) -> bool;
}

/// CPU quota units per core, per the container runtime's CFS bandwidth
/// controller (`cpu.cfs_quota_us` is quota / 100000 cores).
const QUOTA_UNITS_PER_CORE: i64 = 100_000;

pub struct DirectActuator {
    docker: Docker,
}

impl DirectActuator {
    pub fn connect(host: &str) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix(host, 120, bollard::API_DEFAULT_VERSION)?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl Actuator for DirectActuator {
    async fn apply(&self, decision: &AdjustmentDecision) -> bool {
        let cpu_quota = (decision.new_cpu * QUOTA_UNITS_PER_CORE as f64).round() as i64;
        let memory_bytes = parse_memory(&decision.new_memory) as i64;

        let options = UpdateContainerOptions::<String> {
            cpu_quota: Some(cpu_quota),
            memory: Some(memory_bytes),
            ..Default::default()
        };

        match self.docker.update_container(&decision.service_name, options).await {
            Ok(_) => {
                info!(service = %decision.service_name, cpu_quota, memory_bytes, "direct actuation applied");
                true
            }
            Err(err) => {
                error!(service = %decision.service_name, %err, "direct actuation failed");
                false
            }
        }
    }
}

pub struct BlueGreenActuator {
    script: String,
    timeout: Duration,
}

impl BlueGreenActuator {
    pub fn new(script: impl Into<String>, timeout: Duration) -> Self {
        Self { script: script.into(), timeout }
    }
}

#[async_trait]
impl Actuator for BlueGreenActuator {
    async fn apply(&self, decision: &AdjustmentDecision) -> bool {
        let mut cmd = Command::new(&self.script);
        cmd.arg(&decision.service_name)
            .arg(decision.new_cpu.to_string())
            .arg(&decision.new_memory)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                error!(script = %self.script, %err, "failed to spawn blue/green script");
                return false;
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                error!(script = %self.script, %err, "blue/green script I/O failed");
                return false;
            }
            Err(_) => {
                error!(script = %self.script, timeout_secs = self.timeout.as_secs(), "blue/green script timed out");
                return false;
            }
        };

        if output.status.success() {
            info!(service = %decision.service_name, "blue/green deployment succeeded");
            true
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(service = %decision.service_name, status = %output.status, %stderr, "blue/green deployment failed");
            false
        }
    }
}
