//! Layered configuration for the controller: built-in defaults, overridden by
//! an optional YAML file, overridden by a small set of named environment
//! variables. See `SPEC_FULL.md` §4.7 and §6 for the full key list.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use common::units::parse_memory;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/controller.yaml";

const DEFAULT_YAML: &str = r#"
monitoring:
  prometheus_url: "http://localhost:9090"
  analysis_window: "5m"
  check_interval: 60
docker:
  host: "unix:///var/run/docker.sock"
thresholds:
  cpu_high: 0.8
  cpu_low: 0.2
  memory_high: 0.8
  memory_low: 0.2
  consecutive_checks: 3
adjustment:
  increase_factor: 1.5
  decrease_factor: 0.75
  min_cpu: 0.1
  max_cpu: 4.0
  min_memory: "64M"
  max_memory: "4096M"
  cooldown_period: 300
  max_adjustments_per_day: 10
services:
  monitored: []
  critical: []
  baseline: {}
automation:
  enabled: true
  dry_run: false
blue_green:
  enabled: false
  script: "./scripts/blue_green_deploy.sh"
  health_check_timeout: 30
notifications:
  enabled: true
  events:
    - "resource_adjustment"
    - "blue_green_deployment"
    - "deployment_failure"
  channels:
    alertmanager:
      enabled: false
      url: "http://localhost:9093/api/v1/alerts"
    logfile:
      enabled: true
metrics:
  enabled: true
  port: 9100
logging:
  level: "info"
  file: null
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringSettings {
    pub prometheus_url: String,
    pub analysis_window: String,
    pub check_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerSettings {
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSettings {
    #[serde(rename = "cpu_high")]
    pub cpu_high_configured: f64,
    #[serde(rename = "cpu_low")]
    pub cpu_low_configured: f64,
    #[serde(rename = "memory_high")]
    pub memory_high_configured: f64,
    #[serde(rename = "memory_low")]
    pub memory_low_configured: f64,
    pub consecutive_checks: u32,
}

impl ThresholdSettings {
    /// Live: re-checks the environment on every call (see `SPEC_FULL.md` §9).
    pub fn cpu_high(&self) -> f64 {
        env_f64("CPU_HIGH_THRESHOLD").unwrap_or(self.cpu_high_configured)
    }

    pub fn cpu_low(&self) -> f64 {
        env_f64("CPU_LOW_THRESHOLD").unwrap_or(self.cpu_low_configured)
    }

    pub fn memory_high(&self) -> f64 {
        env_f64("MEMORY_HIGH_THRESHOLD").unwrap_or(self.memory_high_configured)
    }

    pub fn memory_low(&self) -> f64 {
        env_f64("MEMORY_LOW_THRESHOLD").unwrap_or(self.memory_low_configured)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentSettings {
    #[serde(rename = "increase_factor")]
    pub increase_factor_configured: f64,
    #[serde(rename = "decrease_factor")]
    pub decrease_factor_configured: f64,
    pub min_cpu: f64,
    pub max_cpu: f64,
    pub min_memory: String,
    pub max_memory: String,
    pub cooldown_period: u64,
    pub max_adjustments_per_day: u32,
}

impl AdjustmentSettings {
    pub fn increase_factor(&self) -> f64 {
        env_f64("INCREASE_FACTOR").unwrap_or(self.increase_factor_configured)
    }

    pub fn decrease_factor(&self) -> f64 {
        env_f64("DECREASE_FACTOR").unwrap_or(self.decrease_factor_configured)
    }

    pub fn min_memory_bytes(&self) -> u64 {
        parse_memory(&self.min_memory)
    }

    pub fn max_memory_bytes(&self) -> u64 {
        parse_memory(&self.max_memory)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Baseline {
    pub cpu: f64,
    pub memory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesSettings {
    pub monitored: Vec<String>,
    pub critical: HashSet<String>,
    pub baseline: HashMap<String, Baseline>,
}

impl ServicesSettings {
    pub fn is_critical(&self, service_name: &str) -> bool {
        self.critical.contains(service_name)
    }

    /// Falls back to `(min_cpu, 64 MiB)` when the service has no configured
    /// baseline, per `SPEC_FULL.md` §4.4.
    pub fn baseline_for(&self, service_name: &str, min_cpu: f64) -> (f64, u64) {
        match self.baseline.get(service_name) {
            Some(b) => (b.cpu, parse_memory(&b.memory)),
            None => (min_cpu, 64 * 1024 * 1024),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutomationSettings {
    pub enabled: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueGreenSettings {
    pub enabled: bool,
    pub script: String,
    pub health_check_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertmanagerSettings {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogfileSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsSettings {
    pub alertmanager: AlertmanagerSettings,
    pub logfile: LogfileSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub events: Vec<String>,
    pub channels: ChannelsSettings,
}

impl NotificationSettings {
    pub fn allows(&self, event_kind: &str) -> bool {
        self.enabled && self.events.iter().any(|e| e == event_kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringSettings,
    pub docker: DockerSettings,
    pub thresholds: ThresholdSettings,
    pub adjustment: AdjustmentSettings,
    pub services: ServicesSettings,
    pub automation: AutomationSettings,
    pub blue_green: BlueGreenSettings,
    pub notifications: NotificationSettings,
    pub metrics: MetricsSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads defaults, layers the YAML file at `cli_config_path` (or
    /// `CONFIG_PATH`, or the built-in default path) on top, applies the
    /// startup-frozen environment overrides, then validates the result.
    pub fn load(cli_config_path: Option<&str>) -> Result<Settings> {
        let path = resolve_config_path(cli_config_path);

        let builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_YAML, config::FileFormat::Yaml))
            .add_source(config::File::from(std::path::Path::new(&path)).required(false));

        let raw = builder.build().context("failed to assemble configuration")?;
        let mut settings: Settings = raw
            .try_deserialize()
            .context("failed to parse configuration into Settings")?;

        settings.apply_startup_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    fn apply_startup_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PROMETHEUS_URL") {
            tracing::debug!(%url, "PROMETHEUS_URL override applied");
            self.monitoring.prometheus_url = url;
        }
        if let Ok(host) = std::env::var("DOCKER_HOST") {
            tracing::debug!(%host, "DOCKER_HOST override applied");
            self.docker.host = host;
        }
        if let Some(interval) = env_u64("CHECK_INTERVAL") {
            tracing::debug!(interval, "CHECK_INTERVAL override applied");
            self.monitoring.check_interval = interval;
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            tracing::debug!(%level, "LOG_LEVEL override applied");
            self.logging.level = level;
        }
        if let Ok(file) = std::env::var("LOG_FILE") {
            tracing::debug!(%file, "LOG_FILE override applied");
            self.logging.file = Some(file);
        }
    }

    fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("cpu_high", t.cpu_high_configured),
            ("cpu_low", t.cpu_low_configured),
            ("memory_high", t.memory_high_configured),
            ("memory_low", t.memory_low_configured),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&value), "thresholds.{name} must be within [0,1], got {value}");
        }
        anyhow::ensure!(t.consecutive_checks >= 1, "thresholds.consecutive_checks must be >= 1");

        let a = &self.adjustment;
        anyhow::ensure!(a.increase_factor_configured > 0.0, "adjustment.increase_factor must be > 0");
        anyhow::ensure!(a.decrease_factor_configured > 0.0, "adjustment.decrease_factor must be > 0");
        anyhow::ensure!(a.min_cpu <= a.max_cpu, "adjustment.min_cpu must be <= max_cpu");
        anyhow::ensure!(a.min_memory_bytes() <= a.max_memory_bytes(), "adjustment.min_memory must be <= max_memory");

        Ok(())
    }
}

fn resolve_config_path(cli_config_path: Option<&str>) -> String {
    if let Ok(path) = std::env::var("CONFIG_PATH") {
        return path;
    }
    cli_config_path
        .map(|p| p.to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
