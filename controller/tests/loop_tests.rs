use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{AdjustmentDecision, ManualClock, ResourceMetrics};
use controller::ControllerLoop;
use metrics_gateway::MetricsGateway;
use notifier::Notifier;
use settings::*;

struct ConstantGateway {
    cpu_percent: f64,
}

#[async_trait]
impl MetricsGateway for ConstantGateway {
    async fn get_metrics(&self, _service_name: &str) -> ResourceMetrics {
        ResourceMetrics {
            cpu_usage: self.cpu_percent,
            memory_usage: 0.1,
            cpu_limit: 1.0,
            memory_limit: 1_000_000_000.0,
            timestamp: Utc::now(),
        }
    }
}

struct CountingActuator {
    applications: Arc<AtomicUsize>,
}

#[async_trait]
impl actuator::Actuator for CountingActuator {
    async fn apply(&self, _decision: &AdjustmentDecision) -> bool {
        self.applications.fetch_add(1, Ordering::SeqCst);
        true
    }
}

fn test_settings(max_adjustments_per_day: u32, cooldown_period: u64) -> Settings {
    Settings {
        monitoring: MonitoringSettings {
            prometheus_url: "http://localhost:9090".to_string(),
            analysis_window: "5m".to_string(),
            check_interval: 60,
        },
        docker: DockerSettings { host: "unix:///var/run/docker.sock".to_string() },
        thresholds: ThresholdSettings {
            cpu_high_configured: 0.8,
            cpu_low_configured: 0.2,
            memory_high_configured: 0.8,
            memory_low_configured: 0.2,
            consecutive_checks: 1,
        },
        adjustment: AdjustmentSettings {
            increase_factor_configured: 1.5,
            decrease_factor_configured: 0.75,
            min_cpu: 0.1,
            max_cpu: 4.0,
            min_memory: "64M".to_string(),
            max_memory: "4096M".to_string(),
            cooldown_period,
            max_adjustments_per_day,
        },
        services: ServicesSettings {
            monitored: vec!["checkout".to_string()],
            critical: HashSet::new(),
            baseline: HashMap::new(),
        },
        automation: AutomationSettings { enabled: true, dry_run: false },
        blue_green: BlueGreenSettings {
            enabled: false,
            script: "./scripts/blue_green_deploy.sh".to_string(),
            health_check_timeout: 30,
        },
        notifications: NotificationSettings {
            enabled: false,
            events: vec![],
            channels: ChannelsSettings {
                alertmanager: AlertmanagerSettings { enabled: false, url: String::new() },
                logfile: LogfileSettings { enabled: false },
            },
        },
        metrics: MetricsSettings { enabled: true, port: 9100 },
        logging: LoggingSettings { level: "info".to_string(), file: None },
    }
}

fn idle_notifier() -> Arc<Notifier> {
    Arc::new(Notifier::new(NotificationSettings {
        enabled: false,
        events: vec![],
        channels: ChannelsSettings {
            alertmanager: AlertmanagerSettings { enabled: false, url: String::new() },
            logfile: LogfileSettings { enabled: false },
        },
    }))
}

#[tokio::test]
async fn daily_cap_blocks_third_actuation_across_ticks() {
    let settings = Arc::new(test_settings(2, 0));
    let gateway: Arc<dyn MetricsGateway> = Arc::new(ConstantGateway { cpu_percent: 0.95 });
    let applications = Arc::new(AtomicUsize::new(0));
    let actuator: Arc<dyn actuator::Actuator> = Arc::new(CountingActuator { applications: applications.clone() });
    let clock: Arc<dyn common::Clock> = Arc::new(ManualClock::new(Utc::now()));

    let mut controller_loop = ControllerLoop::new(settings, gateway, actuator, idle_notifier(), clock);

    for _ in 0..3 {
        controller_loop.tick().await.unwrap();
    }

    assert_eq!(applications.load(Ordering::SeqCst), 2, "third tick must be denied by the daily cap");
}

#[tokio::test]
async fn cooldown_blocks_immediate_repeat_actuation() {
    let settings = Arc::new(test_settings(10, 300));
    let gateway: Arc<dyn MetricsGateway> = Arc::new(ConstantGateway { cpu_percent: 0.95 });
    let applications = Arc::new(AtomicUsize::new(0));
    let actuator: Arc<dyn actuator::Actuator> = Arc::new(CountingActuator { applications: applications.clone() });
    let manual_clock = ManualClock::new(Utc::now());
    let clock: Arc<dyn common::Clock> = Arc::new(manual_clock.clone());

    let mut controller_loop = ControllerLoop::new(settings, gateway, actuator, idle_notifier(), clock);

    controller_loop.tick().await.unwrap();
    assert_eq!(applications.load(Ordering::SeqCst), 1);

    manual_clock.advance(chrono::Duration::seconds(30));
    controller_loop.tick().await.unwrap();
    assert_eq!(applications.load(Ordering::SeqCst), 1, "within cooldown, second tick must not actuate");

    manual_clock.advance(chrono::Duration::seconds(300));
    controller_loop.tick().await.unwrap();
    assert_eq!(applications.load(Ordering::SeqCst), 2, "past cooldown, third tick actuates again");
}
