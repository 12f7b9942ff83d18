use std::sync::Arc;
use std::time::Duration;

use actuator::{Actuator, BlueGreenActuator, DirectActuator};
use clap::Parser;
use common::{Clock, SystemClock};
use controller::ControllerLoop;
use metrics_gateway::{MetricsGateway, PrometheusMetricsGateway};
use notifier::Notifier;
use settings::Settings;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Autonomous resource-management control loop.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: Option<String>,

    /// Produce decisions and log them without actuating.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.dry_run {
        settings.automation.dry_run = true;
    }
    let settings = Arc::new(settings);

    let _log_guard = init_tracing(&settings)?;
    info!("kernel starting");

    let metrics_gateway = PrometheusMetricsGateway::new(
        settings.monitoring.prometheus_url.clone(),
        settings.monitoring.analysis_window.clone(),
    );
    metrics_gateway.wait_until_ready().await;
    let gateway: Arc<dyn MetricsGateway> = Arc::new(metrics_gateway);

    let actuator: Arc<dyn Actuator> = if settings.blue_green.enabled {
        Arc::new(BlueGreenActuator::new(
            settings.blue_green.script.clone(),
            Duration::from_secs(settings.blue_green.health_check_timeout),
        ))
    } else {
        Arc::new(DirectActuator::connect(&settings.docker.host)?)
    };

    let notifier = Arc::new(Notifier::new(settings.notifications.clone()));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    if settings.metrics.enabled {
        let port = settings.metrics.port;
        tokio::spawn(async move {
            if let Err(err) = http_server::run(port).await {
                error!(%err, "health/metrics HTTP server exited");
            }
        });
    }

    let mut controller_loop = ControllerLoop::new(settings, gateway, actuator, notifier, clock);
    controller_loop.run(shutdown_rx).await;

    info!("kernel exiting");
    Ok(())
}

fn init_tracing(settings: &Settings) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    match &settings.logging.file {
        Some(path) => {
            let path = std::path::Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| anyhow::anyhow!("logging.file has no file name"))?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}
