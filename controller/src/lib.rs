mod decision;
mod gate;
mod store;

pub use decision::DecisionEngine;
pub use gate::Gate;
pub use store::ServiceStateStore;

use std::sync::Arc;

use actuator::Actuator;
use common::{event_kind, Clock, NotificationEvent};
use metrics_gateway::MetricsGateway;
use notifier::Notifier;
use settings::Settings;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{error, info, warn};

/// Periodic driver: for every monitored service, fetch metrics, advance
/// state, produce a decision, gate it, actuate, and update state on success.
/// Services are processed strictly one at a time, so `ServiceStateStore` has
/// a single writer and needs no locking.
pub struct ControllerLoop {
    settings: Arc<Settings>,
    gateway: Arc<dyn MetricsGateway>,
    actuator: Arc<dyn Actuator>,
    notifier: Arc<Notifier>,
    clock: Arc<dyn Clock>,
    store: ServiceStateStore,
    success_event_kind: &'static str,
}

impl ControllerLoop {
    pub fn new(
        settings: Arc<Settings>,
        gateway: Arc<dyn MetricsGateway>,
        actuator: Arc<dyn Actuator>,
        notifier: Arc<Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let success_event_kind = if settings.blue_green.enabled {
            event_kind::BLUE_GREEN_DEPLOYMENT
        } else {
            event_kind::RESOURCE_ADJUSTMENT
        };

        Self {
            settings,
            gateway,
            actuator,
            notifier,
            clock,
            store: ServiceStateStore::new(),
            success_event_kind,
        }
    }

    /// Runs until `shutdown` carries `true`. A shutdown request is only
    /// observed between services or during the inter-tick sleep; an
    /// in-flight actuator invocation always runs to completion or its own
    /// timeout.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("controller loop starting");

        while !*shutdown.borrow() {
            if let Err(err) = self.tick().await {
                error!(%err, "unexpected controller loop failure, backing off 60s");
                tokio::time::sleep(Duration::from_secs(60)).await;
                continue;
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(self.settings.monitoring.check_interval)) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("controller loop shutdown signal received, exiting cleanly");
    }

    /// One pass over all monitored services. Public so integration tests can
    /// step the loop deterministically instead of racing real sleeps.
    pub async fn tick(&mut self) -> anyhow::Result<()> {
        let monitored = self.settings.services.monitored.clone();
        for service_name in &monitored {
            self.process_service(service_name).await;
        }
        Ok(())
    }

    async fn process_service(&mut self, service_name: &str) {
        let metrics = self.gateway.get_metrics(service_name).await;
        let now = self.clock.now();

        let decision = {
            let state = self.store.get_or_create(service_name, now);
            DecisionEngine::evaluate(
                service_name,
                &metrics,
                state,
                &self.settings.thresholds,
                &self.settings.adjustment,
                &self.settings.services,
            )
        };

        let dry_run = !self.settings.automation.enabled || self.settings.automation.dry_run;
        let admitted = {
            let state = self.store.get_or_create(service_name, now);
            Gate::should_adjust(&decision, state, &self.settings.adjustment, dry_run, now)
        };

        if !admitted {
            return;
        }

        let success = self.actuator.apply(&decision).await;

        if success {
            {
                let state = self.store.get_or_create(service_name, now);
                state.record_actuation(now);
            }
            let event = NotificationEvent::new(
                self.success_event_kind,
                service_name,
                decision.action,
                decision.resource_type,
                decision.reason.clone(),
                now,
            );
            self.notifier.emit(&event).await;
        } else {
            warn!(service = service_name, "actuation failed, state left untouched");
            let event = NotificationEvent::new(
                event_kind::DEPLOYMENT_FAILURE,
                service_name,
                decision.action,
                decision.resource_type,
                decision.reason.clone(),
                now,
            );
            self.notifier.emit(&event).await;
        }
    }
}
