//! Notification sinks: a structured JSON log line and an optional
//! Alertmanager-compatible HTTP POST. Both are gated by a master enable flag
//! and a per-event-type allow-list; a failure in the alert sink is logged
//! and swallowed, never propagated back to the caller.

use std::time::Duration;

use common::NotificationEvent;
use serde::Serialize;
use settings::NotificationSettings;
use tracing::{debug, info, warn};

const ALERTMANAGER_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Notifier {
    settings: NotificationSettings,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(settings: NotificationSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::builder()
                .timeout(ALERTMANAGER_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub async fn emit(&self, event: &NotificationEvent) {
        if !self.settings.allows(&event.event) {
            debug!(event = %event.event, service = %event.service, "notification suppressed");
            return;
        }

        if self.settings.channels.logfile.enabled {
            self.emit_to_log(event);
        }

        if self.settings.channels.alertmanager.enabled {
            self.emit_to_alertmanager(event).await;
        }
    }

    fn emit_to_log(&self, event: &NotificationEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!(target: "notifier", "{json}"),
            Err(err) => warn!(%err, "failed to serialize notification event"),
        }
    }

    async fn emit_to_alertmanager(&self, event: &NotificationEvent) {
        let alert = AlertmanagerAlert {
            labels: AlertLabels {
                alertname: "ResourceAdjustment",
                service: event.service.clone(),
                severity: "info",
            },
            annotations: AlertAnnotations {
                summary: format!("{} for {}", event.event, event.service),
                description: event.reason.clone(),
            },
        };

        let url = &self.settings.channels.alertmanager.url;
        let body = [alert];
        if let Err(err) = self.client.post(url).json(&body).send().await {
            warn!(%err, %url, "alertmanager notification failed, continuing");
        }
    }
}

#[derive(Serialize)]
struct AlertmanagerAlert {
    labels: AlertLabels,
    annotations: AlertAnnotations,
}

#[derive(Serialize)]
struct AlertLabels {
    alertname: &'static str,
    service: String,
    severity: &'static str,
}

#[derive(Serialize)]
struct AlertAnnotations {
    summary: String,
    description: String,
}
