//! Prometheus-backed metrics gateway: turns four PromQL queries per service
//! into a `ResourceMetrics` snapshot. A failed sub-query degrades to 0 rather
//! than aborting the whole fetch — the Decision Engine treats a limit of 0
//! as "no data, do not act on this resource".

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use common::ResourceMetrics;
use serde::Deserialize;
use tracing::warn;

#[async_trait]
pub trait MetricsGateway: Send + Sync {
    async fn get_metrics(&self, service_name: &str) -> ResourceMetrics;
}

pub struct PrometheusMetricsGateway {
    client: reqwest::Client,
    base_url: String,
    analysis_window: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    data: QueryData,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    result: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    value: (f64, String),
}

impl PrometheusMetricsGateway {
    pub fn new(base_url: impl Into<String>, analysis_window: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            analysis_window: analysis_window.into(),
        }
    }

    /// Polls `/-/ready` until it responds successfully. No retry cap: an
    /// operator watching logs is the backstop.
    pub async fn wait_until_ready(&self) {
        let ready_url = format!("{}/-/ready", self.base_url.trim_end_matches('/'));
        loop {
            match self.client.get(&ready_url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                Ok(resp) => warn!(status = %resp.status(), "metrics backend not ready yet"),
                Err(err) => warn!(%err, "metrics backend unreachable"),
            }
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    async fn query_scalar(&self, promql: &str) -> Option<f64> {
        let url = format!("{}/api/v1/query", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .query(&[("query", promql)])
            .send()
            .await
            .ok()?
            .error_for_status()
            .ok()?
            .json::<QueryResponse>()
            .await
            .ok()?;

        resp.data.result.first()?.value.1.parse::<f64>().ok()
    }

    fn cpu_usage_query(&self, service_name: &str) -> String {
        format!(
            "sum(rate(container_cpu_usage_seconds_total{{name=~\".*{service_name}.*\"}}[{window}]))",
            service_name = service_name,
            window = self.analysis_window
        )
    }

    fn memory_usage_query(&self, service_name: &str) -> String {
        format!("sum(container_memory_usage_bytes{{name=~\".*{service_name}.*\"}})")
    }

    fn cpu_limit_query(&self, service_name: &str) -> String {
        format!("sum(container_spec_cpu_quota{{name=~\".*{service_name}.*\"}}) / 100000")
    }

    fn memory_limit_query(&self, service_name: &str) -> String {
        format!("sum(container_spec_memory_limit_bytes{{name=~\".*{service_name}.*\"}})")
    }

    async fn query_one(&self, service_name: &str, field: &str, promql: String) -> f64 {
        match self.query_scalar(&promql).await {
            Some(value) if value.is_finite() => value,
            _ => {
                warn!(service = service_name, field, "metrics sub-query failed or returned no data, using 0");
                0.0
            }
        }
    }
}

#[async_trait]
impl MetricsGateway for PrometheusMetricsGateway {
    async fn get_metrics(&self, service_name: &str) -> ResourceMetrics {
        let cpu_usage = self.query_one(service_name, "cpu_usage", self.cpu_usage_query(service_name)).await;
        let memory_usage = self.query_one(service_name, "memory_usage", self.memory_usage_query(service_name)).await;
        let cpu_limit = self.query_one(service_name, "cpu_limit", self.cpu_limit_query(service_name)).await;
        let memory_limit = self.query_one(service_name, "memory_limit", self.memory_limit_query(service_name)).await;

        ResourceMetrics {
            cpu_usage,
            memory_usage,
            cpu_limit,
            memory_limit,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promql_embeds_service_name_as_substring() {
        let gw = PrometheusMetricsGateway::new("http://localhost:9090", "5m");
        assert!(gw.cpu_usage_query("checkout").contains(".*checkout.*"));
        assert!(gw.memory_usage_query("checkout").contains(".*checkout.*"));
    }
}
