//! Health-and-metrics HTTP endpoint. Runs as an independent long-lived
//! worker that shares no mutable state with the controller loop beyond
//! read-only configuration.

use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus { status: "healthy", timestamp: Utc::now() })
}

async fn metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body("# HELP controller_up Whether the controller process is running.\n")
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().finish()
}

/// Binds `0.0.0.0:<port>` and serves until the server is stopped or the
/// process exits; the controller loop runs independently in its own task.
pub async fn run(port: u16) -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics))
            .default_service(web::route().to(not_found))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn health_endpoint_reports_healthy() {
        let app = test::init_service(App::new().route("/health", web::get().to(health))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn metrics_endpoint_returns_plain_text() {
        let app = test::init_service(App::new().route("/metrics", web::get().to(metrics))).await;
        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn unknown_path_is_404() {
        let app = test::init_service(App::new().default_service(web::route().to(not_found))).await;
        let req = test::TestRequest::get().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }
}
