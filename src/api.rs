use std::{collections::HashMap, sync::Arc};

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use chrono::Utc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    dispatch::NotificationDispatcher,
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
    resolver::AccountResolver,
    wire::encode_notification_response,
};

pub struct AppState {
    dispatcher: NotificationDispatcher,
    resolver: AccountResolver,
}

pub fn build_router(dispatcher: NotificationDispatcher, resolver: AccountResolver) -> Router {
    let state = Arc::new(AppState {
        dispatcher,
        resolver,
    });

    Router::new()
        .route("/notifications", post(receive_notifications))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(
    config: Config,
    dispatcher: NotificationDispatcher,
    resolver: AccountResolver,
) -> Result<(), Error> {
    let app = build_router(dispatcher, resolver);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;

    info!(address = %addr, "Notification server started");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Server failed: {}", e))?;

    Ok(())
}

async fn receive_notifications(
    State(state): State<Arc<AppState>>,
    body: String,
) -> impl IntoResponse {
    let report = state.dispatcher.dispatch(&body).await;
    let reply = encode_notification_response(report.acknowledgement);

    // The gateway reads the body token; both outcomes ship as 200 so the
    // transport layer never triggers its own retries on top of the token.
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        reply,
    )
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let configuration = if state.resolver.has_default_merchant_account() {
        ServiceHealth::healthy()
    } else {
        ServiceHealth::degraded("No default merchant account configured".to_string())
    };

    let mut checks = HashMap::new();
    checks.insert("configuration".to_string(), configuration);

    let status = if checks
        .values()
        .any(|check| check.status != HealthStatus::Healthy)
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let health = HealthCheckResponse {
        status,
        timestamp: Utc::now(),
        checks,
    };

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}
