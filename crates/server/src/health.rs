use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use highfive_db::LedgerStore;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    store: Arc<dyn LedgerStore>,
}

impl HealthState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub ledger: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let ledger = ledger_check(state.store.as_ref()).await;
    let ready = ledger.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "highfive-server runtime initialized".to_string(),
        },
        ledger,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn ledger_check(store: &dyn LedgerStore) -> HealthCheck {
    match store.snapshot().await {
        Ok(snapshot) => HealthCheck {
            status: "ready",
            detail: format!(
                "{} ledger readable ({} givers, {} receivers)",
                store.backend(),
                snapshot.given_counts.len(),
                snapshot.received_counts.len()
            ),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("{} ledger unavailable: {error}", store.backend()),
        },
    }
}
