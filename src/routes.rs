use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::data::CustomerStore;
use crate::error::RewardError;
use crate::models::RewardReport;
use crate::rewards::RewardCalculator;

/// Shared by all handlers; both parts are read-only.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CustomerStore>,
    pub calculator: RewardCalculator,
}

impl AppState {
    pub fn new(store: CustomerStore, calculator: RewardCalculator) -> Self {
        Self {
            store: Arc::new(store),
            calculator,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/customers/rewards", get(get_rewards))
        .route("/customers/rewards/", get(missing_customer_id))
        .route("/customers/rewards/:customer_id", get(get_customer_rewards))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().on_failure(()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /customers/rewards
async fn get_rewards(State(state): State<AppState>) -> Result<Json<RewardReport>, RewardError> {
    info!("Fetching rewards data");
    let report = state.calculator.rewards_for_customers(state.store.all())?;
    Ok(Json(report))
}

/// GET /customers/rewards/{customer_id}
async fn get_customer_rewards(
    State(state): State<AppState>,
    customer_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<RewardReport>, RewardError> {
    let Path(customer_id) = customer_id.map_err(|rejection| {
        RewardError::Validation(format!("Customer ID must be an integer: {}", rejection.body_text()))
    })?;

    info!(customer_id, "Fetching rewards data for customer");
    let customer = state.store.find_by_id(customer_id)?;
    let report = state.calculator.rewards_for_customer(customer)?;
    Ok(Json(report))
}

/// GET /customers/rewards/ with the id segment left empty
async fn missing_customer_id() -> RewardError {
    RewardError::Validation("Customer ID cannot be null".to_string())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    RewardError::Computation(detail).into_response()
}
