use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    /// Bad or missing input from the caller
    #[error("{0}")]
    Validation(String),

    #[error("Requested customer id is not found. Customer ID: {0}")]
    CustomerNotFound(i64),

    /// Internal fault while aggregating points
    #[error("{0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, RewardError>;

impl RewardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::CustomerNotFound(_) => StatusCode::NOT_FOUND,
            Self::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed under `"error"` in the response body.
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("Invalid request: {}", msg),
            Self::CustomerNotFound(_) => self.to_string(),
            Self::Computation(msg) => format!("An unexpected error occurred: {}", msg),
        }
    }
}

impl IntoResponse for RewardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::Validation(msg) => tracing::warn!(error = %msg, "Bad request"),
            Self::CustomerNotFound(id) => tracing::warn!(customer_id = *id, "Customer not found"),
            Self::Computation(msg) => tracing::error!(error = %msg, "Reward computation failed"),
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
