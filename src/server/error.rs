use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Survey(#[from] crate::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Both missing configuration and upstream failures surface as 500.
        let status = match &self {
            AppError::Survey { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("Request failed: {}", self);

        let body = json!({
            "status": "error",
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
