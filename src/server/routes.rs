use std::sync::Arc;

use axum::{
    extract::State as AxumState,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::{error::AppError, state::State};
use crate::{normalize, with_surveys};

const SURVEY_PAGE: &str = include_str!("../../templates/survey.html");

pub async fn survey_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<Value>, AppError> {
    let envelope = state.gateway.get_survey().await?;
    let surveys = normalize(&envelope);
    info!("Serving {} surveys", surveys.len());

    Ok(Json(json!({
        "status": "success",
        "data": with_surveys(envelope, surveys),
    })))
}

pub async fn debug_survey_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Json<Value>, AppError> {
    let envelope = state.gateway.get_survey().await?;
    Ok(Json(envelope))
}

pub async fn page_handler() -> impl IntoResponse {
    Html(SURVEY_PAGE)
}
