use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use cashflow_core::{recurring::ProcessSummary, scheduler::SchedulerServiceTrait};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{api::shared::require_owner, error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    owner_id: String,
    date: Option<NaiveDate>,
    #[serde(default)]
    preview: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewRequest {
    owner_id: String,
    date: Option<NaiveDate>,
}

async fn process(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProcessRequest>,
) -> ApiResult<Json<ProcessSummary>> {
    let owner_id = require_owner(&body.owner_id)?;
    let summary = state
        .scheduler
        .process(owner_id, body.date, body.preview)
        .await?;
    Ok(Json(summary))
}

async fn preview(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreviewRequest>,
) -> ApiResult<Json<ProcessSummary>> {
    let owner_id = require_owner(&body.owner_id)?;
    let summary = state.scheduler.preview(owner_id, body.date).await?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recurring/process", post(process))
        .route("/recurring/preview", post(preview))
}
