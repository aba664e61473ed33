use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use cashflow_core::scheduler::{RunSummary, SchedulerServiceTrait, SchedulerStatus};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RunRequest {
    date: Option<NaiveDate>,
}

/// Same path as the daily timer; refused with 409 while a run is in flight.
async fn run_now(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunRequest>,
) -> ApiResult<Json<RunSummary>> {
    let summary = state.scheduler.run_now(body.date).await?;
    Ok(Json(summary))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatus> {
    Json(state.scheduler.status())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scheduler/run", post(run_now))
        .route("/scheduler/status", get(status))
}
