use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use cashflow_core::forecast::{MonthlyForecast, WeeklyForecast, WhatIfForecast, WhatIfScenario};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    api::shared::{date_or_today, require_owner},
    error::ApiResult,
    main_lib::AppState,
};

const DEFAULT_MONTHS: u32 = 12;
const DEFAULT_WEEKS: u32 = 12;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyQuery {
    owner_id: String,
    months: Option<u32>,
    today: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeeklyQuery {
    owner_id: String,
    weeks: Option<u32>,
    today: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhatIfRequest {
    owner_id: String,
    months: Option<u32>,
    today: Option<NaiveDate>,
    #[serde(default)]
    scenario: WhatIfScenario,
}

async fn monthly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthlyQuery>,
) -> ApiResult<Json<MonthlyForecast>> {
    let owner_id = require_owner(&query.owner_id)?;
    let today = date_or_today(&state, query.today);
    let forecast = state
        .forecast_service
        .monthly(owner_id, query.months.unwrap_or(DEFAULT_MONTHS), today)
        .await?;
    Ok(Json(forecast))
}

async fn weekly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeeklyQuery>,
) -> ApiResult<Json<WeeklyForecast>> {
    let owner_id = require_owner(&query.owner_id)?;
    let today = date_or_today(&state, query.today);
    let forecast = state
        .forecast_service
        .weekly(owner_id, query.weeks.unwrap_or(DEFAULT_WEEKS), today)
        .await?;
    Ok(Json(forecast))
}

async fn what_if(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WhatIfRequest>,
) -> ApiResult<Json<WhatIfForecast>> {
    let owner_id = require_owner(&body.owner_id)?;
    let today = date_or_today(&state, body.today);
    let forecast = state
        .forecast_service
        .what_if(
            owner_id,
            body.months.unwrap_or(DEFAULT_MONTHS),
            today,
            body.scenario,
        )
        .await?;
    Ok(Json(forecast))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/forecast/monthly", get(monthly))
        .route("/forecast/weekly", get(weekly))
        .route("/forecast/what-if", post(what_if))
}
