use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cashflow_core::credit_cards::{CardUtilization, NextBilling};

use crate::{
    api::shared::{date_or_today, AsOfQuery},
    error::ApiResult,
    main_lib::AppState,
};

async fn utilization(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<CardUtilization>> {
    let today = date_or_today(&state, query.today);
    let utilization = state.card_service.utilization(&id, today).await?;
    Ok(Json(utilization))
}

async fn next_billing(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<NextBilling>> {
    let today = date_or_today(&state, query.today);
    let billing = state.card_service.next_billing(&id, today).await?;
    Ok(Json(billing))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credit-cards/{id}/utilization", get(utilization))
        .route("/credit-cards/{id}/next-billing", get(next_billing))
}
