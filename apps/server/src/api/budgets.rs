use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use cashflow_core::budgets::BudgetStatus;

use crate::{
    api::shared::{date_or_today, AsOfQuery},
    error::ApiResult,
    main_lib::AppState,
};

async fn budget_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<Json<BudgetStatus>> {
    let today = date_or_today(&state, query.today);
    let status = state.budget_service.status(&id, today).await?;
    Ok(Json(status))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/budgets/{id}/status", get(budget_status))
}
