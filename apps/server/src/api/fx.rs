use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use cashflow_core::fx::{parse_currency_code, RateOrigin};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct RateQuery {
    from: String,
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse {
    from: String,
    to: String,
    rate: Decimal,
    origin: RateOrigin,
    as_of: DateTime<Utc>,
}

async fn rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RateQuery>,
) -> ApiResult<Json<RateResponse>> {
    let from = parse_currency_code(&query.from).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let to = parse_currency_code(&query.to).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let now = Utc::now();
    let quote = state.rate_cache.quote_at(&from, &to, now).await;
    Ok(Json(RateResponse {
        from,
        to,
        rate: quote.rate,
        origin: quote.origin,
        as_of: now,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/fx/rate", get(rate))
}
