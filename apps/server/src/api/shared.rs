use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::ApiError, main_lib::AppState};

/// The explicit date, or today's business date in the scheduler's zone.
pub fn date_or_today(state: &AppState, date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| state.scheduler.today())
}

pub fn require_owner(owner_id: &str) -> Result<&str, ApiError> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(ApiError::BadRequest("ownerId is required".to_string()));
    }
    Ok(owner_id)
}

/// Optional `?today=YYYY-MM-DD` override for projections.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AsOfQuery {
    pub today: Option<NaiveDate>,
}
