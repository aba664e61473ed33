use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cashflow_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound(_) | CoreError::Database(DatabaseError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                CoreError::ConcurrencyConflict(_)
                | CoreError::Scheduler(_)
                | CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::errors::ValidationError;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (
                CoreError::Validation(ValidationError::InvalidInput("months".into())),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::NotFound("Budget b1".into()), StatusCode::NOT_FOUND),
            (
                CoreError::Database(DatabaseError::NotFound("row".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Scheduler("A run is already in progress".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::ConcurrencyConflict("obligation o1".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::Unexpected("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let err = ApiError::BadRequest("Invalid date '2025-13-01'".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid date '2025-13-01'");
    }
}
