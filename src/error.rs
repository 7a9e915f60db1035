use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::views::View;

/// Everything a request can fail with. Handlers decide per kind whether to
/// recover (write failures turn into a flashed home page) or let the
/// response mapping below answer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("record not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                View::new("errors/400", json!({ "message": message })),
            )
                .into_response(),
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, View::new("errors/404", json!({}))).into_response()
            }
            AppError::Persistence(e) => {
                tracing::error!("storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    View::new("errors/500", json!({})),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let resp = AppError::Validation("name is required".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn persistence_maps_to_500() {
        let resp = AppError::Persistence(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
