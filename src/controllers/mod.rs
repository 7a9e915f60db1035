pub mod artists;
pub mod shows;
pub mod venues;

use axum::{response::Response, routing::get, Router};
use std::sync::Arc;

use crate::views;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .route("/", get(home))
        .merge(venues::routes())
        .merge(artists::routes())
        .merge(shows::routes())
}

async fn home() -> views::View<serde_json::Value> {
    views::home()
}

/// Unknown routes land on the 404 page instead of an empty response.
pub async fn not_found() -> Response {
    use axum::response::IntoResponse;
    crate::error::AppError::NotFound.into_response()
}
