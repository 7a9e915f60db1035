use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::forms::{FormData, ShowForm};
use crate::models::show::ShowListing;
use crate::models::Show;
use crate::views::{self, View};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", get(new_show_form).post(create_show))
}

#[derive(Debug, Serialize)]
struct ShowsPage {
    shows: Vec<ShowListing>,
}

async fn list_shows(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let shows = Show::all(&state.db.pool).await?;
    Ok(View::new("pages/shows", ShowsPage { shows }))
}

async fn new_show_form() -> impl IntoResponse {
    View::new("forms/new_show", json!({}))
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<Response, AppError> {
    let form = ShowForm::from_form(&form)?;
    match Show::create(&state.db.pool, &form).await {
        Ok(id) => {
            tracing::info!("show {} created", id);
            Ok(views::home()
                .with_flash("Show was successfully listed!")
                .into_response())
        }
        // A dangling venue_id/artist_id surfaces here as a foreign-key
        // violation, same as any other failed write.
        Err(AppError::Persistence(e)) => {
            tracing::error!("create show failed: {:?}", e);
            Ok(views::home()
                .with_flash("An error occurred. Show could not be listed.")
                .into_response())
        }
        Err(other) => Err(other),
    }
}
