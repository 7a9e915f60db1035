use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::forms::{FormData, VenueForm};
use crate::models::venue::{CityGroup, VenueSummary};
use crate::models::{SearchResults, Venue};
use crate::views::{self, View};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", get(new_venue_form).post(create_venue))
        .route("/venues/{id}", get(show_venue).delete(delete_venue))
        .route("/venues/{id}/edit", get(edit_venue_form).post(update_venue))
}

#[derive(Debug, Serialize)]
struct VenuesPage {
    areas: Vec<CityGroup>,
}

async fn list_venues(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let areas = Venue::grouped_by_city(&state.db.pool, Utc::now()).await?;
    Ok(View::new("pages/venues", VenuesPage { areas }))
}

#[derive(Debug, Serialize)]
struct VenueSearchPage {
    results: SearchResults<VenueSummary>,
    search_term: String,
}

async fn search_venues(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let term = form.text("search_term").unwrap_or_default();
    let results = Venue::search(&state.db.pool, &term, Utc::now()).await?;
    Ok(View::new(
        "pages/search_venues",
        VenueSearchPage {
            results,
            search_term: term,
        },
    ))
}

async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let venue = Venue::with_shows(&state.db.pool, id, Utc::now()).await?;
    Ok(View::new("pages/show_venue", venue))
}

async fn new_venue_form() -> impl IntoResponse {
    View::new("forms/new_venue", json!({}))
}

async fn create_venue(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<Response, AppError> {
    let form = VenueForm::from_form(&form)?;
    match Venue::create(&state.db.pool, &form).await {
        Ok(id) => {
            tracing::info!("venue {} created as id {}", form.name, id);
            Ok(views::home()
                .with_flash(format!("Venue {} was successfully listed!", form.name))
                .into_response())
        }
        Err(AppError::Persistence(e)) => {
            tracing::error!("create venue failed: {:?}", e);
            Ok(views::home()
                .with_flash(format!(
                    "An error occurred. Venue {} could not be listed.",
                    form.name
                ))
                .into_response())
        }
        Err(other) => Err(other),
    }
}

async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    match Venue::delete(&state.db.pool, id).await {
        Ok(name) => Ok(views::home()
            .with_flash(format!("Venue {name} was successfully deleted!"))
            .into_response()),
        Err(AppError::Persistence(e)) => {
            tracing::error!("delete venue {} failed: {:?}", id, e);
            Ok(views::home()
                .with_flash("An error occurred. The venue could not be deleted.")
                .into_response())
        }
        Err(other) => Err(other),
    }
}

async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let venue = Venue::find(&state.db.pool, id).await?;
    Ok(View::new("forms/edit_venue", venue))
}

async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<Response, AppError> {
    let form = VenueForm::from_form(&form)?;
    match Venue::update(&state.db.pool, id, &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/venues/{id}")).into_response()),
        Err(AppError::Persistence(e)) => {
            tracing::error!("update venue {} failed: {:?}", id, e);
            Ok(views::home()
                .with_flash(format!(
                    "An error occurred. Venue {} could not be edited.",
                    form.name
                ))
                .into_response())
        }
        Err(other) => Err(other),
    }
}
