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
use crate::forms::{ArtistForm, FormData};
use crate::models::artist::{ArtistMatch, ArtistSummary};
use crate::models::{Artist, SearchResults};
use crate::views::{self, View};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", get(new_artist_form).post(create_artist))
        .route("/artists/{id}", get(show_artist).delete(delete_artist))
        .route(
            "/artists/{id}/edit",
            get(edit_artist_form).post(update_artist),
        )
}

#[derive(Debug, Serialize)]
struct ArtistsPage {
    artists: Vec<ArtistSummary>,
}

async fn list_artists(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let artists = Artist::all(&state.db.pool).await?;
    Ok(View::new("pages/artists", ArtistsPage { artists }))
}

#[derive(Debug, Serialize)]
struct ArtistSearchPage {
    results: SearchResults<ArtistMatch>,
    search_term: String,
}

async fn search_artists(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<impl IntoResponse, AppError> {
    let term = form.text("search_term").unwrap_or_default();
    let results = Artist::search(&state.db.pool, &term, Utc::now()).await?;
    Ok(View::new(
        "pages/search_artists",
        ArtistSearchPage {
            results,
            search_term: term,
        },
    ))
}

async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let artist = Artist::with_shows(&state.db.pool, id, Utc::now()).await?;
    Ok(View::new("pages/show_artist", artist))
}

async fn new_artist_form() -> impl IntoResponse {
    View::new("forms/new_artist", json!({}))
}

async fn create_artist(
    State(state): State<Arc<AppState>>,
    form: FormData,
) -> Result<Response, AppError> {
    let form = ArtistForm::from_form(&form)?;
    match Artist::create(&state.db.pool, &form).await {
        Ok(id) => {
            tracing::info!("artist {} created as id {}", form.name, id);
            Ok(views::home()
                .with_flash(format!("Artist {} was successfully listed!", form.name))
                .into_response())
        }
        Err(AppError::Persistence(e)) => {
            tracing::error!("create artist failed: {:?}", e);
            Ok(views::home()
                .with_flash(format!(
                    "An error occurred. Artist {} could not be listed.",
                    form.name
                ))
                .into_response())
        }
        Err(other) => Err(other),
    }
}

async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    match Artist::delete(&state.db.pool, id).await {
        Ok(name) => Ok(views::home()
            .with_flash(format!("Artist {name} was successfully deleted!"))
            .into_response()),
        Err(AppError::Persistence(e)) => {
            tracing::error!("delete artist {} failed: {:?}", id, e);
            Ok(views::home()
                .with_flash("An error occurred. The artist could not be deleted.")
                .into_response())
        }
        Err(other) => Err(other),
    }
}

async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let artist = Artist::find(&state.db.pool, id).await?;
    Ok(View::new("forms/edit_artist", artist))
}

async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<Response, AppError> {
    let form = ArtistForm::from_form(&form)?;
    match Artist::update(&state.db.pool, id, &form).await {
        Ok(()) => Ok(Redirect::to(&format!("/artists/{id}")).into_response()),
        Err(AppError::Persistence(e)) => {
            tracing::error!("update artist {} failed: {:?}", id, e);
            Ok(views::home()
                .with_flash(format!(
                    "An error occurred. Artist {} could not be edited.",
                    form.name
                ))
                .into_response())
        }
        Err(other) => Err(other),
    }
}
