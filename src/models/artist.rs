use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::forms::ArtistForm;
use crate::models::show::{self, Show, ShowWithVenue};
use crate::models::{split_genres, SearchResults};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct ArtistSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistMatch {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

/// The artist detail page: the record plus its shows split around now.
#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub past_shows: Vec<ShowWithVenue>,
    pub upcoming_shows: Vec<ShowWithVenue>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl Artist {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Artist, AppError> {
        sqlx::query_as::<_, Artist>("SELECT * FROM artists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn all(pool: &PgPool) -> Result<Vec<ArtistSummary>, AppError> {
        sqlx::query_as::<_, ArtistSummary>("SELECT id, name FROM artists ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Case-insensitive substring match on name. An empty term matches
    /// every artist.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchResults<ArtistMatch>, AppError> {
        let artists = sqlx::query_as::<_, Artist>(
            "SELECT * FROM artists WHERE name ILIKE '%' || $1 || '%' ORDER BY id",
        )
        .bind(term)
        .fetch_all(pool)
        .await?;
        let upcoming = Show::upcoming_per_artist(pool, now).await?;
        let matches: Vec<ArtistMatch> = artists
            .into_iter()
            .map(|a| ArtistMatch {
                id: a.id,
                num_upcoming_shows: upcoming.get(&a.id).copied().unwrap_or(0),
                name: a.name,
            })
            .collect();
        Ok(SearchResults {
            count: matches.len(),
            matches,
        })
    }

    pub async fn with_shows(
        pool: &PgPool,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<ArtistDetail, AppError> {
        let artist = Self::find(pool, id).await?;
        let bills = Show::by_artist(pool, id).await?;
        let (past, upcoming) = show::partition_by_start(bills, now)?;
        Ok(ArtistDetail {
            id: artist.id,
            name: artist.name,
            genres: split_genres(artist.genres.as_deref()),
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            image_link: artist.image_link,
            facebook_link: artist.facebook_link,
            website: artist.website,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            past_shows_count: past.len(),
            upcoming_shows_count: upcoming.len(),
            past_shows: past,
            upcoming_shows: upcoming,
        })
    }

    pub async fn create(pool: &PgPool, form: &ArtistForm) -> Result<i64, AppError> {
        let mut tx = pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO artists
                 (name, city, state, phone, genres, image_link,
                  facebook_link, website, seeking_venue, seeking_description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.phone)
        .bind(&form.genres)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(&form.website)
        .bind(form.seeking_venue)
        .bind(&form.seeking_description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Applies every form field to the stored row inside one transaction.
    pub async fn update(pool: &PgPool, id: i64, form: &ArtistForm) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE artists
             SET name = $1, city = $2, state = $3, phone = $4, genres = $5,
                 image_link = $6, facebook_link = $7, website = $8,
                 seeking_venue = $9, seeking_description = $10
             WHERE id = $11",
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.phone)
        .bind(&form.genres)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(&form.website)
        .bind(form.seeking_venue)
        .bind(&form.seeking_description)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            let _ = tx.rollback().await;
            return Err(AppError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// Deletes the artist and every show they are booked for, atomically.
    /// Symmetric with venue deletion.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<String, AppError> {
        let mut tx = pool.begin().await?;
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM artists WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(name) = name else {
            let _ = tx.rollback().await;
            return Err(AppError::NotFound);
        };
        sqlx::query("DELETE FROM shows WHERE artist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(name)
    }
}
