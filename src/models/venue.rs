use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::forms::VenueForm;
use crate::models::show::{self, Show, ShowWithArtist};
use crate::models::{split_genres, SearchResults};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VenueSummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

/// One bucket of the venues listing: every venue sharing a city.
#[derive(Debug, Serialize)]
pub struct CityGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// The venue detail page: the record plus its shows split around now.
#[derive(Debug, Serialize)]
pub struct VenueDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub past_shows: Vec<ShowWithArtist>,
    pub upcoming_shows: Vec<ShowWithArtist>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Buckets venues by city in first-seen order; a bucket's state comes from
/// the first venue that opened it.
fn bucket_by_city(venues: Vec<Venue>, upcoming: &HashMap<i64, usize>) -> Vec<CityGroup> {
    let mut groups: Vec<CityGroup> = Vec::new();
    for venue in venues {
        let city = venue.city.clone().unwrap_or_default();
        let summary = VenueSummary {
            id: venue.id,
            num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
            name: venue.name,
        };
        match groups.iter_mut().find(|g| g.city == city) {
            Some(group) => group.venues.push(summary),
            None => groups.push(CityGroup {
                city,
                state: venue.state.unwrap_or_default(),
                venues: vec![summary],
            }),
        }
    }
    groups
}

impl Venue {
    pub async fn find(pool: &PgPool, id: i64) -> Result<Venue, AppError> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn grouped_by_city(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<CityGroup>, AppError> {
        let venues = sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY id")
            .fetch_all(pool)
            .await?;
        let upcoming = Show::upcoming_per_venue(pool, now).await?;
        Ok(bucket_by_city(venues, &upcoming))
    }

    /// Case-insensitive substring match on name. An empty term matches
    /// every venue.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        now: DateTime<Utc>,
    ) -> Result<SearchResults<VenueSummary>, AppError> {
        let venues = sqlx::query_as::<_, Venue>(
            "SELECT * FROM venues WHERE name ILIKE '%' || $1 || '%' ORDER BY id",
        )
        .bind(term)
        .fetch_all(pool)
        .await?;
        let upcoming = Show::upcoming_per_venue(pool, now).await?;
        let matches: Vec<VenueSummary> = venues
            .into_iter()
            .map(|v| VenueSummary {
                id: v.id,
                num_upcoming_shows: upcoming.get(&v.id).copied().unwrap_or(0),
                name: v.name,
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
    ) -> Result<VenueDetail, AppError> {
        let venue = Self::find(pool, id).await?;
        let bills = Show::at_venue(pool, id).await?;
        let (past, upcoming) = show::partition_by_start(bills, now)?;
        Ok(VenueDetail {
            id: venue.id,
            name: venue.name,
            genres: split_genres(venue.genres.as_deref()),
            city: venue.city,
            state: venue.state,
            address: venue.address,
            phone: venue.phone,
            image_link: venue.image_link,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            past_shows_count: past.len(),
            upcoming_shows_count: upcoming.len(),
            past_shows: past,
            upcoming_shows: upcoming,
        })
    }

    pub async fn create(pool: &PgPool, form: &VenueForm) -> Result<i64, AppError> {
        let mut tx = pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO venues
                 (name, city, state, address, phone, genres,
                  image_link, facebook_link, seeking_talent, seeking_description)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.address)
        .bind(&form.phone)
        .bind(&form.genres)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.seeking_talent)
        .bind(&form.seeking_description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Applies every form field to the stored row. The single UPDATE runs
    /// on its own transaction; a failed commit leaves the row unchanged.
    pub async fn update(pool: &PgPool, id: i64, form: &VenueForm) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE venues
             SET name = $1, city = $2, state = $3, address = $4, phone = $5,
                 genres = $6, image_link = $7, facebook_link = $8,
                 seeking_talent = $9, seeking_description = $10
             WHERE id = $11",
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.address)
        .bind(&form.phone)
        .bind(&form.genres)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.seeking_talent)
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

    /// Deletes the venue and every show booked there, atomically. Returns
    /// the deleted venue's name for the notification.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<String, AppError> {
        let mut tx = pool.begin().await?;
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(name) = name else {
            let _ = tx.rollback().await;
            return Err(AppError::NotFound);
        };
        sqlx::query("DELETE FROM shows WHERE venue_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: i64, name: &str, city: &str, state: &str) -> Venue {
        Venue {
            id,
            name: name.to_string(),
            city: Some(city.to_string()),
            state: Some(state.to_string()),
            address: None,
            phone: None,
            genres: None,
            image_link: None,
            facebook_link: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    #[test]
    fn buckets_cover_every_venue_exactly_once() {
        let venues = vec![
            venue(1, "The Musical Hop", "San Francisco", "CA"),
            venue(2, "The Dueling Pianos Bar", "New York", "NY"),
            venue(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
        ];
        let groups = bucket_by_city(venues, &HashMap::new());

        let mut seen: Vec<i64> = groups
            .iter()
            .flat_map(|g| g.venues.iter().map(|v| v.id))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);

        for group in &groups {
            for v in &group.venues {
                let elsewhere = groups
                    .iter()
                    .filter(|g| g.city != group.city)
                    .flat_map(|g| g.venues.iter())
                    .any(|other| other.id == v.id);
                assert!(!elsewhere, "venue {} appears in two buckets", v.id);
            }
        }
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let venues = vec![
            venue(1, "A", "San Francisco", "CA"),
            venue(2, "B", "New York", "NY"),
            venue(3, "C", "San Francisco", "CA"),
        ];
        let groups = bucket_by_city(venues, &HashMap::new());
        let cities: Vec<&str> = groups.iter().map(|g| g.city.as_str()).collect();
        assert_eq!(cities, vec!["San Francisco", "New York"]);
        assert_eq!(groups[0].state, "CA");
        assert_eq!(
            groups[0].venues.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn bucket_summaries_carry_upcoming_counts() {
        let venues = vec![venue(1, "A", "San Francisco", "CA")];
        let upcoming = HashMap::from([(1, 4)]);
        let groups = bucket_by_city(venues, &upcoming);
        assert_eq!(groups[0].venues[0].num_upcoming_shows, 4);
    }

    #[test]
    fn missing_city_buckets_under_empty_string() {
        let mut nowhere = venue(1, "A", "", "");
        nowhere.city = None;
        nowhere.state = None;
        let groups = bucket_by_city(vec![nowhere], &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].city, "");
    }
}
