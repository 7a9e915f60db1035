use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::forms::ShowForm;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Show {
    pub id: i64,
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: String,
}

/// A show as seen from the venue page: who is on the bill and when.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowWithArtist {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// A show as seen from the artist page: where they play and when.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowWithVenue {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

/// A row of the global shows listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Anything carrying a stored start-time column.
pub trait Scheduled {
    fn start_time(&self) -> &str;
}

impl Scheduled for Show {
    fn start_time(&self) -> &str {
        &self.start_time
    }
}

impl Scheduled for ShowWithArtist {
    fn start_time(&self) -> &str {
        &self.start_time
    }
}

impl Scheduled for ShowWithVenue {
    fn start_time(&self) -> &str {
        &self.start_time
    }
}

/// Start times are stored as text; the two shapes in circulation are
/// RFC 3339 and `YYYY-MM-DD HH:MM:SS`. Anything else is rejected as
/// invalid input, never allowed to fault a request.
pub fn parse_start_time(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(t.and_utc());
    }
    Err(AppError::Validation(format!(
        "unparsable start time {raw:?}"
    )))
}

/// Splits shows into (past, upcoming) against `now`; strictly after `now`
/// counts as upcoming.
pub fn partition_by_start<T: Scheduled>(
    shows: Vec<T>,
    now: DateTime<Utc>,
) -> Result<(Vec<T>, Vec<T>), AppError> {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for show in shows {
        if parse_start_time(show.start_time())? > now {
            upcoming.push(show);
        } else {
            past.push(show);
        }
    }
    Ok((past, upcoming))
}

fn count_upcoming(
    rows: Vec<(i64, String)>,
    now: DateTime<Utc>,
) -> Result<HashMap<i64, usize>, AppError> {
    let mut counts = HashMap::new();
    for (id, raw) in rows {
        if parse_start_time(&raw)? > now {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

impl Show {
    pub async fn create(pool: &PgPool, form: &ShowForm) -> Result<i64, AppError> {
        let mut tx = pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO shows (venue_id, artist_id, start_time)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(form.venue_id)
        .bind(form.artist_id)
        .bind(&form.start_time)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    pub async fn all(pool: &PgPool) -> Result<Vec<ShowListing>, AppError> {
        sqlx::query_as::<_, ShowListing>(
            r#"
            SELECT s.venue_id, v.name AS venue_name,
                   s.artist_id, a.name AS artist_name, a.image_link AS artist_image_link,
                   s.start_time
            FROM shows s
            JOIN venues v ON v.id = s.venue_id
            JOIN artists a ON a.id = s.artist_id
            ORDER BY s.id
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn at_venue(pool: &PgPool, venue_id: i64) -> Result<Vec<ShowWithArtist>, AppError> {
        sqlx::query_as::<_, ShowWithArtist>(
            r#"
            SELECT s.artist_id, a.name AS artist_name, a.image_link AS artist_image_link,
                   s.start_time
            FROM shows s
            JOIN artists a ON a.id = s.artist_id
            WHERE s.venue_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(venue_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn by_artist(pool: &PgPool, artist_id: i64) -> Result<Vec<ShowWithVenue>, AppError> {
        sqlx::query_as::<_, ShowWithVenue>(
            r#"
            SELECT s.venue_id, v.name AS venue_name, v.image_link AS venue_image_link,
                   s.start_time
            FROM shows s
            JOIN venues v ON v.id = s.venue_id
            WHERE s.artist_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(artist_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Upcoming-show tallies keyed by venue id, for the listing and search
    /// pages.
    pub async fn upcoming_per_venue(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<HashMap<i64, usize>, AppError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT venue_id, start_time FROM shows")
                .fetch_all(pool)
                .await?;
        count_upcoming(rows, now)
    }

    pub async fn upcoming_per_artist(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<HashMap<i64, usize>, AppError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT artist_id, start_time FROM shows")
                .fetch_all(pool)
                .await?;
        count_upcoming(rows, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn show(id: i64, start_time: &str) -> Show {
        Show {
            id,
            venue_id: 1,
            artist_id: 1,
            start_time: start_time.to_string(),
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let t = parse_start_time("2019-05-21T21:30:00.000Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2019, 5, 21, 21, 30, 0).unwrap());
    }

    #[test]
    fn parses_space_separated() {
        let t = parse_start_time("2035-04-01 20:00:00").unwrap();
        assert_eq!(t, at(2035, 4, 1, 20));
    }

    #[test]
    fn rejects_garbage_naming_the_value() {
        let err = parse_start_time("next friday-ish").unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("next friday-ish")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn splits_past_and_upcoming_regardless_of_order() {
        let now = at(2025, 1, 1, 12);
        for shows in [
            vec![show(1, "2020-01-01 12:00:00"), show(2, "2030-01-01 12:00:00")],
            vec![show(2, "2030-01-01 12:00:00"), show(1, "2020-01-01 12:00:00")],
        ] {
            let total = shows.len();
            let (past, upcoming) = partition_by_start(shows, now).unwrap();
            assert_eq!(past.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1]);
            assert_eq!(upcoming.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2]);
            assert_eq!(past.len() + upcoming.len(), total);
        }
    }

    #[test]
    fn show_starting_exactly_now_is_past() {
        let now = at(2025, 6, 1, 20);
        let (past, upcoming) =
            partition_by_start(vec![show(1, "2025-06-01 20:00:00")], now).unwrap();
        assert_eq!(past.len(), 1);
        assert!(upcoming.is_empty());
    }

    #[test]
    fn one_bad_timestamp_fails_the_whole_partition() {
        let now = at(2025, 1, 1, 0);
        let shows = vec![show(1, "2020-01-01 12:00:00"), show(2, "not a date")];
        assert!(matches!(
            partition_by_start(shows, now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn counts_upcoming_per_key() {
        let now = at(2025, 1, 1, 0);
        let rows = vec![
            (7, "2030-01-01 12:00:00".to_string()),
            (7, "2031-01-01 12:00:00".to_string()),
            (7, "2020-01-01 12:00:00".to_string()),
            (9, "2020-01-01 12:00:00".to_string()),
        ];
        let counts = count_upcoming(rows, now).unwrap();
        assert_eq!(counts.get(&7), Some(&2));
        assert_eq!(counts.get(&9), None);
    }
}
