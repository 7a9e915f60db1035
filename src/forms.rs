use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use validator::Validate;

use crate::error::AppError;
use crate::models::show::parse_start_time;

/// Raw urlencoded form body with repeated keys preserved, so multi-select
/// fields like `genres` keep every submitted value.
#[derive(Debug, Clone)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed first value; None when the field is absent or blank.
    pub fn text(&self, key: &str) -> Option<String> {
        self.first(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    pub fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Checkbox coercion: present with a non-empty value reads as true.
    pub fn checkbox(&self, key: &str) -> bool {
        matches!(self.first(key), Some(v) if !v.is_empty())
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(format!("unreadable form body: {e}")))?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&bytes)
            .map_err(|e| AppError::Validation(format!("malformed form body: {e}")))?;
        Ok(FormData(pairs))
    }
}

fn join_genres(values: Vec<String>) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn invalid(errors: validator::ValidationErrors) -> AppError {
    AppError::Validation(errors.to_string())
}

#[derive(Debug, Clone, Validate)]
pub struct VenueForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: String,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        let parsed = Self {
            name: form.text("name").unwrap_or_default(),
            city: form.text("city"),
            state: form.text("state"),
            address: form.text("address"),
            phone: form.text("phone"),
            genres: join_genres(form.all("genres")),
            image_link: form.text("image_link"),
            facebook_link: form.text("facebook_link"),
            seeking_talent: form.checkbox("seeking_talent"),
            seeking_description: form.text("seeking_description"),
        };
        parsed.validate().map_err(invalid)?;
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct ArtistForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: String,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        let parsed = Self {
            name: form.text("name").unwrap_or_default(),
            city: form.text("city"),
            state: form.text("state"),
            phone: form.text("phone"),
            genres: join_genres(form.all("genres")),
            image_link: form.text("image_link"),
            facebook_link: form.text("facebook_link"),
            website: form.text("website"),
            seeking_venue: form.checkbox("seeking_venue"),
            seeking_description: form.text("seeking_description"),
        };
        parsed.validate().map_err(invalid)?;
        Ok(parsed)
    }
}

#[derive(Debug, Clone)]
pub struct ShowForm {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: String,
}

impl ShowForm {
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        let venue_id = required_id(form, "venue_id")?;
        let artist_id = required_id(form, "artist_id")?;
        let start_time = form
            .text("start_time")
            .ok_or_else(|| AppError::Validation("start_time is required".to_string()))?;
        // Reject unparsable timestamps before anything reaches storage.
        parse_start_time(&start_time)?;
        Ok(Self {
            venue_id,
            artist_id,
            start_time,
        })
    }
}

fn required_id(form: &FormData, key: &str) -> Result<i64, AppError> {
    let raw = form
        .text(key)
        .ok_or_else(|| AppError::Validation(format!("{key} is required")))?;
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{key} must be a numeric id")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn repeated_genres_collapse_into_one_string() {
        let form = pairs(&[
            ("name", "The Musical Hop"),
            ("genres", "Jazz"),
            ("genres", "Reggae"),
            ("genres", "Swing"),
        ]);
        let venue = VenueForm::from_form(&form).unwrap();
        assert_eq!(venue.genres, "Jazz,Reggae,Swing");
    }

    #[test]
    fn checkbox_present_is_true_absent_is_false() {
        let ticked = pairs(&[("name", "Hop"), ("seeking_talent", "y")]);
        assert!(VenueForm::from_form(&ticked).unwrap().seeking_talent);

        let unticked = pairs(&[("name", "Hop")]);
        assert!(!VenueForm::from_form(&unticked).unwrap().seeking_talent);

        let empty_value = pairs(&[("name", "Hop"), ("seeking_talent", "")]);
        assert!(!VenueForm::from_form(&empty_value).unwrap().seeking_talent);
    }

    #[test]
    fn missing_name_is_rejected() {
        let form = pairs(&[("city", "San Francisco")]);
        assert!(matches!(
            VenueForm::from_form(&form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let form = pairs(&[("name", "   ")]);
        assert!(matches!(
            ArtistForm::from_form(&form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn show_form_requires_numeric_ids() {
        let form = pairs(&[
            ("venue_id", "not-a-number"),
            ("artist_id", "2"),
            ("start_time", "2035-04-01 20:00:00"),
        ]);
        let err = ShowForm::from_form(&form).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("venue_id")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn show_form_rejects_unparsable_start_time() {
        let form = pairs(&[
            ("venue_id", "1"),
            ("artist_id", "2"),
            ("start_time", "someday soon"),
        ]);
        let err = ShowForm::from_form(&form).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("someday soon")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn show_form_accepts_a_complete_submission() {
        let form = pairs(&[
            ("venue_id", "1"),
            ("artist_id", "2"),
            ("start_time", "2035-04-01 20:00:00"),
        ]);
        let show = ShowForm::from_form(&form).unwrap();
        assert_eq!(show.venue_id, 1);
        assert_eq!(show.artist_id, 2);
        assert_eq!(show.start_time, "2035-04-01 20:00:00");
    }

    #[test]
    fn urlencoded_bodies_decode_with_repeated_keys() {
        let body = b"name=The+Musical+Hop&genres=Jazz&genres=Folk";
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap();
        let form = FormData::from_pairs(pairs);
        assert_eq!(form.text("name").as_deref(), Some("The Musical Hop"));
        assert_eq!(form.all("genres"), vec!["Jazz", "Folk"]);
    }
}
