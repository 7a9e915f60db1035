use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// What a handler hands to the presentation layer: the logical page template
/// and the structured data it consumes, plus an optional one-shot user
/// notification.
#[derive(Debug, Serialize)]
pub struct View<T: Serialize> {
    pub template: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    pub data: T,
}

impl<T: Serialize> View<T> {
    pub fn new(template: &'static str, data: T) -> Self {
        Self {
            template,
            flash: None,
            data,
        }
    }

    pub fn with_flash(mut self, message: impl Into<String>) -> Self {
        self.flash = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for View<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The safe landing page that create/delete flows fall back to.
pub fn home() -> View<serde_json::Value> {
    View::new("pages/home", serde_json::json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_omitted_when_absent() {
        let doc = serde_json::to_value(home()).unwrap();
        assert_eq!(doc["template"], "pages/home");
        assert!(doc.get("flash").is_none());
    }

    #[test]
    fn flash_is_carried_when_set() {
        let view = home().with_flash("Venue Roxy was successfully listed!");
        let doc = serde_json::to_value(view).unwrap();
        assert_eq!(doc["flash"], "Venue Roxy was successfully listed!");
    }
}
