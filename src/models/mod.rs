pub mod artist;
pub mod show;
pub mod venue;

pub use artist::Artist;
pub use show::Show;
pub use venue::Venue;

use serde::Serialize;

/// Name-search response shared by the venue and artist search pages.
#[derive(Debug, Serialize)]
pub struct SearchResults<T: Serialize> {
    pub count: usize,
    pub matches: Vec<T>,
}

/// Genres live in one comma-delimited column; blank entries are dropped on
/// the way out.
pub fn split_genres(stored: Option<&str>) -> Vec<String> {
    stored
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_stored_genres() {
        assert_eq!(
            split_genres(Some("Jazz,Reggae, Swing")),
            vec!["Jazz", "Reggae", "Swing"]
        );
    }

    #[test]
    fn empty_and_missing_columns_yield_no_genres() {
        assert!(split_genres(None).is_empty());
        assert!(split_genres(Some("")).is_empty());
        assert!(split_genres(Some(" , ,")).is_empty());
    }
}
