use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single catalog entry (movie, series, episode...)
///
/// Identity is the `imdb_id` alone: two records with the same id are the same
/// record regardless of any other field. `PartialEq` and `Hash` follow that rule.
///
/// `watched` and `my_rating` are user state; everything else comes from the
/// metadata source or an imported file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub rated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub writer: String,
    #[serde(default)]
    pub actors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    /// Currency text as published, e.g. "$292,587,330" or "N/A"
    #[serde(default = "not_available")]
    pub box_office: String,
    #[serde(default = "default_media_type")]
    pub media_type: String,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub my_rating: Option<f64>,
}

fn not_available() -> String {
    "N/A".to_string()
}

fn default_media_type() -> String {
    "movie".to_string()
}

impl MediaRecord {
    /// Create a bare record with only identity, title and year set
    pub fn new(imdb_id: impl Into<String>, title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            imdb_id: imdb_id.into(),
            title: title.into(),
            year,
            genres: Vec::new(),
            rated: String::new(),
            released: None,
            runtime_minutes: None,
            director: String::new(),
            writer: String::new(),
            actors: String::new(),
            plot: None,
            languages: Vec::new(),
            countries: Vec::new(),
            poster: None,
            imdb_rating: None,
            box_office: not_available(),
            media_type: default_media_type(),
            watched: false,
            my_rating: None,
        }
    }

    /// The identity key used for equality, store lookups and watchlist membership
    pub fn identity(&self) -> &str {
        &self.imdb_id
    }

    pub fn same_identity(&self, other: &MediaRecord) -> bool {
        self.imdb_id == other.imdb_id
    }

    /// Box office as a whole amount, `None` for "N/A" or text without digits
    pub fn box_office_amount(&self) -> Option<u64> {
        parse_currency_amount(&self.box_office)
    }

    pub fn genres_joined(&self) -> String {
        self.genres.join(", ")
    }

    pub fn languages_joined(&self) -> String {
        self.languages.join(", ")
    }

    pub fn countries_joined(&self) -> String {
        self.countries.join(", ")
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_imdb_rating(mut self, rating: f64) -> Self {
        self.imdb_rating = Some(rating);
        self
    }

    pub fn with_box_office(mut self, box_office: impl Into<String>) -> Self {
        self.box_office = box_office.into();
        self
    }
}

impl PartialEq for MediaRecord {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for MediaRecord {}

impl Hash for MediaRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.imdb_id.hash(state);
    }
}

/// Strip everything but ASCII digits and parse what is left
///
/// "$1,234,567" -> 1234567, "N/A" -> None
pub fn parse_currency_amount(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Split a comma separated list ("Action, Sci-Fi") into trimmed, non-empty,
/// duplicate-free values, keeping first-seen order
pub fn split_list(text: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() || part.eq_ignore_ascii_case("N/A") {
            continue;
        }
        if !values.iter().any(|v| v == part) {
            values.push(part.to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_uses_identity_only() {
        let a = MediaRecord::new("tt0133093", "The Matrix", Some(1999));
        let mut b = MediaRecord::new("tt0133093", "Matrix, The", Some(2000));
        b.watched = true;
        let c = MediaRecord::new("tt0120338", "Titanic", Some(1997));

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<MediaRecord> = vec![a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_box_office_amount() {
        let record = MediaRecord::new("tt1", "A", None).with_box_office("$171,479,930");
        assert_eq!(record.box_office_amount(), Some(171_479_930));

        let unknown = MediaRecord::new("tt2", "B", None);
        assert_eq!(unknown.box_office, "N/A");
        assert_eq!(unknown.box_office_amount(), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("Action, Sci-Fi,  Action ,"), vec!["Action", "Sci-Fi"]);
        assert!(split_list("N/A").is_empty());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let json = r#"{"imdb_id":"tt0133093","title":"The Matrix"}"#;
        let record: MediaRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.year, None);
        assert_eq!(record.box_office, "N/A");
        assert_eq!(record.media_type, "movie");
        assert!(!record.watched);
        assert_eq!(record.my_rating, None);
    }
}
