use crate::error::FetchError;
use media_catalog_models::{split_list, MediaRecord};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

// OMDb reports "no match" as a failed response with this message
const NOT_FOUND: &str = "Movie not found!";

#[derive(Debug, Deserialize)]
pub struct OmdbSearchHit {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub media_type: String,
}

impl OmdbSearchHit {
    pub fn start_year(&self) -> Option<u32> {
        parse_start_year(&self.year)
    }
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchHit>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Full title record as returned by `?i=<imdb id>`
#[derive(Debug, Deserialize)]
pub struct OmdbTitle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Rated", default)]
    pub rated: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Writer", default)]
    pub writer: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Language", default)]
    pub language: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub media_type: String,
    #[serde(rename = "BoxOffice", default)]
    pub box_office: String,
}

#[derive(Debug, Deserialize)]
struct OmdbStatus {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn not_available(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("N/A")
}

fn non_empty(value: String) -> Option<String> {
    if not_available(&value) {
        None
    } else {
        Some(value)
    }
}

/// "1999" -> 1999, "2008–2013" -> 2008
pub fn parse_start_year(text: &str) -> Option<u32> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// "136 min" -> 136
fn parse_runtime(text: &str) -> Option<u32> {
    text.split_whitespace().next().and_then(|n| n.parse().ok())
}

impl OmdbTitle {
    pub fn into_record(self) -> MediaRecord {
        let mut record = MediaRecord::new(self.imdb_id, self.title, parse_start_year(&self.year));
        record.genres = split_list(&self.genre);
        record.rated = if not_available(&self.rated) { String::new() } else { self.rated };
        record.released = non_empty(self.released);
        record.runtime_minutes = parse_runtime(&self.runtime);
        record.director = if not_available(&self.director) { String::new() } else { self.director };
        record.writer = if not_available(&self.writer) { String::new() } else { self.writer };
        record.actors = if not_available(&self.actors) { String::new() } else { self.actors };
        record.plot = non_empty(self.plot);
        record.languages = split_list(&self.language);
        record.countries = split_list(&self.country);
        record.poster = non_empty(self.poster);
        record.imdb_rating = self.imdb_rating.trim().parse().ok();
        if !not_available(&self.box_office) {
            record.box_office = self.box_office;
        }
        if !self.media_type.is_empty() {
            record.media_type = self.media_type;
        }
        record
    }
}

/// Parse a search response body; "not found" is an empty result, not an error
pub fn parse_search_response(body: &str) -> Result<Vec<OmdbSearchHit>, FetchError> {
    let response: OmdbSearchResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Api(format!("unexpected search response: {}", e)))?;
    if response.response.eq_ignore_ascii_case("true") {
        return Ok(response.search);
    }
    match response.error.as_deref() {
        Some(NOT_FOUND) | None => Ok(Vec::new()),
        Some(other) => Err(FetchError::Api(other.to_string())),
    }
}

pub fn parse_title_response(body: &str) -> Result<Option<OmdbTitle>, FetchError> {
    let status: OmdbStatus = serde_json::from_str(body)
        .map_err(|e| FetchError::Api(format!("unexpected title response: {}", e)))?;
    if !status.response.eq_ignore_ascii_case("true") {
        return match status.error.as_deref() {
            Some(other) if other != NOT_FOUND && !other.starts_with("Incorrect IMDb ID") => {
                Err(FetchError::Api(other.to_string()))
            }
            _ => Ok(None),
        };
    }
    let title: OmdbTitle = serde_json::from_str(body)
        .map_err(|e| FetchError::Api(format!("unexpected title response: {}", e)))?;
    Ok(Some(title))
}

pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    title: &str,
    year: Option<u32>,
) -> Result<Vec<OmdbSearchHit>, FetchError> {
    let mut query: Vec<(&str, String)> = vec![
        ("apikey", api_key.to_string()),
        ("s", title.to_string()),
        ("type", "movie".to_string()),
    ];
    if let Some(year) = year {
        query.push(("y", year.to_string()));
    }

    debug!(title = %title, year = ?year, "OMDb search");
    let response = client.get(base_url).query(&query).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(FetchError::Api(format!("OMDb search returned HTTP {}", status)));
    }
    parse_search_response(&body)
}

pub async fn get_by_id(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<Option<OmdbTitle>, FetchError> {
    let query = [("apikey", api_key), ("i", imdb_id), ("plot", "short")];

    debug!(imdb_id = %imdb_id, "OMDb title lookup");
    let response = client.get(base_url).query(&query).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(FetchError::Api(format!("OMDb lookup for {} returned HTTP {}", imdb_id, status)));
    }
    parse_title_response(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = r#"{
        "Title": "The Matrix", "Year": "1999", "Rated": "R", "Released": "31 Mar 1999",
        "Runtime": "136 min", "Genre": "Action, Sci-Fi", "Director": "Lana Wachowski, Lilly Wachowski",
        "Writer": "Lilly Wachowski, Lana Wachowski", "Actors": "Keanu Reeves, Laurence Fishburne",
        "Plot": "A hacker learns the truth.", "Language": "English", "Country": "United States, Australia",
        "Poster": "N/A", "imdbRating": "8.7", "imdbID": "tt0133093", "Type": "movie",
        "BoxOffice": "$172,076,928", "Response": "True"
    }"#;

    #[test]
    fn test_title_into_record() {
        let title = parse_title_response(MATRIX).unwrap().unwrap();
        let record = title.into_record();
        assert_eq!(record.imdb_id, "tt0133093");
        assert_eq!(record.year, Some(1999));
        assert_eq!(record.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(record.runtime_minutes, Some(136));
        assert_eq!(record.countries, vec!["United States", "Australia"]);
        assert_eq!(record.imdb_rating, Some(8.7));
        assert_eq!(record.box_office_amount(), Some(172_076_928));
        assert_eq!(record.poster, None);
        assert!(!record.watched);
    }

    #[test]
    fn test_series_year_and_missing_values() {
        let body = r#"{"Title": "Breaking Bad", "Year": "2008–2013", "imdbRating": "N/A",
            "BoxOffice": "N/A", "Runtime": "N/A", "imdbID": "tt0903747", "Type": "series", "Response": "True"}"#;
        let record = parse_title_response(body).unwrap().unwrap().into_record();
        assert_eq!(record.year, Some(2008));
        assert_eq!(record.imdb_rating, None);
        assert_eq!(record.runtime_minutes, None);
        assert_eq!(record.box_office, "N/A");
        assert_eq!(record.media_type, "series");
    }

    #[test]
    fn test_search_not_found_is_empty() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        assert!(parse_search_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_search_api_error() {
        let body = r#"{"Response": "False", "Error": "Invalid API key!"}"#;
        assert!(matches!(parse_search_response(body), Err(FetchError::Api(_))));
    }

    #[test]
    fn test_search_hits() {
        let body = r#"{"Search": [
            {"Title": "The Matrix", "Year": "1999", "imdbID": "tt0133093", "Type": "movie", "Poster": "N/A"},
            {"Title": "The Matrix Reloaded", "Year": "2003", "imdbID": "tt0234215", "Type": "movie", "Poster": "N/A"}
        ], "totalResults": "2", "Response": "True"}"#;
        let hits = parse_search_response(body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].start_year(), Some(2003));
    }
}
