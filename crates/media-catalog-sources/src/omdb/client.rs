use crate::error::FetchError;
use crate::omdb::api;
use crate::traits::{MetadataFetcher, YearQualifier};
use async_trait::async_trait;
use media_catalog_config::FetchConfig;
use media_catalog_models::MediaRecord;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// OMDb (omdbapi.com) metadata fetcher
///
/// A fetch is one search request followed by a detail lookup per hit, capped at
/// `max_results` lookups. OMDb only filters on an exact year, so ranges are
/// searched unrestricted and filtered here.
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    max_results: usize,
}

impl OmdbClient {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let api_key = config
            .resolved_api_key()
            .ok_or_else(|| FetchError::NotConfigured("no OMDb API key (set fetch.api_key or OMDB_API_KEY)".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.clone(),
            api_key,
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl MetadataFetcher for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn fetch(&self, title: &str, year: Option<YearQualifier>) -> Result<Vec<MediaRecord>, FetchError> {
        let exact_year = match year {
            Some(YearQualifier::Exact(y)) => Some(y),
            _ => None,
        };

        let hits = api::search(&self.client, &self.base_url, &self.api_key, title, exact_year).await?;
        let total_hits = hits.len();

        let selected: Vec<api::OmdbSearchHit> = hits
            .into_iter()
            .filter(|hit| match (year, hit.start_year()) {
                (Some(qualifier), Some(hit_year)) => qualifier.contains(hit_year),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .take(self.max_results)
            .collect();

        debug!(
            "OMDb search for '{}' ({:?}): {} hits, {} selected",
            title,
            year.map(|q| q.to_string()),
            total_hits,
            selected.len()
        );

        let mut records = Vec::with_capacity(selected.len());
        for hit in selected {
            match api::get_by_id(&self.client, &self.base_url, &self.api_key, &hit.imdb_id).await {
                Ok(Some(details)) => records.push(details.into_record()),
                Ok(None) => debug!("OMDb has no details for {} ({})", hit.title, hit.imdb_id),
                Err(e) => warn!("Failed to fetch details for {} ({}): {}", hit.title, hit.imdb_id, e),
            }
        }

        info!("Fetched {} record(s) from OMDb for '{}'", records.len(), title);
        Ok(records)
    }
}
