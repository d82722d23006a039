pub mod catalog;
pub mod config;
pub mod fetch;
pub mod watchlist;

use clap::Args;
use color_eyre::Result;
use media_catalog_config::{Config, PathManager};
use media_catalog_core::{build_predicates, CollectionManager, FilterField, FilterOperator, Predicate};
use media_catalog_models::MediaRecord;
use media_catalog_sources::OmdbClient;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load and validate the config, from `explicit` or the default location
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, PathManager)> {
    let paths = PathManager::default();
    let config = match explicit {
        Some(path) => Config::load_from_file(&path.to_path_buf())
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", path.display(), e))?,
        None => Config::load_or_default(&paths).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to load config from {}: {}", paths.config_file().display(), e)
        })?,
    };
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    Ok((config, paths))
}

/// Like `load_config`, but a missing or broken config falls back to defaults
///
/// Used by the `config` commands, which must still run to repair the file.
pub fn load_config_or_default(explicit: Option<&Path>) -> (Config, PathManager, Option<color_eyre::Report>) {
    match load_config(explicit) {
        Ok((config, paths)) => (config, paths, None),
        Err(e) => (Config::default(), PathManager::default(), Some(e)),
    }
}

/// Open the catalog, attaching the OMDb client when an API key is available
pub fn open_manager(config: &Config, paths: PathManager) -> Result<CollectionManager> {
    if let Err(e) = config.paths(paths.clone()).ensure_directories() {
        warn!("Could not create data directories: {}", e);
    }
    let manager = CollectionManager::open(config, paths)?;

    if !config.is_fetch_configured() {
        debug!("OMDb lookups disabled (fetch.enabled = false or no API key)");
        return Ok(manager);
    }
    match OmdbClient::new(&config.fetch) {
        Ok(client) => Ok(manager.with_fetcher(Box::new(client))),
        Err(e) => {
            warn!("OMDb lookups unavailable: {}", e);
            Ok(manager)
        }
    }
}

pub fn watchlist_index(manager: &CollectionManager, name: &str) -> Result<usize> {
    manager.find_watchlist(name).ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "No watchlist named '{}' (have: {})",
            name,
            if manager.watchlist_count() == 0 {
                "none".to_string()
            } else {
                manager.watchlist_names().join(", ")
            }
        )
    })
}

/// Copy of the catalog record with this IMDb id
pub fn catalog_record(manager: &CollectionManager, imdb_id: &str) -> Result<MediaRecord> {
    manager
        .store()
        .get(imdb_id.trim())
        .cloned()
        .ok_or_else(|| color_eyre::eyre::eyre!("No record with IMDb id '{}' in the catalog", imdb_id))
}

/// Filter flags shared by the listing commands
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Title contains
    #[arg(long)]
    pub title: Option<String>,

    /// Genre contains
    #[arg(long)]
    pub genre: Option<String>,

    /// MPA rating equals (e.g. PG-13)
    #[arg(long)]
    pub rated: Option<String>,

    /// Released in or after this year
    #[arg(long)]
    pub year_min: Option<String>,

    /// Released in or before this year
    #[arg(long)]
    pub year_max: Option<String>,

    /// IMDb rating at least
    #[arg(long)]
    pub rating_min: Option<String>,

    /// IMDb rating at most
    #[arg(long)]
    pub rating_max: Option<String>,

    /// Box office at least (e.g. 1000000 or $1,000,000)
    #[arg(long)]
    pub box_office_min: Option<String>,

    /// Box office at most
    #[arg(long)]
    pub box_office_max: Option<String>,

    /// Director contains
    #[arg(long)]
    pub director: Option<String>,

    /// Actor contains
    #[arg(long)]
    pub actor: Option<String>,

    /// Writer contains
    #[arg(long)]
    pub writer: Option<String>,

    /// Language contains
    #[arg(long)]
    pub language: Option<String>,

    /// Extra condition as FIELD:OPERATOR:VALUE (repeatable)
    #[arg(long = "filter", short = 'f', value_name = "FIELD:OP:VALUE")]
    pub filters: Vec<Predicate>,
}

impl FilterArgs {
    pub fn into_predicates(self) -> Vec<Predicate> {
        let mut predicates = build_predicates([
            (FilterField::Title, FilterOperator::Contains, self.title),
            (FilterField::Genre, FilterOperator::Contains, self.genre),
            (FilterField::Mpa, FilterOperator::Equals, self.rated),
            (FilterField::Released, FilterOperator::GreaterOrEqual, self.year_min),
            (FilterField::Released, FilterOperator::LessOrEqual, self.year_max),
            (FilterField::Imdb, FilterOperator::GreaterOrEqual, self.rating_min),
            (FilterField::Imdb, FilterOperator::LessOrEqual, self.rating_max),
            (FilterField::BoxOffice, FilterOperator::GreaterOrEqual, self.box_office_min),
            (FilterField::BoxOffice, FilterOperator::LessOrEqual, self.box_office_max),
            (FilterField::Director, FilterOperator::Contains, self.director),
            (FilterField::Actor, FilterOperator::Contains, self.actor),
            (FilterField::Writer, FilterOperator::Contains, self.writer),
            (FilterField::Language, FilterOperator::Contains, self.language),
        ]);
        predicates.extend(self.filters);
        predicates
    }
}

/// Config file a command should write to
pub fn config_file_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathManager::default().config_file())
}
