use super::catalog::finish_writes;
use super::open_manager;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use media_catalog_config::{Config, PathManager};
use media_catalog_sources::YearQualifier;
use serde_json::json;

pub async fn run_fetch(
    config: &Config,
    paths: PathManager,
    title: String,
    year_min: Option<u32>,
    year_max: Option<u32>,
    output: &Output,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Title must not be empty"));
    }
    if !config.is_fetch_configured() {
        return Err(color_eyre::eyre::eyre!(
            "OMDb lookups are not configured: set fetch.api_key in the config file or OMDB_API_KEY"
        ));
    }

    let mut manager = open_manager(config, paths)?;
    let before = manager.store().len();
    let added = manager.fetch_and_merge_by_title(&title, year_min, year_max).await;
    finish_writes(&mut manager, output);

    let years = YearQualifier::from_bounds(year_min, year_max).map(|q| q.to_string());
    match output.format() {
        OutputFormat::Human => {
            let scope = years.map(|y| format!(" ({})", y)).unwrap_or_default();
            if added == 0 {
                output.info(format!("No new records for '{}'{}", title, scope));
            } else {
                output.success(format!(
                    "Added {} record(s) for '{}'{}; catalog now holds {}",
                    added,
                    title,
                    scope,
                    before + added
                ));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "title": title,
                "years": years,
                "added": added,
                "catalog_size": manager.store().len(),
            }));
        }
    }
    Ok(())
}
