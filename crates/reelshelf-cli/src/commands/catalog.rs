use super::{catalog_record, open_manager, watchlist_index, FilterArgs};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_catalog_config::{Config, PathManager};
use media_catalog_core::{CollectionManager, CollectionTarget, FetchQuery, FilterOptions, Predicate};
use media_catalog_models::MediaRecord;
use owo_colors::OwoColorize;
use serde_json::json;

fn target_for(manager: &CollectionManager, watchlist: Option<&str>) -> Result<CollectionTarget> {
    match watchlist {
        Some(name) => Ok(CollectionTarget::Watchlist(watchlist_index(manager, name)?)),
        None => Ok(CollectionTarget::Source),
    }
}

fn target_label(manager: &CollectionManager, target: CollectionTarget) -> String {
    match target {
        CollectionTarget::Source => "catalog".to_string(),
        CollectionTarget::Watchlist(i) => manager
            .watchlist_name(i)
            .map(|name| format!("watchlist '{}'", name))
            .unwrap_or_else(|_| format!("watchlist #{}", i)),
    }
}

pub async fn run_list(
    config: &Config,
    paths: PathManager,
    watchlist: Option<String>,
    filters: FilterArgs,
    fetch: bool,
    output: &Output,
) -> Result<()> {
    let mut manager = open_manager(config, paths)?;
    let predicates = filters.into_predicates();

    if fetch {
        if FetchQuery::from_predicates(&predicates).is_none() {
            output.warn("--fetch needs --title (or a title filter); skipping lookup");
        } else {
            let added = manager.fetch_for_filter(&predicates).await;
            finish_writes(&mut manager, output);
            output.info(format!("{} new record(s) added from OMDb", added));
        }
    }

    let target = target_for(&manager, watchlist.as_deref())?;
    let label = target_label(&manager, target);
    let records: Vec<&MediaRecord> = manager.query(target, Some(predicates.as_slice()))?.collect();
    print_records(&label, &records, &predicates, output);
    Ok(())
}

pub fn print_records(label: &str, records: &[&MediaRecord], predicates: &[Predicate], output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if records.is_empty() {
                output.info(format!("No records in the {} match", label));
                return;
            }
            println!("{}", records_table(records));
            let filter_note = if predicates.is_empty() {
                String::new()
            } else {
                let conditions: Vec<String> = predicates.iter().map(|p| p.to_string()).collect();
                format!(" matching {}", conditions.join(" and "))
            };
            println!("{}", format!("{} record(s) in the {}{}", records.len(), label, filter_note).bright_black());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "collection": label,
                "filters": predicates.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                "count": records.len(),
                "records": records,
            }));
        }
    }
}

fn records_table(records: &[&MediaRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["IMDb ID", "Title", "Year", "Genre", "Rated", "IMDb", "Box Office", "Watched", "My Rating"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(comfy_table::Attribute::Bold)),
    );
    for record in records {
        table.add_row(vec![
            Cell::new(&record.imdb_id),
            Cell::new(&record.title),
            Cell::new(record.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(record.genres_joined()),
            Cell::new(&record.rated),
            Cell::new(record.imdb_rating.map(|r| format!("{:.1}", r)).unwrap_or_default()),
            Cell::new(&record.box_office),
            Cell::new(if record.watched { "✓".green().to_string() } else { String::new() }),
            Cell::new(record.my_rating.map(|r| format!("{:.1}", r)).unwrap_or_default()),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn run_options(config: &Config, paths: PathManager, watchlist: Option<String>, output: &Output) -> Result<()> {
    let manager = open_manager(config, paths)?;
    let target = target_for(&manager, watchlist.as_deref())?;
    // Options describe the whole collection, not a filtered view of it
    let no_filter: Vec<Predicate> = Vec::new();
    let options = FilterOptions::from_records(manager.query(target, Some(no_filter.as_slice()))?);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new(format!("Filter values ({})", target_label(&manager, target)))
                    .fg(comfy_table::Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
            ]);
            let range = |r: Option<(String, String)>| r.map(|(lo, hi)| format!("{} - {}", lo, hi)).unwrap_or_default();
            table.add_row(vec![Cell::new("Types"), Cell::new(options.content_types.join(", "))]);
            table.add_row(vec![Cell::new("Genres"), Cell::new(options.genres.join(", "))]);
            table.add_row(vec![Cell::new("MPA ratings"), Cell::new(options.ratings.join(", "))]);
            table.add_row(vec![Cell::new("Languages"), Cell::new(options.languages.join(", "))]);
            table.add_row(vec![Cell::new("Countries"), Cell::new(options.countries.join(", "))]);
            table.add_row(vec![
                Cell::new("Years"),
                Cell::new(range(options.year_range.map(|(lo, hi)| (lo.to_string(), hi.to_string())))),
            ]);
            table.add_row(vec![
                Cell::new("IMDb rating"),
                Cell::new(range(options.imdb_rating_range.map(|(lo, hi)| (format!("{:.1}", lo), format!("{:.1}", hi))))),
            ]);
            table.add_row(vec![Cell::new("Box office"), Cell::new(range(options.box_office_range_display()))]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let box_office_display = options.box_office_range_display();
            output.json(&json!({
                "collection": target_label(&manager, target),
                "options": options,
                "box_office_display": box_office_display,
            }));
        }
    }
    Ok(())
}

pub fn run_rate(config: &Config, paths: PathManager, imdb_id: &str, rating: f64, output: &Output) -> Result<()> {
    if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
        return Err(color_eyre::eyre::eyre!("Rating must be between 0 and 10, got {}", rating));
    }
    let mut manager = open_manager(config, paths)?;
    let record = catalog_record(&manager, imdb_id)?;
    manager.set_my_rating(&record, rating)?;
    finish_writes(&mut manager, output);
    output.success(format!("Rated {} ({}) {:.1}", record.title, record.imdb_id, rating));
    Ok(())
}

pub fn run_watched(config: &Config, paths: PathManager, imdb_id: &str, watched: bool, output: &Output) -> Result<()> {
    let mut manager = open_manager(config, paths)?;
    let record = catalog_record(&manager, imdb_id)?;
    manager.set_watched(&record, watched)?;
    finish_writes(&mut manager, output);
    let state = if watched { "watched" } else { "not watched" };
    output.success(format!("Marked {} ({}) as {}", record.title, record.imdb_id, state));
    Ok(())
}

/// Retry any write that failed during the command, warning if it still fails
pub fn finish_writes(manager: &mut CollectionManager, output: &Output) {
    if !manager.has_pending_writes() {
        return;
    }
    if let Err(e) = manager.flush() {
        output.warn(format!("Some changes could not be saved: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finish_writes_retries_failed_saves() {
        let dir = TempDir::new().unwrap();
        let mut manager = CollectionManager::open(&Config::default(), PathManager::with_base(dir.path())).unwrap();
        let record = manager.store().iter().next().unwrap().clone();
        let index = manager.create_watchlist("Queue").unwrap();

        let path = dir.path().join("data/watchlists/Queue.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        manager.add_to_watchlist(&record, index).unwrap();
        assert!(manager.has_pending_writes());

        let output = Output::new(OutputFormat::Human, true);
        finish_writes(&mut manager, &output);
        assert!(manager.has_pending_writes());

        std::fs::remove_dir(&path).unwrap();
        finish_writes(&mut manager, &output);
        assert!(!manager.has_pending_writes());
        assert!(path.is_file());
    }
}
