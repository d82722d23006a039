use super::catalog::{finish_writes, print_records};
use super::{catalog_record, open_manager, watchlist_index};
use crate::output::{Output, OutputFormat};
use crate::WatchlistCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_catalog_config::{Config, PathManager};
use media_catalog_core::{CollectionManager, CollectionTarget};
use media_catalog_models::MediaRecord;
use serde_json::json;
use std::path::Path;

pub fn run_watchlist(cmd: WatchlistCommands, config: &Config, paths: PathManager, output: &Output) -> Result<()> {
    let mut manager = open_manager(config, paths)?;

    match cmd {
        WatchlistCommands::List => list_watchlists(&manager, output),
        WatchlistCommands::Create { name } => {
            manager.create_watchlist(&name)?;
            finish_writes(&mut manager, output);
            output.success(format!("Created watchlist '{}'", name));
        }
        WatchlistCommands::Delete { name } => {
            let index = watchlist_index(&manager, &name)?;
            let deleted = manager.delete_watchlist(index)?;
            output.success(format!("Deleted watchlist '{}' ({} records)", deleted.name(), deleted.len()));
        }
        WatchlistCommands::Import { path } => import(&mut manager, &path, output)?,
        WatchlistCommands::Export { name, path } => {
            let index = watchlist_index(&manager, &name)?;
            manager.export_watchlist(index, &path)?;
            output.success(format!("Exported '{}' to {}", name, path.display()));
        }
        WatchlistCommands::Add { name, imdb_id } => {
            let index = watchlist_index(&manager, &name)?;
            let record = catalog_record(&manager, &imdb_id)?;
            if manager.add_to_watchlist(&record, index)? {
                finish_writes(&mut manager, output);
                output.success(format!("Added {} to '{}'", record.title, name));
            } else {
                output.info(format!("{} is already in '{}'", record.title, name));
            }
        }
        WatchlistCommands::Remove { name, imdb_id } => {
            let index = watchlist_index(&manager, &name)?;
            // Removing an id that is not in the catalog is still a harmless no-op
            let record = manager
                .store()
                .get(imdb_id.trim())
                .cloned()
                .unwrap_or_else(|| MediaRecord::new(imdb_id.trim(), "", None));
            if manager.remove_from_watchlist(&record, index)? {
                finish_writes(&mut manager, output);
                output.success(format!("Removed {} from '{}'", imdb_id.trim(), name));
            } else {
                output.info(format!("{} is not in '{}'", imdb_id.trim(), name));
            }
        }
        WatchlistCommands::Show { name, filters } => {
            let index = watchlist_index(&manager, &name)?;
            let predicates = filters.into_predicates();
            let records: Vec<&MediaRecord> = manager
                .query(CollectionTarget::Watchlist(index), Some(predicates.as_slice()))?
                .collect();
            print_records(&format!("watchlist '{}'", name), &records, &predicates, output);
        }
    }
    Ok(())
}

fn list_watchlists(manager: &CollectionManager, output: &Output) {
    let summaries: Vec<(&str, usize)> = (0..manager.watchlist_count())
        .filter_map(|i| manager.watchlist(i).ok())
        .map(|w| (w.name(), w.len()))
        .collect();

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if summaries.is_empty() {
                output.info("No watchlists yet. Create one with 'reelshelf watchlist create <NAME>'");
                return;
            }
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Watchlist").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Records").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for (name, len) in &summaries {
                table.add_row(vec![Cell::new(name), Cell::new(len)]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let lists: Vec<_> = summaries
                .iter()
                .map(|(name, len)| json!({ "name": name, "records": len }))
                .collect();
            output.json(&json!({ "watchlists": lists }));
        }
    }
}

fn import(manager: &mut CollectionManager, path: &Path, output: &Output) -> Result<()> {
    let catalog_before = manager.store().len();
    let index = manager.import_external(path)?;
    finish_writes(manager, output);

    let watchlist = manager.watchlist(index)?;
    output.success(format!(
        "Imported '{}' with {} records ({} new to the catalog)",
        watchlist.name(),
        watchlist.len(),
        manager.store().len() - catalog_before
    ));
    Ok(())
}
