use super::config_file_path;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_catalog_config::{Config, PathManager};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;

pub fn run_config(cmd: ConfigCommands, config: &Config, explicit_path: Option<PathBuf>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(config, full, config_file_path(explicit_path), output),
        ConfigCommands::Init { force } => init_config(config_file_path(explicit_path), force, output),
    }
}

fn show_config(config: &Config, full: bool, config_file: PathBuf, output: &Output) -> Result<()> {
    let paths = config.paths(PathManager::default());
    let api_key = config.fetch.resolved_api_key().unwrap_or_default();
    let api_key_display = if full { api_key.clone() } else { mask_string(&api_key) };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if !config_file.exists() {
                output.warn(format!(
                    "No config file at {} (using defaults). Create one with 'reelshelf config init'.",
                    config_file.display()
                ));
            }

            let mut storage_table = Table::new();
            storage_table.set_header(vec![
                Cell::new("Storage").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
            ]);
            storage_table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display())]);
            storage_table.add_row(vec![Cell::new("Data Directory"), Cell::new(paths.data_dir().display())]);
            storage_table.add_row(vec![
                Cell::new("Catalog File"),
                Cell::new(paths.source_file(config.storage.source_format).display()),
            ]);
            storage_table.add_row(vec![Cell::new("Watchlists"), Cell::new(paths.watchlist_dir().display())]);
            storage_table.add_row(vec![
                Cell::new("Archive"),
                Cell::new(
                    config
                        .storage
                        .archive_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "off".bright_black().to_string()),
                ),
            ]);
            storage_table.load_preset(comfy_table::presets::UTF8_FULL);
            storage_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", storage_table);
            println!();

            let mut fetch_table = Table::new();
            fetch_table.set_header(vec![
                Cell::new("OMDb Lookups").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
            ]);
            fetch_table.add_row(vec![
                Cell::new("Enabled"),
                Cell::new(if config.is_fetch_configured() { "✓".green().to_string() } else { "✗".red().to_string() }),
            ]);
            fetch_table.add_row(vec![Cell::new("API Key"), Cell::new(api_key_display)]);
            fetch_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.fetch.base_url)]);
            fetch_table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.fetch.timeout_secs))]);
            fetch_table.add_row(vec![Cell::new("Max Results"), Cell::new(config.fetch.max_results)]);
            fetch_table.load_preset(comfy_table::presets::UTF8_FULL);
            fetch_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", fetch_table);
            println!();

            let mut logging_table = Table::new();
            logging_table.set_header(vec![
                Cell::new("Logging").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold)
            ]);
            logging_table.add_row(vec![Cell::new("Level"), Cell::new(&config.logging.level)]);
            logging_table.add_row(vec![
                Cell::new("File"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "stderr".to_string()),
                ),
            ]);
            logging_table.load_preset(comfy_table::presets::UTF8_FULL);
            logging_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", logging_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file,
                "config_file_exists": config_file.exists(),
                "data_dir": paths.data_dir(),
                "storage": {
                    "source_format": config.storage.source_format,
                    "archive_dir": config.storage.archive_dir,
                },
                "fetch": {
                    "enabled": config.is_fetch_configured(),
                    "api_key": api_key_display,
                    "base_url": config.fetch.base_url,
                    "timeout_secs": config.fetch.timeout_secs,
                    "max_results": config.fetch.max_results,
                },
                "logging": {
                    "level": config.logging.level,
                    "file": config.logging.file,
                },
            }));
        }
    }
    Ok(())
}

fn init_config(config_file: PathBuf, force: bool, output: &Output) -> Result<()> {
    if config_file.exists() && !force {
        return Err(color_eyre::eyre::eyre!(
            "Config file already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    output.info("Set fetch.api_key (or OMDB_API_KEY) to enable OMDb lookups.");
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_API_KEY" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_force_repairs_a_broken_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\ntimeout_secs = 0\n").unwrap();
        assert!(load_config(Some(path.as_path())).is_err());

        let output = Output::new(OutputFormat::Human, true);
        assert!(init_config(path.clone(), false, &output).is_err());
        init_config(path.clone(), true, &output).unwrap();

        let (config, _) = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.fetch.timeout_secs, 10);
    }

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("abcdef12"), "ab***12");
        assert_eq!(mask_string("ключ-éà"), "кл***éà");
        assert_eq!(mask_string("ñéü"), "***");
    }
}
