use clap::{ArgAction, Parser, Subcommand};
use commands::{catalog, config, fetch, watchlist, FilterArgs};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelshelf")]
#[command(about = "ReelShelf - keep a movie catalog and the watchlists you build from it")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records from the catalog or a watchlist
    #[command(long_about = "List records from the catalog, or from one watchlist with --watchlist. Filters are ANDed together. Use the shortcut flags or repeat --filter FIELD:OPERATOR:VALUE, e.g. --filter 'genre:contains:drama' --filter 'year:>=:1990'.")]
    List {
        /// Watchlist to list instead of the catalog
        #[arg(long, short)]
        watchlist: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Look the --title up on OMDb first and add any new results to the catalog
        #[arg(long, action = ArgAction::SetTrue)]
        fetch: bool,
    },
    /// Show the values present in the catalog or a watchlist, for building filters
    Options {
        /// Watchlist to inspect instead of the catalog
        #[arg(long, short)]
        watchlist: Option<String>,
    },
    /// Look a title up on OMDb and add the results to the catalog
    #[command(long_about = "Search OMDb for a title and merge every match into the catalog. Records already in the catalog are left untouched. Give one year for an exact match or both --year-min and --year-max for a range.")]
    Fetch {
        title: String,

        /// Earliest release year
        #[arg(long)]
        year_min: Option<u32>,

        /// Latest release year
        #[arg(long)]
        year_max: Option<u32>,
    },
    /// Set your own rating (0-10) for a record
    Rate {
        /// IMDb id of the record, e.g. tt0133093
        imdb_id: String,

        rating: f64,
    },
    /// Mark a record as watched
    Watched {
        /// IMDb id of the record
        imdb_id: String,

        /// Mark it as not watched instead
        #[arg(long, action = ArgAction::SetTrue)]
        unset: bool,
    },
    /// Create, fill and share watchlists
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// List every watchlist with its size
    List,
    /// Create an empty watchlist
    Create { name: String },
    /// Delete a watchlist (the records stay in the catalog)
    Delete { name: String },
    /// Create a watchlist from a JSON, XML or CSV file, named after the file
    Import { path: PathBuf },
    /// Write a watchlist to a file; the extension picks the format (json, xml, csv, txt)
    Export { name: String, path: PathBuf },
    /// Add a catalog record to a watchlist
    Add { name: String, imdb_id: String },
    /// Remove a record from a watchlist
    Remove { name: String, imdb_id: String },
    /// Show the records of a watchlist
    Show {
        name: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration (masks the API key)
    Show {
        /// Show the API key in full
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // `config` commands still run on a broken config file so it can be repaired
    let (config, paths, config_error) = if matches!(cli.command, Commands::Config { .. }) {
        commands::load_config_or_default(cli.config.as_deref())
    } else {
        let (config, paths) = commands::load_config(cli.config.as_deref())?;
        (config, paths, None)
    };
    let log_file = config.logging.file.as_deref().map(|file| paths.resolve_log_file(file));

    logging::init_logging(cli.verbose, cli.quiet, &config.logging.level, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    if let Some(e) = config_error {
        output.warn(format!("{}; using defaults", e));
    }

    match cli.command {
        Commands::List { watchlist, filters, fetch } => {
            catalog::run_list(&config, paths, watchlist, filters, fetch, &output).await
        }
        Commands::Options { watchlist } => catalog::run_options(&config, paths, watchlist, &output),
        Commands::Fetch { title, year_min, year_max } => {
            fetch::run_fetch(&config, paths, title, year_min, year_max, &output).await
        }
        Commands::Rate { imdb_id, rating } => catalog::run_rate(&config, paths, &imdb_id, rating, &output),
        Commands::Watched { imdb_id, unset } => catalog::run_watched(&config, paths, &imdb_id, !unset, &output),
        Commands::Watchlist { cmd } => watchlist::run_watchlist(cmd, &config, paths, &output),
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &config, cli.config, &output)
        }
    }
}
