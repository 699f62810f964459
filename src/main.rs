use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use doxindex::config::{default_config_path, load_config, save_config, Config};
use doxindex::search_data::{
    execute_search, to_json, validate, write_search_data, MatchMode, SearchCategory, SearchIndex,
    SearchQuery,
};

/// Query and check the search index of a generated documentation site
#[derive(Parser, Debug)]
#[command(name = "doxindex", version)]
struct Args {
    /// Search data directory or single data file
    #[arg(long, env = "DOXINDEX_SEARCH_DIR", global = true)]
    search_dir: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, env = "DOXINDEX_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Root URL of the generated site, used to resolve relative links
    #[arg(long, env = "DOXINDEX_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up symbols
    Query {
        text: String,
        #[arg(long, value_parser = parse_mode)]
        mode: Option<MatchMode>,
        #[arg(long, value_parser = parse_category)]
        category: Option<SearchCategory>,
        /// Only entries with a link whose scope contains this text
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        local_only: bool,
        /// Maximum results; 0 returns every match
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Validate the index; exits with status 1 when issues are found
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Write the index back out
    Dump {
        #[arg(long, value_enum, default_value_t = DumpFormat::Js)]
        format: DumpFormat,
    },
    /// Entry and link counts per category
    Stats,
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DumpFormat {
    Js,
    Json,
}

fn parse_mode(s: &str) -> Result<MatchMode, String> {
    s.parse()
}

fn parse_category(s: &str) -> Result<SearchCategory, String> {
    s.parse()
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    debug!("Config file: {}", config_path.display());
    let config = load_config(&config_path).with_overrides(args.search_dir, args.base_url);

    match args.command {
        Command::Query {
            text,
            mode,
            category,
            scope,
            local_only,
            limit,
            json,
        } => {
            let index = load_index(&config)?;
            let query = SearchQuery {
                text,
                mode: mode.unwrap_or(config.default_mode),
                category,
                scope,
                local_only,
                limit: config.result_limit(limit),
            };
            run_query(&index, &query, config.base_url.as_deref(), json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { json } => {
            let index = load_index(&config)?;
            let issues = validate(&index);
            if json {
                println!("{}", serde_json::to_string_pretty(&issues)?);
            } else {
                for issue in &issues {
                    println!("{}", issue);
                }
            }
            if issues.is_empty() {
                info!("{} entries checked, no issues", index.len());
                Ok(ExitCode::SUCCESS)
            } else {
                error!("{} issue(s) in {} entries", issues.len(), index.len());
                Ok(ExitCode::from(1))
            }
        }
        Command::Dump { format } => {
            let index = load_index(&config)?;
            match format {
                DumpFormat::Js => print!("{}", write_search_data(index.entries())),
                DumpFormat::Json => println!("{}", to_json(index.entries())?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats => {
            for s in load_index(&config)?.stats() {
                println!(
                    "{:<12} files={:<4} entries={:<6} links={:<6} external={}",
                    s.category, s.files, s.entries, s.links, s.external_links
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                save_config(&config_path, &config)?;
                info!("Saved config to {}", config_path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_index(config: &Config) -> Result<SearchIndex, Box<dyn std::error::Error>> {
    let search_dir = config
        .search_dir
        .as_deref()
        .ok_or("No search data given. Use --search-dir or set DOXINDEX_SEARCH_DIR")?;
    Ok(SearchIndex::load(search_dir)?)
}

fn run_query(
    index: &SearchIndex,
    query: &SearchQuery,
    base_url: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let hits = execute_search(index, query);
    debug!(
        "{} hit(s) for '{}' ({}, limit {:?})",
        hits.len(),
        query.text,
        query.mode,
        query.limit
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    for hit in &hits {
        println!("{}", hit.entry.display_label());
        for link in &hit.entry.links {
            let scope = link.display_scope();
            if scope.is_empty() {
                println!("    {}", link.resolve(base_url));
            } else {
                println!("    {}  {}", scope, link.resolve(base_url));
            }
        }
    }
    Ok(())
}
