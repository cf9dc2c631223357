//! CLI entry point for the documentation symbol search.
//!
//! Provides commands for searching generated documentation indexes and
//! inspecting their shards.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use doxsearch::display::{THEME, create_results_table, create_shard_table};
use doxsearch::io::{ExitCode, JsonResponse, OutputFormat, ResponseMeta};
use doxsearch::{SearchEngine, SearchError, Settings, SymbolEntry};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Documentation symbol search
#[derive(Parser)]
#[command(
    name = "doxsearch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Search symbols in generated API documentation",
    long_about = "Load the search index shards of generated API documentation and query them incrementally.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the shard files (overrides config)
    #[arg(short = 'd', long, global = true)]
    search_dir: Option<PathBuf>,

    /// Log loading and matching details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Write a default .doxsearch/settings.toml")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Search symbols by partial name
    #[command(
        about = "Find symbols whose key contains the query",
        after_help = "Examples:\n  doxsearch search hse_\n  doxsearch search value --all\n  doxsearch search HardFault --json"
    )]
    Search {
        /// Query as typed by a user
        query: String,

        /// Maximum number of results (0 = unlimited, overrides config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Load every shard first so substring matches from all partitions appear
        #[arg(short, long)]
        all: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Exact key lookup
    #[command(about = "Show every occurrence of one exact symbol key")]
    Lookup {
        /// Symbol name or key
        key: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List shards and their load status
    #[command(about = "Load all shards and report per-shard status")]
    Shards {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct ShardStatus {
    shard: String,
    new_entries: usize,
    folded_entries: usize,
    status: String,
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if verbose || debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_with_error(error: &SearchError, format: OutputFormat) -> ! {
    if format.is_json() {
        let response = JsonResponse::from_error(error);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing response: {e}"),
        }
    } else {
        eprintln!("{}", THEME.error_with_icon(&error.to_string()));
        for suggestion in error.recovery_suggestions() {
            eprintln!("  - {suggestion}");
        }
    }
    std::process::exit(ExitCode::from_error(error).into());
}

fn print_json<T: Serialize>(response: &JsonResponse<T>) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error serializing response: {e}"),
    }
}

fn main() {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(ExitCode::ConfigError.into());
        })
    } else {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })
    };

    init_logging(cli.verbose, config.debug);

    if let Some(dir) = &cli.search_dir {
        config.index.search_dir = dir.clone();
    }

    match &cli.command {
        Commands::Init { force } => {
            let dir = std::env::current_dir().unwrap_or_default();
            match Settings::init_config_file(&dir, *force) {
                Ok(path) => {
                    println!(
                        "{}",
                        THEME.success_with_icon(&format!(
                            "Created configuration file at: {}",
                            path.display()
                        ))
                    );
                    println!("Edit this file to point index.search_dir at your documentation.");
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(ExitCode::ConfigError.into());
                }
            }
            return;
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            match toml::to_string_pretty(&config) {
                Ok(toml_str) => println!("{toml_str}"),
                Err(e) => eprintln!("Error displaying config: {e}"),
            }
            return;
        }

        _ => {}
    }

    let json = matches!(
        cli.command,
        Commands::Search { json: true, .. }
            | Commands::Lookup { json: true, .. }
            | Commands::Shards { json: true }
    );
    let format = OutputFormat::from_json_flag(json);

    let engine = SearchEngine::from_settings(&config).unwrap_or_else(|e| exit_with_error(&e, format));
    let start = Instant::now();

    match cli.command {
        Commands::Search {
            query, limit, all, ..
        } => {
            if all {
                load_everything(&engine, format);
            }
            let limit = limit.unwrap_or(config.search.max_results);
            let results = engine.search_with_limit(&query, limit);
            let code = ExitCode::from_result_count(results.len());

            if format.is_json() {
                let meta = ResponseMeta::now(Some(start.elapsed().as_millis() as u64));
                let response = if code.is_success() {
                    JsonResponse::success(&results)
                } else {
                    JsonResponse::no_results(&results, &format!("No symbols match '{query}'"))
                };
                print_json(&response.with_meta(meta));
            } else if results.is_empty() {
                println!("No symbols match '{query}'");
            } else {
                println!("{}", create_results_table(&results));
                if results.truncated {
                    println!(
                        "{}",
                        THEME.warning_with_icon(&format!(
                            "Showing {} of {} matches, use --limit to see more",
                            results.len(),
                            results.total
                        ))
                    );
                }
            }

            print_load_failures(&engine, format);
            std::process::exit(code.into());
        }

        Commands::Lookup { key, .. } => {
            load_everything(&engine, format);
            let found: Vec<SymbolEntry> = engine.lookup_exact(&key);
            let code = ExitCode::from_result_count(found.len());

            if format.is_json() {
                let meta = ResponseMeta::now(Some(start.elapsed().as_millis() as u64));
                let response = if code.is_success() {
                    JsonResponse::success(&found)
                } else {
                    JsonResponse::no_results(&found, &format!("No symbol with key '{key}'"))
                };
                print_json(&response.with_meta(meta));
            } else if found.is_empty() {
                println!("No symbol with key '{key}'");
            } else {
                for entry in &found {
                    println!("{}", THEME.apply(&THEME.code, &entry.display_name));
                    for occ in &entry.occurrences {
                        let label = if occ.container_label.is_empty() {
                            occ.page_name()
                        } else {
                            occ.container_label.as_str()
                        };
                        println!("  {}  {}", label, THEME.apply(&THEME.path, &occ.url));
                    }
                }
            }
            std::process::exit(code.into());
        }

        Commands::Shards { .. } => {
            load_everything(&engine, format);
            let snapshot = engine.index().snapshot();
            let failures = engine.loader().failures();

            let mut counts: Vec<ShardStatus> = snapshot
                .shards()
                .iter()
                .map(|shard| {
                    let report = snapshot.shard_report(shard).unwrap_or_default();
                    ShardStatus {
                        shard: shard.to_string(),
                        new_entries: report.added,
                        folded_entries: report.merged,
                        status: "loaded".to_string(),
                    }
                })
                .collect();
            counts.extend(failures.into_iter().map(|(shard, reason)| ShardStatus {
                shard: shard.to_string(),
                new_entries: 0,
                folded_entries: 0,
                status: format!("failed: {reason}"),
            }));
            counts.sort_by(|a, b| a.shard.cmp(&b.shard));

            if format.is_json() {
                let meta = ResponseMeta::now(Some(start.elapsed().as_millis() as u64));
                print_json(&JsonResponse::success(&counts).with_meta(meta));
            } else {
                println!(
                    "{}",
                    create_shard_table(
                        counts
                            .into_iter()
                            .map(|s| (s.shard, s.new_entries, s.folded_entries, s.status))
                            .collect()
                    )
                );
                println!(
                    "{} entries, {} occurrences from {}",
                    snapshot.len(),
                    snapshot.occurrence_count(),
                    engine.loader().source().describe()
                );
            }
        }

        Commands::Init { .. } | Commands::Config => {
            // Already handled above
            unreachable!()
        }
    }
}

/// Load every shard; individual shard failures are reported, not fatal.
fn load_everything(engine: &SearchEngine, format: OutputFormat) {
    match engine.loader().ensure_all_loaded() {
        Ok(summary) => {
            if !format.is_json() {
                for (shard, e) in &summary.failed {
                    eprintln!(
                        "{}",
                        THEME.warning_with_icon(&format!("Skipped shard {shard}: {e}"))
                    );
                }
            }
        }
        Err(e) => exit_with_error(&e, format),
    }
}

fn print_load_failures(engine: &SearchEngine, format: OutputFormat) {
    if format.is_json() {
        return;
    }
    for (shard, reason) in engine.loader().failures() {
        eprintln!(
            "{}",
            THEME.apply(&THEME.dim, format!("note: shard {shard} unavailable ({reason})"))
        );
    }
}
