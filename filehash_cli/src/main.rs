use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use filehash_cli::config::{AppConfig, CliOverrides, ConfigManager};
use filehash_cli::file_discovery::{FileDiscoveryOptions, discover_inputs};
use filehash_cli::output::{OutputFormat, create_formatter};
use filehash_cli::{progress, terminal};
use filehash_core::{
    AlgorithmConfig, BatchOutcome, DEFAULT_EXPORT_FILE_NAME, EngineStatus, HashingEngine,
    NullProvider, ProgressProvider, write_plain_text,
};

#[derive(Parser)]
#[command(name = "filehash")]
#[command(author, version, about = "Hash files with MD5, SHA1 and CRC32", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash files and directories
    Hash {
        /// Files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Comma separated checks: version,date,md5,sha1,crc32
        #[arg(short, long, value_name = "LIST")]
        checks: Option<String>,

        /// Output format (defaults to output.default_format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Include patterns for directory contents (repeatable)
        #[arg(short = 'i', long = "include", value_name = "PATTERN")]
        include_patterns: Vec<String>,

        /// Exclude patterns for directory contents (repeatable, overrides includes)
        #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
        exclude_patterns: Vec<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Disable progress bar display
        #[arg(long)]
        no_progress: bool,

        /// Write results to a file instead of stdout
        #[arg(
            short,
            long,
            value_name = "PATH",
            num_args = 0..=1,
            default_missing_value = DEFAULT_EXPORT_FILE_NAME
        )]
        output: Option<PathBuf>,

        /// Give up reading a file after this many seconds
        #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
        read_timeout: Option<u64>,

        /// Render modification dates in UTC
        #[arg(long)]
        utc: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., checks.include_md5)
        key: String,
    },

    /// Set a configuration value
    Set { key: String, value: String },

    /// List all configuration values
    List,

    /// Print the configuration file location
    Path,
}

struct HashArgs {
    paths: Vec<PathBuf>,
    checks: Option<String>,
    format: Option<OutputFormat>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    recursive: bool,
    no_progress: bool,
    output: Option<PathBuf>,
    read_timeout: Option<u64>,
    utc: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("filehash_core", log::LevelFilter::Debug)
            .filter_module("filehash_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if !terminal::supports_ansi() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Hash {
            paths,
            checks,
            format,
            include_patterns,
            exclude_patterns,
            recursive,
            no_progress,
            output,
            read_timeout,
            utc,
        } => {
            hash_command(HashArgs {
                paths,
                checks,
                format,
                include_patterns,
                exclude_patterns,
                recursive,
                no_progress,
                output,
                read_timeout,
                utc,
            })
            .await?;
        }
        Commands::Config { command } => config_command(command)?,
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

async fn hash_command(args: HashArgs) -> Result<()> {
    let mut config: AppConfig = ConfigManager::new()
        .load()
        .context("Failed to load configuration")?;

    let checks = args
        .checks
        .as_deref()
        .map(AlgorithmConfig::parse_list)
        .transpose()
        .context("Invalid --checks value")?;
    config.apply_cli_overrides(CliOverrides {
        checks,
        format: args.format.map(|f| f.as_str().to_string()),
        read_timeout_seconds: args.read_timeout,
        utc: args.utc,
        no_progress: args.no_progress,
    });
    let format = OutputFormat::from_string(&config.output.default_format)?;

    let use_color = config.output.color_enabled && terminal::supports_ansi();
    if !config.output.color_enabled {
        colored::control::set_override(false);
    }

    for path in &args.paths {
        if !path.exists() {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }

    let options = FileDiscoveryOptions::new()
        .with_include_patterns(args.include_patterns)
        .with_exclude_patterns(args.exclude_patterns)
        .with_recursive(args.recursive);
    let files = discover_inputs(&args.paths, &options).context("File discovery failed")?;

    if files.is_empty() {
        eprintln!("{}", "No matching files found.".yellow());
        return Ok(());
    }
    let total_bytes: u64 = files
        .iter()
        .filter_map(|path| std::fs::metadata(path).ok())
        .map(|metadata| metadata.len())
        .sum();
    log::info!(
        "Hashing {} file(s), {}",
        files.len(),
        progress::format_bytes(total_bytes)
    );

    let show_progress =
        config.output.progress_enabled && terminal::should_show_progress_by_default();
    let (provider, progress_rx) = if show_progress {
        let (provider, rx) = progress::create_progress_infrastructure();
        (provider, Some(rx))
    } else {
        (Arc::new(NullProvider) as Arc<dyn ProgressProvider>, None)
    };
    let progress_handle = progress_rx.map(|rx| tokio::spawn(progress::render_progress(rx)));

    let engine = HashingEngine::builder()
        .options(config.engine.clone())
        .progress_provider(provider)
        .build()
        .context("Failed to create hashing engine")?;

    let interrupt = {
        let engine = engine.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted, stopping after the current file");
                engine.cancel();
            }
        })
    };

    let receipt = engine.submit(files, config.checks)?;
    if receipt.skipped > 0 {
        log::info!("{} duplicate path(s) skipped", receipt.skipped);
    }

    let status = engine.wait_idle().await;
    interrupt.abort();
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let results = engine.snapshot_results();
    match args.output {
        Some(path) if format == OutputFormat::Text => {
            write_plain_text(&path, &results, &config.checks)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Results written to {}", path.display());
        }
        Some(path) => {
            let formatter = create_formatter(format, config.checks, false);
            std::fs::write(&path, formatter.format_batch(&results)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Results written to {}", path.display());
        }
        None => {
            let formatter = create_formatter(format, config.checks, use_color);
            print!("{}", formatter.format_batch(&results)?);
            if format == OutputFormat::Json {
                println!();
            }
        }
    }

    if let EngineStatus::Finished(BatchOutcome::Cancelled { unprocessed }) = status {
        eprintln!(
            "{}",
            format!("Cancelled: {unprocessed} file(s) were not hashed").yellow()
        );
    }

    Ok(())
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => match manager.get(&key) {
            Ok(value) => println!("{value}"),
            Err(e) => {
                eprintln!("{}", format!("Error: {e}").red());
                std::process::exit(1);
            }
        },
        ConfigCommand::Set { key, value } => match manager.set(&key, &value) {
            Ok(()) => {
                eprintln!("{}", format!("Set {key} = {value}").green());
                eprintln!(
                    "Configuration saved to: {}",
                    manager.config_path().display()
                );
            }
            Err(e) => {
                eprintln!("{}", format!("Error: {e:#}").red());
                std::process::exit(1);
            }
        },
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("Config file: {}", manager.config_path().display());

            let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
            for (key, value) in items {
                let (section, field) = key.split_once('.').unwrap_or(("general", key.as_str()));
                sections
                    .entry(section.to_string())
                    .or_default()
                    .push((field.to_string(), value));
            }

            for (section, items) in sections {
                println!("[{}]", section.yellow());
                for (field, value) in items {
                    println!("  {} = {value}", field.cyan());
                }
            }
        }
        ConfigCommand::Path => println!("{}", manager.config_path().display()),
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
