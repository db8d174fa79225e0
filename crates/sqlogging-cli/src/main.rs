//! sqlog CLI: benchmark and inspect sqlogging loggers from the command line.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqlogging::{open_logger, storage, Level, Logger, LoggerConfig, Value};

#[derive(Parser)]
#[command(
    name = "sqlog",
    about = "sqlog: severity-filtered structured logging into SQLite",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure per-row and per-element write latency
    Bench {
        /// Number of rows to write
        #[arg(long, short, default_value_t = 1000)]
        rows: usize,
        /// Number of columns per row
        #[arg(long, short, default_value_t = 100)]
        cols: usize,
        /// Directory for the benchmark logger
        #[arg(long, default_value = "./logs")]
        dir: PathBuf,
        /// Logger (table) name
        #[arg(long, default_value = "bench")]
        name: String,
        /// Keep the logger on disk instead of deleting it afterwards
        #[arg(long)]
        keep: bool,
    },
    /// Create a new logger table
    Create {
        /// Logger name (overrides the name from --config)
        name: Option<String>,
        /// Directory holding the logger file
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Minimum severity: debug, info, warning, error or critical
        #[arg(long, short)]
        level: Option<String>,
        /// Comma-separated column names
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
        /// YAML logger config to start from
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List loggers in a directory
    List {
        /// Directory holding logger files
        #[arg(default_value = "./logs")]
        dir: PathBuf,
    },
    /// Show a logger's columns in order
    Columns {
        /// Logger name
        name: String,
        /// Directory holding the logger file
        #[arg(long, default_value = "./logs")]
        dir: PathBuf,
    },
    /// Run a raw SQL query against a logger
    Query {
        /// Logger name
        name: String,
        /// SQL statement, passed through verbatim
        sql: String,
        /// Directory holding the logger file
        #[arg(long, default_value = "./logs")]
        dir: PathBuf,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Drop a logger's table and remove its file
    Delete {
        /// Logger name
        name: String,
        /// Directory holding the logger file
        #[arg(long, default_value = "./logs")]
        dir: PathBuf,
        /// Actually delete (default: dry run)
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bench { rows, cols, dir, name, keep } => {
            cmd_bench(dir, name, rows, cols, keep)?;
        }
        Commands::Create { name, dir, level, columns, config } => {
            cmd_create(name, dir, level, columns, config)?;
        }
        Commands::List { dir } => {
            cmd_list(dir)?;
        }
        Commands::Columns { name, dir } => {
            cmd_columns(dir, name)?;
        }
        Commands::Query { name, sql, dir, format } => {
            cmd_query(dir, name, sql, format)?;
        }
        Commands::Delete { name, dir, force } => {
            cmd_delete(dir, name, force)?;
        }
    }

    Ok(())
}

// ─── Command implementations ──────────────────────────────────────────────────

fn cmd_bench(dir: PathBuf, name: String, rows: usize, cols: usize, keep: bool) -> Result<()> {
    if rows == 0 || cols == 0 {
        anyhow::bail!("--rows and --cols must both be at least 1");
    }

    let columns: Vec<String> = (0..cols).map(|i| format!("col_{i}")).collect();
    let config = LoggerConfig::new(&name, &dir)
        .with_level(Level::Info)
        .with_columns(columns.clone());
    let mut logger = Logger::create(config)?;
    info!(rows, cols, path = %logger.path().display(), "Benchmark started");

    let data: Vec<(&str, Value)> = columns
        .iter()
        .map(|c| (c.as_str(), Value::Real(1.0)))
        .collect();

    let progress = ProgressBar::new(rows as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} rows ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut elapsed = Duration::ZERO;
    for _ in 0..rows {
        let row = data.iter().map(|(k, v)| (*k, v.clone()));
        let start = Instant::now();
        logger.info(row)?;
        elapsed += start.elapsed();
        progress.inc(1);
    }
    progress.finish_and_clear();

    let total = elapsed.as_secs_f64();
    let per_row = total / rows as f64;
    let per_element = total / (rows * cols) as f64;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Metric", "Value"]);
    table.add_row(["Rows", &rows.to_string()]);
    table.add_row(["Columns", &cols.to_string()]);
    table.add_row(["Total write time", &format_secs(total)]);
    table.add_row(["Write time per row", &format_secs(per_row)]);
    table.add_row(["Write time per element", &format_secs(per_element)]);
    println!("{}", table);

    if keep {
        println!("Kept logger at {}", logger.path().display());
        logger.close()?;
    } else {
        logger.delete()?;
    }
    Ok(())
}

fn cmd_create(
    name: Option<String>,
    dir: Option<PathBuf>,
    level: Option<String>,
    columns: Option<Vec<String>>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = match config {
        Some(path) => LoggerConfig::from_yaml_file(&path)?,
        None => match &name {
            Some(_) => LoggerConfig::default(),
            None => anyhow::bail!("Either a logger name or --config is required"),
        },
    };
    if let Some(name) = name {
        cfg.name = name;
    }
    if let Some(dir) = dir {
        cfg.dir = dir;
    }
    if let Some(level) = level {
        cfg.level = level.parse()?;
    }
    if let Some(columns) = columns {
        cfg.columns = columns;
    }

    let mut logger = Logger::create(cfg)?;
    println!(
        "Created logger '{}' at {} (level {}, columns: {})",
        logger.name(),
        logger.path().display(),
        logger.level(),
        logger.columns().join(", ")
    );
    logger.close()?;
    Ok(())
}

fn cmd_list(dir: PathBuf) -> Result<()> {
    let names = storage::list_loggers(&dir)?;
    if names.is_empty() {
        println!("No loggers found in '{}'", dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Logger", "Rows", "Columns"]);

    for name in &names {
        match open_logger(name, &dir) {
            Ok(mut logger) => {
                let rows = logger.row_count()?;
                table.add_row([
                    name.as_str(),
                    &rows.to_string(),
                    &logger.columns().join(", "),
                ]);
                logger.close()?;
            }
            Err(_) => {
                table.add_row([name.as_str(), "-", "(no table)"]);
            }
        }
    }

    println!("Loggers in: {}", dir.display());
    println!("{}", table);
    Ok(())
}

fn cmd_columns(dir: PathBuf, name: String) -> Result<()> {
    let mut logger = open_logger(&name, &dir)?;
    for column in logger.columns() {
        println!("{}", column);
    }
    logger.close()?;
    Ok(())
}

fn cmd_query(dir: PathBuf, name: String, sql: String, format: OutputFormat) -> Result<()> {
    let mut logger = open_logger(&name, &dir)?;
    let (names, rows) = logger.query_named(&sql)?;
    logger.close()?;

    match format {
        OutputFormat::Json => {
            let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    names
                        .iter()
                        .cloned()
                        .zip(row.iter().map(serde_json::to_value))
                        .map(|(k, v)| v.map(|v| (k, v)))
                        .collect::<serde_json::Result<_>>()
                })
                .collect::<serde_json::Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&objects)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(names.iter().map(String::as_str));
            for row in &rows {
                table.add_row(row.iter().map(|v| v.to_string()));
            }
            println!("{}", table);
            println!("({} rows)", rows.len());
        }
    }
    Ok(())
}

fn cmd_delete(dir: PathBuf, name: String, force: bool) -> Result<()> {
    let mut logger = open_logger(&name, &dir)?;
    let rows = logger.row_count()?;
    println!(
        "Will delete logger '{}' ({} rows) at {}",
        name,
        rows,
        logger.path().display()
    );

    if !force {
        println!("\nDry run. Use --force to actually delete.");
        logger.close()?;
        return Ok(());
    }

    logger.delete()?;
    println!("  ✓ Deleted {}", name);
    Ok(())
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn format_secs(secs: f64) -> String {
    if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else {
        format!("{:.3} µs", secs * 1e6)
    }
}
