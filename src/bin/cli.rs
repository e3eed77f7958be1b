//! HOPE CLI
//!
//! Command-line interface for HOPE report operations:
//! - Seed the record store with sample data
//! - Generate a report PDF without the server
//! - Print a default config file

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use hope::config::{generate_default_config, Config};
use hope::report::{PeriodMode, PeriodSpec, ReportEngine, ReportLocale};
use hope::store::{EntityKind, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hope-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hospital statistics reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (overrides config)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert sample records spread over one year
    Seed {
        /// Year to spread the records over
        #[arg(short, long)]
        year: Option<i32>,
        /// Records per entity kind
        #[arg(short = 'n', long, default_value = "100")]
        per_kind: usize,
    },

    /// Generate a report PDF
    Report {
        /// Period type (year, quarter, month)
        #[arg(short = 't', long = "type", default_value = "year")]
        period_type: String,
        /// Year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,
        /// Quarter 1..4, for type=quarter
        #[arg(short, long)]
        quarter: Option<u32>,
        /// Month 1..12, for type=month
        #[arg(short, long)]
        month: Option<u32>,
        /// Report language (en, es)
        #[arg(short, long)]
        locale: Option<String>,
        /// Output file (default: the report's own filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, None),
        None => {
            let (config, source) = Config::load_default();
            (config, Some(source))
        }
    };
    if let Some(database) = cli.database {
        config.storage.database_path = database;
    }
    config.logging.init();
    if let Some(source) = source {
        source.log();
    }

    match cli.command {
        Commands::Seed { year, per_kind } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let store = SqliteStore::open(&config.storage.database_path)
                .with_context(|| format!("opening {}", config.storage.database_path))?;

            let mut total = 0;
            for kind in EntityKind::ALL {
                let timestamps = sample_timestamps(year, kind, per_kind)?;
                total += store.insert_batch(kind, timestamps).await?;
            }

            println!(
                "Seeded {} records for {} into {}",
                total, year, config.storage.database_path
            );
        }

        Commands::Report {
            period_type,
            year,
            quarter,
            month,
            locale,
            output,
        } => {
            let mode: PeriodMode = period_type.parse()?;
            let spec = PeriodSpec {
                mode,
                year: year.unwrap_or_else(|| Utc::now().year()),
                quarter,
                month,
            };

            let mut settings = config.report.settings();
            if let Some(raw) = locale {
                settings.locale = ReportLocale::parse(&raw)
                    .with_context(|| format!("unknown locale '{}'", raw))?;
            }

            let store = SqliteStore::open(&config.storage.database_path)
                .with_context(|| format!("opening {}", config.storage.database_path))?;
            let engine = ReportEngine::new(Arc::new(store), settings);
            let report = engine.generate(spec).await?;

            let path = output.unwrap_or_else(|| PathBuf::from(report.filename.replace('/', "-")));
            std::fs::write(&path, &report.bytes)
                .with_context(|| format!("writing {}", path.display()))?;

            println!("{}", report.period_label);
            for (kind, total) in report.totals.iter() {
                println!("  {:<14} {:>8}", kind.to_string(), total);
            }
            println!("Wrote {} ({} bytes)", path.display(), report.bytes.len());
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Deterministic creation times scattered across `year`
fn sample_timestamps(year: i32, kind: EntityKind, count: usize) -> anyhow::Result<Vec<i64>> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .with_context(|| format!("year {} out of range", year))?;
    let days = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() { 366 } else { 365 };
    let salt = kind.series_index() as i64 * 37;

    Ok((0..count as i64)
        .map(|i| {
            let day = (i * 7919 + salt) % days;
            let minute = (i * 131 + salt) % (24 * 60);
            (start + Duration::days(day) + Duration::minutes(minute))
                .and_utc()
                .timestamp_millis()
        })
        .collect())
}
