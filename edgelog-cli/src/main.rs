//! edgelog CLI — run journal analytics over exported trade records.
//!
//! Commands:
//! - `report` — full analytics report (metrics, equity, buckets, tags, streaks, breakdowns)
//! - `tags` — single-tag or combination analysis
//! - `variable` — breakdown by the values of one tag key
//! - `config` — print the effective configuration as TOML
//!
//! Input is a JSON array of raw trade records. Results are written as pretty
//! JSON to stdout or `--output`; logs go to stderr.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use edgelog_analytics::{analyze_tags, build_report, variable_breakdown, AnalyticsConfig};
use edgelog_core::{normalize, normalize_lenient, RawTradeRecord, Trade, TradeWindow};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgelog", about = "edgelog CLI — trading journal performance analytics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full analytics report.
    Report {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Analyze performance by tag, optionally by tag combinations.
    Tags {
        #[command(flatten)]
        input: InputArgs,

        /// Group by tag combinations instead of single tags.
        #[arg(long, default_value_t = false)]
        combine: bool,

        /// Combination size (clamped to 2..=5). Defaults to the config value.
        #[arg(long)]
        level: Option<usize>,
    },
    /// Break performance down by the values of one tag key.
    Variable {
        #[command(flatten)]
        input: InputArgs,

        /// Tag key, e.g. `setup`.
        #[arg(long)]
        key: String,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML config file. Defaults are printed without it.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// JSON file holding an array of trade records.
    #[arg(long)]
    input: PathBuf,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,

    /// Only include the last N days, counted back from --as-of.
    #[arg(long)]
    last_days: Option<u32>,

    /// Reference day for --last-days (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<String>,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Skip invalid records instead of failing on the first one.
    #[arg(long, default_value_t = false)]
    lenient: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report { input } => run_report(&input),
        Commands::Tags {
            input,
            combine,
            level,
        } => run_tags(&input, combine, level),
        Commands::Variable { input, key } => run_variable(&input, &key),
        Commands::Config { config } => run_config(config.as_deref()),
    }
}

fn run_report(args: &InputArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let trades = load_trades(args)?;
    let report = build_report(&trades, &config);
    info!(
        trades = report.trade_count,
        total_pnl = report.core.total_pnl,
        dataset_hash = %report.dataset_hash,
        "report built"
    );
    write_json(&report, args.output.as_deref())
}

fn run_tags(args: &InputArgs, combine: bool, level: Option<usize>) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let trades = load_trades(args)?;
    let combine = combine || config.tags.combine;
    let level = level.unwrap_or(config.tags.combination_level);
    let analysis = analyze_tags(&trades, combine, level, &config.tags);
    if analysis.diagnostics.truncated {
        warn!(
            generated = analysis.diagnostics.combination_groups_generated,
            kept = analysis.combinations.len(),
            "combination results truncated"
        );
    }
    write_json(&analysis, args.output.as_deref())
}

fn run_variable(args: &InputArgs, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        bail!("--key must not be empty");
    }
    let trades = load_trades(args)?;
    let breakdown = variable_breakdown(&trades, key);
    write_json(&breakdown, args.output.as_deref())
}

fn run_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    match path {
        Some(path) => AnalyticsConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalyticsConfig::default()),
    }
}

/// Read, normalize and window the input records.
fn load_trades(args: &InputArgs) -> Result<Vec<Trade>> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let records: Vec<RawTradeRecord> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {} as a JSON array of trades", args.input.display()))?;

    let trades = if args.lenient {
        let outcome = normalize_lenient(&records);
        if !outcome.rejected.is_empty() {
            warn!(
                rejected = outcome.rejected.len(),
                accepted = outcome.trades.len(),
                "skipped invalid records"
            );
        }
        outcome.trades
    } else {
        normalize(&records).context("invalid trade record (pass --lenient to skip)")?
    };

    let window = build_window(args)?;
    let windowed = if window.is_unbounded() {
        trades
    } else {
        window.apply(&trades)
    };
    info!(records = records.len(), trades = windowed.len(), "loaded trades");
    Ok(windowed)
}

fn build_window(args: &InputArgs) -> Result<TradeWindow> {
    let from = parse_day(args.from.as_deref(), "--from")?;
    let to = parse_day(args.to.as_deref(), "--to")?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            bail!("--from {from} is after --to {to}");
        }
    }
    // The CLI supplies the clock; the core never reads it.
    let as_of = match parse_day(args.as_of.as_deref(), "--as-of")? {
        Some(day) => Some(day),
        None if args.last_days.is_some() => Some(chrono::Local::now().date_naive()),
        None => None,
    };
    Ok(TradeWindow {
        from,
        to,
        last_days: args.last_days,
        as_of,
    })
}

fn parse_day(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("{flag} expects YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}
