//! pfstats CLI - Command line interface for portfolio performance analytics.
//!
//! Series are read from JSON files holding `[{"date": "YYYY-MM-DD", "value": x}, ...]`;
//! results are printed as a JSON `ApiResponse`. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pfstats_core::{
    analytics::{compute_drawdown, compute_sharpe, compute_stats, compute_windowed_drawdown},
    portfolio::{build_portfolio_frame, compute_portfolio_std, CorrelationMatrix, PortfolioSpec},
    AnalyticsConfig, ApiResponse, SharpeMode, StaticPriceSource, TimeSeries,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "pfstats")]
#[command(about = "Portfolio performance analytics - drawdown, Sharpe ratio and volatility")]
#[command(version)]
struct Cli {
    /// Config file (defaults to PFSTATS_CONFIG or the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drawdown profile of a value series
    Drawdown {
        /// Value series JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Summarize per window of this many observations
        #[arg(short, long)]
        window: Option<usize>,
        /// Summarize per window using the configured window size
        #[arg(long, conflicts_with = "window")]
        windowed: bool,
    },
    /// Annualized Sharpe ratio of a value series
    Sharpe {
        /// Value series JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Risk-free rate series JSON file (annual, percent)
        #[arg(short, long)]
        rates: PathBuf,
        /// full, monthly (ME) or yearly (YE)
        #[arg(short, long)]
        mode: Option<String>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Portfolio standard deviation from weights, volatilities and correlations
    PortfolioStd {
        /// Comma-separated weights
        #[arg(short, long)]
        weights: String,
        /// Comma-separated annualized standard deviations
        #[arg(short, long)]
        std_devs: String,
        /// Correlation matrix as JSON, e.g. [[1,0.2],[0.2,1]]
        #[arg(short, long)]
        correlations: String,
    },
    /// Summary record (last value, return, Sharpe, max drawdown)
    Stats {
        /// Value series JSON file
        #[arg(short, long)]
        input: PathBuf,
        /// Risk-free rate series JSON file (annual, percent)
        #[arg(short, long)]
        rates: PathBuf,
        /// Name the record is keyed by
        #[arg(short, long, default_value = "pf_val")]
        name: String,
        /// Starting value (defaults to the configured base value)
        #[arg(short, long)]
        base: Option<f64>,
    },
    /// Build a portfolio value series from per-ticker prices
    Portfolio {
        /// JSON file mapping ticker -> price series
        #[arg(short, long)]
        prices: PathBuf,
        /// Weights, e.g. SPY=0.25,GLD=0.2,SHY=0.25
        #[arg(short, long)]
        weights: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// End date, exclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Risk-free rate series JSON file; adds a stats record when given
        #[arg(short, long)]
        rates: Option<PathBuf>,
        /// Starting value (defaults to the configured base value)
        #[arg(short, long)]
        base: Option<f64>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Drawdown {
            input,
            window,
            windowed,
        } => handle_drawdown(&config, &input, window, windowed),
        Commands::Sharpe {
            input,
            rates,
            mode,
            start,
            end,
        } => handle_sharpe(&config, &input, &rates, mode.as_deref(), start, end),
        Commands::PortfolioStd {
            weights,
            std_devs,
            correlations,
        } => handle_portfolio_std(&weights, &std_devs, &correlations),
        Commands::Stats {
            input,
            rates,
            name,
            base,
        } => handle_stats(&config, &input, &rates, &name, base),
        Commands::Portfolio {
            prices,
            weights,
            start,
            end,
            rates,
            base,
        } => handle_portfolio(&config, &prices, &weights, start, end, rates.as_deref(), base),
    });

    let (output, ok) = match result {
        Ok(data) => (serde_json::to_string_pretty(&ApiResponse::ok(data)), true),
        Err(e) => {
            tracing::error!("{:#}", e);
            (
                serde_json::to_string_pretty(&ApiResponse::<()>::err(format!("{:#}", e))),
                false,
            )
        }
    };

    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("failed to serialize response: {}", e);
            std::process::exit(2);
        }
    }

    if !ok {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    let config = match path {
        Some(path) => AnalyticsConfig::load_from_path(path),
        None => AnalyticsConfig::load(),
    };
    config.context("failed to load config")
}

fn load_series(path: &Path) -> Result<TimeSeries> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid series in {}", path.display()))
}

fn parse_list(input: &str) -> Result<Vec<f64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid number '{}'", s))
        })
        .collect()
}

fn handle_drawdown(
    config: &AnalyticsConfig,
    input: &Path,
    window: Option<usize>,
    windowed: bool,
) -> Result<Value> {
    let series = load_series(input)?;

    let window = window.or(windowed.then_some(config.drawdown_window));
    match window {
        Some(size) => {
            let summaries = compute_windowed_drawdown(&series, size)?;
            Ok(json!({
                "window": size,
                "windows": summaries,
            }))
        }
        None => {
            let result = compute_drawdown(&series)?;
            Ok(json!({
                "max_drawdown": result.max_drawdown(),
                "avg_drawdown": result.avg_drawdown(),
                "points": result,
            }))
        }
    }
}

fn handle_sharpe(
    config: &AnalyticsConfig,
    input: &Path,
    rates: &Path,
    mode: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Value> {
    let mode: SharpeMode = match mode {
        Some(m) => m.parse()?,
        None => config.sharpe_mode,
    };

    let mut series = load_series(input)?;
    if start.is_some() || end.is_some() {
        series = series.between(
            start.unwrap_or(NaiveDate::MIN),
            end.unwrap_or(NaiveDate::MAX),
        );
    }
    let risk_free = load_series(rates)?;

    let result = compute_sharpe(&series, &risk_free, mode)?;
    Ok(json!({ "sharpe": result }))
}

fn handle_portfolio_std(weights: &str, std_devs: &str, correlations: &str) -> Result<Value> {
    let weights = parse_list(weights)?;
    let std_devs = parse_list(std_devs)?;
    let correlations: CorrelationMatrix =
        serde_json::from_str(correlations).context("invalid correlation matrix")?;

    let std = compute_portfolio_std(&weights, &std_devs, &correlations)?;
    Ok(json!({ "portfolio_std": std }))
}

fn handle_stats(
    config: &AnalyticsConfig,
    input: &Path,
    rates: &Path,
    name: &str,
    base: Option<f64>,
) -> Result<Value> {
    let series = load_series(input)?;
    let risk_free = load_series(rates)?;

    let record = compute_stats(&series, &risk_free, name, base.unwrap_or(config.base_value))?;
    Ok(json!({
        "record": record,
        "keyed": record.to_keyed_map(),
    }))
}

fn handle_portfolio(
    config: &AnalyticsConfig,
    prices: &Path,
    weights: &str,
    start: NaiveDate,
    end: NaiveDate,
    rates: Option<&Path>,
    base: Option<f64>,
) -> Result<Value> {
    let spec: PortfolioSpec = weights.parse()?;

    let content = fs::read_to_string(prices)
        .with_context(|| format!("failed to read {}", prices.display()))?;
    let histories: HashMap<String, TimeSeries> = serde_json::from_str(&content)
        .with_context(|| format!("invalid price histories in {}", prices.display()))?;
    let source = StaticPriceSource::from_map(histories);

    let base = base.unwrap_or(config.base_value);
    let frame = build_portfolio_frame(&spec, &source, start, end, base)?;
    let portfolio_std = frame.portfolio_std(config.asset_periods_per_year)?;

    let stats = match rates {
        Some(path) => {
            let risk_free = load_series(path)?;
            Some(compute_stats(&frame.values, &risk_free, "pf_val", base)?.to_keyed_map())
        }
        None => None,
    };

    tracing::info!(tickers = spec.len(), days = frame.values.len(), "portfolio built");

    Ok(json!({
        "weights": spec,
        "cash_weight": spec.cash_weight(),
        "portfolio_std": portfolio_std,
        "values": frame.values,
        "stats": stats,
    }))
}
