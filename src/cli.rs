//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestRequest, BacktestResult, DAILY_BARS_PER_YEAR};
use crate::domain::choice_store::ChoiceStore;
use crate::domain::error::StratlabError;
use crate::domain::params::{ParamSpec, ParamValue};
use crate::domain::registry::StrategyRegistry;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stratlab", about = "Strategy backtesting and selection engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for CSV exports of trades, equity and decisions
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the configured symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override the configured strategy id
        #[arg(long)]
        strategy: Option<String>,
    },
    /// List available strategies and their parameters
    ListStrategies,
    /// Validate a backtest configuration without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
            strategy,
        } => cmd_backtest(
            &config,
            output.as_deref(),
            symbol.as_deref(),
            strategy.as_deref(),
        ),
        Command::ListStrategies => cmd_list_strategies(),
        Command::Validate { config } => cmd_validate(&config),
    }
}

fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, StratlabError> {
    config
        .get_string(section, key)
        .ok_or_else(|| StratlabError::ConfigMissing {
            section: section.into(),
            key: key.into(),
        })
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, StratlabError> {
    let raw = require_string(config, "backtest", key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| StratlabError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

/// Bars per year implied by the configured bar interval.
fn bars_per_year(interval: &str) -> Result<f64, StratlabError> {
    match interval {
        "daily" => Ok(DAILY_BARS_PER_YEAR),
        "hourly" => Ok(DAILY_BARS_PER_YEAR * 6.5),
        "minute" => Ok(DAILY_BARS_PER_YEAR * 390.0),
        other => Err(StratlabError::ConfigInvalid {
            section: "backtest".into(),
            key: "interval".into(),
            reason: format!("unknown interval {other} (expected daily, hourly or minute)"),
        }),
    }
}

/// Interpret a raw `[params]` value: numeric first, then a bool spelling,
/// otherwise text.
fn parse_param_value(raw: &str) -> ParamValue {
    if let Ok(n) = raw.parse::<f64>() {
        return ParamValue::Number(n);
    }
    match raw.to_lowercase().as_str() {
        "true" | "yes" => ParamValue::Flag(true),
        "false" | "no" => ParamValue::Flag(false),
        _ => ParamValue::Text(raw.to_string()),
    }
}

fn build_request(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
) -> Result<BacktestRequest, StratlabError> {
    let symbol = match symbol_override {
        Some(s) => s.to_uppercase(),
        None => require_string(config, "backtest", "symbol")?.to_uppercase(),
    };
    let strategy_id = match strategy_override {
        Some(s) => s.to_string(),
        None => require_string(config, "backtest", "strategy")?,
    };

    let interval = config
        .get_string("backtest", "interval")
        .unwrap_or_else(|| "daily".to_string());

    let params: BTreeMap<String, ParamValue> = config
        .section("params")
        .into_iter()
        .map(|(k, v)| (k, parse_param_value(&v)))
        .collect();

    Ok(BacktestRequest {
        symbol,
        start_date: parse_date(config, "start_date")?,
        end_date: parse_date(config, "end_date")?,
        starting_cash: config.get_double("backtest", "starting_cash", 10_000.0),
        strategy_id,
        params,
        bars_per_year: bars_per_year(&interval)?,
    })
}

fn cmd_backtest(
    config_path: &Path,
    output_dir: Option<&Path>,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Build and validate the request
    let request = match build_request(&config, symbol_override, strategy_override) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 3: Fetch price data
    let data_dir = config
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| "data".to_string());
    let data_port = CsvAdapter::new(PathBuf::from(&data_dir));

    eprintln!(
        "Fetching {} from {} ({} to {})",
        request.symbol, data_dir, request.start_date, request.end_date
    );
    let series = match data_port.fetch(&request.symbol, request.start_date, request.end_date) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("  {} bars", series.len());

    // Stage 4: Run
    eprintln!(
        "Running backtest: {} with {}",
        request.symbol, request.strategy_id
    );
    let registry = StrategyRegistry::standard();
    let choices = Arc::new(ChoiceStore::new());
    let result = match run_backtest(&request, &series, &registry, &choices) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Summary
    print_summary(&result);

    if let Some(active) = choices.active(&request.symbol) {
        eprintln!("\nActive choice for {}:", request.symbol);
        eprintln!("  {} ({})", active.strategy_id, active.strategy_name);
        if !active.parameters.is_empty() {
            eprintln!("  params: {}", active.parameters);
        }
    }

    // Stage 6: Export
    if let Some(dir) = output_dir {
        if let Err(e) = export_result(&result, dir) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("\nResults written to {}", dir.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult) {
    let pct = |v: Option<f64>| match v {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => "n/a".to_string(),
    };

    eprintln!("\n=== Results ===");
    eprintln!("Initial Value:    {:.2}", result.initial_value);
    eprintln!("Final Value:      {:.2}", result.final_value);
    eprintln!(
        "P&L:              {:.2} ({:.2}%)",
        result.profit_loss, result.profit_loss_pct
    );
    eprintln!("Total Trades:     {}", result.total_trades);
    match result.metrics.sharpe_ratio {
        Some(s) => eprintln!("Sharpe Ratio:     {:.2}", s),
        None => eprintln!("Sharpe Ratio:     n/a"),
    }
    eprintln!(
        "Max Drawdown:     -{:.1}%",
        result.metrics.max_drawdown * 100.0
    );
    eprintln!("CAGR:             {}", pct(result.metrics.cagr));
    eprintln!("Win Rate:         {}", pct(result.metrics.win_rate));
}

fn export_result(result: &BacktestResult, dir: &Path) -> Result<(), StratlabError> {
    fs::create_dir_all(dir)?;

    let mut trades = csv::Writer::from_path(dir.join("trades.csv"))
        .map_err(|e| csv_error("trades.csv", e))?;
    trades
        .write_record(["timestamp", "action", "price", "shares", "cash_after"])
        .map_err(|e| csv_error("trades.csv", e))?;
    for t in &result.trades {
        let action = match t.action {
            crate::domain::backtest::TradeAction::Buy => "BUY",
            crate::domain::backtest::TradeAction::Sell => "SELL",
        };
        trades
            .write_record([
                t.timestamp.to_string(),
                action.to_string(),
                t.price.to_string(),
                t.shares.to_string(),
                t.cash_after.to_string(),
            ])
            .map_err(|e| csv_error("trades.csv", e))?;
    }
    trades.flush()?;

    let mut equity = csv::Writer::from_path(dir.join("equity.csv"))
        .map_err(|e| csv_error("equity.csv", e))?;
    equity
        .write_record(["timestamp", "value"])
        .map_err(|e| csv_error("equity.csv", e))?;
    for p in &result.equity_curve {
        equity
            .write_record([p.timestamp.to_string(), p.value.to_string()])
            .map_err(|e| csv_error("equity.csv", e))?;
    }
    equity.flush()?;

    if let Some(decisions) = &result.decisions {
        let mut log = csv::Writer::from_path(dir.join("decisions.csv"))
            .map_err(|e| csv_error("decisions.csv", e))?;
        log.write_record(["timestamp", "strategy", "params", "score", "metric"])
            .map_err(|e| csv_error("decisions.csv", e))?;
        for d in decisions {
            let score = d.score.map(|s| s.to_string()).unwrap_or_default();
            log.write_record([
                d.timestamp.to_string(),
                d.strategy_id.clone(),
                d.parameters.to_string(),
                score,
                d.metric.to_string(),
            ])
            .map_err(|e| csv_error("decisions.csv", e))?;
        }
        log.flush()?;
    }

    Ok(())
}

fn csv_error(file: &str, e: csv::Error) -> StratlabError {
    StratlabError::DataSource {
        reason: format!("failed to write {file}: {e}"),
    }
}

fn format_spec(spec: &ParamSpec) -> String {
    let mut out = match &spec.default {
        ParamValue::Number(n) => format!("{} (number, default {n}", spec.name),
        ParamValue::Text(s) => format!("{} (text, default {s}", spec.name),
        ParamValue::Flag(b) => format!("{} (flag, default {b}", spec.name),
    };
    if let (Some(min), Some(max)) = (spec.min, spec.max) {
        out.push_str(&format!(", range {min}..{max}"));
    }
    if let Some(step) = spec.step {
        out.push_str(&format!(", step {step}"));
    }
    out.push(')');
    out
}

fn cmd_list_strategies() -> ExitCode {
    let registry = StrategyRegistry::standard();

    for info in registry.list() {
        println!("{} - {}", info.id, info.name);
        println!("    {}", info.description);
        for spec in &info.param_specs {
            println!("    {}", format_spec(spec));
        }
        println!();
    }
    ExitCode::SUCCESS
}

fn cmd_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let request = match build_request(&config, None, None) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if request.end_date <= request.start_date {
        eprintln!(
            "error: end date {} must be after start date {}",
            request.end_date, request.start_date
        );
        return ExitCode::from(3);
    }
    if request.starting_cash <= 0.0 {
        eprintln!("error: starting cash must be positive");
        return ExitCode::from(3);
    }

    // Instantiating also validates the strategy id and parameters.
    let registry = StrategyRegistry::standard();
    let choices = Arc::new(ChoiceStore::new());
    let strategy = match registry.create(
        &request.strategy_id,
        &request.symbol,
        &choices,
        request.bars_per_year,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = crate::domain::params::Params::validate(&request.params, &strategy.param_specs())
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration is valid");
    eprintln!("  symbol:   {}", request.symbol);
    eprintln!("  strategy: {}", request.strategy_id);
    eprintln!(
        "  range:    {} to {}",
        request.start_date, request.end_date
    );
    ExitCode::SUCCESS
}
