//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_simulation, SimulationResult};
use crate::domain::config_validation::{
    parse_optional_date, validate_simulation_config, DEFAULT_INITIAL_CASH,
};
use crate::domain::decision::DrawdownParams;
use crate::domain::error::DcatraderError;
use crate::domain::holdings::Holdings;
use crate::domain::metrics::Performance;
use crate::domain::price_series::DEFAULT_FEATURE_COLUMN;
use crate::domain::strategy::{StrategyConfig, StrategyKind};
use crate::domain::universe::{load_ticker_symbols, parse_codes};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "dcatrader",
    about = "Dollar-cost averaging and drawdown-buying backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one strategy over a daily price history
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Symbol or comma-separated symbols, overriding the config
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Holdings CSV destination
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Contribution ledger CSV destination
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Run every strategy kind over the same history
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List ticker symbols from a ticker file or a price table
    Tickers {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a simulation configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Everything a run needs, resolved from the config file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub symbols: Vec<String>,
    pub kind: StrategyKind,
    pub initial_cash: f64,
    pub income: f64,
    pub drawdown: DrawdownParams,
    pub seed: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub feature_column: String,
}

impl RunPlan {
    pub fn strategy_config(&self, symbol: &str, kind: StrategyKind) -> StrategyConfig {
        StrategyConfig::new(symbol, kind, self.initial_cash)
            .with_income(self.income)
            .with_drawdown(self.drawdown)
            .with_feature_column(&self.feature_column)
    }

    /// Apply command-line overrides on top of the config values.
    pub fn apply_overrides(
        &mut self,
        symbol: Option<&str>,
        strategy: Option<&str>,
        seed: Option<u64>,
    ) -> Result<(), DcatraderError> {
        if let Some(symbol) = symbol {
            self.symbols = parse_codes(symbol)?;
        }
        if let Some(strategy) = strategy {
            self.kind = parse_kind(strategy)?;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        Ok(())
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Simulate {
            config,
            symbol,
            strategy,
            seed,
            output,
            ledger,
        } => run_simulate(
            &config,
            symbol.as_deref(),
            strategy.as_deref(),
            seed,
            output.as_ref(),
            ledger.as_ref(),
        ),
        Command::Compare {
            config,
            symbol,
            seed,
        } => run_compare(&config, symbol.as_deref(), seed),
        Command::Tickers { file, config } => run_tickers(file.as_ref(), config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn parse_kind(raw: &str) -> Result<StrategyKind, DcatraderError> {
    raw.parse().map_err(|reason| DcatraderError::ConfigInvalid {
        section: "simulation".to_string(),
        key: "strategy".to_string(),
        reason,
    })
}

/// Symbols come from `[simulation] symbol` when set, otherwise from the
/// `[data] tickers` file.
pub fn resolve_symbols(adapter: &dyn ConfigPort) -> Result<Vec<String>, DcatraderError> {
    if let Some(raw) = adapter.get_string("simulation", "symbol") {
        return Ok(parse_codes(&raw)?);
    }
    if let Some(path) = adapter.get_string("data", "tickers") {
        return load_ticker_symbols(path);
    }
    Err(DcatraderError::ConfigMissing {
        section: "simulation".to_string(),
        key: "symbol".to_string(),
    })
}

pub fn build_run_plan(adapter: &dyn ConfigPort) -> Result<RunPlan, DcatraderError> {
    let symbols = resolve_symbols(adapter)?;

    let kind = match adapter.get_string("simulation", "strategy") {
        Some(raw) => parse_kind(&raw)?,
        None => StrategyKind::BuyAndHold,
    };

    let seed = match adapter.get_string("simulation", "seed") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| DcatraderError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "seed".to_string(),
            reason: "seed must be an unsigned integer".to_string(),
        })?),
        None => None,
    };

    let defaults = DrawdownParams::default();
    let drawdown = DrawdownParams {
        opening_lot: adapter.get_int("drawdown", "opening_lot", defaults.opening_lot),
        buy_probability: adapter.get_double(
            "drawdown",
            "buy_probability",
            defaults.buy_probability,
        ),
    };

    Ok(RunPlan {
        symbols,
        kind,
        initial_cash: adapter.get_double("simulation", "initial_cash", DEFAULT_INITIAL_CASH),
        income: adapter.get_double("simulation", "income", 0.0),
        drawdown,
        seed,
        start_date: parse_optional_date(adapter, "data", "start_date")?,
        end_date: parse_optional_date(adapter, "data", "end_date")?,
        feature_column: adapter
            .get_string("data", "feature_column")
            .unwrap_or_else(|| DEFAULT_FEATURE_COLUMN.to_string()),
    })
}

pub fn build_data_adapter(adapter: &dyn ConfigPort) -> Result<CsvPriceAdapter, DcatraderError> {
    let prices = adapter
        .get_string("data", "prices")
        .ok_or_else(|| DcatraderError::ConfigMissing {
            section: "data".to_string(),
            key: "prices".to_string(),
        })?;
    let mut data = CsvPriceAdapter::new(PathBuf::from(prices));
    if let Some(column) = adapter.get_string("data", "date_column") {
        data = data.with_date_column(&column);
    }
    if let Some(column) = adapter.get_string("data", "feature_column") {
        data = data.with_feature_column(&column);
    }
    Ok(data)
}

/// A seeded generator reproduces a run exactly; otherwise draw from the OS.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Fetch each symbol's series and run every requested kind over it.
///
/// A symbol whose data is unusable is skipped with a warning. So is one whose
/// table lacks the moving-average column when a drawdown kind is requested.
/// Every run starts from a fresh generator so results do not depend on
/// symbol order.
pub fn run_pipeline(
    data_port: &dyn PriceDataPort,
    plan: &RunPlan,
    kinds: &[StrategyKind],
) -> Result<Vec<SimulationResult>, DcatraderError> {
    let mut results = Vec::with_capacity(plan.symbols.len() * kinds.len());
    let mut last_error = None;
    let needs_average = kinds.iter().any(|k| k.uses_drawdown());

    for symbol in &plan.symbols {
        let series = match data_port
            .fetch_closes(std::slice::from_ref(symbol), plan.start_date, plan.end_date)
            .and_then(|table| {
                if needs_average && !table.has_column(&plan.feature_column) {
                    return Err(DcatraderError::MissingField {
                        field: plan.feature_column.clone(),
                    });
                }
                table.series(symbol, &plan.feature_column)
            }) {
            Ok(series) => series,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                last_error = Some(e);
                continue;
            }
        };

        for &kind in kinds {
            let mut rng = make_rng(plan.seed);
            let config = plan.strategy_config(symbol, kind);
            results.push(run_simulation(&config, &series, &mut rng)?);
        }
    }

    match (results.is_empty(), last_error) {
        (true, Some(e)) => Err(e),
        (true, None) => Err(DcatraderError::Data {
            reason: "no symbols to simulate".to_string(),
        }),
        _ => Ok(results),
    }
}

/// `out/ledger.csv` becomes `out/ledger_VOO.csv`.
pub fn symbol_path(path: &Path, symbol: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, symbol, ext.to_string_lossy()),
        None => format!("{}_{}", stem, symbol),
    };
    path.with_file_name(name)
}

/// Holdings from every run go into one table; ledgers are written per
/// symbol once more than one run produced one.
pub fn write_reports(
    report: &dyn ReportPort,
    results: &[SimulationResult],
    holdings_path: Option<&Path>,
    ledger_path: Option<&Path>,
) -> Result<(), DcatraderError> {
    if let Some(path) = holdings_path {
        let holdings: Holdings = results
            .iter()
            .flat_map(|r| r.holdings.positions().iter().cloned())
            .collect();
        report.write_holdings(&holdings, &path.to_string_lossy())?;
        eprintln!("Holdings written to: {}", path.display());
    }

    if let Some(path) = ledger_path {
        let with_ledger: Vec<&SimulationResult> =
            results.iter().filter(|r| !r.ledger.is_empty()).collect();
        if with_ledger.is_empty() {
            eprintln!("warning: only dca and dca_drawdown keep a contribution ledger");
        }
        for result in &with_ledger {
            let target = if with_ledger.len() > 1 {
                symbol_path(path, &result.symbol)
            } else {
                path.to_path_buf()
            };
            report.write_ledger(&result.ledger, &target.to_string_lossy())?;
            eprintln!("Ledger written to: {}", target.display());
        }
    }
    Ok(())
}

pub fn print_summary(result: &SimulationResult, show_trades: bool) {
    eprintln!("\n=== {} ({}) ===", result.symbol, result.kind);
    eprintln!(
        "Period:            {} to {}",
        result.start.date, result.end.date
    );
    eprintln!("Start Price:       {:.2}", result.start.price);
    eprintln!("End Price:         {:.2}", result.end.price);
    eprintln!("Trades:            {}", result.holdings.len());
    eprintln!("Shares Held:       {}", result.shares_held());
    match result.average_cost() {
        Some(cost) => eprintln!("Average Cost:      {:.2}", cost),
        None => eprintln!("Average Cost:      n/a"),
    }
    eprintln!("Cash Left:         {:.2}", result.final_cash);
    eprintln!("Total Contributed: {:.2}", result.total_contributed);
    eprintln!("Final Value:       {:.2}", result.final_value());
    match result.performance {
        Performance::Computed { gains, gains_pct } => {
            eprintln!("Gains:             {:.2} ({:.2}%)", gains, gains_pct * 100.0)
        }
        Performance::NotComputed => eprintln!("Gains:             not computed"),
    }

    if show_trades && !result.holdings.is_empty() {
        eprintln!("\nTrades:");
        for position in result.holdings.positions() {
            eprintln!("  {}  {}", position.date(), position);
        }
    }
}

pub fn print_comparison(results: &[SimulationResult]) {
    let mut current: Option<&str> = None;
    for result in results {
        if current != Some(result.symbol.as_str()) {
            current = Some(result.symbol.as_str());
            eprintln!("\n=== Strategy Comparison: {} ===", result.symbol);
            eprintln!(
                "  {:<14} {:>7} {:>8} {:>14} {:>14} {:>9}",
                "Strategy", "Trades", "Shares", "Contributed", "Final Value", "Gains"
            );
        }
        let gains = match result.performance.gains_pct() {
            Some(pct) => format!("{:.2}%", pct * 100.0),
            None => "-".to_string(),
        };
        eprintln!(
            "  {:<14} {:>7} {:>8} {:>14.2} {:>14.2} {:>9}",
            result.kind.as_str(),
            result.holdings.len(),
            result.shares_held(),
            result.total_contributed,
            result.final_value(),
            gains
        );
    }
}

/// Stages shared by `simulate` and `compare`: load, validate, plan.
fn prepare(
    config_path: &Path,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    seed_override: Option<u64>,
) -> Result<(FileConfigAdapter, RunPlan), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let plan = validate_simulation_config(&adapter)
        .and_then(|_| build_run_plan(&adapter))
        .and_then(|mut plan| {
            plan.apply_overrides(symbol_override, strategy_override, seed_override)?;
            Ok(plan)
        });
    match plan {
        Ok(plan) => Ok((adapter, plan)),
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

fn run_simulate(
    config_path: &Path,
    symbol_override: Option<&str>,
    strategy_override: Option<&str>,
    seed_override: Option<u64>,
    output_path: Option<&PathBuf>,
    ledger_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load, validate and resolve the run
    let (adapter, plan) =
        match prepare(config_path, symbol_override, strategy_override, seed_override) {
            Ok(p) => p,
            Err(code) => return code,
        };

    // Stage 2: Price data
    let data = match build_data_adapter(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Simulating {} on {} symbol(s): {}",
        plan.kind,
        plan.symbols.len(),
        plan.symbols.join(", ")
    );

    // Stage 3: Run
    let results = match run_pipeline(&data, &plan, &[plan.kind]) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Console summary
    let show_trades = adapter.get_bool("report", "show_trades", false);
    for result in &results {
        print_summary(result, show_trades);
    }

    // Stage 5: CSV output
    let holdings_path = output_path
        .cloned()
        .or_else(|| adapter.get_string("report", "holdings_path").map(PathBuf::from));
    let ledger_path = ledger_path
        .cloned()
        .or_else(|| adapter.get_string("report", "ledger_path").map(PathBuf::from));

    match write_reports(
        &CsvReportAdapter,
        &results,
        holdings_path.as_deref(),
        ledger_path.as_deref(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

fn run_compare(config_path: &Path, symbol_override: Option<&str>, seed: Option<u64>) -> ExitCode {
    let (adapter, plan) = match prepare(config_path, symbol_override, None, seed) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let data = match build_data_adapter(&adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match run_pipeline(&data, &plan, &StrategyKind::ALL) {
        Ok(results) => {
            print_comparison(&results);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_tickers(file: Option<&PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let symbols = match (file, config_path) {
        (Some(file), _) => load_ticker_symbols(file),
        (None, Some(config_path)) => {
            let adapter = match load_config(config_path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match adapter.get_string("data", "tickers") {
                Some(path) => load_ticker_symbols(path),
                None => build_data_adapter(&adapter).and_then(|data| data.list_symbols()),
            }
        }
        (None, None) => {
            eprintln!("error: --file or --config is required for tickers");
            return ExitCode::from(1);
        }
    };

    match symbols {
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{}", symbol);
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    eprintln!("Validating config: {}", adapter.source());

    let plan = match validate_simulation_config(&adapter).and_then(|_| build_run_plan(&adapter)) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nSimulation:");
    eprintln!("  symbols:      {}", plan.symbols.join(", "));
    eprintln!("  strategy:     {}", plan.kind);
    eprintln!("  initial_cash: {:.2}", plan.initial_cash);
    if plan.kind.takes_income() {
        eprintln!("  income:       {:.2} per month", plan.income);
    }
    if plan.kind.uses_drawdown() {
        eprintln!("  opening_lot:  {}", plan.drawdown.opening_lot);
        eprintln!("  probability:  {}", plan.drawdown.buy_probability);
    }
    match plan.seed {
        Some(seed) => eprintln!("  seed:         {}", seed),
        None => eprintln!("  seed:         (random)"),
    }

    eprintln!("\nConfig is valid");
    ExitCode::SUCCESS
}
