use analytics::{ChartData, StatisticsEngine, StatisticsReport, DEFAULT_HISTOGRAM_BINS};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use configuration::{
    get_file_path, init_tracing, load_config, load_json, load_optimization_setting, AppConfig,
    StatisticsSettings,
};
use core_types::DailyResult;
use optimizer::check_optimization_setting;
use std::fs;
use std::path::{Path, PathBuf};
use strategies::StrategyRegistry;

/// Settings file read from the settings directory when `--settings` is not given.
const SETTINGS_FILE_NAME: &str = "cta_backtester_setting.json";

/// The main entry point for the ctabench command-line tool.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional CTA_* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging).context("Failed to initialise logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Stats(args) => handle_stats(args, &config),
        Commands::Grid(args) => handle_grid(args),
        Commands::Strategies => handle_strategies(),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance statistics and parameter sweeps for CTA strategies.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Application config file (TOML or JSON). CTA_* environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute performance statistics from a file of daily results.
    Stats(StatsArgs),
    /// Validate an optimization setting and print its parameter grid.
    Grid(GridArgs),
    /// List the available strategy classes and their default parameters.
    Strategies,
}

#[derive(Parser)]
struct StatsArgs {
    /// JSON array of daily results (`date`, `net_pnl`, optional cost fields).
    #[arg(long)]
    input: PathBuf,

    /// Flat JSON settings file overriding `risk_free`, `annual_days` and `half_life`.
    /// Defaults to `cta_backtester_setting.json` in the settings directory.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Starting capital; defaults to the configured capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Where to write the chart dataset as JSON.
    #[arg(long)]
    chart_out: Option<PathBuf>,
}

#[derive(Parser)]
struct GridArgs {
    /// Optimization setting file (TOML or JSON).
    #[arg(long)]
    setting: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_stats(args: StatsArgs, config: &AppConfig) -> anyhow::Result<()> {
    let results = load_daily_results(&args.input)?;
    let settings = statistics_settings(config, args.settings.as_deref());
    let capital = args.capital.unwrap_or(config.capital);

    let engine = StatisticsEngine::new(capital, settings)?;
    let report = engine.calculate(&results);

    println!("{}", statistics_table(&report));

    if let Some(path) = args.chart_out {
        write_chart(&path, &report.chart())?;
        println!("Chart data written to {}", path.display());
    }
    Ok(())
}

fn handle_grid(args: GridArgs) -> anyhow::Result<()> {
    let setting = load_optimization_setting(&args.setting)
        .with_context(|| format!("Failed to load optimization setting {}", args.setting.display()))?;
    let grid = check_optimization_setting(&setting)?;

    let names: Vec<&String> = setting.parameters.keys().collect();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(std::iter::once("#".to_string()).chain(names.iter().map(|n| n.to_string())));
    for (i, parameters) in grid.iter().enumerate() {
        let row = std::iter::once((i + 1).to_string()).chain(
            names
                .iter()
                .map(|name| parameters.get(name.as_str()).map(|v| v.to_string()).unwrap_or_default()),
        );
        table.add_row(row);
    }

    println!("Target: {}", setting.target_name);
    println!("{table}");
    println!("{} parameter combinations", grid.len());
    Ok(())
}

fn handle_strategies() -> anyhow::Result<()> {
    let registry = StrategyRegistry::with_builtin();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Class", "Author", "Default parameters"]);
    for name in registry.class_names() {
        let class = registry.get(&name)?;
        let defaults = serde_json::Value::Object(class.class_parameters());
        table.add_row(vec![name, class.author.to_string(), defaults.to_string()]);
    }

    println!("{table}");
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Reads a JSON array of daily results.
fn load_daily_results(path: &Path) -> anyhow::Result<Vec<DailyResult>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read daily results from {}", path.display()))?;
    let results: Vec<DailyResult> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of daily results", path.display()))?;
    tracing::info!(days = results.len(), path = %path.display(), "Loaded daily results");
    Ok(results)
}

/// The configured statistics settings with the overrides of a settings file applied.
///
/// Without an explicit file the stored one is used; a missing file changes nothing.
fn statistics_settings(config: &AppConfig, overrides: Option<&Path>) -> StatisticsSettings {
    let path = overrides
        .map(Path::to_path_buf)
        .unwrap_or_else(|| get_file_path(SETTINGS_FILE_NAME));
    let mut settings = config.statistics;
    settings.apply_overrides(&load_json(&path));
    settings
}

fn statistics_table(report: &StatisticsReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Statistic", "Value"]);
    for (label, value) in report.record.summary_lines() {
        table.add_row(vec![label.to_string(), value]);
    }
    if !report.record.is_valid() {
        table.add_row(vec!["Status".to_string(), format!("{:?}", report.record.status)]);
    }
    table
}

fn write_chart(path: &Path, chart: &ChartData) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(chart)?;
    fs::write(path, json).with_context(|| format!("Failed to write chart data to {}", path.display()))?;
    tracing::debug!(bins = DEFAULT_HISTOGRAM_BINS, points = chart.points.len(), "Chart data exported");
    Ok(())
}
