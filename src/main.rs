//! Automobile Sales Dashboard - command line front end
//!
//! Loads the sales dataset once, runs the selected report and prints its
//! tables; optionally renders one chart per table.

use anyhow::{Context, Result};
use autosales_dash::charts::StaticChartRenderer;
use autosales_dash::config::DashboardConfig;
use autosales_dash::output::{format_report, OutputFormat};
use autosales_dash::{DataLoader, ReportEngine, ReportError, ReportKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "autosales",
    version,
    about = "Automobile Sales Statistics Dashboard",
    long_about = "Computes yearly and recession-period statistics over the historical \
                  automobile sales dataset and prints them as tables or JSON, \
                  optionally rendering one chart per table."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Dataset CSV: local path or http(s) URL (defaults to the public dataset)
    #[arg(long, env = "AUTOSALES_DATASET", global = true)]
    dataset: Option<String>,

    /// JSON settings file
    #[arg(long, env = "AUTOSALES_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format for report tables
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Render one PNG chart per table into this directory
    #[arg(long, env = "AUTOSALES_OUTPUT_DIR", global = true)]
    charts: Option<PathBuf>,

    /// Open the chart directory once rendering finishes
    #[arg(long, global = true)]
    open: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Yearly Statistics for one year
    Yearly {
        /// Year to break down
        #[arg(short, long)]
        year: i64,
    },

    /// Recession Period Statistics
    Recession,

    /// Run a report chosen by its selector label or short name
    Report {
        /// "Yearly Statistics", "Recession Period Statistics", "yearly" or "recession"
        #[arg(short, long)]
        kind: String,
        /// Year (required for the yearly report)
        #[arg(short, long)]
        year: Option<i64>,
    },

    /// List the years available for the yearly report
    Years,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = DashboardConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load settings")?;

    // Validate the selection before touching the dataset
    let (kind, year) = match &cli.command {
        Commands::Yearly { year } => (Some(ReportKind::Yearly), Some(*year)),
        Commands::Recession => (Some(ReportKind::Recession), None),
        Commands::Report { kind, year } => (Some(kind.parse::<ReportKind>()?), *year),
        Commands::Years => (None, None),
    };
    if kind.is_some_and(ReportKind::requires_year) && year.is_none() {
        return Err(ReportError::MissingYear.into());
    }

    let source = config.dataset_source(cli.dataset.as_deref());
    let dataset = DataLoader::new()
        .with_infer_schema_length(config.infer_schema_length)
        .load(&source)
        .with_context(|| format!("Failed to load dataset from {}", source))?;
    let engine = ReportEngine::new(&dataset);

    let Some(kind) = kind else {
        let years = engine.available_years();
        match cli.format {
            OutputFormat::Text => {
                for year in years {
                    println!("{}", year);
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string(&years)?),
        }
        return Ok(());
    };

    let report = engine.run(kind, year)?;
    println!("{}", format_report(&report, cli.format)?);

    if let Some(dir) = config.chart_dir(cli.charts.as_deref()) {
        let renderer = StaticChartRenderer::new(config.chart_width, config.chart_height);
        let paths = renderer
            .render_report(&report, &dir)
            .with_context(|| format!("Failed to render charts into {}", dir.display()))?;
        for path in &paths {
            info!(path = %path.display(), "chart written");
        }

        if cli.open {
            open::that(&dir)
                .with_context(|| format!("Failed to open {}", dir.display()))?;
        }
    }

    Ok(())
}
