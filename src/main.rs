use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use stemsheet::{
    config::ColumnLayout,
    process::{self, BatchOptions, Packaging},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "stemsheet")]
#[command(about = "Fill stem rows of music-library spreadsheets from their full-mix rows")]
struct RunConfig {
    /// Spreadsheet files, directories or glob patterns (.csv, .xlsx, .xls, .xlsm, .xlsb, .ods)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory for modified tables
    #[arg(short, long, default_value = "processed")]
    output: PathBuf,

    /// YAML file overriding the default column layout
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// How to hand over modified tables
    #[arg(long, value_enum, default_value_t = Packaging::Auto)]
    packaging: Packaging,

    /// Upper bound for emitted column widths
    #[arg(long, default_value_t = process::DEFAULT_MAX_COLUMN_WIDTH)]
    max_column_width: usize,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = RunConfig::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_filter = if args.verbose {
        "info,stemsheet=debug"
    } else {
        "info"
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve column layout ────────────────────────────────────
    let layout = match &args.layout {
        Some(path) => {
            info!(path = %path.display(), "loading column layout");
            ColumnLayout::from_yaml_file(path)?
        }
        None => ColumnLayout::default(),
    };
    let resolved = layout.resolve().map_err(|e| {
        error!("{}", e);
        e
    })?;

    // ─── 3) discover inputs ──────────────────────────────────────────
    let inputs = process::collect_inputs(&args.inputs)?;
    if inputs.is_empty() {
        warn!("no spreadsheets found; exit");
        return Ok(());
    }
    info!("{} spreadsheet(s) to process", inputs.len());

    // ─── 4) enrich & emit ────────────────────────────────────────────
    let options = BatchOptions {
        out_dir: args.output,
        packaging: args.packaging,
        max_column_width: args.max_column_width,
    };
    let report = process::run_batch(&inputs, &resolved, &options)?;
    for artifact in &report.artifacts {
        info!(path = %artifact.display(), "output ready");
    }

    // ─── 5) optional run report ──────────────────────────────────────
    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!(path = %path.display(), "wrote run report");
    }

    info!("done");
    Ok(())
}
