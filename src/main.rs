//! Fire Map - satellite fire detections on a world map
//!
//! Reads a fire-detection CSV, keeps the rows that parse, and renders them as a
//! brightness-colored scatter plot.

use anyhow::{Context, Result};
use clap::Parser;
use fire_map::charts::{ColorScale, FireMapPlotter};
use fire_map::config::AppConfig;
use fire_map::data::{DataExtractor, ExtractError};
use fire_map::stats::BrightnessSummary;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fire_map")]
#[command(about = "Plot satellite fire detections from a CSV file on a world map")]
struct Args {
    /// CSV file: latitude, longitude, brightness in columns 0-2, YYYY-MM-DD date in column 5
    #[arg(default_value = "fire_data/world_fires_1_day.csv")]
    csv_path: PathBuf,

    /// Maximum number of data rows to read (default 1000)
    #[arg(long)]
    max_rows: Option<usize>,

    /// Plot title (default "Global Fires")
    #[arg(long)]
    title: Option<String>,

    /// Output image; a .svg extension selects SVG, anything else PNG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Marker color scale
    #[arg(long, value_enum)]
    color_scale: Option<ColorScale>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render only, do not open the image
    #[arg(long)]
    no_show: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

impl Args {
    /// Config file values (or defaults) with command line flags applied on top.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(max_rows) = self.max_rows {
            config.max_rows = max_rows;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(output) = &self.output {
            config.plot.output = output.clone();
        }
        if let Some(scale) = self.color_scale {
            config.plot.color_scale = scale;
        }

        Ok(config)
    }
}

fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level)?;

    let config = args.resolve_config()?;
    info!(
        path = %args.csv_path.display(),
        max_rows = config.max_rows,
        "Starting fire map"
    );

    let extractor = DataExtractor::new(&args.csv_path);
    let extraction = match extractor.extract(config.max_rows) {
        Ok(extraction) => extraction,
        Err(e @ ExtractError::FileNotFound { .. }) => {
            error!(path = %extractor.file_path().display(), "fire data file not found");
            return Err(e.into());
        }
        Err(e) => return Err(e).context("reading fire data"),
    };

    if !extraction.diagnostics.is_empty() {
        warn!(
            skipped = extraction.diagnostics.len(),
            rows_considered = extraction.rows_considered,
            "some rows could not be parsed"
        );
    }
    if extraction.is_empty() {
        warn!("no valid fire records; rendering an empty map");
    } else {
        let summary = BrightnessSummary::from_records(&extraction.records);
        info!(
            count = summary.count,
            min = summary.min,
            max = summary.max,
            mean = summary.mean,
            median = summary.median,
            p05 = summary.p05,
            p95 = summary.p95,
            "brightness summary"
        );
    }

    let (lats, lons, brights, dates) = extraction.columns();
    let plotter = FireMapPlotter::new(config.plot.clone());
    let plot = plotter
        .create_plot(&lats, &lons, &brights, &dates, &config.title)
        .context("creating fire map")?;

    if plot.off_map > 0 {
        warn!(off_map = plot.off_map, "records outside the world frame were not drawn");
    }

    if args.no_show {
        info!(path = %plot.path.display(), "Fire map written");
    } else {
        plotter.show_plot(&plot).context("showing fire map")?;
    }

    Ok(())
}
