use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use faraday_phase::config::Config;
use faraday_phase::data::boundary::{extract_boundary, hysteresis};
use faraday_phase::data::catalog::{Catalog, Sweep};
use faraday_phase::data::store::{convert_directory, load_datasets};
use faraday_phase::images::convert_tiff_tree;
use faraday_phase::view::PhaseView;

#[derive(Parser)]
#[command(name = "faraday-phase")]
#[command(about = "Normalize sweep tables and lay out phase diagrams", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of sweep tables into dataset documents
    Convert {
        /// Directory of .csv / .tsv / .parquet tables
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory receiving <id>.json documents
        #[arg(long)]
        output: Option<PathBuf>,

        /// Accelerometer sensitivity, mV per g
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Frequency bin width, Hz
        #[arg(long)]
        df: Option<f64>,
    },

    /// Print up/down boundary curves and their hysteresis for one fluid
    Boundary {
        /// Directory of dataset documents
        #[arg(long)]
        datasets: Option<PathBuf>,

        #[arg(long)]
        fluid: String,
    },

    /// Write the phase-diagram view (axes, regions, curves) for one fluid
    Layout {
        /// Directory of dataset documents
        #[arg(long)]
        datasets: Option<PathBuf>,

        #[arg(long)]
        fluid: String,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Convert captured TIFF patterns to PNG
    Images {
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Re-encode files that already have a PNG
        #[arg(long, default_value = "false")]
        overwrite: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            sensitivity,
            df,
        } => {
            if let Some(s) = sensitivity {
                config.calibration.sensitivity_mv_per_g = s;
            }
            if let Some(df) = df {
                config.calibration.df = df;
            }
            let input = input.unwrap_or(config.paths.input_dir);
            let output = output.unwrap_or(config.paths.output_dir);

            let written = convert_directory(&input, &output, &config.calibration)?;
            println!("{} dataset(s) written to {}", written.len(), output.display());
        }

        Commands::Boundary { datasets, fluid } => {
            let catalog = open_catalog(datasets.unwrap_or(config.paths.output_dir))?;
            let pair = catalog.pair(&fluid);
            if pair.up.is_none() && pair.down.is_none() {
                bail!("no datasets for fluid '{fluid}' (known: {})", catalog.fluids().join(", "));
            }

            let curve = |sweep: Sweep| {
                pair.get(sweep)
                    .map(|ds| extract_boundary(&ds.regions, &config.boundary))
                    .unwrap_or_default()
            };
            let up = curve(Sweep::Up);
            let down = curve(Sweep::Down);
            let report = json!({
                "fluid": fluid,
                "up": up,
                "down": down,
                "hysteresis": hysteresis(&up, &down),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Layout {
            datasets,
            fluid,
            out,
        } => {
            let catalog = open_catalog(datasets.unwrap_or(config.paths.output_dir.clone()))?;
            let pair = catalog.pair(&fluid);
            if pair.up.is_none() && pair.down.is_none() {
                bail!("no datasets for fluid '{fluid}' (known: {})", catalog.fluids().join(", "));
            }

            let view = PhaseView::build(&fluid, pair, &config);
            let text = serde_json::to_string_pretty(&view)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("view for {fluid} written to {}", path.display());
                }
                None => println!("{text}"),
            }
        }

        Commands::Images {
            input,
            output,
            overwrite,
        } => {
            let input = input.unwrap_or(config.paths.pattern_dir);
            let output = output.unwrap_or(config.paths.png_dir);
            let report = convert_tiff_tree(&input, &output, !overwrite)?;
            println!(
                "{} found, {} converted, {} skipped, {} failed",
                report.total, report.converted, report.skipped, report.failed
            );
        }
    }

    Ok(())
}

fn open_catalog(dir: PathBuf) -> Result<Catalog> {
    let datasets = load_datasets(&dir)?;
    log::info!("{} dataset(s) in {}", datasets.len(), dir.display());
    Ok(Catalog::from_datasets(datasets))
}
