use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use env_logger::Env;
use log::info;
use sources::tile_file::{load_soil_rasters, load_tiles};
use sources::{GridSource, JsonGridSource, SyntheticGridSource};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, StaticLayers};

mod generator;
mod sources;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Station soil-moisture feature extraction driver")]
struct Args {
    /// Load a workflow config from YAML; the built-in demo is used otherwise
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// First day to process (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day to process, inclusive
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Ignore grid directories and generate synthetic swaths
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Override the synthetic swath seed
    #[arg(long)]
    seed: Option<u64>,
    /// Write JSON lines here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::demo()?,
    };
    if let Some(seed) = args.seed {
        config.synthetic.seed = seed;
    }
    anyhow::ensure!(!config.stations.is_empty(), "workflow lists no stations");
    let (start, end) = config.date_range(args.start, args.end)?;

    let baseline: Box<dyn GridSource> = match (&config.grid_dir, args.synthetic) {
        (Some(dir), false) => {
            info!("reading baseline grids from {}", dir.display());
            Box::new(JsonGridSource::new(dir.clone(), config.domain))
        }
        _ => {
            let source = SyntheticGridSource::new(
                config.synthetic.clone(),
                config.domain,
                &config.stations,
            );
            let (lat, lon) = source.center();
            info!("generating synthetic swaths around ({:.4}, {:.4})", lat, lon);
            Box::new(source)
        }
    };
    let alternate: Option<Box<dyn GridSource>> = match (&config.alternate_grid_dir, args.synthetic) {
        (Some(dir), false) => {
            info!("reading alternate grids from {}", dir.display());
            Some(Box::new(JsonGridSource::new(dir.clone(), config.domain)))
        }
        _ => None,
    };
    let statics = StaticLayers {
        elevation: load_tiles(&config.terrain_tiles)?,
        soil: load_soil_rasters(&config.soil_rasters)?,
    };
    let mut out = open_output(args.output.as_deref())?;

    let mut runner = Runner::new(config)?;
    runner.run(
        start,
        end,
        &*baseline,
        alternate.as_deref(),
        &statics,
        &mut out,
    )?;

    Ok(())
}

/// Buffered JSON-lines sink: the given file, created with its parent
/// directories, or stdout.
fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("creating output {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}
