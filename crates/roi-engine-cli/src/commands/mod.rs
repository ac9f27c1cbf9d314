pub mod catalog;
pub mod compute;

use clap::Args;
use tracing::debug;

use roi_engine_core::{EngineConfig, ProfileCatalog, RoiEngine, SimulationMode};

use crate::input;

/// Engine options shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Engine configuration file (JSON or YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Profile catalog file (JSON or YAML); defaults to the built-in catalog
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Master seed for a reproducible simulation
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Monte Carlo trial count (100 to 10000)
    #[arg(long, global = true)]
    pub trials: Option<u32>,

    /// Simulation mode: standard, optimistic, pessimistic or stress-test
    #[arg(long, global = true)]
    pub mode: Option<SimulationMode>,
}

pub fn build_engine(args: &EngineArgs) -> Result<RoiEngine, Box<dyn std::error::Error>> {
    let mut config: EngineConfig = match &args.config {
        Some(path) => input::file::read_document(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(trials) = args.trials {
        config.simulation.trials = trials;
    }
    if let Some(mode) = args.mode {
        config.simulation.mode = mode;
    }

    let catalog: ProfileCatalog = match &args.catalog {
        Some(path) => input::file::read_document(path)?,
        None => ProfileCatalog::default(),
    };

    debug!(
        trials = config.simulation.trials,
        seed = ?config.simulation.seed,
        mode = %config.simulation.mode,
        catalog_currency = %catalog.currency(),
        "engine configured"
    );
    Ok(RoiEngine::new(catalog, config)?)
}
