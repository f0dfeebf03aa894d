pub mod battle;
pub mod config;
pub mod draft;
pub mod error;
pub mod matrix;
pub mod model;
pub mod types;

use crate::config::GameConfig;
use crate::matrix::compute_draft_matrix;
use crate::model::{default_pool, Combatant, PoolFile};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub pool_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub sims_per_cell: usize,
    pub seed: Option<u64>,
    pub output_path: PathBuf,
}

pub fn load_pool(path: &Path) -> anyhow::Result<Vec<Combatant>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool file at {}", path.display()))?;
    let parsed: PoolFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    if parsed.pool.is_empty() {
        anyhow::bail!("Pool file {} lists no combatants", path.display());
    }
    Ok(parsed.pool)
}

/// Pool from `path`, or the built-in ten when none is given.
pub fn load_pool_or_default(path: Option<&Path>) -> anyhow::Result<Vec<Combatant>> {
    match path {
        Some(path) => load_pool(path),
        None => Ok(default_pool()),
    }
}

pub fn load_config_or_default(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => config::load_config(path),
        None => Ok(GameConfig::default()),
    }
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.sims_per_cell == 0 {
        anyhow::bail!("--sims-per-cell must be > 0");
    }
    let config = load_config_or_default(opts.config_path.as_deref())?;
    let pool = load_pool_or_default(opts.pool_path.as_deref())?;
    let chart = config.chart()?;
    let seed = opts.seed.unwrap_or(config.seed);
    info!(pool = pool.len(), sims = opts.sims_per_cell, seed, "evaluating draft");
    let cells = compute_draft_matrix(&pool, &chart, opts.sims_per_cell, seed);
    matrix::write_csv(&cells, &opts.output_path)?;
    println!(
        "Wrote {} draft matchups to {}",
        cells.len(),
        opts.output_path.display()
    );
    Ok(())
}
