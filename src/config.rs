use crate::draft::ROSTER_SIZE;
use crate::types::TypeChart;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub roster_size: usize,
    pub seed: u64,
    /// Turns after which an undecided match is a draw. `None` plays to the end.
    pub max_turns: Option<u32>,
    /// Replaces the built-in chart. Types left out list nothing.
    pub type_chart: Option<HashMap<String, Vec<String>>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            roster_size: ROSTER_SIZE,
            seed: 0,
            max_turns: None,
            type_chart: None,
        }
    }
}

impl GameConfig {
    pub fn chart(&self) -> anyhow::Result<TypeChart> {
        match &self.type_chart {
            Some(raw) => TypeChart::from_names(raw).context("Invalid typeChart in config"),
            None => Ok(TypeChart::default()),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<GameConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let parsed: GameConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    if parsed.roster_size == 0 {
        anyhow::bail!("rosterSize must be > 0");
    }
    Ok(parsed)
}
