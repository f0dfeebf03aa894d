use crate::battle::{simulate_match, MatchOutcome};
use crate::draft::draft_ai_indices;
use crate::model::Combatant;
use crate::types::TypeChart;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

pub const AUTO_PLAY_TURN_CAP: u32 = 500;

fn choose3_indices(len: usize) -> Vec<[usize; 3]> {
    let mut combos = Vec::new();
    for i in 0..len {
        for j in (i + 1)..len {
            for k in (j + 1)..len {
                combos.push([i, j, k]);
            }
        }
    }
    combos
}

fn selection_from_indices(pool: &[Combatant], indices: &[usize]) -> Vec<Combatant> {
    indices.iter().map(|&idx| pool[idx].clone()).collect()
}

/// Player win rate for one drafted matchup; draws count half.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftCell {
    pub player: Vec<String>,
    pub ai: Vec<String>,
    pub win_rate: f64,
}

/// Plays every 3-of-pool player roster against the greedy counter-draft.
pub fn compute_draft_matrix(
    pool: &[Combatant],
    chart: &TypeChart,
    sims_per_cell: usize,
    seed: u64,
) -> Vec<DraftCell> {
    let combos = choose3_indices(pool.len());
    combos
        .par_iter()
        .enumerate()
        .map(|(cell_idx, picks)| {
            let mut cell_rng = SmallRng::seed_from_u64(seed ^ ((cell_idx as u64) << 32));
            let ai_picks = draft_ai_indices(pool, picks, chart, picks.len());
            let player = selection_from_indices(pool, picks);
            let ai = selection_from_indices(pool, &ai_picks);
            let mut wins = 0u64;
            let mut draws = 0u64;
            for _ in 0..sims_per_cell {
                let battle_seed = cell_rng.gen();
                match simulate_match(&player, &ai, chart, battle_seed, Some(AUTO_PLAY_TURN_CAP)) {
                    MatchOutcome::Win => wins += 1,
                    MatchOutcome::Draw | MatchOutcome::Continue => draws += 1,
                    MatchOutcome::Loss => {}
                }
            }
            let total = sims_per_cell.max(1) as f64;
            DraftCell {
                player: player.iter().map(|c| c.name().to_string()).collect(),
                ai: ai.iter().map(|c| c.name().to_string()).collect(),
                win_rate: (wins as f64 + 0.5 * draws as f64) / total,
            }
        })
        .collect()
}

pub fn write_csv(cells: &[DraftCell], path: &std::path::Path) -> anyhow::Result<()> {
    let mut out = String::from("player_roster,ai_roster,win_rate");
    for cell in cells {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{:.4}",
            cell.player.join("/"),
            cell.ai.join("/"),
            cell.win_rate
        ));
    }
    std::fs::write(path, out)?;
    Ok(())
}
