use crate::error::BattleError;
use crate::model::{Combatant, Roster};
use crate::types::{ElementType, TypeChart};
use std::collections::HashSet;
use tracing::{info, warn};

pub const ROSTER_SIZE: usize = 3;

/// Blocking source of the player's draft picks, as indices into the pool.
pub trait RosterSelector {
    fn choose_roster(&mut self, pool: &[Combatant], count: usize) -> Result<Vec<usize>, BattleError>;
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub player: Roster,
    pub ai: Roster,
}

/// Checks that `picks` names exactly `count` distinct pool slots.
pub fn validate_selection(pool_len: usize, count: usize, picks: &[usize]) -> Result<(), BattleError> {
    if picks.len() != count {
        return Err(BattleError::InvalidSelection(format!(
            "expected {count} picks, got {}",
            picks.len()
        )));
    }
    let mut seen = HashSet::with_capacity(picks.len());
    for &idx in picks {
        if idx >= pool_len {
            return Err(BattleError::InvalidSelection(format!(
                "pick {} is outside the pool of {pool_len}",
                idx + 1
            )));
        }
        if !seen.insert(idx) {
            return Err(BattleError::InvalidSelection(format!(
                "pick {} chosen twice",
                idx + 1
            )));
        }
    }
    Ok(())
}

fn player_weaknesses(player: &[&Combatant], chart: &TypeChart) -> HashSet<ElementType> {
    player
        .iter()
        .flat_map(|c| chart.weaknesses_of(c.element()).iter().copied())
        .collect()
}

/// Greedy pick: the candidate whose weaknesses overlap most with the player's
/// combined weaknesses. Ties go to the earliest candidate.
pub fn select_ai_pick(
    player: &[&Combatant],
    candidates: &[(usize, &Combatant)],
    chart: &TypeChart,
) -> Option<usize> {
    let targets = player_weaknesses(player, chart);
    let mut best: Option<(usize, usize)> = None;
    for &(idx, candidate) in candidates {
        let score = chart
            .weaknesses_of(candidate.element())
            .iter()
            .filter(|t| targets.contains(*t))
            .count();
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Fills the AI roster one pick at a time from whatever the player left in the pool.
///
/// Single pass, no backtracking: an earlier pick is never revisited, so the
/// result is a counter-team, not the best possible one. A pool that runs dry
/// yields a shorter roster.
pub fn draft_ai_indices(
    pool: &[Combatant],
    player_picks: &[usize],
    chart: &TypeChart,
    count: usize,
) -> Vec<usize> {
    let player: Vec<&Combatant> = player_picks.iter().filter_map(|&i| pool.get(i)).collect();
    let mut taken: HashSet<usize> = player_picks.iter().copied().collect();
    let mut ai = Vec::with_capacity(count);
    for _ in 0..count {
        let candidates: Vec<(usize, &Combatant)> = pool
            .iter()
            .enumerate()
            .filter(|(idx, _)| !taken.contains(idx))
            .collect();
        match select_ai_pick(&player, &candidates, chart) {
            Some(idx) => {
                taken.insert(idx);
                ai.push(idx);
            }
            None => {
                warn!(
                    "{}",
                    BattleError::EmptyPool {
                        requested: count,
                        available: ai.len(),
                    }
                );
                break;
            }
        }
    }
    ai
}

/// Runs the full draft: the selector picks for the player (re-prompted until
/// valid), then the AI counter-drafts.
pub fn run_draft(
    pool: &[Combatant],
    chart: &TypeChart,
    selector: &mut dyn RosterSelector,
    roster_size: usize,
) -> Result<Draft, BattleError> {
    let count = roster_size.min(pool.len());
    if count < roster_size {
        warn!(
            "{}",
            BattleError::EmptyPool {
                requested: roster_size,
                available: pool.len(),
            }
        );
    }
    let picks = loop {
        let picks = selector.choose_roster(pool, count)?;
        match validate_selection(pool.len(), count, &picks) {
            Ok(()) => break picks,
            Err(err) => warn!("{err}"),
        }
    };
    let ai_picks = draft_ai_indices(pool, &picks, chart, roster_size);
    let draft = Draft {
        player: picks.iter().map(|&i| pool[i].clone()).collect(),
        ai: ai_picks.iter().map(|&i| pool[i].clone()).collect(),
    };
    info!(
        player = ?draft.player.names(),
        ai = ?draft.ai.names(),
        "draft complete"
    );
    Ok(draft)
}
