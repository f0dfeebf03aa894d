use crate::error::BattleError;
use crate::model::{Combatant, Roster};
use crate::types::{ElementType, TypeChart};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

pub const DAMAGE_STEP: u32 = 35;
pub const DAMAGE_FACES: u32 = 6;

/// Match-level result from the player's point of view.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
    Continue,
}

impl MatchOutcome {
    pub fn is_final(self) -> bool {
        !matches!(self, MatchOutcome::Continue)
    }
}

/// Which active combatants fell during a turn.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TurnOutcome {
    Continuing,
    PlayerTeamDepleted,
    AiTeamDepleted,
    BothDepleted,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TurnPhase {
    AwaitingPlayerMove,
    MovesResolved(TurnOutcome),
    Finished(MatchOutcome),
}

/// Source of raw per-side damage before type advantage.
pub trait DamageRoll {
    fn roll(&mut self) -> u32;
}

/// `d6 * 35`: one of 35, 70, 105, 140, 175 or 210, each equally likely.
pub struct DiceRoll {
    rng: SmallRng,
}

impl DiceRoll {
    pub fn new(seed: u64) -> Self {
        DiceRoll {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl DamageRoll for DiceRoll {
    fn roll(&mut self) -> u32 {
        self.rng.gen_range(1..=DAMAGE_FACES) * DAMAGE_STEP
    }
}

/// Best-effort text generator used for commentary and, optionally, AI move picks.
/// Its output is never trusted as game state.
pub trait FlavorGenerator {
    fn generate(&mut self, prompt: &str) -> anyhow::Result<String>;
}

/// Blocking source of the player's move choice.
pub trait InputSelector {
    fn choose_move(&mut self, legal_moves: &[String]) -> Result<String, BattleError>;
}

/// Picks the AI's move for its active combatant. The result must be one of `attacker.moves()`.
pub trait MovePolicy {
    fn choose_move(&mut self, attacker: &Combatant, defender: &Combatant) -> String;
}

/// Snapshot handed to the display before each move prompt.
#[derive(Clone, Debug)]
pub struct BattleFrame<'a> {
    pub turn: u32,
    pub player_active: &'a Combatant,
    pub ai_active: &'a Combatant,
    pub legal_moves: &'a [String],
    pub player_health: (u32, u32),
    pub ai_health: (u32, u32),
    pub player_remaining: usize,
    pub ai_remaining: usize,
}

/// Fire-and-forget presentation hooks; nothing returned flows back into the core.
pub trait DisplaySink {
    fn render(&mut self, frame: &BattleFrame<'_>);

    fn commentary(&mut self, _line: &str) {}

    fn report(&mut self, _report: &TurnReport) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentDisplay;

impl DisplaySink for SilentDisplay {
    fn render(&mut self, _frame: &BattleFrame<'_>) {}
}

pub struct RandomMovePolicy {
    rng: SmallRng,
}

impl RandomMovePolicy {
    pub fn new(seed: u64) -> Self {
        RandomMovePolicy {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, moves: &[String]) -> String {
        moves.choose(&mut self.rng).cloned().unwrap_or_default()
    }
}

impl MovePolicy for RandomMovePolicy {
    fn choose_move(&mut self, attacker: &Combatant, _defender: &Combatant) -> String {
        self.pick(attacker.moves())
    }
}

// Lets a random policy stand in for the player during auto-play.
impl InputSelector for RandomMovePolicy {
    fn choose_move(&mut self, legal_moves: &[String]) -> Result<String, BattleError> {
        Ok(self.pick(legal_moves))
    }
}

/// Resolves generated text to a legal move name, ignoring case, quotes and trailing punctuation.
pub fn match_move_text<'a>(legal_moves: &'a [String], text: &str) -> Result<&'a str, BattleError> {
    let cleaned = text
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '!')
        .trim();
    legal_moves
        .iter()
        .find(|m| m.eq_ignore_ascii_case(cleaned))
        .map(String::as_str)
        .ok_or_else(|| BattleError::UntrustedTextMismatch {
            text: text.to_string(),
        })
}

/// Asks a generator for the AI's move and falls back to a random legal move
/// when the reply is unusable.
pub struct FlavorMovePolicy<G> {
    generator: G,
    fallback: RandomMovePolicy,
}

impl<G: FlavorGenerator> FlavorMovePolicy<G> {
    pub fn new(generator: G, seed: u64) -> Self {
        FlavorMovePolicy {
            generator,
            fallback: RandomMovePolicy::new(seed),
        }
    }

    fn prompt(attacker: &Combatant, defender: &Combatant) -> String {
        format!(
            "Your Pokemon is {attacker}, facing {defender}. Choose one move from: {}. Answer with the move name only.",
            attacker.moves().join(", ")
        )
    }
}

impl<G: FlavorGenerator> MovePolicy for FlavorMovePolicy<G> {
    fn choose_move(&mut self, attacker: &Combatant, defender: &Combatant) -> String {
        let prompt = Self::prompt(attacker, defender);
        let reply = match self.generator.generate(&prompt) {
            Ok(text) => text,
            Err(err) => {
                warn!("flavor generator failed, using random move: {err:#}");
                return self.fallback.pick(attacker.moves());
            }
        };
        match match_move_text(attacker.moves(), &reply) {
            Ok(name) => name.to_string(),
            Err(err) => {
                warn!("{err}; using random move");
                self.fallback.pick(attacker.moves())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u32,
    pub player_combatant: String,
    pub ai_combatant: String,
    pub player_move: String,
    pub ai_move: String,
    pub player_roll: u32,
    pub ai_roll: u32,
    /// Damage dealt by the player's combatant after type advantage.
    pub player_damage: u32,
    /// Damage dealt by the AI's combatant after type advantage.
    pub ai_damage: u32,
    pub player_super_effective: bool,
    pub ai_super_effective: bool,
    pub player_health: u32,
    pub ai_health: u32,
    pub fainted: Vec<String>,
    pub outcome: TurnOutcome,
    pub match_outcome: MatchOutcome,
}

/// Collaborators a turn needs beyond the battle state itself.
pub struct TurnContext<'a> {
    pub input: &'a mut dyn InputSelector,
    pub ai: &'a mut dyn MovePolicy,
    pub rolls: &'a mut dyn DamageRoll,
    pub display: &'a mut dyn DisplaySink,
    pub flavor: Option<&'a mut dyn FlavorGenerator>,
}

fn boosted(roll: u32, attacker: ElementType, defender: ElementType, chart: &TypeChart) -> (u32, bool) {
    if chart.beats(attacker, defender) {
        // Floor of 1.5x, kept in integers.
        (roll.saturating_mul(3) / 2, true)
    } else {
        (roll, false)
    }
}

pub struct Battle {
    player: Roster,
    ai: Roster,
    chart: TypeChart,
    turn: u32,
    max_turns: Option<u32>,
    phase: TurnPhase,
    fallback: RandomMovePolicy,
}

impl Battle {
    pub fn new(player: Roster, ai: Roster, chart: TypeChart) -> Self {
        let mut battle = Battle {
            player,
            ai,
            chart,
            turn: 0,
            max_turns: None,
            phase: TurnPhase::AwaitingPlayerMove,
            fallback: RandomMovePolicy::new(0),
        };
        battle.sync_phase();
        battle
    }

    /// Declares the match a draw once `cap` turns have been resolved with both rosters standing.
    pub fn with_max_turns(mut self, cap: Option<u32>) -> Self {
        self.max_turns = cap;
        self.sync_phase();
        self
    }

    /// Seeds the random move substituted when the AI policy names a move its combatant lacks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.fallback = RandomMovePolicy::new(seed);
        self
    }

    pub fn player(&self) -> &Roster {
        &self.player
    }

    pub fn ai(&self) -> &Roster {
        &self.ai
    }

    pub fn chart(&self) -> &TypeChart {
        &self.chart
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Player-empty is checked before AI-empty, so a simultaneous wipe is a loss.
    pub fn outcome(&self) -> MatchOutcome {
        if self.player.is_empty() {
            MatchOutcome::Loss
        } else if self.ai.is_empty() {
            MatchOutcome::Win
        } else if self.max_turns.is_some_and(|cap| self.turn >= cap) {
            MatchOutcome::Draw
        } else {
            MatchOutcome::Continue
        }
    }

    fn sync_phase(&mut self) {
        let outcome = self.outcome();
        if outcome.is_final() {
            self.phase = TurnPhase::Finished(outcome);
        }
    }

    pub fn legal_moves(&self) -> &[String] {
        self.player.active().map(Combatant::moves).unwrap_or(&[])
    }

    pub fn frame(&self) -> Option<BattleFrame<'_>> {
        let player_active = self.player.active()?;
        let ai_active = self.ai.active()?;
        Some(BattleFrame {
            turn: self.turn + 1,
            player_active,
            ai_active,
            legal_moves: player_active.moves(),
            player_health: (player_active.current_health(), player_active.max_health()),
            ai_health: (ai_active.current_health(), ai_active.max_health()),
            player_remaining: self.player.len(),
            ai_remaining: self.ai.len(),
        })
    }

    /// Resolves one exchange with both moves already chosen.
    ///
    /// Rolls are drawn player first, then AI. Each side's damage is boosted by
    /// 1.5x (floored) when its type is listed in the opponent's chart entry, and
    /// is applied to the opponent. Fainted actives leave their rosters before
    /// the match outcome is recomputed.
    pub fn resolve_turn(
        &mut self,
        player_move: &str,
        ai_move: &str,
        rolls: &mut dyn DamageRoll,
    ) -> Result<TurnReport, BattleError> {
        if self.outcome().is_final() {
            return Err(BattleError::MatchOver);
        }
        let (Some(player_active), Some(ai_active)) = (self.player.active(), self.ai.active()) else {
            return Err(BattleError::MatchOver);
        };
        let player_move = player_active
            .find_move(player_move)
            .ok_or_else(|| {
                BattleError::InvalidSelection(format!(
                    "{} does not know {player_move:?}",
                    player_active.name()
                ))
            })?
            .to_string();
        let ai_move = ai_active
            .find_move(ai_move)
            .ok_or_else(|| {
                BattleError::InvalidSelection(format!(
                    "{} does not know {ai_move:?}",
                    ai_active.name()
                ))
            })?
            .to_string();
        let player_type = player_active.element();
        let ai_type = ai_active.element();

        let player_roll = rolls.roll();
        let ai_roll = rolls.roll();
        let (player_damage, player_super_effective) =
            boosted(player_roll, player_type, ai_type, &self.chart);
        let (ai_damage, ai_super_effective) = boosted(ai_roll, ai_type, player_type, &self.chart);

        self.turn += 1;
        let (player_name, player_health, player_fainted) = match self.player.active_mut() {
            Some(active) => {
                active.take_hit(ai_damage);
                (active.name().to_string(), active.current_health(), active.is_fainted())
            }
            None => return Err(BattleError::MatchOver),
        };
        let (ai_name, ai_health, ai_fainted) = match self.ai.active_mut() {
            Some(active) => {
                active.take_hit(player_damage);
                (active.name().to_string(), active.current_health(), active.is_fainted())
            }
            None => return Err(BattleError::MatchOver),
        };
        debug!(
            turn = self.turn,
            %player_move,
            %ai_move,
            player_damage,
            ai_damage,
            player_health,
            ai_health,
            "turn resolved"
        );

        let mut fainted = Vec::new();
        let outcome = match (player_fainted, ai_fainted) {
            (true, true) => TurnOutcome::BothDepleted,
            (true, false) => TurnOutcome::PlayerTeamDepleted,
            (false, true) => TurnOutcome::AiTeamDepleted,
            (false, false) => TurnOutcome::Continuing,
        };
        if player_fainted {
            if let Some(down) = self.player.advance() {
                debug!("{} fainted", down.name());
                fainted.push(down.name().to_string());
            }
        }
        if ai_fainted {
            if let Some(down) = self.ai.advance() {
                debug!("{} fainted", down.name());
                fainted.push(down.name().to_string());
            }
        }

        let match_outcome = self.outcome();
        self.phase = if match_outcome.is_final() {
            debug!(?match_outcome, turn = self.turn, "match finished");
            TurnPhase::Finished(match_outcome)
        } else {
            TurnPhase::MovesResolved(outcome)
        };

        Ok(TurnReport {
            turn: self.turn,
            player_combatant: player_name,
            ai_combatant: ai_name,
            player_move,
            ai_move,
            player_roll,
            ai_roll,
            player_damage,
            ai_damage,
            player_super_effective,
            ai_super_effective,
            player_health,
            ai_health,
            fainted,
            outcome,
            match_outcome,
        })
    }

    /// Runs one full turn against the collaborators: render, wait for a legal
    /// player move, pick the AI move, resolve, report.
    pub fn play_turn(&mut self, ctx: &mut TurnContext<'_>) -> Result<TurnReport, BattleError> {
        if self.outcome().is_final() {
            return Err(BattleError::MatchOver);
        }
        self.phase = TurnPhase::AwaitingPlayerMove;
        if let Some(frame) = self.frame() {
            ctx.display.render(&frame);
        }

        let player_move = self.await_player_move(ctx.input)?;
        comment(
            &mut ctx.flavor,
            ctx.display,
            &format!("The player's Pokemon uses '{player_move}'."),
        );

        let ai_move = match (self.ai.active(), self.player.active()) {
            (Some(attacker), Some(defender)) => {
                let text = ctx.ai.choose_move(attacker, defender);
                match match_move_text(attacker.moves(), &text) {
                    Ok(name) => name.to_string(),
                    Err(err) => {
                        warn!("{err}; using random move");
                        self.fallback.pick(attacker.moves())
                    }
                }
            }
            _ => return Err(BattleError::MatchOver),
        };
        comment(
            &mut ctx.flavor,
            ctx.display,
            &format!("The AI's Pokemon uses '{ai_move}'."),
        );

        let report = self.resolve_turn(&player_move, &ai_move, ctx.rolls)?;
        ctx.display.report(&report);
        comment(
            &mut ctx.flavor,
            ctx.display,
            &format!("Your Pokemon deals {} damage.", report.player_damage),
        );
        Ok(report)
    }

    fn await_player_move(&self, input: &mut dyn InputSelector) -> Result<String, BattleError> {
        let Some(active) = self.player.active() else {
            return Err(BattleError::MatchOver);
        };
        loop {
            let choice = input.choose_move(active.moves())?;
            match active.find_move(&choice) {
                Some(name) => return Ok(name.to_string()),
                None => warn!(
                    "{}",
                    BattleError::InvalidSelection(format!(
                        "{choice:?} is not one of {:?}",
                        active.moves()
                    ))
                ),
            }
        }
    }

    /// Plays turns until the match is decided.
    pub fn run(&mut self, ctx: &mut TurnContext<'_>) -> Result<MatchOutcome, BattleError> {
        while !self.outcome().is_final() {
            self.play_turn(ctx)?;
        }
        Ok(self.outcome())
    }
}

fn comment(
    flavor: &mut Option<&mut dyn FlavorGenerator>,
    display: &mut dyn DisplaySink,
    message: &str,
) {
    let Some(generator) = flavor.as_deref_mut() else {
        return;
    };
    match generator.generate(message) {
        Ok(text) if !text.trim().is_empty() => display.commentary(text.trim()),
        Ok(_) => {}
        Err(err) => warn!("commentary skipped: {err:#}"),
    }
}

/// Auto-plays a match with random moves on both sides.
pub fn simulate_match(
    player: &[Combatant],
    ai: &[Combatant],
    chart: &TypeChart,
    seed: u64,
    max_turns: Option<u32>,
) -> MatchOutcome {
    let mut battle = Battle::new(
        Roster::new(player.to_vec()),
        Roster::new(ai.to_vec()),
        chart.clone(),
    )
    .with_max_turns(max_turns);
    let mut seeds = SmallRng::seed_from_u64(seed);
    battle = battle.with_seed(seeds.gen());
    let mut player_policy = RandomMovePolicy::new(seeds.gen());
    let mut ai_policy = RandomMovePolicy::new(seeds.gen());
    let mut rolls = DiceRoll::new(seeds.gen());
    let mut display = SilentDisplay;
    let mut ctx = TurnContext {
        input: &mut player_policy,
        ai: &mut ai_policy,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    // Random selectors never close, so the only error left is MatchOver.
    battle.run(&mut ctx).unwrap_or_else(|_| battle.outcome())
}
