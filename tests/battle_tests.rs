use pokemon_draft_battle::battle::{
    simulate_match, Battle, BattleFrame, DamageRoll, DisplaySink, FlavorGenerator,
    FlavorMovePolicy, InputSelector, MatchOutcome, MovePolicy, RandomMovePolicy, TurnContext,
    TurnOutcome, TurnPhase, TurnReport,
};
use pokemon_draft_battle::error::BattleError;
use pokemon_draft_battle::model::{default_pool, Combatant, Roster};
use pokemon_draft_battle::types::{ElementType, TypeChart};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

struct FixedRolls(VecDeque<u32>);

impl FixedRolls {
    fn new(values: &[u32]) -> Self {
        FixedRolls(values.iter().copied().collect())
    }
}

impl DamageRoll for FixedRolls {
    fn roll(&mut self) -> u32 {
        let v = self.0.pop_front().unwrap_or(100);
        self.0.push_back(v);
        v
    }
}

struct ScriptedInput(VecDeque<&'static str>);

impl InputSelector for ScriptedInput {
    fn choose_move(&mut self, _legal_moves: &[String]) -> Result<String, BattleError> {
        self.0
            .pop_front()
            .map(str::to_string)
            .ok_or(BattleError::InputClosed)
    }
}

#[derive(Default)]
struct Recorder {
    frames: usize,
    lines: Vec<String>,
    reports: Vec<TurnReport>,
}

impl DisplaySink for Recorder {
    fn render(&mut self, frame: &BattleFrame<'_>) {
        assert!(frame.legal_moves.len() <= 4);
        self.frames += 1;
    }

    fn commentary(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn report(&mut self, report: &TurnReport) {
        self.reports.push(report.clone());
    }
}

struct Canned(Result<&'static str, &'static str>);

impl FlavorGenerator for Canned {
    fn generate(&mut self, _prompt: &str) -> anyhow::Result<String> {
        match self.0 {
            Ok(text) => Ok(text.to_string()),
            Err(msg) => Err(anyhow::anyhow!(msg)),
        }
    }
}

fn mon(name: &str) -> Combatant {
    default_pool()
        .into_iter()
        .find(|c| c.name() == name)
        .expect("pool member")
}

fn battle(player: &[&str], ai: &[&str]) -> Battle {
    Battle::new(
        player.iter().map(|n| mon(n)).collect(),
        ai.iter().map(|n| mon(n)).collect(),
        TypeChart::default(),
    )
}

#[test]
fn water_beats_fire_end_to_end() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let report = b
        .resolve_turn("Surf", "Flamethrower", &mut FixedRolls::new(&[200, 50]))
        .unwrap();
    assert!(report.player_super_effective);
    assert!(!report.ai_super_effective);
    assert_eq!(report.player_damage, 300);
    assert_eq!(report.ai_damage, 50);
    assert_eq!(report.ai_health, 30);
    assert_eq!(report.player_health, 280);
    assert_eq!(report.outcome, TurnOutcome::Continuing);
    assert_eq!(report.match_outcome, MatchOutcome::Continue);
    assert_eq!(b.phase(), TurnPhase::MovesResolved(TurnOutcome::Continuing));
}

#[test]
fn fire_into_water_is_not_boosted() {
    let mut b = battle(&["Moltres"], &["Kyogre"]);
    let report = b
        .resolve_turn("Overheat", "Surf", &mut FixedRolls::new(&[70, 70]))
        .unwrap();
    assert_eq!(report.player_damage, 70);
    assert_eq!(report.ai_damage, 105);
}

#[test]
fn both_sides_can_be_super_effective() {
    // Ghost lists Ghost, so a Ghost mirror boosts both sides.
    let mut b = battle(&["Giratina"], &["Giratina"]);
    let report = b
        .resolve_turn("Shadow Ball", "Dark Pulse", &mut FixedRolls::new(&[35, 140]))
        .unwrap();
    assert!(report.player_super_effective && report.ai_super_effective);
    assert_eq!(report.player_damage, 52);
    assert_eq!(report.ai_damage, 210);
}

#[test]
fn simultaneous_wipe_is_a_loss() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let report = b
        .resolve_turn("Surf", "Overheat", &mut FixedRolls::new(&[400, 400]))
        .unwrap();
    assert_eq!(report.outcome, TurnOutcome::BothDepleted);
    assert_eq!(report.fainted, vec!["Kyogre".to_string(), "Moltres".to_string()]);
    assert!(b.player().is_empty() && b.ai().is_empty());
    assert_eq!(report.match_outcome, MatchOutcome::Loss);
    assert_eq!(b.phase(), TurnPhase::Finished(MatchOutcome::Loss));
}

#[test]
fn simultaneous_faint_with_reserves_continues() {
    let mut b = battle(&["Kyogre", "Zapdos"], &["Moltres", "Groudon"]);
    let report = b
        .resolve_turn("Surf", "Overheat", &mut FixedRolls::new(&[400, 400]))
        .unwrap();
    assert_eq!(report.outcome, TurnOutcome::BothDepleted);
    assert_eq!(report.match_outcome, MatchOutcome::Continue);
    assert_eq!(b.player().names(), vec!["Zapdos"]);
    assert_eq!(b.ai().names(), vec!["Groudon"]);
}

#[test]
fn single_faints_advance_one_roster() {
    let mut b = battle(&["Kyogre", "Zapdos"], &["Moltres", "Groudon"]);
    let report = b
        .resolve_turn("Surf", "Overheat", &mut FixedRolls::new(&[35, 400]))
        .unwrap();
    assert_eq!(report.outcome, TurnOutcome::PlayerTeamDepleted);
    assert_eq!(b.player().names(), vec!["Zapdos"]);
    assert_eq!(b.ai().len(), 2);

    let report = b
        .resolve_turn("Thunder", "Flamethrower", &mut FixedRolls::new(&[400, 35]))
        .unwrap();
    assert_eq!(report.outcome, TurnOutcome::AiTeamDepleted);
    assert_eq!(b.ai().names(), vec!["Groudon"]);
}

#[test]
fn last_ai_combatant_falling_is_a_win() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let report = b
        .resolve_turn("Surf", "Overheat", &mut FixedRolls::new(&[400, 35]))
        .unwrap();
    assert_eq!(report.match_outcome, MatchOutcome::Win);
    assert_eq!(
        b.resolve_turn("Surf", "Overheat", &mut FixedRolls::new(&[35])),
        Err(BattleError::MatchOver)
    );
}

#[test]
fn fixed_rolls_make_matches_repeatable() {
    let run = || {
        let mut b = battle(&["Mewtwo", "Kyogre", "Zapdos"], &["Giratina", "Groudon", "Torterra"]);
        let mut rolls = FixedRolls::new(&[100]);
        let mut outcomes = Vec::new();
        while !b.outcome().is_final() {
            let player_move = b.legal_moves()[0].clone();
            let ai_move = b.ai().active().unwrap().moves()[0].clone();
            outcomes.push(b.resolve_turn(&player_move, &ai_move, &mut rolls).unwrap());
        }
        (outcomes, b.player().clone(), b.ai().clone(), b.outcome())
    };
    assert_eq!(run(), run());
}

#[test]
fn health_stays_in_bounds() {
    let mut rng = SmallRng::seed_from_u64(5);
    for level in [1u32, 3, 42, 100, 250] {
        let mut c = Combatant::new("Probe", ElementType::Steel, level, vec!["Iron Tail".into()])
            .unwrap();
        let max = c.max_health();
        assert_eq!(max, level * 33 / 10);
        for _ in 0..50 {
            let amount = rng.gen_range(0..200);
            let multiplier = if rng.gen_bool(0.5) { 1.5 } else { 1.0 };
            c.apply_damage(amount, multiplier);
            assert!(c.current_health() <= max);
            assert_eq!(c.max_health(), max);
        }
        assert!(c.is_fainted());
    }
}

#[test]
fn play_turn_reprompts_until_move_is_legal() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::from(["Thunderbolt", "", "muddy water"]));
    let mut ai = RandomMovePolicy::new(1);
    let mut rolls = FixedRolls::new(&[35, 35]);
    let mut display = Recorder::default();
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    let report = b.play_turn(&mut ctx).unwrap();
    assert_eq!(report.player_move, "Muddy Water");
    assert!(mon("Moltres").moves().contains(&report.ai_move));
    assert_eq!(display.frames, 1);
    assert_eq!(display.reports.len(), 1);
    assert!(display.lines.is_empty());
}

struct Always(&'static str);

impl MovePolicy for Always {
    fn choose_move(&mut self, _attacker: &Combatant, _defender: &Combatant) -> String {
        self.0.to_string()
    }
}

#[test]
fn unknown_ai_move_is_replaced_by_a_legal_one() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::from(["Surf"]));
    let mut ai = Always("Splash");
    let mut rolls = FixedRolls::new(&[35, 35]);
    let mut display = Recorder::default();
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    let report = b.play_turn(&mut ctx).unwrap();
    assert!(mon("Moltres").moves().contains(&report.ai_move));
    assert_eq!(report.ai_damage, 35);
    assert_eq!(b.turn(), 1);
}

#[test]
fn ai_move_text_is_normalized_before_resolving() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::from(["Surf"]));
    let mut ai = Always("  'heat wave'! ");
    let mut rolls = FixedRolls::new(&[35, 35]);
    let mut display = Recorder::default();
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    let report = b.play_turn(&mut ctx).unwrap();
    assert_eq!(report.ai_move, "Heat Wave");
}

#[test]
fn match_with_a_broken_ai_policy_still_finishes() {
    let mut b = battle(&["Kyogre", "Lucario"], &["Moltres", "Zapdos"]).with_seed(9);
    let mut input = RandomMovePolicy::new(3);
    let mut ai = Always("Splash");
    let mut rolls = FixedRolls::new(&[105, 70, 210]);
    let mut display = Recorder::default();
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    let outcome = b.run(&mut ctx).unwrap();
    assert!(matches!(outcome, MatchOutcome::Win | MatchOutcome::Loss));
    assert!(display.reports.iter().all(|r| r.ai_move != "Splash"));
}

#[test]
fn closed_input_stops_the_match() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::new());
    let mut ai = RandomMovePolicy::new(1);
    let mut rolls = FixedRolls::new(&[35]);
    let mut display = Recorder::default();
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: None,
    };
    assert_eq!(b.run(&mut ctx), Err(BattleError::InputClosed));
    assert_eq!(b.turn(), 0);
}

#[test]
fn commentary_goes_to_display_and_failures_are_skipped() {
    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::from(["Surf"]));
    let mut ai = RandomMovePolicy::new(2);
    let mut rolls = FixedRolls::new(&[35]);
    let mut display = Recorder::default();
    let mut chatter = Canned(Ok("What a hit!"));
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: Some(&mut chatter),
    };
    b.play_turn(&mut ctx).unwrap();
    assert_eq!(display.lines, vec!["What a hit!"; 3]);

    let mut b = battle(&["Kyogre"], &["Moltres"]);
    let mut input = ScriptedInput(VecDeque::from(["Surf"]));
    let mut display = Recorder::default();
    let mut broken = Canned(Err("timeout"));
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: Some(&mut broken),
    };
    assert!(b.play_turn(&mut ctx).is_ok());
    assert!(display.lines.is_empty());
}

#[test]
fn flavor_policy_validates_generated_moves() {
    let attacker = mon("Moltres");
    let defender = mon("Kyogre");

    let mut exact = FlavorMovePolicy::new(Canned(Ok("  'overheat'. ")), 3);
    assert_eq!(exact.choose_move(&attacker, &defender), "Overheat");

    let mut rambling = FlavorMovePolicy::new(Canned(Ok("I will use Hydro Pump!")), 3);
    for _ in 0..20 {
        let picked = rambling.choose_move(&attacker, &defender);
        assert!(attacker.moves().contains(&picked));
    }

    let mut offline = FlavorMovePolicy::new(Canned(Err("connection refused")), 3);
    let picked = offline.choose_move(&attacker, &defender);
    assert!(attacker.moves().contains(&picked));
}

#[test]
fn auto_play_always_finishes() {
    let pool = default_pool();
    let chart = TypeChart::default();
    for seed in 0..20 {
        let outcome = simulate_match(&pool[0..3], &pool[7..10], &chart, seed, Some(500));
        assert!(outcome.is_final());
    }
}

#[test]
fn empty_rosters_from_iterators() {
    let roster: Roster = Vec::<Combatant>::new().into_iter().collect();
    assert!(roster.is_empty());
    assert!(roster.active().is_none());
}
