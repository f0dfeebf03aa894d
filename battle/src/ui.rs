use pokemon_draft_battle::battle::{
    BattleFrame, DisplaySink, FlavorGenerator, InputSelector, MatchOutcome, TurnOutcome,
    TurnReport,
};
use pokemon_draft_battle::draft::{validate_selection, RosterSelector};
use pokemon_draft_battle::error::BattleError;
use pokemon_draft_battle::model::Combatant;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Reads draft picks and move choices from stdin.
pub struct TerminalInput;

impl RosterSelector for TerminalInput {
    fn choose_roster(&mut self, pool: &[Combatant], count: usize) -> Result<Vec<usize>, BattleError> {
        clear_screen();
        println!("Choose {count} Pokemon (e.g. 1 3 5). Separate numbers with spaces or commas.");
        print_selection_table(pool);
        loop {
            print!("Picks: ");
            let input = read_line()?;
            let replaced = input.replace(',', " ");
            let mut picks = Vec::new();
            let mut invalid = false;
            for token in replaced.split_whitespace() {
                match token.parse::<usize>() {
                    Ok(n) if n >= 1 => picks.push(n - 1),
                    _ => {
                        println!("Use numbers between 1 and {}.", pool.len());
                        invalid = true;
                        break;
                    }
                }
            }
            if invalid {
                continue;
            }
            if let Err(err) = validate_selection(pool.len(), count, &picks) {
                println!("{err}");
                continue;
            }
            return Ok(picks);
        }
    }
}

impl InputSelector for TerminalInput {
    fn choose_move(&mut self, legal_moves: &[String]) -> Result<String, BattleError> {
        loop {
            print!("Move (1-{}): ", legal_moves.len());
            let input = read_line()?;
            let trimmed = input.trim();
            if let Ok(choice) = trimmed.parse::<usize>() {
                if choice >= 1 && choice <= legal_moves.len() {
                    return Ok(legal_moves[choice - 1].clone());
                }
                println!("Out of range.");
                continue;
            }
            if !trimmed.is_empty() {
                // Names are accepted too; the resolver re-prompts if they do not match.
                return Ok(trimmed.to_string());
            }
        }
    }
}

/// Text rendition of the battle scene.
pub struct TerminalDisplay {
    pub pause: Duration,
}

impl DisplaySink for TerminalDisplay {
    fn render(&mut self, frame: &BattleFrame<'_>) {
        clear_screen();
        println!("=== Turn {} ===", frame.turn);
        println!(
            "Opponent: {}  [{} left]",
            frame.ai_active, frame.ai_remaining
        );
        println!(
            "  {} {}/{}",
            hp_bar(frame.ai_health.0, frame.ai_health.1),
            frame.ai_health.0,
            frame.ai_health.1
        );
        println!(
            "You:      {}  [{} left]",
            frame.player_active, frame.player_remaining
        );
        println!(
            "  {} {}/{}",
            hp_bar(frame.player_health.0, frame.player_health.1),
            frame.player_health.0,
            frame.player_health.1
        );
        println!();
        println!("MOVES");
        for (i, mv) in frame.legal_moves.iter().enumerate() {
            println!(" {}. {}", i + 1, mv);
        }
    }

    fn commentary(&mut self, line: &str) {
        println!("  > {line}");
    }

    fn report(&mut self, report: &TurnReport) {
        println!();
        println!(
            "The AI's {} uses '{}' and deals {} damage.",
            report.ai_combatant, report.ai_move, report.ai_damage
        );
        if report.ai_super_effective {
            println!("It's super effective!");
        }
        println!(
            "Your {} uses '{}' and deals {} damage.",
            report.player_combatant, report.player_move, report.player_damage
        );
        if report.player_super_effective {
            println!("It's super effective!");
        }
        match report.outcome {
            TurnOutcome::BothDepleted => println!("Both Pokemon fainted!"),
            TurnOutcome::PlayerTeamDepleted => println!("Your Pokemon fainted!"),
            TurnOutcome::AiTeamDepleted => println!("The AI's Pokemon fainted!"),
            TurnOutcome::Continuing => println!("The battle continues!"),
        }
        thread::sleep(self.pause);
    }
}

const CHEERS: &[&str] = &[
    "What a move!",
    "The crowd goes wild!",
    "That one had some weight behind it.",
    "Red doesn't look worried.",
    "Keep your eyes on the HP bars!",
];

/// Offline commentary: repeats the event and adds a canned cheer.
pub struct Announcer {
    rng: SmallRng,
}

impl Announcer {
    pub fn new(seed: u64) -> Self {
        Announcer {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl FlavorGenerator for Announcer {
    fn generate(&mut self, prompt: &str) -> anyhow::Result<String> {
        let cheer = CHEERS
            .choose(&mut self.rng)
            .ok_or_else(|| anyhow::anyhow!("no cheers configured"))?;
        Ok(format!("{} {cheer}", prompt.trim()))
    }
}

pub fn print_draft(player: &[&str], ai: &[&str]) {
    println!();
    println!("Your team: {}", player.join(", "));
    println!("Red's team: {}", ai.join(", "));
}

pub fn print_result(outcome: MatchOutcome) {
    let text = match outcome {
        MatchOutcome::Win => "You win!",
        MatchOutcome::Loss => "You lose...",
        MatchOutcome::Draw => "Draw",
        MatchOutcome::Continue => "Unfinished",
    };
    println!();
    println!("=== Result: {text} ===");
}

fn print_selection_table(pool: &[Combatant]) {
    let width = 46;
    println!("{}", "-".repeat(width));
    for (idx, mon) in pool.iter().enumerate() {
        println!(
            "{:>2}: {:<12} {:<10} Lv.{:<4} HP:{}",
            idx + 1,
            mon.name(),
            mon.element(),
            mon.level(),
            mon.max_health()
        );
    }
    println!("{}", "-".repeat(width));
}

fn hp_bar(hp: u32, max_hp: u32) -> String {
    let width = 20usize;
    let max = max_hp.max(1) as f32;
    let filled = ((hp as f32 / max) * width as f32).round() as usize;
    let filled = filled.min(width);
    let mut bar = String::new();
    bar.push('[');
    for _ in 0..filled {
        bar.push('=');
    }
    for _ in filled..width {
        bar.push('.');
    }
    bar.push(']');
    bar
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = io::stdout().flush();
}

fn read_line() -> Result<String, BattleError> {
    let mut buf = String::new();
    io::stdout().flush().map_err(|_| BattleError::InputClosed)?;
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => Err(BattleError::InputClosed),
        Ok(_) => Ok(buf),
    }
}
