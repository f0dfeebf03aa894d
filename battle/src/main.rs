mod ui;

use anyhow::Context;
use pokemon_draft_battle::battle::{
    Battle, DiceRoll, FlavorGenerator, RandomMovePolicy, TurnContext,
};
use pokemon_draft_battle::draft::run_draft;
use pokemon_draft_battle::{load_config_or_default, load_pool_or_default};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

struct CliOptions {
    pool_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    pause_ms: u64,
    commentary: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args()?;
    run_game(opts)
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut pool_path = None;
    let mut config_path = None;
    let mut seed = None;
    let mut pause_ms = 500u64;
    let mut commentary = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pool" => {
                pool_path = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow::anyhow!("--pool requires a path"))?,
                );
            }
            "--config" => {
                config_path = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?,
                );
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = Some(val.parse()?);
            }
            "--pause-ms" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--pause-ms requires milliseconds"))?;
                pause_ms = val.parse()?;
            }
            "--commentary" => commentary = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                print_usage();
                anyhow::bail!("Unknown argument: {}", other);
            }
        }
    }

    Ok(CliOptions {
        pool_path,
        config_path,
        seed,
        pause_ms,
        commentary,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: cargo run -- [--pool pool.json] [--config config.json] [--seed N] [--pause-ms MS] [--commentary]"
    );
}

fn run_game(opts: CliOptions) -> anyhow::Result<()> {
    let config = load_config_or_default(opts.config_path.as_deref())?;
    let pool = load_pool_or_default(opts.pool_path.as_deref())?;
    let chart = config.chart()?;
    let seed = opts.seed.unwrap_or(config.seed);

    let mut input = ui::TerminalInput;
    let draft = run_draft(&pool, &chart, &mut input, config.roster_size)
        .context("Draft was interrupted")?;
    ui::print_draft(&draft.player.names(), &draft.ai.names());

    let mut seed_rng = SmallRng::seed_from_u64(seed ^ 0x9E37_79B9);
    let mut ai = RandomMovePolicy::new(seed_rng.gen());
    let mut rolls = DiceRoll::new(seed_rng.gen());
    let mut display = ui::TerminalDisplay {
        pause: Duration::from_millis(opts.pause_ms),
    };
    let mut announcer = ui::Announcer::new(seed_rng.gen());
    let mut battle = Battle::new(draft.player, draft.ai, chart)
        .with_max_turns(config.max_turns)
        .with_seed(seed_rng.gen());
    let mut ctx = TurnContext {
        input: &mut input,
        ai: &mut ai,
        rolls: &mut rolls,
        display: &mut display,
        flavor: if opts.commentary {
            Some(&mut announcer as &mut dyn FlavorGenerator)
        } else {
            None
        },
    };
    let outcome = battle.run(&mut ctx).context("Battle was interrupted")?;
    ui::print_result(outcome);
    Ok(())
}
