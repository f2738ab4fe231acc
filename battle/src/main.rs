mod ui;

use anyhow::Context;
use pokemon_battle_arena::arena::Arena;
use pokemon_battle_arena::battle::Side;
use pokemon_battle_arena::config::{ArenaConfig, Pacing};
use pokemon_battle_arena::feedback::CuePlayer;
use pokemon_battle_arena::{load_config_or_default, load_roster, logging, BattleError};
use std::env;
use std::path::PathBuf;
use ui::{BattleCommand, CueSink, SetupCommand};

struct CliOptions {
    roster_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: u64,
    player: Option<String>,
    opponent: Option<String>,
    no_sound: bool,
    fast: bool,
    verbose: bool,
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let opts = parse_args()?;
    logging::init(logging::level_from_flags(opts.verbose, opts.debug))?;
    let mut config = load_config_or_default(opts.config_path.as_deref())?;
    if opts.no_sound {
        config.sound = false;
    }
    if opts.fast {
        config.pacing = Pacing::none();
    }
    let roster = load_roster(opts.roster_path.as_deref(), &config).context("failed to load roster")?;
    let mut arena = Arena::new(roster, config.rules.clone(), opts.seed)?;
    if let Some(name) = &opts.player {
        arena.select_player_by_name(name)?;
    }
    if let Some(name) = &opts.opponent {
        arena.select_opponent_by_name(name)?;
    }
    run_game(&mut arena, &config)
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut opts = CliOptions {
        roster_path: None,
        config_path: None,
        seed: 0,
        player: None,
        opponent: None,
        no_sound: false,
        fast: false,
        verbose: false,
        debug: false,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--roster" => {
                opts.roster_path = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow::anyhow!("--roster requires a path"))?,
                );
            }
            "--config" => {
                opts.config_path = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?,
                );
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                opts.seed = val.parse()?;
            }
            "--player" => {
                opts.player = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--player requires a name"))?,
                );
            }
            "--opponent" => {
                opts.opponent = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--opponent requires a name"))?,
                );
            }
            "--no-sound" => opts.no_sound = true,
            "--fast" => opts.fast = true,
            "--verbose" | "-v" => opts.verbose = true,
            "--debug" => opts.debug = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                print_usage();
                anyhow::bail!("Unknown argument {other}");
            }
        }
    }
    Ok(opts)
}

fn print_usage() {
    eprintln!(
        "Usage: cargo run -p pokemon-battle-arena-cli -- [--roster roster.json] [--config arena.json] [--seed N] \
[--player NAME] [--opponent NAME] [--no-sound] [--fast] [--verbose] [--debug]"
    );
}

fn run_game(arena: &mut Arena, config: &ArenaConfig) -> anyhow::Result<()> {
    let mut message = arena.selection_message().to_string();
    loop {
        ui::render_selection(
            arena.roster(),
            arena.player_choice(),
            arena.opponent_choice(),
            &message,
        );
        let outcome = match ui::prompt_setup(arena.roster().len())? {
            SetupCommand::Player(idx) => arena.select_player(idx),
            SetupCommand::Opponent(idx) => arena.select_opponent(idx),
            SetupCommand::RandomOpponent => arena.random_opponent().map(|_| ()),
            SetupCommand::Reset => {
                arena.reset_to_selection();
                message = arena.session().message().to_string();
                Ok(())
            }
            SetupCommand::Start => {
                run_battle(arena, config)?;
                message = arena.session().message().to_string();
                Ok(())
            }
            SetupCommand::Quit => return Ok(()),
        };
        if let Err(err) = outcome {
            message = err.to_string();
        }
    }
}

fn run_battle(arena: &mut Arena, config: &ArenaConfig) -> anyhow::Result<()> {
    let cues = CuePlayer::new(config.sound);
    let pacing = &config.pacing;
    arena.start_battle();

    while arena.session().is_active() {
        ui::render_battle(arena.session());
        let command = ui::prompt_battle(arena.session())?;
        let session = arena.session_mut();
        let result = match command {
            BattleCommand::Move(idx) => play_paced_turn(session, idx, &cues, pacing),
            BattleCommand::Potion => session.heal(Side::Player).map(|_| ()),
            BattleCommand::Surrender => session.surrender(),
            BattleCommand::FullHeal => session.full_reset(),
            BattleCommand::Exit => {
                session.exit();
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("{err}");
        }
        session.drain_feedback(&mut CueSink { cues: &cues });
    }

    ui::render_battle(arena.session());
    ui::print_result(arena.session());
    ui::wait_for_enter()?;
    Ok(())
}

/// Resolves the turn one attack at a time, pausing between attacks.
fn play_paced_turn(
    session: &mut pokemon_battle_arena::session::BattleSession,
    move_index: usize,
    cues: &CuePlayer,
    pacing: &Pacing,
) -> Result<(), BattleError> {
    session.submit_move(move_index)?;
    let mut first = true;
    loop {
        if !first {
            ui::pause(pacing.counter());
        }
        first = false;
        ui::pause(pacing.attack());
        let step = session.advance()?;
        ui::print_step(&step);
        session.drain_feedback(&mut CueSink { cues });
        if step.turn_over {
            break;
        }
    }
    ui::pause(pacing.settle());
    Ok(())
}
