//! Pocket Forge - Main Binary
//!
//! Runs games between automated controllers, replays recorded games and
//! plays tournaments.

use clap::{Parser, Subcommand};
use pocket_forge_rs::{
    game::{compute_state_hash, Engine, EngineConfig, GameRunner, OutputFormat, ReplayRecord, VerbosityLevel},
    game::state_hash::format_hash,
    loader::{CardDatabase, DeckLoader, GameInitializer},
    tournament::{run_tourney, ControllerType, TournamentConfig},
    PocketError, Result,
};
use std::path::{Path, PathBuf};

/// Verbosity level for game output (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "pocket")]
#[command(about = "Pocket Forge - two-player trading card game engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game between two controllers
    Play {
        /// Deck file (.dck) for player 0
        #[arg(value_name = "PLAYER0_DECK")]
        deck0: PathBuf,

        /// Deck file (.dck) for player 1
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        /// Player 0 controller type
        #[arg(long, value_enum, default_value = "random")]
        p0: ControllerType,

        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        /// Fixed script for player 0 (space or comma separated indices, e.g. "0 2 1")
        #[arg(long, value_name = "CHOICES")]
        p0_fixed_inputs: Option<String>,

        /// Fixed script for player 1
        #[arg(long, value_name = "CHOICES")]
        p1_fixed_inputs: Option<String>,

        /// Random seed (default: derived from the clock)
        #[arg(long)]
        seed: Option<u64>,

        /// Card definitions directory
        #[arg(long, default_value = "cardsfolder")]
        cardsfolder: PathBuf,

        /// Turn limit; the game ends without a winner past it
        #[arg(long)]
        max_turns: Option<u32>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Log line format
        #[arg(long, value_enum, default_value = "text")]
        log_format: OutputFormat,

        /// Write a replay record (JSON) of the finished game
        #[arg(long, value_name = "FILE")]
        replay_out: Option<PathBuf>,
    },

    /// Re-run a recorded game and check that it reproduces
    Replay {
        /// Replay record written by `play --replay-out`
        #[arg(value_name = "REPLAY_FILE")]
        file: PathBuf,

        /// Card definitions directory
        #[arg(long, default_value = "cardsfolder")]
        cardsfolder: PathBuf,

        #[arg(long, default_value = "minimal", short = 'v')]
        verbosity: VerbosityArg,

        #[arg(long, value_enum, default_value = "text")]
        log_format: OutputFormat,
    },

    /// Run many games in parallel and report win rates
    Tourney {
        /// Deck files to sample from
        #[arg(value_name = "DECKS", required = true)]
        decks: Vec<PathBuf>,

        /// Number of games
        #[arg(long, default_value = "100")]
        games: usize,

        #[arg(long, value_enum, default_value = "random")]
        p0: ControllerType,

        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        #[arg(long, default_value = "0")]
        seed: u64,

        #[arg(long, default_value = "cardsfolder")]
        cardsfolder: PathBuf,

        #[arg(long)]
        max_turns: Option<u32>,

        /// Print the last N log lines of any game that fails
        #[arg(long, value_name = "N")]
        failure_log_tail: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            deck0,
            deck1,
            p0,
            p1,
            p0_fixed_inputs,
            p1_fixed_inputs,
            seed,
            cardsfolder,
            max_turns,
            verbosity,
            log_format,
            replay_out,
        } => {
            let scripts = [
                parse_fixed_inputs(p0, p0_fixed_inputs.as_deref())?,
                parse_fixed_inputs(p1, p1_fixed_inputs.as_deref())?,
            ];
            let seed = seed.unwrap_or_else(clock_seed);
            run_play(PlayArgs {
                decks: [deck0, deck1],
                controllers: [p0, p1],
                scripts,
                seed,
                cardsfolder,
                max_turns,
                verbosity: verbosity.into(),
                log_format,
                replay_out,
            })
            .await?
        }
        Commands::Replay {
            file,
            cardsfolder,
            verbosity,
            log_format,
        } => run_replay(&file, cardsfolder, verbosity.into(), log_format).await?,
        Commands::Tourney {
            decks,
            games,
            p0,
            p1,
            seed,
            cardsfolder,
            max_turns,
            failure_log_tail,
        } => {
            let config = TournamentConfig {
                deck_paths: decks,
                games,
                p0,
                p1,
                seed,
                cardsfolder,
                engine: engine_config(max_turns),
                failure_log_tail,
            };
            println!("Running {games} games...");
            let report = run_tourney(&config).await?;
            print!("{report}");
        }
    }

    Ok(())
}

struct PlayArgs {
    decks: [PathBuf; 2],
    controllers: [ControllerType; 2],
    scripts: [Vec<usize>; 2],
    seed: u64,
    cardsfolder: PathBuf,
    max_turns: Option<u32>,
    verbosity: VerbosityLevel,
    log_format: OutputFormat,
    replay_out: Option<PathBuf>,
}

async fn run_play(args: PlayArgs) -> Result<()> {
    let [deck0_path, deck1_path] = &args.decks;
    let deck0 = DeckLoader::load_from_file(deck0_path)?;
    let deck1 = DeckLoader::load_from_file(deck1_path)?;

    let card_db = CardDatabase::new(args.cardsfolder.clone());
    let (count, duration) = card_db.prefetch_deck(&deck0).await?;
    let (count1, duration1) = card_db.prefetch_deck(&deck1).await?;
    if args.verbosity >= VerbosityLevel::Verbose {
        println!(
            "Loaded {} card definitions in {:.2}ms",
            count + count1,
            (duration + duration1).as_secs_f64() * 1000.0
        );
    }

    let mut state = GameInitializer::new(&card_db)?
        .with_config(engine_config(args.max_turns))
        .init_game("Player 0", &deck0, "Player 1", &deck1, args.seed)
        .await?;
    state.logger.set_verbosity(args.verbosity);
    state.logger.set_output_format(args.log_format);

    println!("Seed: {}", args.seed);
    let mut c0 = args.controllers[0].build(0, args.seed.wrapping_add(1), &args.scripts[0]);
    let mut c1 = args.controllers[1].build(1, args.seed.wrapping_add(2), &args.scripts[1]);

    let engine = Engine::new(state)?;
    let mut runner = GameRunner::new(engine, c0.as_mut(), c1.as_mut())?;
    let result = runner.run()?;
    let engine = runner.into_engine();

    match result.outcome {
        Some(outcome) => {
            let winner = outcome
                .winner
                .map_or_else(|| "nobody".to_string(), |p| format!("Player {p}"));
            println!(
                "Game over on turn {}: {winner} wins ({:?})",
                outcome.turns, outcome.reason
            );
            for (index, player) in engine.state().players.iter().enumerate() {
                println!("  Player {index}: {} points", player.points);
            }
        }
        None => println!("Game stopped after {} decisions without a result", result.steps),
    }
    println!("Final state hash: {}", format_hash(compute_state_hash(engine.state())?));

    if let Some(path) = args.replay_out {
        let decks = [deck0_path.display().to_string(), deck1_path.display().to_string()];
        ReplayRecord::from_run(args.seed, decks, &result, &engine)?.save(&path)?;
        println!("Replay written to {}", path.display());
    }
    Ok(())
}

async fn run_replay(
    file: &Path,
    cardsfolder: PathBuf,
    verbosity: VerbosityLevel,
    log_format: OutputFormat,
) -> Result<()> {
    let record = ReplayRecord::load(file)?;
    let deck0 = DeckLoader::load_from_file(Path::new(&record.decks[0]))?;
    let deck1 = DeckLoader::load_from_file(Path::new(&record.decks[1]))?;

    let card_db = CardDatabase::new(cardsfolder);
    card_db.prefetch_deck(&deck0).await?;
    card_db.prefetch_deck(&deck1).await?;

    let mut state = GameInitializer::new(&card_db)?
        .init_game("Player 0", &deck0, "Player 1", &deck1, record.seed)
        .await?;
    state.logger.set_verbosity(verbosity);
    state.logger.set_output_format(log_format);

    let mut engine = Engine::new(state)?;
    let step = record.replay(&mut engine)?;
    println!(
        "Replayed {} inputs ({} events), finished: {}",
        record.inputs.len(),
        engine.state().events.len(),
        step.is_finished()
    );
    println!("Final state hash: {}", format_hash(compute_state_hash(engine.state())?));
    Ok(())
}

fn engine_config(max_turns: Option<u32>) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(max_turns) = max_turns {
        config.max_turns = max_turns;
    }
    config
}

/// Parse a fixed-input script like "0 2 1" or "0,2,1"
fn parse_fixed_inputs(controller: ControllerType, script: Option<&str>) -> Result<Vec<usize>> {
    let Some(script) = script else {
        if controller == ControllerType::Fixed {
            return Err(PocketError::InvalidAction(
                "fixed controller requires --p0-fixed-inputs / --p1-fixed-inputs".to_string(),
            ));
        }
        return Ok(Vec::new());
    };

    script
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| PocketError::InvalidAction(format!("invalid choice index '{s}' in fixed inputs")))
        })
        .collect()
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
