//! Tournament mode: many seeded games in parallel
//!
//! Game states are built up front (card loading is async), then the games run
//! on the rayon thread pool. Every game gets its own seed derived from the
//! tournament seed, so a tournament is reproducible game by game.

use crate::game::{
    Engine, EngineConfig, FixedScriptController, GameEndReason, GameLogger, GameRunner, GameState, OutputMode,
    PlayerController, RandomController, VerbosityLevel, ZeroController,
};
use crate::loader::{CardDatabase, DeckList, DeckLoader, GameInitializer};
use crate::{PocketError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Controller type for automated players
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ControllerType {
    /// Always chooses the first meaningful input
    Zero,
    /// Seeded random choices
    Random,
    /// Predetermined choice indices (requires a script)
    Fixed,
}

impl ControllerType {
    /// Build a controller for `player`
    pub fn build(self, player: usize, seed: u64, script: &[usize]) -> Box<dyn PlayerController + Send> {
        match self {
            ControllerType::Zero => Box::new(ZeroController::new(player)),
            ControllerType::Random => Box::new(RandomController::with_seed(player, seed)),
            ControllerType::Fixed => Box::new(FixedScriptController::new(player, script.to_vec())),
        }
    }
}

/// Tournament settings
#[derive(Debug, Clone)]
pub struct TournamentConfig {
    pub deck_paths: Vec<PathBuf>,
    pub games: usize,
    pub p0: ControllerType,
    pub p1: ControllerType,
    pub seed: u64,
    pub cardsfolder: PathBuf,
    pub engine: EngineConfig,
    /// Print this many trailing log lines of every game that fails
    pub failure_log_tail: Option<usize>,
}

/// Outcome of one tournament game
#[derive(Debug, Clone)]
struct GameSummary {
    decks: (String, String),
    winner: Option<usize>,
    reason: Option<GameEndReason>,
    turns: u32,
}

/// Aggregated tournament results
#[derive(Debug, Default, Clone)]
pub struct TournamentReport {
    pub games: usize,
    pub p0_wins: usize,
    pub p1_wins: usize,
    /// Turn limit or step limit reached
    pub draws: usize,
    /// Games aborted by an engine error
    pub failures: usize,
    pub deck_wins: BTreeMap<String, usize>,
    pub deck_games: BTreeMap<String, usize>,
    pub reasons: BTreeMap<String, usize>,
    pub total_turns: u64,
    pub duration: Duration,
}

impl TournamentReport {
    fn record(&mut self, summary: Result<GameSummary>) {
        self.games += 1;
        let summary = match summary {
            Ok(s) => s,
            Err(_) => {
                self.failures += 1;
                return;
            }
        };

        let (deck0, deck1) = &summary.decks;
        *self.deck_games.entry(deck0.clone()).or_default() += 1;
        *self.deck_games.entry(deck1.clone()).or_default() += 1;
        self.total_turns += summary.turns as u64;
        let reason = summary.reason.map_or("STEP_LIMIT".to_string(), |r| format!("{r:?}"));
        *self.reasons.entry(reason).or_default() += 1;

        match summary.winner {
            Some(0) => {
                self.p0_wins += 1;
                *self.deck_wins.entry(deck0.clone()).or_default() += 1;
            }
            Some(_) => {
                self.p1_wins += 1;
                *self.deck_wins.entry(deck1.clone()).or_default() += 1;
            }
            None => self.draws += 1,
        }
    }

    pub fn average_turns(&self) -> f64 {
        let played = self.games - self.failures;
        if played == 0 {
            0.0
        } else {
            self.total_turns as f64 / played as f64
        }
    }
}

impl fmt::Display for TournamentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Tournament Results ===")?;
        writeln!(f, "Games:      {} in {:.2}s", self.games, self.duration.as_secs_f64())?;
        writeln!(f, "P0 wins:    {}", self.p0_wins)?;
        writeln!(f, "P1 wins:    {}", self.p1_wins)?;
        writeln!(f, "Draws:      {}", self.draws)?;
        if self.failures > 0 {
            writeln!(f, "Failures:   {}", self.failures)?;
        }
        writeln!(f, "Avg turns:  {:.1}", self.average_turns())?;
        writeln!(f, "\nEnd reasons:")?;
        for (reason, count) in &self.reasons {
            writeln!(f, "  {reason:<12} {count}")?;
        }
        writeln!(f, "\nDeck win rates:")?;
        for (deck, games) in &self.deck_games {
            let wins = self.deck_wins.get(deck).copied().unwrap_or(0);
            writeln!(f, "  {deck:<24} {wins}/{games} ({:.1}%)", 100.0 * wins as f64 / *games as f64)?;
        }
        Ok(())
    }
}

/// Load decks and cards, then play `config.games` games in parallel
pub async fn run_tourney(config: &TournamentConfig) -> Result<TournamentReport> {
    if config.deck_paths.is_empty() {
        return Err(PocketError::InvalidAction("Tournament requires at least one deck".to_string()));
    }

    let mut decks: Vec<(String, DeckList)> = Vec::new();
    for path in &config.deck_paths {
        let deck = DeckLoader::load_from_file(path)?;
        let label = if deck.name.is_empty() {
            path.file_stem().map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
        } else {
            deck.name.clone()
        };
        decks.push((label, deck));
    }

    let card_db = CardDatabase::new(config.cardsfolder.clone());
    for (_, deck) in &decks {
        card_db.prefetch_deck(deck).await?;
    }
    let initializer = GameInitializer::new(&card_db)?.with_config(config.engine);

    let mut setups = Vec::with_capacity(config.games);
    for game_index in 0..config.games {
        let game_seed = config.seed.wrapping_add(game_index as u64);
        let mut pick = ChaCha12Rng::seed_from_u64(game_seed);
        let (label0, deck0) = &decks[pick.gen_range(0..decks.len())];
        let (label1, deck1) = &decks[pick.gen_range(0..decks.len())];

        let mut state = initializer.init_game("P0", deck0, "P1", deck1, game_seed).await?;
        quiet_logger(&mut state.logger, config.failure_log_tail);
        setups.push(((label0.clone(), label1.clone()), game_seed, state));
    }

    let start = Instant::now();
    let summaries: Vec<(Result<GameSummary>, Option<GameLogger>)> = setups
        .into_par_iter()
        .map(|(decks, seed, state)| play_one(decks, seed, state, config.p0, config.p1))
        .collect();

    let mut report = TournamentReport::default();
    for (summary, failed_log) in summaries {
        if let (Err(err), Some(mut logger), Some(tail)) = (&summary, failed_log, config.failure_log_tail) {
            println!("--- game {} failed: {err} ---", report.games);
            logger.flush_tail(tail);
        }
        report.record(summary);
    }
    report.duration = start.elapsed();
    Ok(report)
}

/// Silence live output; with a failure tail, keep every line in memory instead
fn quiet_logger(logger: &mut GameLogger, failure_log_tail: Option<usize>) {
    match failure_log_tail {
        Some(_) => {
            logger.set_verbosity(VerbosityLevel::Verbose);
            logger.set_output_mode(OutputMode::Memory);
        }
        None => logger.set_verbosity(VerbosityLevel::Silent),
    }
}

/// Play one game; a game stopped by an engine error hands back its logger
fn play_one(
    decks: (String, String),
    seed: u64,
    state: GameState,
    p0: ControllerType,
    p1: ControllerType,
) -> (Result<GameSummary>, Option<GameLogger>) {
    let mut c0 = p0.build(0, seed ^ 0x5eed_0000, &[]);
    let mut c1 = p1.build(1, seed ^ 0x5eed_0001, &[]);
    let engine = match Engine::new(state) {
        Ok(engine) => engine,
        Err(err) => return (Err(err), None),
    };
    let mut runner = match GameRunner::new(engine, c0.as_mut(), c1.as_mut()) {
        Ok(runner) => runner,
        Err(err) => return (Err(err), None),
    };
    match runner.run() {
        Ok(result) => (
            Ok(GameSummary {
                decks,
                winner: result.winner(),
                reason: result.end_reason(),
                turns: result.turns_played(),
            }),
            None,
        ),
        Err(err) => {
            let logger = std::mem::take(&mut runner.into_engine().state_mut().logger);
            (Err(err), Some(logger))
        }
    }
}
