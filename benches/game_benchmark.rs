//! Performance benchmarks for the Pocket Forge engine
//!
//! Measures whole games between two RandomControllers using Criterion.rs:
//!
//! 1. **Fresh** - build a new game from the deck lists each iteration
//! 2. **Snapshot** - clone a pre-built initial state each iteration
//!
//! plus the legal-move generator on a mid-game state.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pocket_forge_rs::{
    game::{legal_inputs, Engine, GameRunner, GameState, RandomController, VerbosityLevel},
    loader::{CardDatabase, DeckList, DeckLoader, GameInitializer},
    Result,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

/// Metrics collected during game execution
#[derive(Debug, Clone)]
struct GameMetrics {
    turns: u32,
    /// Inputs applied
    actions: usize,
    /// Events recorded
    events: usize,
    duration: Duration,
}

impl GameMetrics {
    fn games_per_sec(&self) -> f64 {
        1.0 / self.duration.as_secs_f64()
    }

    fn actions_per_sec(&self) -> f64 {
        self.actions as f64 / self.duration.as_secs_f64()
    }

    fn actions_per_turn(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.actions as f64 / self.turns as f64
        }
    }
}

/// Decks and card definitions, loaded once and reused across iterations
struct BenchmarkSetup {
    card_db: CardDatabase,
    decks: [DeckList; 2],
    runtime: Runtime,
}

impl BenchmarkSetup {
    fn load() -> Result<Self> {
        let runtime = Runtime::new()?;
        let card_db = CardDatabase::new(PathBuf::from("cardsfolder"));
        let decks = [
            DeckLoader::load_from_file(&PathBuf::from("test_decks/blaze.dck"))?,
            DeckLoader::load_from_file(&PathBuf::from("test_decks/tide.dck"))?,
        ];
        runtime.block_on(async {
            for deck in &decks {
                card_db.prefetch_deck(deck).await?;
            }
            Ok::<_, pocket_forge_rs::PocketError>(())
        })?;

        Ok(BenchmarkSetup {
            card_db,
            decks,
            runtime,
        })
    }

    fn initial_state(&self, seed: u64) -> Result<GameState> {
        let mut state = self.runtime.block_on(async {
            GameInitializer::new(&self.card_db)?
                .init_game("Player 0", &self.decks[0], "Player 1", &self.decks[1], seed)
                .await
        })?;
        state.logger.set_verbosity(VerbosityLevel::Silent);
        Ok(state)
    }
}

fn play(state: GameState, seed: u64) -> Result<GameMetrics> {
    let start = Instant::now();
    let mut c0 = RandomController::with_seed(0, seed);
    let mut c1 = RandomController::with_seed(1, seed + 1);
    let mut runner = GameRunner::new(Engine::new(state)?, &mut c0, &mut c1)?;
    let result = runner.run()?;
    let duration = start.elapsed();

    Ok(GameMetrics {
        turns: result.turns_played(),
        actions: result.inputs.len(),
        events: runner.engine().state().events.len(),
        duration,
    })
}

/// Benchmark: Fresh mode - build a new game each iteration
fn bench_game_fresh(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    println!("\nWarmup game (seed {}):", seed);
    if let Ok(metrics) = setup.initial_state(seed).and_then(|s| play(s, seed)) {
        println!("  Turns: {}", metrics.turns);
        println!("  Actions: {}", metrics.actions);
        println!("  Events: {}", metrics.events);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Games/sec: {:.2}", metrics.games_per_sec());
        println!("  Actions/sec: {:.2}", metrics.actions_per_sec());
        println!("  Actions/turn: {:.2}", metrics.actions_per_turn());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| {
            let state = setup.initial_state(black_box(seed)).expect("game should initialize");
            play(state, seed).expect("game should complete")
        });
    });

    group.finish();
}

/// Benchmark: Snapshot mode - clone a pre-built initial state each iteration
fn bench_game_snapshot(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let seed = 42u64;
    let initial = setup.initial_state(seed).expect("failed to initialize game");

    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| play(black_box(initial.clone()), seed).expect("game should complete"));
    });

    group.finish();
}

/// Benchmark: legal-move generation on a main-phase state
fn bench_legal_inputs(c: &mut Criterion) {
    let setup = match BenchmarkSetup::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping benchmark - failed to load resources: {}", e);
            return;
        }
    };

    let mut engine = Engine::new(setup.initial_state(7).expect("failed to initialize game"))
        .expect("engine should accept the decks");
    let mut step = engine.start().expect("engine should start");
    // Take the first non-concede input until the first main phase
    while engine.state().turn == 0 {
        let pocket_forge_rs::game::EngineStep::AwaitingInput { legal_inputs } = step else {
            break;
        };
        let Some(input) = legal_inputs.into_iter().find(|i| !i.is_concede()) else {
            break;
        };
        step = engine.run_until_next(input).expect("setup input should apply");
    }

    c.bench_function("legal_inputs_main", |b| {
        b.iter(|| legal_inputs(black_box(engine.state())))
    });
}

criterion_group!(benches, bench_game_fresh, bench_game_snapshot, bench_legal_inputs);
criterion_main!(benches);
