//! Rules engine: game state, actions, legal moves and the engine driver

/// Describe an event through the game logger
///
/// When the verbose-logging feature is disabled this compiles to nothing, so
/// no formatting work happens on the hot path.
macro_rules! log_if_verbose {
    ($logger:expr, $level:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.log_fmt($level, "game_event", format_args!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = (&$logger, $level);
        }
    };
}

pub mod actions;
pub mod combat;
pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod fixed_script_controller;
pub mod game_loop;
pub mod input;
pub mod legal_moves;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod replay;
pub mod state;
pub mod state_based;
pub mod state_hash;
pub mod zero_controller;

pub use combat::DamageOptions;
pub use config::EngineConfig;
pub use controller::{GameStateView, PlayerController};
pub use engine::{Engine, EngineStep};
pub use events::{
    EventBus, EventSubscriber, GameEndReason, GameEvent, GameEventData, InputRequestKind, RemovalReason,
};
pub use fixed_script_controller::FixedScriptController;
pub use game_loop::{GameResult, GameRunner};
pub use input::{InputAction, PlayerInput};
pub use legal_moves::legal_inputs;
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::Phase;
pub use random_controller::RandomController;
pub use replay::ReplayRecord;
pub use state::{GameOutcome, GameState};
pub use state_based::check_state_based_actions;
pub use state_hash::compute_state_hash;
pub use zero_controller::ZeroController;
