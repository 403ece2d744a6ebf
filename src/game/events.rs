//! Game events and the event bus
//!
//! Every state change is described by one immutable `GameEvent`. The bus keeps
//! the full ordered history and forwards each event to its subscribers.

use crate::core::{CardId, CardName, EffectId, EnergyType};
use crate::effects::EffectTarget;
use crate::game::{Phase, VerbosityLevel};
use crate::zones::ZoneName;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEndReason {
    Points,
    NoPokemon,
    DeckOut,
    Concede,
    TurnLimit,
}

/// Why an effect left the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Expired,
    SourceLeft,
    TargetLeft,
    Explicit,
}

/// Decision the engine is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputRequestKind {
    PlaceActive,
    PlaceBench,
    MainAction,
    SelectNewActive,
}

/// Event payload, one variant per kind of state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEventData {
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    CoinFlip {
        heads: bool,
    },
    TurnOrderDecided {
        first_player: usize,
    },
    DeckShuffled {
        player: usize,
    },
    CardMoved {
        player: usize,
        card: CardId,
        card_name: CardName,
        from: ZoneName,
        to: ZoneName,
    },
    CardSelected {
        player: usize,
        hand_index: usize,
        card: CardId,
    },
    EnergyAttached {
        player: usize,
        zone: ZoneName,
        energy: EnergyType,
    },
    EnergyZoneChanged {
        player: usize,
        current: Option<EnergyType>,
        next: Option<EnergyType>,
    },
    EnergyDiscarded {
        player: usize,
        zone: ZoneName,
        energy: EnergyType,
        amount: u32,
    },
    AttackDeclared {
        player: usize,
        attacker: CardId,
        attack_name: String,
    },
    DamageApplied {
        player: usize,
        zone: ZoneName,
        card: CardId,
        amount: i32,
        total: u32,
    },
    KnockedOut {
        player: usize,
        zone: ZoneName,
        card: CardId,
        card_name: CardName,
    },
    Evolved {
        player: usize,
        zone: ZoneName,
        from: CardName,
        to: CardName,
    },
    Retreated {
        player: usize,
        from_bench: usize,
        retreated: CardId,
        promoted: CardId,
    },
    TrainerPlayed {
        player: usize,
        card: CardId,
        card_name: CardName,
    },
    ToolAttached {
        player: usize,
        zone: ZoneName,
        card: CardId,
    },
    EffectAdded {
        effect_id: EffectId,
        effect_type: String,
        target: Option<EffectTarget>,
    },
    EffectRemoved {
        effect_id: EffectId,
        effect_type: String,
        reason: RemovalReason,
    },
    EffectPrevented {
        effect_type: String,
        target: Option<EffectTarget>,
    },
    AbilityUsed {
        player: usize,
        card: CardId,
        ability_name: String,
    },
    PointsAwarded {
        player: usize,
        points: u32,
        total: u32,
    },
    TurnStarted {
        player: usize,
        turn: u32,
    },
    TurnEnded {
        player: usize,
        turn: u32,
    },
    InputRequested {
        players: SmallVec<[usize; 2]>,
        request: InputRequestKind,
    },
    GameEnded {
        winner: Option<usize>,
        reason: GameEndReason,
    },
}

impl GameEventData {
    /// Logger level used when this event is described
    pub fn verbosity(&self) -> VerbosityLevel {
        match self {
            GameEventData::GameEnded { .. } => VerbosityLevel::Minimal,
            GameEventData::TurnStarted { .. }
            | GameEventData::AttackDeclared { .. }
            | GameEventData::KnockedOut { .. }
            | GameEventData::PointsAwarded { .. }
            | GameEventData::TurnOrderDecided { .. }
            | GameEventData::Evolved { .. }
            | GameEventData::Retreated { .. }
            | GameEventData::TrainerPlayed { .. }
            | GameEventData::AbilityUsed { .. }
            | GameEventData::DamageApplied { .. } => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }

    /// Short tag matching the serialized `type`
    pub fn kind(&self) -> &'static str {
        match self {
            GameEventData::PhaseChanged { .. } => "PHASE_CHANGED",
            GameEventData::CoinFlip { .. } => "COIN_FLIP",
            GameEventData::TurnOrderDecided { .. } => "TURN_ORDER_DECIDED",
            GameEventData::DeckShuffled { .. } => "DECK_SHUFFLED",
            GameEventData::CardMoved { .. } => "CARD_MOVED",
            GameEventData::CardSelected { .. } => "CARD_SELECTED",
            GameEventData::EnergyAttached { .. } => "ENERGY_ATTACHED",
            GameEventData::EnergyZoneChanged { .. } => "ENERGY_ZONE_CHANGED",
            GameEventData::EnergyDiscarded { .. } => "ENERGY_DISCARDED",
            GameEventData::AttackDeclared { .. } => "ATTACK_DECLARED",
            GameEventData::DamageApplied { .. } => "DAMAGE_APPLIED",
            GameEventData::KnockedOut { .. } => "KNOCKED_OUT",
            GameEventData::Evolved { .. } => "EVOLVED",
            GameEventData::Retreated { .. } => "RETREATED",
            GameEventData::TrainerPlayed { .. } => "TRAINER_PLAYED",
            GameEventData::ToolAttached { .. } => "TOOL_ATTACHED",
            GameEventData::EffectAdded { .. } => "EFFECT_ADDED",
            GameEventData::EffectRemoved { .. } => "EFFECT_REMOVED",
            GameEventData::EffectPrevented { .. } => "EFFECT_PREVENTED",
            GameEventData::AbilityUsed { .. } => "ABILITY_USED",
            GameEventData::PointsAwarded { .. } => "POINTS_AWARDED",
            GameEventData::TurnStarted { .. } => "TURN_STARTED",
            GameEventData::TurnEnded { .. } => "TURN_ENDED",
            GameEventData::InputRequested { .. } => "INPUT_REQUESTED",
            GameEventData::GameEnded { .. } => "GAME_ENDED",
        }
    }
}

impl fmt::Display for GameEventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GameEventData::*;
        match self {
            PhaseChanged { from, to } => write!(f, "phase {from} -> {to}"),
            CoinFlip { heads } => write!(f, "coin flip: {}", if *heads { "heads" } else { "tails" }),
            TurnOrderDecided { first_player } => write!(f, "player {first_player} goes first"),
            DeckShuffled { player } => write!(f, "player {player} shuffles their deck"),
            CardMoved { player, card_name, from, to, .. } => {
                write!(f, "player {player} moves {card_name} from {from} to {to}")
            }
            CardSelected { player, hand_index, .. } => write!(f, "player {player} selects hand[{hand_index}]"),
            EnergyAttached { player, zone, energy } => {
                write!(f, "player {player} attaches {energy} energy to {zone}")
            }
            EnergyZoneChanged { player, current, next } => write!(
                f,
                "player {player} energy zone: current={} next={}",
                current.map_or("-".to_string(), |e| e.to_string()),
                next.map_or("-".to_string(), |e| e.to_string())
            ),
            EnergyDiscarded { player, zone, energy, amount } => {
                write!(f, "player {player} discards {amount} {energy} energy from {zone}")
            }
            AttackDeclared { player, attack_name, .. } => write!(f, "player {player} attacks with {attack_name}"),
            DamageApplied { player, zone, amount, total, .. } => {
                write!(f, "player {player}'s {zone} takes {amount} damage (total {total})")
            }
            KnockedOut { player, card_name, .. } => write!(f, "player {player}'s {card_name} is knocked out"),
            Evolved { player, from, to, .. } => write!(f, "player {player} evolves {from} into {to}"),
            Retreated { player, from_bench, .. } => {
                write!(f, "player {player} retreats, bench{from_bench} becomes active")
            }
            TrainerPlayed { player, card_name, .. } => write!(f, "player {player} plays {card_name}"),
            ToolAttached { player, zone, .. } => write!(f, "player {player} attaches a tool to {zone}"),
            EffectAdded { effect_id, effect_type, .. } => write!(f, "effect {effect_id} ({effect_type}) added"),
            EffectRemoved { effect_id, effect_type, reason } => {
                write!(f, "effect {effect_id} ({effect_type}) removed: {reason:?}")
            }
            EffectPrevented { effect_type, .. } => write!(f, "{effect_type} was prevented"),
            AbilityUsed { player, ability_name, .. } => write!(f, "player {player} uses {ability_name}"),
            PointsAwarded { player, points, total } => {
                write!(f, "player {player} gains {points} point(s), now {total}")
            }
            TurnStarted { player, turn } => write!(f, "=== Turn {turn}: player {player} ==="),
            TurnEnded { player, turn } => write!(f, "player {player} ends turn {turn}"),
            InputRequested { players, request } => write!(f, "waiting on {players:?} for {request:?}"),
            GameEnded { winner: Some(w), reason } => write!(f, "game over: player {w} wins ({reason:?})"),
            GameEnded { winner: None, reason } => write!(f, "game over: no winner ({reason:?})"),
        }
    }
}

/// A recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Position in the game's history, starting at 0
    pub seq: u64,
    pub turn: u32,
    pub data: GameEventData,
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// Receives events as they are recorded
pub trait EventSubscriber: Send {
    fn on_event(&mut self, event: &GameEvent);
}

/// Ordered event history plus subscribers
///
/// Subscribers are runtime attachments: clones and deserialized buses start
/// without any.
#[derive(Default)]
pub struct EventBus {
    history: Vec<GameEvent>,
    subscribers: Vec<Box<dyn EventSubscriber>>,
    next_seq: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Record an event and notify subscribers
    pub fn push(&mut self, turn: u32, data: GameEventData) -> &GameEvent {
        let event = GameEvent {
            seq: self.next_seq,
            turn,
            data,
        };
        self.next_seq += 1;
        for subscriber in &mut self.subscribers {
            subscriber.on_event(&event);
        }
        self.history.push(event);
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    /// Events recorded at or after `seq`
    pub fn since(&self, seq: u64) -> &[GameEvent] {
        let start = self.history.partition_point(|e| e.seq < seq);
        &self.history[start..]
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.history.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        EventBus {
            history: self.history.clone(),
            subscribers: Vec::new(),
            next_seq: self.next_seq,
        }
    }
}

impl Serialize for EventBus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("EventBus", 2)?;
        state.serialize_field("history", &self.history)?;
        state.serialize_field("next_seq", &self.next_seq)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for EventBus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct EventBusData {
            history: Vec<GameEvent>,
            next_seq: u64,
        }

        let data = EventBusData::deserialize(deserializer)?;
        Ok(EventBus {
            history: data.history,
            subscribers: Vec::new(),
            next_seq: data.next_seq,
        })
    }
}
