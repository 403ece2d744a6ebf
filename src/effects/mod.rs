//! Card effect system
//!
//! Card text never lives in the engine. Cards carry declarative
//! [`EffectDescriptor`]s (a type name, a target and parameters); the
//! [`EffectRegistry`] turns a descriptor into a live [`Effect`] whose behavior
//! object is looked up by type name, and the [`EffectManager`] stores live
//! effects and folds them into rule queries (damage, retreat cost, energy).

pub mod builtin;
pub mod manager;
pub mod registry;

pub use manager::{EffectManager, SourceFilter};
pub use registry::{EffectFactory, EffectRegistry, EffectTypeDescriptor};

use crate::core::{CardId, EffectId};
use crate::game::GameState;
use crate::{PocketError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Duration sentinel: never removed by tickdown
pub const PERMANENT: i32 = -1;

/// Registered effect type names
pub mod kinds {
    pub const DAMAGE: &str = "DAMAGE";
    pub const HEAL: &str = "HEAL";
    pub const DRAW_CARDS: &str = "DRAW_CARDS";
    pub const MODIFY_DAMAGE: &str = "MODIFY_DAMAGE";
    pub const MODIFY_RETREAT_COST: &str = "MODIFY_RETREAT_COST";
    pub const DISABLE_RETREAT: &str = "DISABLE_RETREAT";
    pub const MODIFY_ENERGY_COUNT: &str = "MODIFY_ENERGY_COUNT";
    pub const PREVENT_EFFECT: &str = "PREVENT_EFFECT";
    pub const DAMAGE_REACTION: &str = "DAMAGE_REACTION";
    pub const POISON: &str = "POISON";
}

/// Effect parameters (`amount`, `duration`, `priority`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectParams(BTreeMap<String, serde_json::Value>);

impl EffectParams {
    pub fn new() -> Self {
        EffectParams(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    /// Integer parameter that must be present
    pub fn require_i64(&self, effect_type: &str, key: &str) -> Result<i64> {
        self.get_i64(key).ok_or_else(|| PocketError::InvalidEffectParams {
            effect_type: effect_type.to_string(),
            reason: format!("missing integer parameter '{key}'"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> + '_ {
        self.0.iter()
    }
}

/// Who a descriptor points at, relative to the card that carries it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    /// The Pokémon carrying the effect (for tools: the Pokémon holding it)
    SelfPokemon,
    OwnActive,
    OpponentActive,
    /// Every Pokémon of the source player
    OwnPlayer,
    /// Every Pokémon of the opponent
    OpponentPlayer,
    Global,
}

impl TargetSpec {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetSpec::SelfPokemon => "self",
            TargetSpec::OwnActive => "own_active",
            TargetSpec::OpponentActive => "opponent_active",
            TargetSpec::OwnPlayer => "own_player",
            TargetSpec::OpponentPlayer => "opponent_player",
            TargetSpec::Global => "global",
        }
    }
}

impl FromStr for TargetSpec {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "self" => Ok(TargetSpec::SelfPokemon),
            "own_active" => Ok(TargetSpec::OwnActive),
            "opponent_active" | "opp_active" => Ok(TargetSpec::OpponentActive),
            "own_player" | "own" => Ok(TargetSpec::OwnPlayer),
            "opponent_player" | "opponent" => Ok(TargetSpec::OpponentPlayer),
            "global" | "" => Ok(TargetSpec::Global),
            other => Err(PocketError::InvalidCardFormat(format!(
                "unknown effect target '{other}'"
            ))),
        }
    }
}

/// Declarative effect attached to an attack, ability or trainer card
///
/// Text form: `TYPE@target{key=value,key=value}` where `@target` and the
/// parameter block are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub effect_type: String,
    pub target: TargetSpec,
    #[serde(default)]
    pub params: EffectParams,
}

impl EffectDescriptor {
    pub fn new(effect_type: impl Into<String>, target: TargetSpec) -> Self {
        EffectDescriptor {
            effect_type: effect_type.into(),
            target,
            params: EffectParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key, value);
        self
    }
}

impl fmt::Display for EffectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.effect_type, self.target.as_str())?;
        if !self.params.is_empty() {
            let parts: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => format!("{k}={s}"),
                    other => format!("{k}={other}"),
                })
                .collect();
            write!(f, "{{{}}}", parts.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for EffectDescriptor {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (head, params_src) = match s.find('{') {
            Some(open) => {
                let close = s.rfind('}').ok_or_else(|| {
                    PocketError::InvalidCardFormat(format!("unterminated parameter block in '{s}'"))
                })?;
                (&s[..open], Some(&s[open + 1..close]))
            }
            None => (s, None),
        };

        let (type_name, target) = match head.split_once('@') {
            Some((t, target)) => (t.trim(), target.parse()?),
            None => (head.trim(), TargetSpec::Global),
        };
        if type_name.is_empty() {
            return Err(PocketError::InvalidCardFormat(format!("missing effect type in '{s}'")));
        }

        let mut params = EffectParams::new();
        for pair in params_src.unwrap_or("").split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').ok_or_else(|| {
                PocketError::InvalidCardFormat(format!("expected key=value, got '{pair}'"))
            })?;
            let raw = raw.trim();
            let value = if let Ok(n) = raw.parse::<i64>() {
                serde_json::Value::from(n)
            } else if let Ok(b) = raw.parse::<bool>() {
                serde_json::Value::from(b)
            } else {
                serde_json::Value::from(raw)
            };
            params.insert(key.trim(), value);
        }

        Ok(EffectDescriptor {
            effect_type: type_name.to_uppercase(),
            target,
            params,
        })
    }
}

/// What kind of game object created an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Attack,
    Ability,
    Tool,
    Trainer,
    Status,
    DamageReaction,
    Heal,
}

/// When an effect does its work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Runs once when created and is never stored
    Immediate,
    /// Stored and consulted by rule queries
    Continuous,
    /// Runs whenever its target takes damage
    OnDamageTaken,
    /// Runs once per between-turns transition
    BetweenTurns,
}

/// Resolved target of a live effect
///
/// `card: None` covers every Pokémon of `player`. An effect with no target at
/// all is global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectTarget {
    pub player: usize,
    pub card: Option<CardId>,
}

impl EffectTarget {
    pub fn pokemon(player: usize, card: CardId) -> Self {
        EffectTarget { player, card: Some(card) }
    }

    pub fn player(player: usize) -> Self {
        EffectTarget { player, card: None }
    }

    pub fn covers(&self, player: usize, card: CardId) -> bool {
        self.player == player && self.card.map_or(true, |c| c == card)
    }
}

/// Origin of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSource {
    pub player: usize,
    pub card: Option<CardId>,
    pub category: SourceCategory,
}

/// Data handed to a behavior when it runs
#[derive(Debug, Clone, Copy)]
pub struct EffectContext {
    pub effect_id: EffectId,
    pub source: EffectSource,
    pub target: Option<EffectTarget>,
    /// Trigger-specific amount (damage actually taken for reactions)
    pub amount: i32,
}

/// Per-type behavior, built by the registry from an effect's parameters
pub trait EffectBehavior: fmt::Debug + Send + Sync {
    /// Do the effect's work (immediate, triggered and between-turns effects)
    fn run(&self, _state: &mut GameState, _ctx: &EffectContext) -> Result<()> {
        Ok(())
    }

    /// Fold this effect into a rule value (continuous effects)
    fn modify(&self, value: i32) -> i32 {
        value
    }

    /// Optional activation condition
    fn is_active(&self, _state: &GameState, _effect: &Effect) -> bool {
        true
    }

    /// Does this effect block effects of `effect_type`?
    fn prevents(&self, _effect_type: &str) -> bool {
        false
    }
}

/// A live effect instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub effect_type: String,
    pub source: EffectSource,
    pub target: Option<EffectTarget>,
    pub timing: Timing,

    /// Remaining between-turns transitions, or [`PERMANENT`]
    pub duration: i32,

    /// Lower applies first
    pub priority: i32,

    /// Purge when the source leaves play
    pub requires_source: bool,

    pub params: EffectParams,

    #[serde(skip)]
    behavior: Option<Arc<dyn EffectBehavior>>,
}

impl Effect {
    pub(crate) fn with_behavior(mut self, behavior: Arc<dyn EffectBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn behavior(&self) -> Option<Arc<dyn EffectBehavior>> {
        self.behavior.clone()
    }

    pub fn is_permanent(&self) -> bool {
        self.duration == PERMANENT
    }

    /// Does this effect reach the Pokémon `card` of `player`?
    pub fn applies_to(&self, player: usize, card: CardId) -> bool {
        self.target.map_or(true, |t| t.covers(player, card))
    }

    pub fn modify(&self, value: i32) -> i32 {
        self.behavior.as_ref().map_or(value, |b| b.modify(value))
    }

    pub fn is_active(&self, state: &GameState) -> bool {
        self.behavior.as_ref().map_or(true, |b| b.is_active(state, self))
    }

    pub fn prevents(&self, effect_type: &str) -> bool {
        self.behavior.as_ref().is_some_and(|b| b.prevents(effect_type))
    }

    pub fn context(&self, amount: i32) -> EffectContext {
        EffectContext {
            effect_id: self.id,
            source: self.source,
            target: self.target,
            amount,
        }
    }

    /// Rebuild the behavior object after deserialization
    pub fn rehydrate(&mut self, registry: &EffectRegistry) -> Result<()> {
        let descriptor = registry.get(&self.effect_type)?;
        self.behavior = Some((descriptor.create)(&self.params)?);
        Ok(())
    }
}
