//! Effect type registry
//!
//! Maps effect type names to descriptors holding the timing metadata and a
//! stateless factory. A registry is populated once before play and then shared
//! read-only (behind an `Arc`) by every game that uses it.

use crate::core::{Card, EffectId};
use crate::effects::{
    builtin, Effect, EffectBehavior, EffectDescriptor, EffectParams, EffectSource, EffectTarget, SourceCategory,
    TargetSpec, Timing,
};
use crate::{PocketError, Result};
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};

static SHARED_BUILTIN: OnceLock<Arc<EffectRegistry>> = OnceLock::new();

/// Builds a behavior from an effect's parameters
pub type EffectFactory = fn(&EffectParams) -> Result<Arc<dyn EffectBehavior>>;

/// Static description of one effect type
#[derive(Debug, Clone, Copy)]
pub struct EffectTypeDescriptor {
    pub timing: Timing,
    pub default_duration: i32,
    pub default_priority: i32,
    /// Effects of this type are purged when their source leaves play
    pub requires_source: bool,
    /// A global (untargeted) instance has nothing to act on
    pub needs_target: bool,
    /// At most one live instance per target; later applications are ignored
    pub unique: bool,
    pub create: EffectFactory,
}

#[derive(Debug, Default)]
pub struct EffectRegistry {
    types: FxHashMap<String, EffectTypeDescriptor>,
}

impl EffectRegistry {
    /// Empty registry
    pub fn new() -> Self {
        EffectRegistry {
            types: FxHashMap::default(),
        }
    }

    /// Registry with every built-in effect type
    pub fn with_builtins() -> Result<Self> {
        let mut registry = EffectRegistry::new();
        builtin::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Process-wide built-in registry, built on first use
    pub fn shared_builtin() -> Result<Arc<EffectRegistry>> {
        if let Some(registry) = SHARED_BUILTIN.get() {
            return Ok(Arc::clone(registry));
        }
        let registry = Arc::new(EffectRegistry::with_builtins()?);
        Ok(Arc::clone(SHARED_BUILTIN.get_or_init(|| registry)))
    }

    /// Register an effect type; a name can only be registered once
    pub fn register(&mut self, type_name: &str, descriptor: EffectTypeDescriptor) -> Result<()> {
        if self.types.contains_key(type_name) {
            return Err(PocketError::DuplicateEffectType(type_name.to_string()));
        }
        self.types.insert(type_name.to_string(), descriptor);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Result<&EffectTypeDescriptor> {
        self.types
            .get(type_name)
            .ok_or_else(|| PocketError::UnknownEffectType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate a live effect
    ///
    /// `duration` and `priority` parameters override the type defaults.
    pub fn create_effect(
        &self,
        id: EffectId,
        type_name: &str,
        source: EffectSource,
        target: Option<EffectTarget>,
        params: EffectParams,
    ) -> Result<Effect> {
        let descriptor = self.get(type_name)?;
        let behavior = (descriptor.create)(&params)?;

        let duration = params
            .get_i64("duration")
            .map(|d| d as i32)
            .unwrap_or(descriptor.default_duration);
        let priority = params
            .get_i64("priority")
            .map(|p| p as i32)
            .unwrap_or(descriptor.default_priority);

        let effect = Effect {
            id,
            effect_type: type_name.to_string(),
            source,
            target,
            timing: descriptor.timing,
            duration,
            priority,
            requires_source: descriptor.requires_source,
            params,
            behavior: None,
        };
        Ok(effect.with_behavior(behavior))
    }

    /// Check a descriptor without creating anything
    ///
    /// `carrier` is what prints the descriptor. Item and Supporter cards have
    /// no Pokémon holding them, so `self` cannot resolve there.
    pub fn validate(&self, descriptor: &EffectDescriptor, carrier: SourceCategory) -> Result<()> {
        let entry = self.get(&descriptor.effect_type)?;
        (entry.create)(&descriptor.params)?;

        let invalid = |reason: &str| PocketError::InvalidEffectParams {
            effect_type: descriptor.effect_type.clone(),
            reason: reason.to_string(),
        };
        if entry.needs_target && descriptor.target == TargetSpec::Global {
            return Err(invalid("effect needs a target, none given"));
        }
        if descriptor.target == TargetSpec::SelfPokemon && carrier == SourceCategory::Trainer {
            return Err(invalid("'self' has no holder on an Item or Supporter"));
        }
        Ok(())
    }

    /// Check every descriptor printed on a card; errors name the card
    pub fn validate_card(&self, card: &Card) -> Result<()> {
        for (carrier, descriptor) in card.carried_effects() {
            self.validate(descriptor, carrier).map_err(|e| match e {
                PocketError::UnknownEffectType(t) => {
                    PocketError::UnknownEffectType(format!("{t} (on card {})", card.name))
                }
                PocketError::InvalidEffectParams { effect_type, reason } => PocketError::InvalidEffectParams {
                    effect_type,
                    reason: format!("{reason} (on card {})", card.name),
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardCategory, CardId};
    use crate::effects::{kinds, PERMANENT};

    fn source() -> EffectSource {
        EffectSource {
            player: 0,
            card: None,
            category: SourceCategory::Attack,
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = EffectRegistry::with_builtins().unwrap();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains(kinds::POISON));
        assert!(registry.type_names().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = EffectRegistry::with_builtins().unwrap();
        let existing = *registry.get(kinds::HEAL).unwrap();
        let err = registry.register(kinds::HEAL, existing).unwrap_err();
        assert!(matches!(err, PocketError::DuplicateEffectType(ref name) if name == "HEAL"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let err = registry
            .create_effect(EffectId::new(1), "TELEPORT", source(), None, EffectParams::new())
            .unwrap_err();
        assert!(matches!(err, PocketError::UnknownEffectType(_)));
    }

    #[test]
    fn test_create_merges_defaults_and_overrides() {
        let registry = EffectRegistry::with_builtins().unwrap();

        let effect = registry
            .create_effect(
                EffectId::new(9),
                kinds::MODIFY_RETREAT_COST,
                source(),
                Some(EffectTarget::player(0)),
                EffectParams::new().with("amount", -1),
            )
            .unwrap();
        assert_eq!(effect.duration, PERMANENT);
        assert_eq!(effect.timing, Timing::Continuous);
        assert!(effect.requires_source);
        assert_eq!(effect.modify(2), 1);

        let short = registry
            .create_effect(
                EffectId::new(10),
                kinds::MODIFY_RETREAT_COST,
                source(),
                None,
                EffectParams::new().with("amount", -1).with("duration", 1).with("priority", 5),
            )
            .unwrap();
        assert_eq!(short.duration, 1);
        assert_eq!(short.priority, 5);
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let missing: EffectDescriptor = "DAMAGE@opponent_active".parse().unwrap();
        assert!(matches!(
            registry.validate(&missing, SourceCategory::Attack),
            Err(PocketError::InvalidEffectParams { .. })
        ));
        let ok: EffectDescriptor = "DAMAGE@opponent_active{amount=10}".parse().unwrap();
        assert!(registry.validate(&ok, SourceCategory::Attack).is_ok());
    }

    #[test]
    fn test_validate_rejects_untargeted_effects() {
        let registry = EffectRegistry::with_builtins().unwrap();
        for text in ["DAMAGE_REACTION{amount=20}", "POISON", "HEAL{amount=10}", "DAMAGE{amount=10}"] {
            let descriptor: EffectDescriptor = text.parse().unwrap();
            assert!(
                matches!(
                    registry.validate(&descriptor, SourceCategory::Ability),
                    Err(PocketError::InvalidEffectParams { .. })
                ),
                "{text} should need a target"
            );
        }
        let draw: EffectDescriptor = "DRAW_CARDS{count=1}".parse().unwrap();
        assert!(registry.validate(&draw, SourceCategory::Trainer).is_ok());
    }

    #[test]
    fn test_validate_self_target_depends_on_carrier() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let heal: EffectDescriptor = "HEAL@self{amount=20}".parse().unwrap();
        assert!(registry.validate(&heal, SourceCategory::Tool).is_ok());
        assert!(registry.validate(&heal, SourceCategory::Attack).is_ok());
        assert!(registry.validate(&heal, SourceCategory::Trainer).is_err());
    }

    #[test]
    fn test_validate_card_names_the_card() {
        let registry = EffectRegistry::with_builtins().unwrap();
        let potion = Card::trainer(CardId::new(0), "Bad Potion", CardCategory::Item)
            .with_effect("HEAL@self{amount=20}".parse().unwrap());
        let err = registry.validate_card(&potion).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("Bad Potion"));

        let helmet = Card::trainer(CardId::new(1), "Helmet", CardCategory::Tool)
            .with_effect("DAMAGE_REACTION@self{amount=20}".parse().unwrap());
        assert!(registry.validate_card(&helmet).is_ok());
    }

    #[test]
    fn test_shared_builtin_is_built_once() {
        let a = EffectRegistry::shared_builtin().unwrap();
        let b = EffectRegistry::shared_builtin().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 10);
    }
}
