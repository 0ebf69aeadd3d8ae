//! Status effects
//!
//! Tracks temporary effects on combatants:
//! - duration policies (rounds, until-save, turn boundaries, permanent)
//! - turn-start/turn-end processing with saving-throw escapes
//! - aggregate mechanical queries consumed by attack resolution
//!
//! A `StatusEffect` wraps a standard [`Condition`] or stands alone as a
//! bespoke effect with explicit mechanical overrides. The [`EffectManager`]
//! maps each combatant slot to its active effect list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abilities::Ability;
use crate::combatant::Combatant;
use crate::conditions::Condition;
use crate::dice::{CheckOutcome, Dice};

/// How long an effect lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    /// A fixed number of rounds, decremented at each of the owner's turn ends
    Rounds(u32),
    /// Until the owner passes a saving throw, attempted at each turn end
    UntilSave { ability: Ability, dc: i32 },
    /// Until the end of the owner's current turn
    UntilEndOfTurn,
    /// Until the start of the owner's next turn
    UntilStartOfNextTurn,
    /// Never expires on its own
    Permanent,
    /// Lasts until something outside combat lifts it
    Indefinite,
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Duration::Rounds(1) => write!(f, "1 round"),
            Duration::Rounds(n) => write!(f, "{} rounds", n),
            Duration::UntilSave { ability, dc } => {
                write!(f, "until {} save vs DC {}", ability.abbrev(), dc)
            }
            Duration::UntilEndOfTurn => write!(f, "until end of turn"),
            Duration::UntilStartOfNextTurn => write!(f, "until next turn"),
            Duration::Permanent => write!(f, "permanent"),
            Duration::Indefinite => write!(f, "indefinite"),
        }
    }
}

/// Result of an escape-save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAttempt {
    /// The save succeeded and the effect expired
    Escaped(CheckOutcome),
    /// The save was rolled and failed
    Held(CheckOutcome),
    /// An auto-fail condition prevented any roll
    AutoFailed,
}

/// Mechanical flags a bespoke effect may set.
///
/// Defaults to no effect on everything; condition-backed effects rarely need
/// these since the wrapped condition already answers the queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectOverrides {
    pub grants_advantage_on_attacks: bool,
    pub causes_disadvantage_on_attacks: bool,
    pub grants_advantage_against: bool,
    pub prevents_actions: bool,
    pub prevents_movement: bool,
    pub melee_crits_on_hit: bool,
    pub auto_fails_str_dex_saves: bool,
}

/// A status effect instance on a combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Display name
    pub name: String,
    /// The standard condition this effect applies, if any
    pub condition: Option<Condition>,
    /// Duration policy (the rounds counter lives in the variant)
    pub duration: Duration,
    /// Slot of the combatant that inflicted this effect
    pub source: Option<usize>,
    /// Bespoke mechanical flags, OR-ed with the condition's predicates
    pub overrides: EffectOverrides,
    expired: bool,
}

impl StatusEffect {
    /// Wrap a standard condition in a duration policy
    pub fn from_condition(condition: Condition, duration: Duration) -> Self {
        Self {
            name: condition.to_string(),
            condition: Some(condition),
            duration,
            source: None,
            overrides: EffectOverrides::default(),
            expired: false,
        }
    }

    /// Create a bespoke effect with no condition and no mechanics
    pub fn bespoke(name: &str, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            condition: None,
            duration,
            source: None,
            overrides: EffectOverrides::default(),
            expired: false,
        }
    }

    /// Record which combatant inflicted this effect
    pub fn with_source(mut self, source: usize) -> Self {
        self.source = Some(source);
        self
    }

    /// Set bespoke mechanical flags
    pub fn with_overrides(mut self, overrides: EffectOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Whether the effect is spent
    pub fn is_expired(&self) -> bool {
        self.expired || matches!(self.duration, Duration::Rounds(0))
    }

    /// Force the effect to expire
    pub fn expire(&mut self) {
        self.expired = true;
    }

    /// Decrement the rounds counter (no-op for other policies)
    pub fn decrement_duration(&mut self) {
        if let Duration::Rounds(ref mut remaining) = self.duration {
            *remaining = remaining.saturating_sub(1);
        }
    }

    /// Attempt the escape save, expiring the effect on success.
    ///
    /// `auto_fail_str_dex` short-circuits STR/DEX saves without consulting
    /// the dice. Returns `None` when the duration policy allows no save.
    pub fn attempt_save(
        &mut self,
        target: &Combatant,
        dice: &mut Dice,
        auto_fail_str_dex: bool,
    ) -> Option<SaveAttempt> {
        let Duration::UntilSave { ability, dc } = self.duration else {
            return None;
        };
        if auto_fail_str_dex && matches!(ability, Ability::Strength | Ability::Dexterity) {
            return Some(SaveAttempt::AutoFailed);
        }
        let check = dice.check(target.save_modifier(ability), dc);
        if check.success {
            self.expired = true;
            Some(SaveAttempt::Escaped(check))
        } else {
            Some(SaveAttempt::Held(check))
        }
    }

    /// Process the start of the owner's turn.
    ///
    /// Only the until-start-of-next-turn policy acts here.
    pub fn on_turn_start(&mut self, target: &Combatant) -> Option<String> {
        if self.is_expired() {
            return None;
        }
        match self.duration {
            Duration::UntilStartOfNextTurn => {
                self.expired = true;
                Some(format!(
                    "The {} on {} fades as their turn begins.",
                    self.name,
                    target.name()
                ))
            }
            _ => None,
        }
    }

    /// Process the end of the owner's turn.
    ///
    /// Ordering is load-bearing: a save is attempted first, and a successful
    /// save expires the effect without touching the rounds counter this call.
    pub fn on_turn_end(
        &mut self,
        target: &Combatant,
        dice: &mut Dice,
        auto_fail_str_dex: bool,
    ) -> Option<String> {
        if self.is_expired() {
            return None;
        }
        match self.duration {
            Duration::UntilSave { .. } => {
                match self.attempt_save(target, dice, auto_fail_str_dex)? {
                    SaveAttempt::AutoFailed => Some(format!(
                        "{} cannot even struggle against {} (save automatically fails).",
                        target.name(),
                        self.name
                    )),
                    SaveAttempt::Escaped(check) => Some(format!(
                        "{} shakes off {}! ({})",
                        target.name(),
                        self.name,
                        check
                    )),
                    SaveAttempt::Held(check) => Some(format!(
                        "{} fails to shake off {}. ({})",
                        target.name(),
                        self.name,
                        check
                    )),
                }
            }
            Duration::Rounds(_) => {
                self.decrement_duration();
                if self.is_expired() {
                    Some(format!(
                        "The {} on {} has worn off.",
                        self.name,
                        target.name()
                    ))
                } else {
                    None
                }
            }
            Duration::UntilEndOfTurn => {
                self.expired = true;
                Some(format!(
                    "The {} on {} fades as their turn ends.",
                    self.name,
                    target.name()
                ))
            }
            Duration::UntilStartOfNextTurn | Duration::Permanent | Duration::Indefinite => None,
        }
    }

    /// Whether the owner's attacks have advantage
    pub fn grants_advantage_on_attacks(&self) -> bool {
        self.condition
            .is_some_and(|c| c.grants_advantage_on_attacks())
            || self.overrides.grants_advantage_on_attacks
    }

    /// Whether the owner's attacks have disadvantage
    pub fn causes_disadvantage_on_attacks(&self) -> bool {
        self.condition
            .is_some_and(|c| c.causes_disadvantage_on_attacks())
            || self.overrides.causes_disadvantage_on_attacks
    }

    /// Whether attacks against the owner have advantage
    pub fn grants_advantage_against(&self) -> bool {
        self.condition.is_some_and(|c| c.grants_advantage_against())
            || self.overrides.grants_advantage_against
    }

    /// Whether the owner cannot take actions
    pub fn prevents_actions(&self) -> bool {
        self.condition.is_some_and(|c| c.causes_incapacitated())
            || self.overrides.prevents_actions
    }

    /// Whether the owner cannot move
    pub fn prevents_movement(&self) -> bool {
        self.condition.is_some_and(|c| c.prevents_movement())
            || self.overrides.prevents_movement
    }

    /// Whether melee hits on the owner auto-crit
    pub fn melee_crits_on_hit(&self) -> bool {
        self.condition.is_some_and(|c| c.melee_crits_on_hit())
            || self.overrides.melee_crits_on_hit
    }

    /// Whether the owner auto-fails STR and DEX saves
    pub fn auto_fails_str_dex_saves(&self) -> bool {
        self.condition
            .is_some_and(|c| c.auto_fails_str_dex_saves())
            || self.overrides.auto_fails_str_dex_saves
    }

    /// One-line status display ("restrained (until STR save vs DC 12)")
    pub fn summary(&self) -> String {
        format!("{} ({})", self.name, self.duration)
    }
}

/// Registry mapping combatant slots to their active effects
#[derive(Debug, Default)]
pub struct EffectManager {
    effects: HashMap<usize, Vec<StatusEffect>>,
}

impl EffectManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect to a combatant
    pub fn apply(&mut self, slot: usize, effect: StatusEffect) {
        debug!(slot, effect = %effect.name, "applying status effect");
        self.effects.entry(slot).or_default().push(effect);
    }

    /// Active (non-expired) effects on a combatant
    pub fn effects_on(&self, slot: usize) -> &[StatusEffect] {
        self.effects.get(&slot).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Remove every effect applying a given condition
    pub fn remove_condition(&mut self, slot: usize, condition: Condition) {
        if let Some(list) = self.effects.get_mut(&slot) {
            list.retain(|e| e.condition != Some(condition));
        }
    }

    /// Remove the first effect with the given name
    pub fn remove_named(&mut self, slot: usize, name: &str) -> Option<StatusEffect> {
        let list = self.effects.get_mut(&slot)?;
        let pos = list.iter().position(|e| e.name == name)?;
        Some(list.remove(pos))
    }

    /// Remove every effect inflicted by a given source
    pub fn remove_from_source(&mut self, slot: usize, source: usize) {
        if let Some(list) = self.effects.get_mut(&slot) {
            list.retain(|e| e.source != Some(source));
        }
    }

    /// Remove all effects from one combatant
    pub fn clear(&mut self, slot: usize) {
        self.effects.remove(&slot);
    }

    /// Remove all effects from everyone
    pub fn clear_all(&mut self) {
        self.effects.clear();
    }

    fn any_active(&self, slot: usize, pred: impl Fn(&StatusEffect) -> bool) -> bool {
        self.effects_on(slot)
            .iter()
            .any(|e| !e.is_expired() && pred(e))
    }

    /// Whether the combatant's attacks have advantage from any effect
    pub fn has_advantage_on_attacks(&self, slot: usize) -> bool {
        self.any_active(slot, |e| e.grants_advantage_on_attacks())
    }

    /// Whether the combatant's attacks have disadvantage from any effect
    pub fn has_disadvantage_on_attacks(&self, slot: usize) -> bool {
        self.any_active(slot, |e| e.causes_disadvantage_on_attacks())
    }

    /// Whether attacks against the combatant have advantage from any effect
    pub fn attacks_have_advantage_against(&self, slot: usize) -> bool {
        self.any_active(slot, |e| e.grants_advantage_against())
    }

    /// Whether the combatant can take actions
    pub fn can_take_actions(&self, slot: usize) -> bool {
        !self.any_active(slot, |e| e.prevents_actions())
    }

    /// Whether the combatant can move
    pub fn can_move(&self, slot: usize) -> bool {
        !self.any_active(slot, |e| e.prevents_movement())
    }

    /// Whether melee hits on the combatant auto-crit
    pub fn melee_crits_on_hit(&self, slot: usize) -> bool {
        self.any_active(slot, |e| e.melee_crits_on_hit())
    }

    /// Whether the combatant auto-fails STR and DEX saves
    pub fn auto_fails_str_dex_saves(&self, slot: usize) -> bool {
        self.any_active(slot, |e| e.auto_fails_str_dex_saves())
    }

    /// Process turn-start hooks for a combatant, purging expired effects.
    ///
    /// The list is detached while processing so hooks cannot observe the
    /// registry mid-mutation.
    pub fn process_turn_start(&mut self, slot: usize, target: &Combatant) -> Vec<String> {
        let mut list = self.effects.remove(&slot).unwrap_or_default();
        let mut messages = Vec::new();
        for effect in &mut list {
            if let Some(msg) = effect.on_turn_start(target) {
                messages.push(msg);
            }
        }
        self.reinsert_live(slot, list);
        messages
    }

    /// Process turn-end hooks for a combatant, purging expired effects.
    pub fn process_turn_end(
        &mut self,
        slot: usize,
        target: &Combatant,
        dice: &mut Dice,
    ) -> Vec<String> {
        // Auto-fail is an aggregate property of the whole list, so compute it
        // before any effect expires this call.
        let auto_fail = self.auto_fails_str_dex_saves(slot);

        let mut list = self.effects.remove(&slot).unwrap_or_default();
        let mut messages = Vec::new();
        for effect in &mut list {
            if let Some(msg) = effect.on_turn_end(target, dice, auto_fail) {
                messages.push(msg);
            }
        }
        self.reinsert_live(slot, list);
        messages
    }

    fn reinsert_live(&mut self, slot: usize, mut list: Vec<StatusEffect>) {
        let before = list.len();
        list.retain(|e| !e.is_expired());
        if list.len() < before {
            debug!(slot, purged = before - list.len(), "purged expired effects");
        }
        if !list.is_empty() {
            self.effects.insert(slot, list);
        }
    }

    /// Status display lines for a combatant
    pub fn summary_lines(&self, slot: usize) -> Vec<String> {
        self.effects_on(slot)
            .iter()
            .filter(|e| !e.is_expired())
            .map(|e| e.summary())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityScores;
    use crate::combatant::Character;
    use crate::dice::{DiceRoll, FixedDie};
    use crate::monster::Monster;

    fn target() -> Combatant {
        Combatant::Player(Character::new(
            "Hero",
            AbilityScores::new(14, 12, 10, 10, 10, 10),
            12,
            14,
        ))
    }

    fn restrained_until_save(dc: i32) -> StatusEffect {
        StatusEffect::from_condition(
            Condition::Restrained,
            Duration::UntilSave {
                ability: Ability::Strength,
                dc,
            },
        )
    }

    #[test]
    fn test_save_success_expires_immediately() {
        let mut effect = restrained_until_save(10);
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        let msg = effect.on_turn_end(&target(), &mut dice, false).unwrap();
        assert!(msg.contains("shakes off"));
        assert!(effect.is_expired());
    }

    #[test]
    fn test_save_failure_never_expires() {
        let mut effect = restrained_until_save(10);
        let mut dice = Dice::with_source(Box::new(FixedDie(1)));
        for _ in 0..10 {
            let msg = effect.on_turn_end(&target(), &mut dice, false).unwrap();
            assert!(msg.contains("fails to shake off"));
            assert!(!effect.is_expired());
        }
    }

    #[test]
    fn test_auto_fail_skips_the_roll() {
        let mut effect = restrained_until_save(2);
        // A DC 2 save would pass on any face with +2 STR, but auto-fail
        // means the die is never consulted.
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        let msg = effect.on_turn_end(&target(), &mut dice, true).unwrap();
        assert!(msg.contains("automatically fails"));
        assert!(!effect.is_expired());
    }

    #[test]
    fn test_rounds_decrement_and_wear_off() {
        let mut effect = StatusEffect::from_condition(Condition::Poisoned, Duration::Rounds(2));
        let mut dice = Dice::with_source(Box::new(FixedDie(1)));
        let t = target();

        assert!(effect.on_turn_end(&t, &mut dice, false).is_none());
        assert!(!effect.is_expired());

        let msg = effect.on_turn_end(&t, &mut dice, false).unwrap();
        assert!(msg.contains("worn off"));
        assert!(effect.is_expired());
    }

    #[test]
    fn test_until_end_of_turn_expires_unconditionally() {
        let mut effect = StatusEffect::bespoke("shield of faith", Duration::UntilEndOfTurn);
        let mut dice = Dice::with_source(Box::new(FixedDie(1)));
        let msg = effect.on_turn_end(&target(), &mut dice, false).unwrap();
        assert!(msg.contains("fades"));
        assert!(effect.is_expired());
    }

    #[test]
    fn test_turn_start_only_fires_start_boundary() {
        let t = target();
        let mut boundary =
            StatusEffect::bespoke("dodge stance", Duration::UntilStartOfNextTurn);
        assert!(boundary.on_turn_start(&t).is_some());
        assert!(boundary.is_expired());

        let mut rounds = StatusEffect::from_condition(Condition::Poisoned, Duration::Rounds(3));
        assert!(rounds.on_turn_start(&t).is_none());
        assert!(!rounds.is_expired());
    }

    #[test]
    fn test_permanent_effects_survive_processing() {
        let mut effect = StatusEffect::from_condition(Condition::Blinded, Duration::Permanent);
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        let t = target();
        assert!(effect.on_turn_start(&t).is_none());
        assert!(effect.on_turn_end(&t, &mut dice, false).is_none());
        assert!(!effect.is_expired());
    }

    #[test]
    fn test_bespoke_overrides() {
        let effect = StatusEffect::bespoke("blessed", Duration::Rounds(3)).with_overrides(
            EffectOverrides {
                grants_advantage_on_attacks: true,
                ..Default::default()
            },
        );
        assert!(effect.grants_advantage_on_attacks());
        assert!(!effect.causes_disadvantage_on_attacks());
        assert!(!effect.prevents_actions());
    }

    #[test]
    fn test_manager_aggregate_queries() {
        let mut mgr = EffectManager::new();
        assert!(mgr.can_take_actions(0));
        assert!(!mgr.has_disadvantage_on_attacks(0));

        mgr.apply(
            0,
            StatusEffect::from_condition(Condition::Poisoned, Duration::Rounds(3)),
        );
        mgr.apply(
            0,
            StatusEffect::from_condition(Condition::Paralyzed, Duration::Rounds(2)),
        );

        assert!(mgr.has_disadvantage_on_attacks(0));
        assert!(!mgr.can_take_actions(0));
        assert!(!mgr.can_move(0));
        assert!(mgr.attacks_have_advantage_against(0));
        assert!(mgr.melee_crits_on_hit(0));
        assert!(mgr.auto_fails_str_dex_saves(0));
    }

    #[test]
    fn test_manager_removal_operations() {
        let mut mgr = EffectManager::new();
        mgr.apply(
            0,
            StatusEffect::from_condition(Condition::Restrained, Duration::Permanent)
                .with_source(3),
        );
        mgr.apply(0, StatusEffect::bespoke("marked", Duration::Indefinite));

        mgr.remove_condition(0, Condition::Restrained);
        assert!(mgr.can_move(0));
        assert_eq!(mgr.effects_on(0).len(), 1);

        assert!(mgr.remove_named(0, "marked").is_some());
        assert!(mgr.effects_on(0).is_empty());

        mgr.apply(1, StatusEffect::bespoke("webbed", Duration::Permanent).with_source(2));
        mgr.remove_from_source(1, 2);
        assert!(mgr.effects_on(1).is_empty());
    }

    #[test]
    fn test_turn_end_processing_purges_expired() {
        let mut mgr = EffectManager::new();
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        let t = target();

        mgr.apply(0, restrained_until_save(10));
        mgr.apply(
            0,
            StatusEffect::from_condition(Condition::Poisoned, Duration::Rounds(3)),
        );

        let messages = mgr.process_turn_end(0, &t, &mut dice);
        assert_eq!(messages.len(), 1); // the save message; poison ticks silently
        assert_eq!(mgr.effects_on(0).len(), 1);
        assert!(mgr.can_move(0)); // restrained is gone
    }

    #[test]
    fn test_paralysis_auto_fails_restrained_escape() {
        // Paralyzed + restrained-with-STR-save: the escape save auto-fails
        // even on a natural 20.
        let mut mgr = EffectManager::new();
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        let t = target();

        mgr.apply(0, restrained_until_save(5));
        mgr.apply(
            0,
            StatusEffect::from_condition(Condition::Paralyzed, Duration::Permanent),
        );

        let messages = mgr.process_turn_end(0, &t, &mut dice);
        assert!(messages.iter().any(|m| m.contains("automatically fails")));
        assert_eq!(mgr.effects_on(0).len(), 2);
    }

    #[test]
    fn test_monster_save_uses_raw_modifier() {
        let ooze = Combatant::Monster(
            Monster::new("Ooze", 10, 8, DiceRoll::new(1, 6, 0))
                .with_scores(AbilityScores::new(14, 6, 12, 1, 6, 2)),
        );
        let mut effect = restrained_until_save(12);
        // STR +2: face 10 gives 12, exactly the DC
        let mut dice = Dice::with_source(Box::new(FixedDie(10)));
        let attempt = effect.attempt_save(&ooze, &mut dice, false).unwrap();
        let SaveAttempt::Escaped(check) = attempt else {
            panic!("expected an escape, got {:?}", attempt);
        };
        assert!(check.success);
        assert_eq!(check.modifier, 2);
    }

    #[test]
    fn test_attempt_save_honors_auto_fail() {
        let mut effect = restrained_until_save(2);
        // A DC 2 STR save would pass on any face, but the roll never happens.
        let mut dice = Dice::with_source(Box::new(FixedDie(20)));
        assert_eq!(
            effect.attempt_save(&target(), &mut dice, true),
            Some(SaveAttempt::AutoFailed)
        );
        assert!(!effect.is_expired());
    }

    #[test]
    fn test_summary_lines() {
        let mut mgr = EffectManager::new();
        mgr.apply(0, restrained_until_save(12));
        let lines = mgr.summary_lines(0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("restrained"));
        assert!(lines[0].contains("DC 12"));
    }
}
