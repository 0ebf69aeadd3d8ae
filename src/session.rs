//! Combat session
//!
//! The encounter state machine: Inactive -> Active -> Inactive.
//! Owns the participants, initiative order, aggro map, and dropped-item
//! pool, and resolves everything that happens on a turn:
//! - initiative rolls and turn sequencing (dead combatants are skipped)
//! - attack resolution with advantage/disadvantage and auto-crits
//! - monster AI (aggro, tactical targeting, behavior-driven flight)
//! - special abilities (disarm, adhesive) and their saving throws
//! - player flight with opportunity attacks
//! - Victory/Defeat/Fled termination
//!
//! Every public operation returns a [`CombatUpdate`]: a structured outcome
//! plus pre-formatted lines showing every roll. The structured outcome is
//! the contract; the lines are presentation.
//!
//! Not thread-safe by design: a session mutates turn state in place and the
//! caller must serialize all turn-advancing calls.

use std::collections::HashMap;

use tracing::debug;

use crate::abilities::Ability;
use crate::combatant::{Character, Combatant, Item};
use crate::conditions::Condition;
use crate::dice::{CheckOutcome, D20Outcome, Dice, RollMode};
use crate::effects::{Duration, EffectManager, StatusEffect};
use crate::error::CombatError;
use crate::monster::{Behavior, Monster, SpecialAbility};

/// DC for every flee attempt, player or monster
pub const FLEE_DC: i32 = 10;

/// The player always occupies slot 0
const PLAYER_SLOT: usize = 0;

/// One combatant's place in the initiative order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiativeEntry {
    /// Arena slot of the combatant
    pub slot: usize,
    /// Display name (cached for rendering)
    pub name: String,
    /// Raw d20 face
    pub face: u32,
    /// Initiative modifier (breaks ties, higher first)
    pub modifier: i32,
    /// Face plus modifier; the order sorts on this, descending
    pub total: i32,
}

/// A resolved attack, structured for assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: String,
    pub target: String,
    /// The attack roll, both faces preserved
    pub d20: D20Outcome,
    pub target_ac: i32,
    pub hit: bool,
    /// Whether the target's condition made the hit an automatic critical
    pub auto_crit: bool,
    /// Effective damage absorbed by the target (never exceeds remaining HP)
    pub damage: Option<i32>,
}

/// Structured result of a session operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Combat started; the full turn order with every roll shown
    Begin { order: Vec<InitiativeEntry> },
    /// It is the player's turn; the session never acts for the player
    PlayerTurn { name: String },
    /// The current combatant could not act and its turn was skipped
    Incapacitated { name: String },
    /// An attack was resolved (hit or miss)
    Attack(AttackReport),
    /// A monster escaped the battle
    MonsterFled { name: String },
    /// The player's flee check failed; their turn is spent
    FleeFailed { check: CheckOutcome },
    /// The player escaped; no XP awarded
    Fled,
    /// All monsters defeated
    Victory { xp: u32, recovered_items: Vec<String> },
    /// The player is down
    Defeat,
}

/// An outcome plus its fully transparent rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatUpdate {
    pub outcome: Outcome,
    pub lines: Vec<String>,
}

#[derive(Debug)]
struct Slot {
    combatant: Combatant,
    fled: bool,
}

/// A single encounter's combat state
#[derive(Debug)]
pub struct CombatSession {
    slots: Vec<Slot>,
    initiative: Vec<InitiativeEntry>,
    turn_index: usize,
    /// target slot -> slot of whoever last damaged it
    aggro: HashMap<usize, usize>,
    dropped_items: Vec<Item>,
    player_fled: bool,
    active: bool,
    dice: Dice,
    effects: EffectManager,
}

impl CombatSession {
    /// Create an inactive session with real randomness
    pub fn new() -> Self {
        Self::with_dice(Dice::new())
    }

    /// Create an inactive session rolling through the given dice
    pub fn with_dice(dice: Dice) -> Self {
        Self {
            slots: Vec::new(),
            initiative: Vec::new(),
            turn_index: 0,
            aggro: HashMap::new(),
            dropped_items: Vec::new(),
            player_fled: false,
            active: false,
            dice,
            effects: EffectManager::new(),
        }
    }

    /// Whether an encounter is in progress
    pub fn is_in_combat(&self) -> bool {
        self.active
    }

    /// The combatant whose turn it is
    pub fn current_combatant(&self) -> Option<&Combatant> {
        let slot = self.current_slot()?;
        Some(&self.slots[slot].combatant)
    }

    /// The initiative order, highest roll first
    pub fn initiative_order(&self) -> &[InitiativeEntry] {
        &self.initiative
    }

    /// Monsters still standing (alive and not fled)
    pub fn living_enemies(&self) -> Vec<&Monster> {
        self.slots
            .iter()
            .filter(|s| !s.fled && s.combatant.is_alive())
            .filter_map(|s| s.combatant.as_monster())
            .collect()
    }

    /// The player character, if a combat has been populated
    pub fn player(&self) -> Option<&Character> {
        self.slots.get(PLAYER_SLOT)?.combatant.as_player()
    }

    /// Extract the player after the encounter ends (XP and recovered items
    /// included). Returns `None` while combat is still active.
    pub fn take_player(&mut self) -> Option<Character> {
        if self.active || self.slots.is_empty() {
            return None;
        }
        let slot = self.slots.remove(PLAYER_SLOT);
        self.slots.clear();
        match slot.combatant {
            Combatant::Player(c) => Some(c),
            Combatant::Monster(_) => None,
        }
    }

    /// Status display lines for a named combatant
    pub fn status_lines(&self, name: &str) -> Vec<String> {
        match self.find_slot(name) {
            Some(slot) => self.effects.summary_lines(slot),
            None => Vec::new(),
        }
    }

    /// Items knocked loose during this encounter
    pub fn dropped_items(&self) -> &[Item] {
        &self.dropped_items
    }

    /// Begin an encounter, replacing any previous session state.
    ///
    /// The player always enters first; monsters are restored to full HP.
    /// Initiative is d20 + modifier, sorted descending, ties broken by the
    /// higher modifier.
    pub fn start(
        &mut self,
        player: Character,
        monsters: Vec<Monster>,
    ) -> Result<CombatUpdate, CombatError> {
        if monsters.is_empty() {
            return Err(CombatError::NoEnemies);
        }
        debug!(enemies = monsters.len(), "combat starting");

        self.slots.clear();
        self.initiative.clear();
        self.aggro.clear();
        self.dropped_items.clear();
        self.effects.clear_all();
        self.player_fled = false;
        self.turn_index = 0;

        self.slots.push(Slot {
            combatant: Combatant::Player(player),
            fled: false,
        });
        for mut monster in monsters {
            monster.restore_to_full();
            self.slots.push(Slot {
                combatant: Combatant::Monster(monster),
                fled: false,
            });
        }

        let mut entries = Vec::with_capacity(self.slots.len());
        for slot in 0..self.slots.len() {
            let name = self.slots[slot].combatant.name().to_string();
            let modifier = self.slots[slot].combatant.initiative_modifier();
            let face = self.dice.roll(20);
            entries.push(InitiativeEntry {
                slot,
                name,
                face,
                modifier,
                total: face as i32 + modifier,
            });
        }
        entries.sort_by(|a, b| b.total.cmp(&a.total).then(b.modifier.cmp(&a.modifier)));

        let mut lines = vec!["Combat begins! Initiative order:".to_string()];
        for entry in &entries {
            lines.push(format!(
                "  {}: {} (d20 [{}] {:+})",
                entry.name, entry.total, entry.face, entry.modifier
            ));
        }

        self.initiative = entries.clone();
        self.active = true;

        Ok(CombatUpdate {
            outcome: Outcome::Begin { order: entries },
            lines,
        })
    }

    /// Advance to and process the current combatant's turn.
    ///
    /// Dead combatants are skipped without acting. Turn-start effects fire
    /// before anything else; a combatant left unable to act forfeits the
    /// turn. A monster acts immediately; for the player this only announces
    /// the turn and waits for [`player_turn`](Self::player_turn).
    pub fn execute_turn(&mut self) -> Result<CombatUpdate, CombatError> {
        if !self.active {
            return Err(CombatError::NotInCombat);
        }

        let mut skipped = 0;
        while skipped < self.initiative.len() {
            let slot = self.initiative[self.turn_index].slot;
            if self.slots[slot].combatant.is_alive() {
                break;
            }
            self.turn_index = (self.turn_index + 1) % self.initiative.len();
            skipped += 1;
        }
        if skipped >= self.initiative.len() {
            // The order holds no living actor; only an end condition remains.
            return match self.evaluate_end() {
                Some(update) => Ok(update),
                None => Err(CombatError::NotInCombat),
            };
        }

        let slot = self.initiative[self.turn_index].slot;
        let name = self.slots[slot].combatant.name().to_string();
        let mut lines = self
            .effects
            .process_turn_start(slot, &self.slots[slot].combatant);

        if !self.effects.can_take_actions(slot) {
            lines.push(format!("{} is unable to act!", name));
            self.advance_turn(&mut lines);
            return Ok(CombatUpdate {
                outcome: Outcome::Incapacitated { name },
                lines,
            });
        }

        if self.slots[slot].combatant.is_monster() {
            self.enemy_turn_inner(lines)
        } else {
            lines.push(format!("{}, it is your turn.", name));
            Ok(CombatUpdate {
                outcome: Outcome::PlayerTurn { name },
                lines,
            })
        }
    }

    /// Take the player's turn with an action verb and optional target name.
    ///
    /// Verbs: `attack`/`hit`/`strike` and `flee`/`run`/`escape`.
    pub fn player_turn(
        &mut self,
        action: &str,
        target: Option<&str>,
    ) -> Result<CombatUpdate, CombatError> {
        if !self.active {
            return Err(CombatError::NotInCombat);
        }
        if self.current_slot() != Some(PLAYER_SLOT) {
            return Err(CombatError::NotYourTurn);
        }
        match action.trim().to_lowercase().as_str() {
            "attack" | "hit" | "strike" => self.player_attack(target),
            "flee" | "run" | "escape" => self.player_flee(),
            other => Err(CombatError::UnknownAction(other.to_string())),
        }
    }

    /// Take the current monster's turn
    pub fn enemy_turn(&mut self) -> Result<CombatUpdate, CombatError> {
        if !self.active {
            return Err(CombatError::NotInCombat);
        }
        let slot = self.current_slot().ok_or(CombatError::NotInCombat)?;
        if !self.slots[slot].combatant.is_monster() {
            return Err(CombatError::NotEnemyTurn);
        }
        self.enemy_turn_inner(Vec::new())
    }

    /// Force the encounter to end in victory, collecting XP for every
    /// defeated monster
    pub fn end_combat(&mut self) -> Result<CombatUpdate, CombatError> {
        if !self.active {
            return Err(CombatError::NotInCombat);
        }
        Ok(self.finish_victory())
    }

    fn current_slot(&self) -> Option<usize> {
        self.initiative.get(self.turn_index).map(|e| e.slot)
    }

    fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.combatant.name().eq_ignore_ascii_case(name))
    }

    fn find_living_monster(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.combatant.is_monster()
                && !s.fled
                && s.combatant.is_alive()
                && s.combatant.name().eq_ignore_ascii_case(name)
        })
    }

    fn first_living_monster(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.combatant.is_monster() && !s.fled && s.combatant.is_alive())
    }

    fn any_living_monster(&self) -> bool {
        self.first_living_monster().is_some()
    }

    /// Process turn-end effects for the acting combatant, then move the
    /// turn index forward.
    fn advance_turn(&mut self, lines: &mut Vec<String>) {
        if self.initiative.is_empty() {
            return;
        }
        let slot = self.initiative[self.turn_index].slot;
        if self.slots[slot].combatant.is_alive() {
            let messages =
                self.effects
                    .process_turn_end(slot, &self.slots[slot].combatant, &mut self.dice);
            lines.extend(messages);
        }
        self.turn_index = (self.turn_index + 1) % self.initiative.len();
    }

    fn player_attack(&mut self, target: Option<&str>) -> Result<CombatUpdate, CombatError> {
        let target_slot = match target {
            Some(name) => self
                .find_living_monster(name)
                .ok_or_else(|| CombatError::UnknownTarget(name.to_string()))?,
            None => match self.first_living_monster() {
                Some(slot) => slot,
                None => {
                    return match self.evaluate_end() {
                        Some(update) => Ok(update),
                        None => Err(CombatError::NotInCombat),
                    };
                }
            },
        };

        let mut lines = Vec::new();
        let report = self.resolve_attack(PLAYER_SLOT, target_slot, &mut lines)?;

        if let Some(end) = self.evaluate_end() {
            return Ok(merge_lines(lines, end));
        }
        self.advance_turn(&mut lines);
        Ok(CombatUpdate {
            outcome: Outcome::Attack(report),
            lines,
        })
    }

    fn player_flee(&mut self) -> Result<CombatUpdate, CombatError> {
        let mut lines = vec!["You turn to flee!".to_string()];

        // Every living monster gets a free swing before the check.
        let monsters: Vec<usize> = self
            .initiative
            .iter()
            .map(|e| e.slot)
            .filter(|&s| s != PLAYER_SLOT && self.slots[s].combatant.is_alive())
            .collect();
        for monster in monsters {
            if !self.slots[PLAYER_SLOT].combatant.is_alive() {
                break;
            }
            lines.push(format!(
                "{} lashes out as you turn your back!",
                self.slots[monster].combatant.name()
            ));
            self.resolve_attack(monster, PLAYER_SLOT, &mut lines)?;
        }

        if !self.slots[PLAYER_SLOT].combatant.is_alive() {
            let end = self.finish_defeat();
            return Ok(merge_lines(lines, end));
        }

        let dex = self.slots[PLAYER_SLOT]
            .combatant
            .ability_modifier(Ability::Dexterity);
        let check = self.dice.check(dex, FLEE_DC);
        lines.push(format!("Flee check: {}", check));

        if check.success {
            self.player_fled = true;
            let end = self.finish_fled();
            return Ok(merge_lines(lines, end));
        }

        lines.push("You fail to get away and lose your footing!".to_string());
        self.advance_turn(&mut lines);
        Ok(CombatUpdate {
            outcome: Outcome::FleeFailed { check },
            lines,
        })
    }

    fn enemy_turn_inner(&mut self, mut lines: Vec<String>) -> Result<CombatUpdate, CombatError> {
        let slot = self.current_slot().ok_or(CombatError::NotInCombat)?;
        let (name, wants_flee, dex_mod, behavior) = {
            let monster = self.slots[slot]
                .combatant
                .as_monster()
                .ok_or(CombatError::NotEnemyTurn)?;
            (
                monster.name.clone(),
                monster.wants_to_flee(),
                monster.ability_modifier(Ability::Dexterity),
                monster.behavior,
            )
        };

        if wants_flee && self.effects.can_move(slot) {
            let check = self.dice.check(dex_mod, FLEE_DC);
            lines.push(format!("{} tries to flee! ({})", name, check));
            if check.success {
                self.remove_from_battle(slot);
                lines.push(format!("{} escapes into the dark!", name));
                debug!(monster = %name, "monster fled");
                if let Some(end) = self.evaluate_end() {
                    return Ok(merge_lines(lines, end));
                }
                return Ok(CombatUpdate {
                    outcome: Outcome::MonsterFled { name },
                    lines,
                });
            }
            lines.push(format!("{} is cornered and fights on.", name));
        }

        let target_slot = self.select_monster_target(slot, behavior);
        let report = self.resolve_attack(slot, target_slot, &mut lines)?;
        self.advance_turn(&mut lines);

        if target_slot == PLAYER_SLOT && !self.slots[PLAYER_SLOT].combatant.is_alive() {
            let end = self.finish_defeat();
            return Ok(merge_lines(lines, end));
        }
        Ok(CombatUpdate {
            outcome: Outcome::Attack(report),
            lines,
        })
    }

    /// Targeting priority: whoever last hurt this monster, else (tactical
    /// only) the weakest living non-monster, else the player.
    fn select_monster_target(&self, attacker: usize, behavior: Behavior) -> usize {
        if let Some(&aggro) = self.aggro.get(&attacker) {
            let slot = &self.slots[aggro];
            if !slot.fled && slot.combatant.is_alive() {
                return aggro;
            }
        }
        if behavior == Behavior::Tactical {
            let weakest = self
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| {
                    !s.combatant.is_monster() && !s.fled && s.combatant.is_alive()
                })
                .min_by_key(|(_, s)| s.combatant.hp())
                .map(|(slot, _)| slot);
            if let Some(slot) = weakest {
                return slot;
            }
        }
        PLAYER_SLOT
    }

    /// Resolve one attack. Shared by player attacks, enemy attacks, and
    /// opportunity attacks.
    fn resolve_attack(
        &mut self,
        attacker: usize,
        target: usize,
        lines: &mut Vec<String>,
    ) -> Result<AttackReport, CombatError> {
        let attacker_name = self.slots[attacker].combatant.name().to_string();
        let target_name = self.slots[target].combatant.name().to_string();
        if !self.slots[attacker].combatant.is_alive() {
            return Err(CombatError::AttackerDown(attacker_name));
        }
        if !self.slots[target].combatant.is_alive() {
            return Err(CombatError::TargetAlreadyDown(target_name));
        }

        // Advantage and disadvantage never stack; one of each cancels to a
        // flat roll.
        let advantage = self.effects.has_advantage_on_attacks(attacker)
            || self.effects.attacks_have_advantage_against(target);
        let disadvantage = self.effects.has_disadvantage_on_attacks(attacker);
        let mode = match (advantage, disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            _ => RollMode::Flat,
        };

        let bonus = self.slots[attacker].combatant.attack_bonus();
        let d20 = self.dice.d20(mode, bonus);
        let target_ac = self.slots[target].combatant.armor_class();
        let auto_crit = self.effects.melee_crits_on_hit(target);
        let hit = d20.total >= target_ac;

        lines.push(format!(
            "{} attacks {}: {} vs AC {}",
            attacker_name, target_name, d20, target_ac
        ));

        let mut report = AttackReport {
            attacker: attacker_name.clone(),
            target: target_name.clone(),
            d20,
            target_ac,
            hit,
            auto_crit,
            damage: None,
        };

        if !hit {
            lines.push(format!("{} misses {}.", attacker_name, target_name));
            return Ok(report);
        }

        let spec = self.slots[attacker].combatant.damage_dice();
        let damage_bonus = self.slots[attacker].combatant.damage_bonus();
        let rolled = self.dice.roll_detailed(&spec);
        let base = (rolled.total + damage_bonus).max(1);
        let total = if auto_crit { base * 2 } else { base };

        let detail = if damage_bonus != 0 {
            format!("{} {:+}", rolled, damage_bonus)
        } else {
            rolled.to_string()
        };
        if auto_crit {
            lines.push(format!(
                "The helpless target takes a critical hit! {} doubled to {}",
                detail, total
            ));
        } else {
            lines.push(format!("Hit! {}", detail));
        }

        let applied = self.slots[target].combatant.take_damage(total);
        report.damage = Some(applied);
        lines.push(format!(
            "{} takes {} damage ({}/{} HP).",
            target_name,
            applied,
            self.slots[target].combatant.hp(),
            self.slots[target].combatant.max_hp()
        ));
        self.aggro.insert(target, attacker);

        let ability = self.slots[attacker]
            .combatant
            .as_monster()
            .and_then(|m| m.special_ability.clone());
        if let Some(ability) = ability {
            self.trigger_special_ability(attacker, target, &ability, lines);
        }

        Ok(report)
    }

    fn trigger_special_ability(
        &mut self,
        attacker: usize,
        target: usize,
        ability: &SpecialAbility,
        lines: &mut Vec<String>,
    ) {
        let attacker_name = self.slots[attacker].combatant.name().to_string();
        let target_name = self.slots[target].combatant.name().to_string();
        match ability {
            SpecialAbility::Disarm { dc } => {
                lines.push(format!(
                    "{} hooks at {}'s weapon!",
                    attacker_name, target_name
                ));
                if self.roll_save(target, Ability::Dexterity, *dc, lines) {
                    lines.push(format!("{} keeps hold of their weapon.", target_name));
                    return;
                }
                let weapon = self.slots[target]
                    .combatant
                    .as_player_mut()
                    .and_then(|c| c.unequip_main_hand());
                match weapon {
                    Some(weapon) => {
                        lines.push(format!(
                            "The {} is torn from {}'s grip and clatters to the ground!",
                            weapon.name, target_name
                        ));
                        self.dropped_items.push(weapon);
                    }
                    None => {
                        lines.push(format!("{} has nothing to drop.", target_name));
                    }
                }
            }
            SpecialAbility::Adhesive { dc } => {
                lines.push(format!(
                    "{}'s adhesive hide grips {}!",
                    attacker_name, target_name
                ));
                if self.roll_save(target, Ability::Strength, *dc, lines) {
                    lines.push(format!("{} pulls free.", target_name));
                    return;
                }
                let effect = StatusEffect::from_condition(
                    Condition::Restrained,
                    Duration::UntilSave {
                        ability: Ability::Strength,
                        dc: *dc,
                    },
                )
                .with_source(attacker);
                self.effects.apply(target, effect);
                lines.push(format!(
                    "{} is stuck fast and restrained! (STR save vs DC {} each turn to break free)",
                    target_name, dc
                ));
            }
            SpecialAbility::Other(name) => {
                // Placeholder carried over from the stat-block data: only
                // tactical monsters announce an unrecognized ability.
                let tactical = self.slots[attacker]
                    .combatant
                    .as_monster()
                    .is_some_and(|m| m.behavior == Behavior::Tactical);
                if tactical {
                    lines.push(format!("{} uses {}!", attacker_name, name));
                }
            }
        }
    }

    /// Roll a saving throw for a combatant, honoring auto-fail conditions
    fn roll_save(
        &mut self,
        slot: usize,
        ability: Ability,
        dc: i32,
        lines: &mut Vec<String>,
    ) -> bool {
        let name = self.slots[slot].combatant.name().to_string();
        if matches!(ability, Ability::Strength | Ability::Dexterity)
            && self.effects.auto_fails_str_dex_saves(slot)
        {
            lines.push(format!(
                "{} automatically fails the {} save!",
                name,
                ability.abbrev()
            ));
            return false;
        }
        let modifier = self.slots[slot].combatant.save_modifier(ability);
        let check = self.dice.check(modifier, dc);
        lines.push(format!("{} {} save: {}", name, ability.abbrev(), check));
        check.success
    }

    /// Drop a fled monster out of the turn order without disturbing slots
    fn remove_from_battle(&mut self, slot: usize) {
        self.slots[slot].fled = true;
        if let Some(pos) = self.initiative.iter().position(|e| e.slot == slot) {
            self.initiative.remove(pos);
            if pos < self.turn_index {
                self.turn_index -= 1;
            }
        }
        if !self.initiative.is_empty() {
            self.turn_index %= self.initiative.len();
        } else {
            self.turn_index = 0;
        }
        self.aggro.retain(|&t, &mut a| t != slot && a != slot);
        self.effects.clear(slot);
    }

    /// Check for an encounter-ending state: Fled, then Victory, then Defeat
    fn evaluate_end(&mut self) -> Option<CombatUpdate> {
        if !self.active {
            return None;
        }
        if self.player_fled {
            return Some(self.finish_fled());
        }
        if !self.any_living_monster() {
            return Some(self.finish_victory());
        }
        if !self.slots[PLAYER_SLOT].combatant.is_alive() {
            return Some(self.finish_defeat());
        }
        None
    }

    fn finish_victory(&mut self) -> CombatUpdate {
        let xp: u32 = self
            .slots
            .iter()
            .filter_map(|s| s.combatant.as_monster())
            .filter(|m| !m.is_alive())
            .map(|m| m.xp_value)
            .sum();

        let dropped = std::mem::take(&mut self.dropped_items);
        let mut recovered_items = Vec::new();
        let mut lines = vec![format!("Victory! You gain {} XP.", xp)];
        if let Some(player) = self.slots[PLAYER_SLOT].combatant.as_player_mut() {
            player.award_xp(xp);
            for item in dropped {
                lines.push(format!("You recover the {}.", item.name));
                recovered_items.push(item.name.clone());
                player.add_item(item);
            }
        }

        self.deactivate();
        CombatUpdate {
            outcome: Outcome::Victory {
                xp,
                recovered_items,
            },
            lines,
        }
    }

    fn finish_defeat(&mut self) -> CombatUpdate {
        self.deactivate();
        CombatUpdate {
            outcome: Outcome::Defeat,
            lines: vec!["You have fallen. The battle is lost.".to_string()],
        }
    }

    fn finish_fled(&mut self) -> CombatUpdate {
        self.deactivate();
        CombatUpdate {
            outcome: Outcome::Fled,
            lines: vec!["You escape the battle, winded but alive.".to_string()],
        }
    }

    fn deactivate(&mut self) {
        debug!("combat over");
        self.active = false;
        self.initiative.clear();
        self.aggro.clear();
        self.dropped_items.clear();
        self.effects.clear_all();
        self.turn_index = 0;
    }
}

impl Default for CombatSession {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_lines(mut lines: Vec<String>, mut end: CombatUpdate) -> CombatUpdate {
    lines.append(&mut end.lines);
    end.lines = lines;
    end
}
