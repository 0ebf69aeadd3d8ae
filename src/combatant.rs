//! Combatants
//!
//! The two combatant kinds as a tagged union with explicit match dispatch,
//! plus the lean player-character surface this engine consumes:
//! - HP/AC/initiative capability queries
//! - per-kind attack-bonus and damage formulas
//! - saving throws (players add proficiency, monsters never do)
//! - the one inventory interaction combat needs: main-hand weapon in, out,
//!   and back again

use serde::{Deserialize, Serialize};

use crate::abilities::{Ability, AbilityScores};
use crate::dice::DiceRoll;
use crate::monster::Monster;

/// Damage expression for an empty main hand
pub const UNARMED_DAMAGE: DiceRoll = DiceRoll::new(1, 4, 0);

/// An inventory item (combat only cares about weapons)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name
    pub name: String,
    /// Damage expression when swung
    pub damage: DiceRoll,
}

impl Item {
    /// Create an item
    pub fn new(name: &str, damage: DiceRoll) -> Self {
        Self {
            name: name.to_string(),
            damage,
        }
    }
}

/// A player character, reduced to the surface combat consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Display name
    pub name: String,
    /// Ability scores
    pub scores: AbilityScores,
    /// Proficiency bonus added to attacks and proficient saves
    pub proficiency_bonus: i32,
    save_proficiencies: Vec<Ability>,
    hp: i32,
    max_hp: i32,
    /// Armor class
    pub armor_class: i32,
    xp: u32,
    main_hand: Option<Item>,
    backpack: Vec<Item>,
}

impl Character {
    /// Create a character with a +2 proficiency bonus and empty hands
    pub fn new(name: &str, scores: AbilityScores, max_hp: i32, armor_class: i32) -> Self {
        Self {
            name: name.to_string(),
            scores,
            proficiency_bonus: 2,
            save_proficiencies: Vec::new(),
            hp: max_hp,
            max_hp,
            armor_class,
            xp: 0,
            main_hand: None,
            backpack: Vec::new(),
        }
    }

    /// Set the proficiency bonus
    pub fn with_proficiency_bonus(mut self, bonus: i32) -> Self {
        self.proficiency_bonus = bonus;
        self
    }

    /// Mark an ability as save-proficient
    pub fn with_save_proficiency(mut self, ability: Ability) -> Self {
        if !self.save_proficiencies.contains(&ability) {
            self.save_proficiencies.push(ability);
        }
        self
    }

    /// Equip a main-hand weapon (returns the displaced weapon, if any)
    pub fn equip_main_hand(&mut self, item: Item) -> Option<Item> {
        self.main_hand.replace(item)
    }

    /// Remove and return the main-hand weapon
    pub fn unequip_main_hand(&mut self) -> Option<Item> {
        self.main_hand.take()
    }

    /// The equipped main-hand weapon, if any
    pub fn main_hand(&self) -> Option<&Item> {
        self.main_hand.as_ref()
    }

    /// Add an item to the backpack
    pub fn add_item(&mut self, item: Item) {
        self.backpack.push(item);
    }

    /// Remove the first item with the given name from the backpack
    pub fn remove_item(&mut self, name: &str) -> Option<Item> {
        let pos = self.backpack.iter().position(|i| i.name == name)?;
        Some(self.backpack.remove(pos))
    }

    /// Items carried in the backpack
    pub fn backpack(&self) -> &[Item] {
        &self.backpack
    }

    /// Current hit points
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Whether the character is still up
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Take damage, clamped to remaining HP; returns the amount absorbed
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let applied = amount.clamp(0, self.hp);
        self.hp -= applied;
        applied
    }

    /// Heal, clamped at max HP; returns the amount applied
    pub fn heal(&mut self, amount: i32) -> i32 {
        let applied = amount.clamp(0, self.max_hp - self.hp);
        self.hp += applied;
        applied
    }

    /// Modifier for an ability
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.scores.modifier(ability)
    }

    /// Saving-throw modifier: ability modifier plus proficiency if proficient
    pub fn save_modifier(&self, ability: Ability) -> i32 {
        let base = self.scores.modifier(ability);
        if self.save_proficiencies.contains(&ability) {
            base + self.proficiency_bonus
        } else {
            base
        }
    }

    /// Attack bonus: STR modifier plus proficiency
    pub fn attack_bonus(&self) -> i32 {
        self.scores.modifier(Ability::Strength) + self.proficiency_bonus
    }

    /// Total experience points
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// Award experience points
    pub fn award_xp(&mut self, amount: u32) {
        self.xp += amount;
    }
}

/// A participant in combat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Combatant {
    Player(Character),
    Monster(Monster),
}

impl Combatant {
    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Combatant::Player(c) => &c.name,
            Combatant::Monster(m) => &m.name,
        }
    }

    /// Current hit points
    pub fn hp(&self) -> i32 {
        match self {
            Combatant::Player(c) => c.hp(),
            Combatant::Monster(m) => m.hp(),
        }
    }

    /// Maximum hit points
    pub fn max_hp(&self) -> i32 {
        match self {
            Combatant::Player(c) => c.max_hp(),
            Combatant::Monster(m) => m.max_hp(),
        }
    }

    /// Armor class
    pub fn armor_class(&self) -> i32 {
        match self {
            Combatant::Player(c) => c.armor_class,
            Combatant::Monster(m) => m.armor_class,
        }
    }

    /// Initiative modifier (DEX)
    pub fn initiative_modifier(&self) -> i32 {
        self.ability_modifier(Ability::Dexterity)
    }

    /// Whether the combatant is still up
    pub fn is_alive(&self) -> bool {
        match self {
            Combatant::Player(c) => c.is_alive(),
            Combatant::Monster(m) => m.is_alive(),
        }
    }

    /// Take damage, clamped to remaining HP; returns the amount absorbed
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        match self {
            Combatant::Player(c) => c.take_damage(amount),
            Combatant::Monster(m) => m.take_damage(amount),
        }
    }

    /// Heal, clamped at max HP; returns the amount applied
    pub fn heal(&mut self, amount: i32) -> i32 {
        match self {
            Combatant::Player(c) => c.heal(amount),
            Combatant::Monster(m) => m.heal(amount),
        }
    }

    /// Modifier for an ability
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        match self {
            Combatant::Player(c) => c.ability_modifier(ability),
            Combatant::Monster(m) => m.ability_modifier(ability),
        }
    }

    /// Saving-throw modifier. Players add proficiency where proficient;
    /// monsters use the raw ability modifier.
    pub fn save_modifier(&self, ability: Ability) -> i32 {
        match self {
            Combatant::Player(c) => c.save_modifier(ability),
            Combatant::Monster(m) => m.ability_modifier(ability),
        }
    }

    /// Static attack-roll bonus
    pub fn attack_bonus(&self) -> i32 {
        match self {
            Combatant::Player(c) => c.attack_bonus(),
            Combatant::Monster(m) => m.attack_bonus,
        }
    }

    /// The dice expression this combatant rolls for damage
    pub fn damage_dice(&self) -> DiceRoll {
        match self {
            Combatant::Player(c) => c
                .main_hand()
                .map(|w| w.damage)
                .unwrap_or(UNARMED_DAMAGE),
            Combatant::Monster(m) => m.damage_dice,
        }
    }

    /// Static bonus added to the damage roll (players add STR)
    pub fn damage_bonus(&self) -> i32 {
        match self {
            Combatant::Player(c) => c.ability_modifier(Ability::Strength),
            Combatant::Monster(_) => 0,
        }
    }

    /// Whether this is the player
    pub fn is_player(&self) -> bool {
        matches!(self, Combatant::Player(_))
    }

    /// Whether this is a monster
    pub fn is_monster(&self) -> bool {
        matches!(self, Combatant::Monster(_))
    }

    /// Borrow as a player character, if it is one
    pub fn as_player(&self) -> Option<&Character> {
        match self {
            Combatant::Player(c) => Some(c),
            Combatant::Monster(_) => None,
        }
    }

    /// Mutably borrow as a player character, if it is one
    pub fn as_player_mut(&mut self) -> Option<&mut Character> {
        match self {
            Combatant::Player(c) => Some(c),
            Combatant::Monster(_) => None,
        }
    }

    /// Borrow as a monster, if it is one
    pub fn as_monster(&self) -> Option<&Monster> {
        match self {
            Combatant::Player(_) => None,
            Combatant::Monster(m) => Some(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Character {
        Character::new(
            "Hero",
            AbilityScores::new(16, 12, 14, 10, 10, 10),
            12,
            14,
        )
        .with_save_proficiency(Ability::Strength)
    }

    #[test]
    fn test_hp_invariant() {
        let mut c = hero();
        assert_eq!(c.take_damage(5), 5);
        assert_eq!(c.hp(), 7);
        assert_eq!(c.take_damage(20), 7); // clamped to remaining
        assert_eq!(c.hp(), 0);
        assert!(!c.is_alive());
        assert_eq!(c.heal(100), 12); // clamped at max
        assert_eq!(c.hp(), 12);
    }

    #[test]
    fn test_save_modifier_proficiency() {
        let c = hero();
        // STR: +3 mod, proficient -> +5
        assert_eq!(c.save_modifier(Ability::Strength), 5);
        // DEX: +1 mod, not proficient
        assert_eq!(c.save_modifier(Ability::Dexterity), 1);
    }

    #[test]
    fn test_attack_bonus() {
        let c = hero();
        assert_eq!(c.attack_bonus(), 5); // STR +3, proficiency +2
    }

    #[test]
    fn test_inventory_round_trip() {
        let mut c = hero();
        let sword = Item::new("Shortsword", DiceRoll::new(1, 6, 0));

        assert!(c.equip_main_hand(sword.clone()).is_none());
        assert_eq!(c.main_hand().map(|i| i.name.as_str()), Some("Shortsword"));

        let dropped = c.unequip_main_hand().unwrap();
        assert_eq!(dropped, sword);
        assert!(c.main_hand().is_none());

        c.add_item(dropped);
        assert_eq!(c.backpack().len(), 1);
        assert!(c.remove_item("Shortsword").is_some());
        assert!(c.remove_item("Shortsword").is_none());
    }

    #[test]
    fn test_player_damage_formula() {
        let mut c = hero();
        let player = Combatant::Player(c.clone());
        assert_eq!(player.damage_dice(), UNARMED_DAMAGE);
        assert_eq!(player.damage_bonus(), 3); // STR mod

        c.equip_main_hand(Item::new("Longsword", DiceRoll::new(1, 8, 0)));
        let armed = Combatant::Player(c);
        assert_eq!(armed.damage_dice(), DiceRoll::new(1, 8, 0));
    }

    #[test]
    fn test_monster_save_has_no_proficiency() {
        let m = Monster::new("Ooze", 10, 8, DiceRoll::new(1, 6, 0))
            .with_scores(AbilityScores::new(14, 6, 12, 1, 6, 2));
        let combatant = Combatant::Monster(m);
        assert_eq!(combatant.save_modifier(Ability::Strength), 2);
        assert_eq!(combatant.save_modifier(Ability::Dexterity), -2);
    }

    #[test]
    fn test_xp_award() {
        let mut c = hero();
        c.award_xp(50);
        c.award_xp(25);
        assert_eq!(c.xp(), 75);
    }
}
