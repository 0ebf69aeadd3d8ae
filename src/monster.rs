//! Monster stat blocks
//!
//! A monster carries its own attack and damage formulas plus:
//! - size/type/alignment classification
//! - a behavior tag driving targeting and flee decisions
//! - an optional special-ability tag resolved once at construction

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::abilities::{Ability, AbilityScores};
use crate::dice::DiceRoll;

/// Saving-throw DC for the Disarm special ability
pub const DISARM_DC: i32 = 12;
/// Saving-throw DC for the Adhesive special ability
pub const ADHESIVE_DC: i32 = 12;

/// Creature size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Size {
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Size::Tiny => "tiny",
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::Huge => "huge",
            Size::Gargantuan => "gargantuan",
        };
        write!(f, "{}", s)
    }
}

/// Combat behavior driving targeting and flee decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Behavior {
    /// Fights to the death, targets its aggressor
    #[default]
    Aggressive,
    /// Flees when badly wounded (at or below 25% HP)
    Defensive,
    /// Flees when bloodied (at or below 50% HP)
    Cowardly,
    /// Picks the weakest target; never flees
    Tactical,
}

impl Behavior {
    /// HP percentage at or below which this behavior attempts to flee
    pub fn flee_threshold_percent(&self) -> Option<u32> {
        match self {
            Behavior::Cowardly => Some(50),
            Behavior::Defensive => Some(25),
            Behavior::Aggressive | Behavior::Tactical => None,
        }
    }
}

impl FromStr for Behavior {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aggressive" => Ok(Behavior::Aggressive),
            "defensive" => Ok(Behavior::Defensive),
            "cowardly" | "coward" => Ok(Behavior::Cowardly),
            "tactical" => Ok(Behavior::Tactical),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Behavior::Aggressive => "aggressive",
            Behavior::Defensive => "defensive",
            Behavior::Cowardly => "cowardly",
            Behavior::Tactical => "tactical",
        };
        write!(f, "{}", s)
    }
}

/// A monster's special ability, resolved from its stat-block name.
///
/// Stat blocks name abilities in free text ("Disarming Strike", "Adhesive
/// Hide"); the name is matched once here, at construction, so attack
/// resolution dispatches on a typed tag rather than re-searching strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAbility {
    /// On hit, the target saves on DEX or drops its main-hand weapon
    Disarm { dc: i32 },
    /// On hit, the target saves on STR or is restrained until it escapes
    Adhesive { dc: i32 },
    /// Unrecognized ability; announced but mechanically inert
    Other(String),
}

impl SpecialAbility {
    /// Resolve a stat-block ability name into a typed tag
    pub fn parse(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("disarm") {
            SpecialAbility::Disarm { dc: DISARM_DC }
        } else if lower.contains("adhesive") {
            SpecialAbility::Adhesive { dc: ADHESIVE_DC }
        } else {
            SpecialAbility::Other(name.to_string())
        }
    }

    /// The save ability the target rolls against this ability, if any
    pub fn save_ability(&self) -> Option<Ability> {
        match self {
            SpecialAbility::Disarm { .. } => Some(Ability::Dexterity),
            SpecialAbility::Adhesive { .. } => Some(Ability::Strength),
            SpecialAbility::Other(_) => None,
        }
    }
}

impl std::fmt::Display for SpecialAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecialAbility::Disarm { .. } => write!(f, "Disarm"),
            SpecialAbility::Adhesive { .. } => write!(f, "Adhesive"),
            SpecialAbility::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A monster combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    /// Display name
    pub name: String,
    /// Size category
    pub size: Size,
    /// Creature type line (e.g. "beast", "ooze")
    pub creature_type: String,
    /// Alignment line (e.g. "unaligned", "chaotic evil")
    pub alignment: String,
    hp: i32,
    max_hp: i32,
    /// Armor class
    pub armor_class: i32,
    /// Ability scores (monsters use raw modifiers, no proficiency)
    pub scores: AbilityScores,
    /// Static bonus added to attack rolls
    pub attack_bonus: i32,
    /// Damage expression rolled on a hit
    pub damage_dice: DiceRoll,
    /// Challenge rating
    pub challenge_rating: f32,
    /// XP awarded when defeated
    pub xp_value: u32,
    /// Optional special ability triggered on a successful hit
    pub special_ability: Option<SpecialAbility>,
    /// Behavior tag
    pub behavior: Behavior,
}

impl Monster {
    /// Create a monster with default classification and behavior
    pub fn new(name: &str, max_hp: i32, armor_class: i32, damage_dice: DiceRoll) -> Self {
        Self {
            name: name.to_string(),
            size: Size::default(),
            creature_type: "beast".to_string(),
            alignment: "unaligned".to_string(),
            hp: max_hp,
            max_hp,
            armor_class,
            scores: AbilityScores::default(),
            attack_bonus: 0,
            damage_dice,
            challenge_rating: 0.25,
            xp_value: 50,
            special_ability: None,
            behavior: Behavior::default(),
        }
    }

    /// Set the size/type/alignment classification
    pub fn with_classification(mut self, size: Size, creature_type: &str, alignment: &str) -> Self {
        self.size = size;
        self.creature_type = creature_type.to_string();
        self.alignment = alignment.to_string();
        self
    }

    /// Set ability scores
    pub fn with_scores(mut self, scores: AbilityScores) -> Self {
        self.scores = scores;
        self
    }

    /// Set the attack bonus
    pub fn with_attack_bonus(mut self, bonus: i32) -> Self {
        self.attack_bonus = bonus;
        self
    }

    /// Set challenge rating and XP value
    pub fn with_challenge(mut self, rating: f32, xp_value: u32) -> Self {
        self.challenge_rating = rating;
        self.xp_value = xp_value;
        self
    }

    /// Set the behavior tag
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Attach a special ability by its stat-block name
    pub fn with_special_ability(mut self, name: &str) -> Self {
        self.special_ability = Some(SpecialAbility::parse(name));
        self
    }

    /// Current hit points
    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Whether the monster is still up
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Restore to full hit points (combat start)
    pub fn restore_to_full(&mut self) {
        self.hp = self.max_hp;
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

    /// Modifier for an ability (monsters have no proficiency bonus)
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.scores.modifier(ability)
    }

    /// Whether this monster's behavior calls for a flee attempt right now
    pub fn wants_to_flee(&self) -> bool {
        match self.behavior.flee_threshold_percent() {
            Some(threshold) => self.hp * 100 <= self.max_hp * threshold as i32,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin() -> Monster {
        Monster::new("Goblin", 7, 13, DiceRoll::new(1, 6, 2))
            .with_scores(AbilityScores::new(8, 14, 10, 10, 8, 8))
            .with_attack_bonus(4)
            .with_challenge(0.25, 50)
    }

    #[test]
    fn test_hp_clamping() {
        let mut m = goblin();
        assert_eq!(m.take_damage(5), 5);
        assert_eq!(m.hp(), 2);

        // Overkill is clamped to remaining HP
        assert_eq!(m.take_damage(100), 2);
        assert_eq!(m.hp(), 0);
        assert!(!m.is_alive());

        // Damage at zero applies nothing
        assert_eq!(m.take_damage(10), 0);

        // Overheal is clamped at max
        assert_eq!(m.heal(100), 7);
        assert_eq!(m.hp(), m.max_hp());
    }

    #[test]
    fn test_negative_amounts_apply_nothing() {
        let mut m = goblin();
        assert_eq!(m.take_damage(-5), 0);
        assert_eq!(m.hp(), 7);
        m.take_damage(3);
        assert_eq!(m.heal(-5), 0);
        assert_eq!(m.hp(), 4);
    }

    #[test]
    fn test_restore_to_full() {
        let mut m = goblin();
        m.take_damage(6);
        m.restore_to_full();
        assert_eq!(m.hp(), 7);
    }

    #[test]
    fn test_flee_thresholds() {
        let mut coward = goblin().with_behavior(Behavior::Cowardly);
        assert!(!coward.wants_to_flee());
        coward.take_damage(4); // 3/7 < 50%
        assert!(coward.wants_to_flee());

        let mut defensive = goblin().with_behavior(Behavior::Defensive);
        defensive.take_damage(4); // 3/7 is above 25%
        assert!(!defensive.wants_to_flee());
        defensive.take_damage(2); // 1/7 <= 25%
        assert!(defensive.wants_to_flee());

        let mut brave = goblin().with_behavior(Behavior::Aggressive);
        brave.take_damage(6);
        assert!(!brave.wants_to_flee());
    }

    #[test]
    fn test_special_ability_resolution() {
        assert_eq!(
            SpecialAbility::parse("Disarming Strike"),
            SpecialAbility::Disarm { dc: DISARM_DC }
        );
        assert_eq!(
            SpecialAbility::parse("Adhesive Hide"),
            SpecialAbility::Adhesive { dc: ADHESIVE_DC }
        );
        assert_eq!(
            SpecialAbility::parse("Terrifying Howl"),
            SpecialAbility::Other("Terrifying Howl".to_string())
        );
    }

    #[test]
    fn test_special_ability_save_abilities() {
        assert_eq!(
            SpecialAbility::parse("disarm").save_ability(),
            Some(Ability::Dexterity)
        );
        assert_eq!(
            SpecialAbility::parse("adhesive").save_ability(),
            Some(Ability::Strength)
        );
        assert_eq!(SpecialAbility::parse("howl").save_ability(), None);
    }

    #[test]
    fn test_behavior_parsing() {
        assert_eq!("cowardly".parse::<Behavior>(), Ok(Behavior::Cowardly));
        assert_eq!("TACTICAL".parse::<Behavior>(), Ok(Behavior::Tactical));
        assert!("sneaky".parse::<Behavior>().is_err());
    }
}
