//! Shared fixtures for encounter tests

use skirmish::dice::DiceRoll;
use skirmish::{AbilityScores, Character, Item, Monster};

/// A plain hero: all 10s, no proficiency, AC 10, 20 HP, empty hands
pub fn hero() -> Character {
    Character::new(
        "Hero",
        AbilityScores::new(10, 10, 10, 10, 10, 10),
        20,
        10,
    )
    .with_proficiency_bonus(0)
}

/// The plain hero carrying a 1d6 shortsword
pub fn armed_hero() -> Character {
    let mut hero = hero();
    hero.equip_main_hand(Item::new("Shortsword", DiceRoll::new(1, 6, 0)));
    hero
}

/// A stock goblin worth 50 XP
pub fn goblin(name: &str) -> Monster {
    Monster::new(name, 7, 10, DiceRoll::new(1, 4, 0)).with_challenge(0.25, 50)
}
