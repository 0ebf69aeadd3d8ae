//! Condition catalog
//!
//! The closed set of standard status conditions. Each condition is a pure,
//! stateless source of mechanical predicates consumed by attack resolution
//! and saving throws:
//! - who gains advantage/disadvantage
//! - who cannot act, move, or speak
//! - which saves auto-fail, which hits auto-crit
//!
//! Every predicate is a total function over the enum; matches stay exhaustive
//! so a new condition cannot be added without deciding its mechanics.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Standard status conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

impl Condition {
    /// Get all conditions
    pub fn all() -> &'static [Condition] {
        &[
            Condition::Blinded,
            Condition::Charmed,
            Condition::Deafened,
            Condition::Frightened,
            Condition::Grappled,
            Condition::Incapacitated,
            Condition::Invisible,
            Condition::Paralyzed,
            Condition::Petrified,
            Condition::Poisoned,
            Condition::Prone,
            Condition::Restrained,
            Condition::Stunned,
            Condition::Unconscious,
        ]
    }

    /// Whether the afflicted cannot take actions
    pub fn causes_incapacitated(&self) -> bool {
        matches!(
            self,
            Condition::Incapacitated
                | Condition::Paralyzed
                | Condition::Petrified
                | Condition::Stunned
                | Condition::Unconscious
        )
    }

    /// Whether attacks against the afflicted have advantage
    pub fn grants_advantage_against(&self) -> bool {
        matches!(
            self,
            Condition::Blinded
                | Condition::Paralyzed
                | Condition::Petrified
                | Condition::Prone
                | Condition::Restrained
                | Condition::Stunned
                | Condition::Unconscious
        )
    }

    /// Whether the afflicted's own attacks have disadvantage
    pub fn causes_disadvantage_on_attacks(&self) -> bool {
        matches!(
            self,
            Condition::Blinded
                | Condition::Frightened
                | Condition::Poisoned
                | Condition::Prone
                | Condition::Restrained
        )
    }

    /// Whether the afflicted's own attacks have advantage
    pub fn grants_advantage_on_attacks(&self) -> bool {
        matches!(self, Condition::Invisible)
    }

    /// Whether the afflicted cannot move
    pub fn prevents_movement(&self) -> bool {
        matches!(
            self,
            Condition::Grappled
                | Condition::Paralyzed
                | Condition::Petrified
                | Condition::Restrained
                | Condition::Stunned
                | Condition::Unconscious
        )
    }

    /// Whether the afflicted automatically fails STR and DEX saves
    pub fn auto_fails_str_dex_saves(&self) -> bool {
        matches!(
            self,
            Condition::Paralyzed
                | Condition::Petrified
                | Condition::Stunned
                | Condition::Unconscious
        )
    }

    /// Whether melee hits against the afflicted are automatic critical hits
    pub fn melee_crits_on_hit(&self) -> bool {
        matches!(self, Condition::Paralyzed | Condition::Unconscious)
    }

    /// Whether the afflicted cannot speak
    pub fn prevents_speech(&self) -> bool {
        matches!(
            self,
            Condition::Paralyzed | Condition::Petrified | Condition::Unconscious
        )
    }

    /// Human-readable description of the mechanical effect
    pub fn description(&self) -> &'static str {
        match self {
            Condition::Blinded => "cannot see; attacks suffer, attackers strike true",
            Condition::Charmed => "regards the charmer as a friendly acquaintance",
            Condition::Deafened => "cannot hear",
            Condition::Frightened => "attacks falter while the source of fear is near",
            Condition::Grappled => "held fast; cannot move",
            Condition::Incapacitated => "cannot take actions",
            Condition::Invisible => "unseen; strikes from nowhere",
            Condition::Paralyzed => "frozen in place; helpless against melee blows",
            Condition::Petrified => "turned to stone",
            Condition::Poisoned => "sickened; attacks falter",
            Condition::Prone => "knocked down",
            Condition::Restrained => "bound; cannot move and attacks falter",
            Condition::Stunned => "reeling; cannot act",
            Condition::Unconscious => "out cold; helpless against melee blows",
        }
    }
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blinded" | "blind" => Ok(Condition::Blinded),
            "charmed" | "charm" => Ok(Condition::Charmed),
            "deafened" | "deaf" => Ok(Condition::Deafened),
            "frightened" | "feared" => Ok(Condition::Frightened),
            "grappled" | "grabbed" => Ok(Condition::Grappled),
            "incapacitated" => Ok(Condition::Incapacitated),
            "invisible" | "invis" => Ok(Condition::Invisible),
            "paralyzed" | "paralysis" => Ok(Condition::Paralyzed),
            "petrified" | "stone" => Ok(Condition::Petrified),
            "poisoned" | "poison" => Ok(Condition::Poisoned),
            "prone" => Ok(Condition::Prone),
            "restrained" | "bound" => Ok(Condition::Restrained),
            "stunned" | "stun" => Ok(Condition::Stunned),
            "unconscious" | "ko" => Ok(Condition::Unconscious),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Condition::Blinded => "blinded",
            Condition::Charmed => "charmed",
            Condition::Deafened => "deafened",
            Condition::Frightened => "frightened",
            Condition::Grappled => "grappled",
            Condition::Incapacitated => "incapacitated",
            Condition::Invisible => "invisible",
            Condition::Paralyzed => "paralyzed",
            Condition::Petrified => "petrified",
            Condition::Poisoned => "poisoned",
            Condition::Prone => "prone",
            Condition::Restrained => "restrained",
            Condition::Stunned => "stunned",
            Condition::Unconscious => "unconscious",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parsing() {
        assert_eq!("restrained".parse::<Condition>(), Ok(Condition::Restrained));
        assert_eq!("STUN".parse::<Condition>(), Ok(Condition::Stunned));
        assert_eq!("blind".parse::<Condition>(), Ok(Condition::Blinded));
        assert!("dizzy".parse::<Condition>().is_err());
    }

    #[test]
    fn test_incapacitating_conditions() {
        assert!(Condition::Paralyzed.causes_incapacitated());
        assert!(Condition::Stunned.causes_incapacitated());
        assert!(Condition::Unconscious.causes_incapacitated());
        assert!(!Condition::Poisoned.causes_incapacitated());
        assert!(!Condition::Restrained.causes_incapacitated());
    }

    #[test]
    fn test_advantage_and_disadvantage() {
        // Blinded cuts both ways
        assert!(Condition::Blinded.grants_advantage_against());
        assert!(Condition::Blinded.causes_disadvantage_on_attacks());

        // Invisible is the only self-advantage condition
        assert!(Condition::Invisible.grants_advantage_on_attacks());
        for condition in Condition::all() {
            if *condition != Condition::Invisible {
                assert!(!condition.grants_advantage_on_attacks());
            }
        }
    }

    #[test]
    fn test_auto_crit_conditions() {
        assert!(Condition::Paralyzed.melee_crits_on_hit());
        assert!(Condition::Unconscious.melee_crits_on_hit());
        assert!(!Condition::Stunned.melee_crits_on_hit());
        assert!(!Condition::Restrained.melee_crits_on_hit());
    }

    #[test]
    fn test_auto_fail_saves() {
        assert!(Condition::Paralyzed.auto_fails_str_dex_saves());
        assert!(Condition::Petrified.auto_fails_str_dex_saves());
        assert!(!Condition::Restrained.auto_fails_str_dex_saves());
        assert!(!Condition::Grappled.auto_fails_str_dex_saves());
    }

    #[test]
    fn test_movement_prevention() {
        assert!(Condition::Grappled.prevents_movement());
        assert!(Condition::Restrained.prevents_movement());
        assert!(!Condition::Frightened.prevents_movement());
    }

    #[test]
    fn test_every_condition_describes_itself() {
        for condition in Condition::all() {
            assert!(!condition.description().is_empty());
            assert!(!condition.to_string().is_empty());
        }
    }
}
