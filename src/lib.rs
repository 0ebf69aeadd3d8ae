//! skirmish - a deterministic turn-based combat resolver
//!
//! A self-contained d20 combat engine:
//! - dice notation parsing and rolls through a swappable die source
//! - initiative, attack resolution, advantage/disadvantage
//! - status conditions and timed effects with saving-throw escapes
//! - monster stat blocks with behavior-driven AI and special abilities
//! - a session state machine ending in Victory, Defeat, or Fled
//!
//! Every operation returns structured outcomes plus display lines showing
//! each roll, so callers can render or assert on either.

pub mod abilities;
pub mod combatant;
pub mod conditions;
pub mod dice;
pub mod effects;
pub mod error;
pub mod monster;
pub mod session;

pub use abilities::{Ability, AbilityScores};
pub use combatant::{Character, Combatant, Item};
pub use conditions::Condition;
pub use dice::{parse_dice, Dice, DiceRoll, DieSource, RollMode};
pub use effects::{Duration, EffectManager, SaveAttempt, StatusEffect};
pub use error::CombatError;
pub use monster::{Behavior, Monster, SpecialAbility};
pub use session::{CombatSession, CombatUpdate, Outcome};
