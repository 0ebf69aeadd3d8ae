//! Combat error types
//!
//! Expected domain outcomes (wrong turn, unknown verb, bad target) are typed
//! errors the caller branches on, never panics.

use thiserror::Error;

/// Errors surfaced by combat session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("not in combat")]
    NotInCombat,

    #[error("cannot start combat without enemies")]
    NoEnemies,

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("it is not an enemy's turn")]
    NotEnemyTurn,

    #[error("no target named '{0}'")]
    UnknownTarget(String),

    #[error("unknown action '{0}' (valid actions: attack, hit, strike, flee, run, escape)")]
    UnknownAction(String),

    #[error("{0} is in no state to attack")]
    AttackerDown(String),

    #[error("{0} is already defeated")]
    TargetAlreadyDown(String),
}
