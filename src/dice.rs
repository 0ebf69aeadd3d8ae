//! Dice rolling system
//!
//! Parses dice notation like "2d6+3" and rolls it through an injectable die
//! source, so encounters can run on real randomness, a fixed seed, or a
//! scripted sequence of faces:
//! - d20 rolls with advantage/disadvantage (both faces always recorded)
//! - DC checks (roll + modifier vs difficulty class)
//! - detailed multi-die rolls for damage expressions

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation")]
    MissingSeparator,

    #[error("invalid dice count: {0}")]
    InvalidCount(String),

    #[error("invalid die sides: {0}")]
    InvalidSides(String),

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("dice count must be at least 1")]
    ZeroCount,

    #[error("die sides must be at least 1")]
    ZeroSides,
}

/// A parsed dice expression like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Flat modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice expression
    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i32 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i32
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let notation = notation.trim().to_lowercase();

    let d_pos = notation.find('d').ok_or(DiceError::MissingSeparator)?;

    // Count before 'd'; "d6" means "1d6"
    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
    };

    if count == 0 {
        return Err(DiceError::ZeroCount);
    }

    let rest = &notation[d_pos + 1..];

    // Split off a trailing +N or -N modifier
    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..plus_pos], modifier)
    } else if let Some(minus_pos) = rest.rfind('-') {
        if minus_pos == 0 {
            (rest, 0)
        } else {
            let mod_str = &rest[minus_pos..]; // includes the minus sign
            let modifier: i32 = mod_str
                .parse()
                .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
            (&rest[..minus_pos], modifier)
        }
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidSides(sides_str.to_string()))?;

    if sides == 0 {
        return Err(DiceError::ZeroSides);
    }

    Ok(DiceRoll {
        count,
        sides,
        modifier,
    })
}

/// A source of individual die faces.
///
/// Every roll in the engine funnels through one of these, so a whole
/// encounter can be replayed by swapping in a deterministic source.
pub trait DieSource {
    /// Roll a die and return a face in `1..=sides`
    fn roll(&mut self, sides: u32) -> u32;
}

/// Thread-local RNG source (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDie;

impl DieSource for RandomDie {
    fn roll(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides)
    }
}

/// Seeded RNG source for reproducible encounters
#[derive(Debug, Clone)]
pub struct SeededDie(SmallRng);

impl SeededDie {
    /// Create a source from a u64 seed
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

impl DieSource for SeededDie {
    fn roll(&mut self, sides: u32) -> u32 {
        self.0.random_range(1..=sides)
    }
}

/// Source pinned to a single face (clamped to the die being rolled)
#[derive(Debug, Clone, Copy)]
pub struct FixedDie(pub u32);

impl DieSource for FixedDie {
    fn roll(&mut self, sides: u32) -> u32 {
        self.0.clamp(1, sides)
    }
}

/// Source that replays a scripted sequence of faces, repeating at the end
#[derive(Debug, Clone)]
pub struct SequenceDie {
    faces: Vec<u32>,
    next: usize,
}

impl SequenceDie {
    /// Create a source from a non-empty face script
    pub fn new(faces: Vec<u32>) -> Self {
        assert!(!faces.is_empty(), "face script must not be empty");
        Self { faces, next: 0 }
    }
}

impl DieSource for SequenceDie {
    fn roll(&mut self, sides: u32) -> u32 {
        let face = self.faces[self.next % self.faces.len()];
        self.next += 1;
        face.clamp(1, sides)
    }
}

/// How a d20 was rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollMode {
    /// One die
    Flat,
    /// Two dice, keep the higher
    Advantage,
    /// Two dice, keep the lower
    Disadvantage,
}

/// A resolved d20 roll with both faces preserved for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D20Outcome {
    /// First face, and the second when rolled with advantage/disadvantage
    pub faces: (u32, Option<u32>),
    /// The face that counted
    pub kept: u32,
    /// Static modifier added to the kept face
    pub modifier: i32,
    /// Kept face plus modifier
    pub total: i32,
    /// How the roll was made
    pub mode: RollMode,
}

impl std::fmt::Display for D20Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.faces {
            (first, Some(second)) => {
                let word = match self.mode {
                    RollMode::Advantage => "advantage",
                    _ => "disadvantage",
                };
                write!(
                    f,
                    "d20 [{}, {}] ({}) keep {}{:+} = {}",
                    first, second, word, self.kept, self.modifier, self.total
                )
            }
            (first, None) => write!(f, "d20 [{}]{:+} = {}", first, self.modifier, self.total),
        }
    }
}

/// A resolved dice-expression roll with per-die faces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceOutcome {
    /// The expression that was rolled
    pub notation: DiceRoll,
    /// Individual die faces
    pub faces: Vec<u32>,
    /// Sum of faces plus the expression's modifier
    pub total: i32,
}

impl std::fmt::Display for DiceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let faces: Vec<String> = self.faces.iter().map(|d| d.to_string()).collect();
        write!(
            f,
            "{} [{}] = {}",
            self.notation,
            faces.join(", "),
            self.total
        )
    }
}

/// A resolved check against a difficulty class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The raw d20 face
    pub roll: u32,
    /// Static modifier
    pub modifier: i32,
    /// Face plus modifier
    pub total: i32,
    /// The difficulty class checked against
    pub dc: i32,
    /// Whether total >= dc
    pub success: bool,
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "d20 [{}]{:+} = {} vs DC {}: {}",
            self.roll,
            self.modifier,
            self.total,
            self.dc,
            if self.success { "success" } else { "failure" }
        )
    }
}

/// Dice roller owning a die source
pub struct Dice {
    source: Box<dyn DieSource>,
}

impl Dice {
    /// Create a roller backed by the thread-local RNG
    pub fn new() -> Self {
        Self::with_source(Box::new(RandomDie))
    }

    /// Create a reproducible roller from a seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(Box::new(SeededDie::new(seed)))
    }

    /// Create a roller from any die source
    pub fn with_source(source: Box<dyn DieSource>) -> Self {
        Self { source }
    }

    /// Roll a single die, returning a face in `1..=sides`
    pub fn roll(&mut self, sides: u32) -> u32 {
        self.source.roll(sides)
    }

    /// Roll a single die and add a modifier
    pub fn roll_with_modifier(&mut self, sides: u32, modifier: i32) -> i32 {
        self.roll(sides) as i32 + modifier
    }

    /// Roll a dice expression, keeping the individual faces
    pub fn roll_detailed(&mut self, spec: &DiceRoll) -> DiceOutcome {
        let mut faces = Vec::with_capacity(spec.count as usize);
        for _ in 0..spec.count {
            faces.push(self.roll(spec.sides));
        }
        let sum: u32 = faces.iter().sum();
        DiceOutcome {
            notation: *spec,
            faces,
            total: sum as i32 + spec.modifier,
        }
    }

    /// Parse and roll a notation string like "2d6+3"
    pub fn eval(&mut self, notation: &str) -> Result<i32, DiceError> {
        let spec: DiceRoll = notation.parse()?;
        Ok(self.roll_detailed(&spec).total)
    }

    /// Roll a d20 with the given mode and static modifier
    pub fn d20(&mut self, mode: RollMode, modifier: i32) -> D20Outcome {
        let first = self.roll(20);
        let (faces, kept) = match mode {
            RollMode::Flat => ((first, None), first),
            RollMode::Advantage => {
                let second = self.roll(20);
                ((first, Some(second)), first.max(second))
            }
            RollMode::Disadvantage => {
                let second = self.roll(20);
                ((first, Some(second)), first.min(second))
            }
        };
        D20Outcome {
            faces,
            kept,
            modifier,
            total: kept as i32 + modifier,
            mode,
        }
    }

    /// Roll a flat d20 check against a difficulty class
    pub fn check(&mut self, modifier: i32, dc: i32) -> CheckOutcome {
        let roll = self.roll(20);
        let total = roll as i32 + modifier;
        CheckOutcome {
            roll,
            modifier,
            total,
            dc,
            success: total >= dc,
        }
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dice").finish_non_exhaustive()
    }
}
