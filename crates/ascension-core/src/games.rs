//! Mini-game settlement.
//!
//! Games are played by the caller; only the resolved outcome reaches the
//! ledger. Each [`GameResult`] settles into a signed XP delta, whether a gain
//! is mirrored into the weekly total, and an optional reward badge. Losses
//! never touch weekly XP.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::badges::QUANTUM_MASTER;

/// Streak bonus per day in the dark corridor.
pub const CORRIDOR_STREAK_FACTOR: f64 = 0.03;
/// Compounding bonus per corridor depth.
pub const CORRIDOR_DEPTH_FACTOR: f64 = 1.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceOutcome {
    Win,
    Draw,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipOutcome {
    Correct,
    Wrong,
    /// The coin landed on its edge.
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleOutcome {
    /// Predicted "same" and it was.
    Same,
    /// Predicted higher or lower correctly.
    HigherLower,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

impl Difficulty {
    pub fn reward(self) -> i64 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 180,
            Difficulty::Hard => 260,
            Difficulty::Elite => 420,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorRoom {
    Treasure,
    Secret,
    Trap,
}

impl CorridorRoom {
    /// Range the caller rolls the base amount from.
    pub fn base_range(self) -> RangeInclusive<u64> {
        match self {
            CorridorRoom::Treasure => 25..=75,
            CorridorRoom::Secret => 10..=35,
            CorridorRoom::Trap => 5..=20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RushOutcome {
    /// Named the final symbol.
    Final,
    /// Counted the symbol occurrences.
    Count,
    Wrong,
}

/// A resolved mini-game round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameResult {
    DiceBattle { outcome: DiceOutcome },
    QuantumFlip { outcome: FlipOutcome },
    Quiz { correct: bool },
    XpTyphoon { taps: u32 },
    /// `None` when the player tapped before the signal.
    TapSpeed { reaction_ms: Option<u64> },
    BombDefusal { safe: bool },
    CorruptedOracle { outcome: OracleOutcome },
    /// `None` when the puzzle was failed.
    MindHack { solved: Option<Difficulty> },
    DarkCorridor { room: CorridorRoom, base: u64, depth: u32 },
    AscensionRush { outcome: RushOutcome },
}

/// What a round does to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub delta: i64,
    pub mirror_weekly: bool,
    pub badge: Option<&'static str>,
}

impl Settlement {
    fn gain(delta: i64, mirror_weekly: bool) -> Self {
        Self {
            delta,
            mirror_weekly,
            badge: None,
        }
    }

    fn loss(amount: i64) -> Self {
        Self {
            delta: -amount,
            mirror_weekly: false,
            badge: None,
        }
    }
}

impl GameResult {
    pub fn name(&self) -> &'static str {
        match self {
            GameResult::DiceBattle { .. } => "Dice Battle",
            GameResult::QuantumFlip { .. } => "Quantum Flip",
            GameResult::Quiz { .. } => "Quiz",
            GameResult::XpTyphoon { .. } => "XP Typhoon",
            GameResult::TapSpeed { .. } => "Tap Speed",
            GameResult::BombDefusal { .. } => "Bomb Defusal",
            GameResult::CorruptedOracle { .. } => "Corrupted Oracle",
            GameResult::MindHack { .. } => "Mind Hack",
            GameResult::DarkCorridor { .. } => "Dark Corridor",
            GameResult::AscensionRush { .. } => "Ascension Rush",
        }
    }

    /// Settle the round for a player on `streak`.
    pub fn settle(&self, streak: u32) -> Settlement {
        match *self {
            GameResult::DiceBattle { outcome } => {
                let xp = match outcome {
                    DiceOutcome::Win => 200,
                    DiceOutcome::Draw => 100,
                    DiceOutcome::Lose => 50,
                };
                Settlement::gain(xp, true)
            }
            GameResult::QuantumFlip { outcome } => match outcome {
                FlipOutcome::Correct => Settlement::gain(100, false),
                FlipOutcome::Wrong => Settlement::loss(20),
                FlipOutcome::Edge => Settlement {
                    delta: 500,
                    mirror_weekly: false,
                    badge: Some(QUANTUM_MASTER),
                },
            },
            GameResult::Quiz { correct: true } => Settlement::gain(120, false),
            GameResult::Quiz { correct: false } => Settlement::loss(15),
            GameResult::XpTyphoon { taps } if taps < 3 => Settlement::loss(5),
            GameResult::XpTyphoon { taps } => Settlement::gain(4 * i64::from(taps), false),
            GameResult::TapSpeed { reaction_ms } => {
                let xp = match reaction_ms {
                    Some(ms) if ms < 300 => 200,
                    Some(ms) if ms < 600 => 120,
                    Some(ms) if ms < 1000 => 60,
                    _ => 0,
                };
                Settlement::gain(xp, true)
            }
            GameResult::BombDefusal { safe: true } => Settlement::gain(150, true),
            GameResult::BombDefusal { safe: false } => Settlement::loss(5),
            GameResult::CorruptedOracle { outcome } => match outcome {
                OracleOutcome::Same => Settlement::gain(200, false),
                OracleOutcome::HigherLower => Settlement::gain(100, false),
                OracleOutcome::Wrong => Settlement::loss(15),
            },
            GameResult::MindHack { solved: Some(level) } => Settlement::gain(level.reward(), true),
            GameResult::MindHack { solved: None } => Settlement::loss(12),
            GameResult::DarkCorridor { room, base, depth } => {
                let amount = corridor_amount(base, streak, depth);
                match room {
                    CorridorRoom::Treasure | CorridorRoom::Secret => Settlement::gain(amount, true),
                    CorridorRoom::Trap => Settlement::loss(amount),
                }
            }
            GameResult::AscensionRush { outcome } => match outcome {
                RushOutcome::Final => Settlement::gain(100, true),
                RushOutcome::Count => Settlement::gain(200, true),
                RushOutcome::Wrong => Settlement::loss(10),
            },
        }
    }
}

/// `floor(base * (1 + 0.03 * streak) * 1.12^depth)`.
pub fn corridor_amount(base: u64, streak: u32, depth: u32) -> i64 {
    let depth = i32::try_from(depth).unwrap_or(i32::MAX);
    let multiplier = (1.0 + CORRIDOR_STREAK_FACTOR * f64::from(streak))
        * CORRIDOR_DEPTH_FACTOR.powi(depth);
    let amount = (base as f64 * multiplier).floor();
    if amount >= i64::MAX as f64 {
        i64::MAX
    } else {
        amount as i64
    }
}
