//! Rank tiers derived from lifetime XP.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered rank tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Rank {
    #[default]
    Bronze,
    Silver,
    Gold,
    Diamond,
    Master,
    Ascended,
}

/// Minimum lifetime XP for each tier, ascending.
const RANK_TABLE: [(u64, Rank); 6] = [
    (0, Rank::Bronze),
    (750, Rank::Silver),
    (1500, Rank::Gold),
    (2500, Rank::Diamond),
    (5000, Rank::Master),
    (10000, Rank::Ascended),
];

impl Rank {
    /// Highest tier whose threshold `xp` reaches.
    pub fn for_xp(xp: u64) -> Rank {
        RANK_TABLE
            .iter()
            .rev()
            .find(|(threshold, _)| xp >= *threshold)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::Bronze)
    }

    /// XP needed to hold this tier.
    pub fn threshold(self) -> u64 {
        RANK_TABLE
            .iter()
            .find(|(_, rank)| *rank == self)
            .map(|(threshold, _)| *threshold)
            .unwrap_or(0)
    }

    /// The tier above this one, if any.
    pub fn next(self) -> Option<Rank> {
        RANK_TABLE
            .iter()
            .map(|(_, rank)| *rank)
            .find(|rank| *rank > self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Diamond => "Diamond",
            Rank::Master => "Master",
            Rank::Ascended => "Ascended",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
