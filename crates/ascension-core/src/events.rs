use serde::{Deserialize, Serialize};

use crate::ledger::Rank;

/// Result of one grind attempt.
///
/// Only the highest-priority notable event is reported per call:
/// badge > streak milestone > rank-up > plain success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrindOutcome {
    /// Rejected; nothing changed.
    Cooldown { remaining_secs: i64 },
    BadgeUnlocked { badge: String },
    StreakMilestone { streak: u32 },
    RankUp { rank: Rank },
    Success { xp_gained: u64 },
}

impl GrindOutcome {
    /// Whether the attempt was accepted and state mutated.
    pub fn accepted(&self) -> bool {
        !matches!(self, GrindOutcome::Cooldown { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GrindOutcome::Cooldown { .. } => "cooldown",
            GrindOutcome::BadgeUnlocked { .. } => "badge_unlocked",
            GrindOutcome::StreakMilestone { .. } => "streak_milestone",
            GrindOutcome::RankUp { .. } => "rank_up",
            GrindOutcome::Success { .. } => "success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(GrindOutcome::RankUp { rank: Rank::Gold }).unwrap();
        assert_eq!(json["type"], "rank_up");
        assert_eq!(json["rank"], "Gold");
    }

    #[test]
    fn cooldown_is_not_accepted() {
        assert!(!GrindOutcome::Cooldown { remaining_secs: 3 }.accepted());
        assert!(GrindOutcome::Success { xp_gained: 50 }.accepted());
    }
}
