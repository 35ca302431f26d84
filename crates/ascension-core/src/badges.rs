//! Badge catalog and unlock scan.
//!
//! Badges are declared as a fixed, ordered table of [`BadgeDefinition`]s.
//! The scan walks the table in order and awards at most one badge per call;
//! callers that want every pending badge simply scan again.

use serde::Serialize;

use crate::challenges::{self, ChallengeKey};
use crate::user::UserRecord;

/// What a user must reach for a badge to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "required", rename_all = "snake_case")]
pub enum BadgeCriterion {
    OnboardingComplete,
    /// Grinds performed in the current leaderboard week.
    Grinds(u64),
    Streak(u32),
    /// Lifetime XP.
    Xp(u64),
    /// Flagged top 3 at the last weekly reset.
    Top3,
}

impl BadgeCriterion {
    pub fn is_met(&self, user: &UserRecord) -> bool {
        match *self {
            BadgeCriterion::OnboardingComplete => user.onboarding_complete,
            BadgeCriterion::Grinds(required) => user.weekly.grinds >= required,
            BadgeCriterion::Streak(required) => user.streak >= required,
            BadgeCriterion::Xp(required) => user.xp >= required,
            BadgeCriterion::Top3 => user.weekly.top3,
        }
    }

    /// Human-readable progress toward this criterion.
    pub fn progress(&self, user: &UserRecord) -> String {
        match *self {
            BadgeCriterion::OnboardingComplete => {
                if user.onboarding_complete {
                    "Completed".to_string()
                } else {
                    "Complete onboarding".to_string()
                }
            }
            BadgeCriterion::Grinds(required) => {
                format!("{}/{} grinds", user.weekly.grinds, required)
            }
            BadgeCriterion::Streak(required) => format!("{}/{} days", user.streak, required),
            BadgeCriterion::Xp(required) => format!("{}/{} XP", user.xp, required),
            BadgeCriterion::Top3 => "Finish top 3 on weekly leaderboard".to_string(),
        }
    }
}

/// A badge in the scan catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub criterion: BadgeCriterion,
}

/// Awarded by the daily spin jackpot; not part of the scan.
pub const WHEEL_MASTER: &str = "Wheel Master";
/// Awarded when a quantum flip lands on its edge; not part of the scan.
pub const QUANTUM_MASTER: &str = "Quantum Master";

const BADGES: [BadgeDefinition; 8] = [
    BadgeDefinition {
        name: "Initiate",
        description: "Complete the onboarding process and begin your ascension.",
        criterion: BadgeCriterion::OnboardingComplete,
    },
    BadgeDefinition {
        name: "First Grind",
        description: "Complete your first grind session.",
        criterion: BadgeCriterion::Grinds(1),
    },
    BadgeDefinition {
        name: "Grind Master",
        description: "Complete 100 grind sessions.",
        criterion: BadgeCriterion::Grinds(100),
    },
    BadgeDefinition {
        name: "Streak Keeper",
        description: "Maintain a 7-day streak.",
        criterion: BadgeCriterion::Streak(7),
    },
    BadgeDefinition {
        name: "Streak Legend",
        description: "Maintain a 30-day streak.",
        criterion: BadgeCriterion::Streak(30),
    },
    BadgeDefinition {
        name: "XP Hunter",
        description: "Reach 1000 XP.",
        criterion: BadgeCriterion::Xp(1000),
    },
    BadgeDefinition {
        name: "XP Champion",
        description: "Reach 10000 XP.",
        criterion: BadgeCriterion::Xp(10000),
    },
    BadgeDefinition {
        name: "Dominator",
        description: "Finish in the top 3 on the weekly leaderboard.",
        criterion: BadgeCriterion::Top3,
    },
];

/// The scan catalog, in scan order.
pub fn badge_definitions() -> &'static [BadgeDefinition] {
    &BADGES
}

pub fn find_badge(name: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.name == name)
}

/// Catalog badges plus the reward-only ones.
pub fn is_known(name: &str) -> bool {
    find_badge(name).is_some() || name == WHEEL_MASTER || name == QUANTUM_MASTER
}

/// Award the first unowned badge whose criterion is met.
///
/// Returns the awarded name.
pub fn scan_new_badge(user: &mut UserRecord) -> Option<&'static str> {
    let badge = BADGES
        .iter()
        .filter(|b| !user.has_badge(b.name))
        .find(|b| b.criterion.is_met(user))?;

    award(user, badge.name);
    Some(badge.name)
}

/// Give `user` a badge by name, catalog or not.
///
/// Returns false if already owned. A new badge refreshes the weekly badge
/// challenge.
pub fn award(user: &mut UserRecord, name: &str) -> bool {
    if !user.push_badge(name) {
        return false;
    }
    let earned = user.badges_this_week();
    challenges::update_progress(user, ChallengeKey::BadgeCollector, earned);
    true
}

/// [`award`] plus an `Unlocked badge: {name}` line in the activity feed.
pub fn unlock(user: &mut UserRecord, name: &str, time: i64, activity_cap: usize) -> bool {
    if !award(user, name) {
        return false;
    }
    user.push_activity(time, format!("Unlocked badge: {name}"), activity_cap);
    true
}

/// [`scan_new_badge`], logging the unlock like [`unlock`] does.
pub fn unlock_next(
    user: &mut UserRecord,
    time: i64,
    activity_cap: usize,
) -> Option<&'static str> {
    let badge = scan_new_badge(user)?;
    user.push_activity(time, format!("Unlocked badge: {badge}"), activity_cap);
    Some(badge)
}

/// Progress string for a named badge; does not mutate.
pub fn badge_progress(user: &UserRecord, name: &str) -> String {
    match find_badge(name) {
        Some(badge) => badge.criterion.progress(user),
        None => "Unknown".to_string(),
    }
}
