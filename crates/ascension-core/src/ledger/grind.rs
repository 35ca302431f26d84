//! Grind state machine.
//!
//! ```text
//! cooldown check -> daily rollover -> apply -> challenge sync
//!     -> badge scan | streak milestone | rank-up | success
//! ```
//!
//! Operates on a single [`UserRecord`]; the caller owns loading and saving.

use chrono::{DateTime, Utc};

use super::streak::{is_milestone, next_streak, DATE_FORMAT};
use crate::badges;
use crate::challenges::{self, ChallengeKey};
use crate::events::GrindOutcome;
use crate::user::{UserRecord, ACTIVITY_CAP};

/// Seconds required between two accepted grinds.
pub const COOLDOWN_SECS: i64 = 30;
/// XP credited per accepted grind.
pub const GRIND_XP: u64 = 50;

/// Tunables for the grind action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrindRules {
    pub cooldown_secs: i64,
    pub grind_xp: u64,
    pub activity_cap: usize,
}

impl Default for GrindRules {
    fn default() -> Self {
        Self {
            cooldown_secs: COOLDOWN_SECS,
            grind_xp: GRIND_XP,
            activity_cap: ACTIVITY_CAP,
        }
    }
}

/// Run one grind attempt against `user` at `now`.
pub fn run_grind(user: &mut UserRecord, now: DateTime<Utc>, rules: &GrindRules) -> GrindOutcome {
    let now_ts = now.timestamp();
    // Stored timestamps may be far outside chrono's range.
    let elapsed = now_ts.saturating_sub(user.last_grind);
    if elapsed < rules.cooldown_secs {
        return GrindOutcome::Cooldown {
            remaining_secs: rules.cooldown_secs.saturating_sub(elapsed),
        };
    }

    let today = now.date_naive();
    let today_str = today.format(DATE_FORMAT).to_string();
    if user.last_grind_date.as_deref() != Some(today_str.as_str()) {
        user.grinds_today = 0;
        user.xp_today = 0;
        user.streak = next_streak(user.streak, user.last_grind_date.as_deref(), today);
        user.last_grind_date = Some(today_str);
    }

    user.grinds_today += 1;
    user.last_grind = now_ts;
    user.xp = user.xp.saturating_add(rules.grind_xp);
    user.xp_today = user.xp_today.saturating_add(rules.grind_xp);
    user.weekly.xp = user.weekly.xp.saturating_add(rules.grind_xp);
    user.weekly.grinds += 1;
    user.push_activity(
        now_ts,
        format!("Performed grind (+{} XP)", rules.grind_xp),
        rules.activity_cap,
    );

    challenges::update_progress(user, ChallengeKey::GrindsToday, user.grinds_today);
    challenges::update_progress(user, ChallengeKey::XpToday, user.xp_today);
    challenges::update_progress(user, ChallengeKey::XpWeek, user.weekly.xp);
    challenges::update_progress(user, ChallengeKey::GrindsWeek, user.weekly.grinds);
    challenges::update_progress(user, ChallengeKey::StreakDay, 1);

    // Rank is stored even when a higher-priority event is the one reported.
    let rank_up = user.recompute_rank();

    if let Some(badge) = badges::unlock_next(user, now_ts, rules.activity_cap) {
        return GrindOutcome::BadgeUnlocked {
            badge: badge.to_string(),
        };
    }
    if is_milestone(user.streak) {
        return GrindOutcome::StreakMilestone {
            streak: user.streak,
        };
    }
    if let Some(rank) = rank_up {
        return GrindOutcome::RankUp { rank };
    }
    GrindOutcome::Success {
        xp_gained: rules.grind_xp,
    }
}
