//! Daily reward wheel.

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;

use crate::badges::{self, WHEEL_MASTER};
use crate::ledger::Rank;
use crate::user::UserRecord;

/// Hours between two spins.
pub const SPIN_COOLDOWN_HOURS: i64 = 24;
/// Length of the XP boost prize.
pub const BOOST_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinPrize {
    /// Lifetime XP only; weekly XP is untouched.
    Xp { amount: u64 },
    /// Recorded in `xp_boost_until`; no multiplier is applied anywhere.
    XpBoost { hours: i64 },
    StreakDay,
    BadgeFragment,
    WheelMaster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpinReward {
    pub label: &'static str,
    pub prize: SpinPrize,
    pub weight: u32,
}

const WHEEL: [SpinReward; 8] = [
    SpinReward {
        label: "+300 XP",
        prize: SpinPrize::Xp { amount: 300 },
        weight: 60,
    },
    SpinReward {
        label: "+600 XP",
        prize: SpinPrize::Xp { amount: 600 },
        weight: 50,
    },
    SpinReward {
        label: "+900 XP",
        prize: SpinPrize::Xp { amount: 900 },
        weight: 40,
    },
    SpinReward {
        label: "1-Day XP Boost (x2)",
        prize: SpinPrize::XpBoost { hours: BOOST_HOURS },
        weight: 20,
    },
    SpinReward {
        label: "+1 Streak Day",
        prize: SpinPrize::StreakDay,
        weight: 15,
    },
    SpinReward {
        label: "Badge Fragment",
        prize: SpinPrize::BadgeFragment,
        weight: 12,
    },
    SpinReward {
        label: "JACKPOT: +2,000 XP",
        prize: SpinPrize::Xp { amount: 2000 },
        weight: 3,
    },
    SpinReward {
        label: "Wheel Master Badge",
        prize: SpinPrize::WheelMaster,
        weight: 1,
    },
];

pub fn wheel() -> &'static [SpinReward] {
    &WHEEL
}

/// Pick a reward by weight.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> &'static SpinReward {
    match WeightedIndex::new(WHEEL.iter().map(|r| r.weight)) {
        Ok(dist) => &WHEEL[dist.sample(rng)],
        Err(_) => &WHEEL[0],
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpinOutcome {
    Cooldown {
        remaining_secs: i64,
    },
    Won {
        reward: SpinReward,
        #[serde(skip_serializing_if = "Option::is_none")]
        rank_up: Option<Rank>,
    },
}

/// Seconds until `user` may spin again, if still cooling down.
pub fn cooldown_remaining(user: &UserRecord, now: DateTime<Utc>, cooldown_hours: i64) -> Option<i64> {
    let last = user.last_spin?;
    let remaining = last
        .saturating_add(cooldown_hours.saturating_mul(3600))
        .saturating_sub(now.timestamp());
    (remaining > 0).then_some(remaining)
}

/// Spin the wheel for `user`, applying the prize.
pub fn run_spin<R: Rng + ?Sized>(
    user: &mut UserRecord,
    now: DateTime<Utc>,
    cooldown_hours: i64,
    rng: &mut R,
    activity_cap: usize,
) -> SpinOutcome {
    if let Some(remaining_secs) = cooldown_remaining(user, now, cooldown_hours) {
        return SpinOutcome::Cooldown { remaining_secs };
    }

    user.last_spin = Some(now.timestamp());
    let reward = draw(rng);
    let rank_up = apply_reward(user, reward, now, activity_cap);
    SpinOutcome::Won {
        reward: *reward,
        rank_up,
    }
}

/// Apply one reward. Returns the new rank if XP crossed a tier.
pub fn apply_reward(
    user: &mut UserRecord,
    reward: &SpinReward,
    now: DateTime<Utc>,
    activity_cap: usize,
) -> Option<Rank> {
    let mut rank_up = None;
    match reward.prize {
        SpinPrize::Xp { amount } => rank_up = user.credit_xp(amount, false),
        SpinPrize::XpBoost { hours } => {
            let until = now.timestamp().saturating_add(hours.saturating_mul(3600));
            user.xp_boost_until = Some(until);
        }
        SpinPrize::StreakDay => user.streak = user.streak.saturating_add(1),
        SpinPrize::BadgeFragment => user.badge_fragments = user.badge_fragments.saturating_add(1),
        SpinPrize::WheelMaster => {
            badges::unlock(user, WHEEL_MASTER, now.timestamp(), activity_cap);
        }
    }
    user.push_activity(
        now.timestamp(),
        format!("Daily Spin: {}", reward.label),
        activity_cap,
    );
    rank_up
}
