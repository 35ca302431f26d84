//! Per-user ledger record.
//!
//! A [`UserRecord`] is the value stored under each user-id key of the
//! document. Every field is defaulted on read so that partially written or
//! older records still load; fields this crate does not know about are kept
//! in [`UserRecord::extra`] and written back untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::challenges::ChallengeBook;
use crate::ledger::Rank;

/// Stable numeric chat user identifier.
pub type UserId = i64;

/// Maximum number of activity entries kept per user.
pub const ACTIVITY_CAP: usize = 500;

/// Display theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// User-facing preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "English".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            theme: Theme::Dark,
            language: default_language(),
        }
    }
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(deserialize_with = "epoch_secs")]
    pub time: i64,
    pub text: String,
}

/// Counters for the current leaderboard week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub grinds: u64,
    /// Badge count snapshot taken at the last weekly reset.
    #[serde(default)]
    pub badges: u64,
    #[serde(default)]
    pub top3: bool,
}

/// Everything the ledger knows about one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    pub username: String,
    pub xp: u64,
    pub rank: Rank,
    pub streak: u32,
    pub grinds_today: u64,
    pub xp_today: u64,
    /// Epoch seconds of the last accepted grind, 0 if never.
    #[serde(deserialize_with = "epoch_secs")]
    pub last_grind: i64,
    /// `YYYY-MM-DD` of the last accepted grind.
    pub last_grind_date: Option<String>,
    pub badges: Vec<String>,
    pub onboarding_step: u8,
    pub onboarding_complete: bool,
    /// Answer letter per onboarding step, keyed by the step number.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub onboarding_answers: BTreeMap<String, String>,
    pub settings: Settings,
    /// Newest first, capped at [`ACTIVITY_CAP`].
    pub activity: Vec<ActivityEntry>,
    pub weekly: WeeklyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<ChallengeBook>,
    #[serde(deserialize_with = "opt_epoch_secs")]
    pub last_spin: Option<i64>,
    #[serde(deserialize_with = "opt_epoch_secs")]
    pub xp_boost_until: Option<i64>,
    pub badge_fragments: u64,
    #[serde(deserialize_with = "epoch_secs")]
    pub created_at: i64,
    /// Fields written by other tools; preserved on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            username: String::new(),
            xp: 0,
            rank: Rank::Bronze,
            streak: 0,
            grinds_today: 0,
            xp_today: 0,
            last_grind: 0,
            last_grind_date: None,
            badges: Vec::new(),
            onboarding_step: 1,
            onboarding_complete: false,
            onboarding_answers: BTreeMap::new(),
            settings: Settings::default(),
            activity: Vec::new(),
            weekly: WeeklyStats::default(),
            challenges: None,
            last_spin: None,
            xp_boost_until: None,
            badge_fragments: 0,
            created_at: 0,
            extra: serde_json::Map::new(),
        }
    }
}

impl UserRecord {
    /// Fresh record for a user seen for the first time.
    pub fn new(id: UserId, username: Option<&str>, now: DateTime<Utc>) -> Self {
        let username = match username {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => Self::default_username(id),
        };
        Self {
            username,
            created_at: now.timestamp(),
            ..Self::default()
        }
    }

    /// Display name for a user who never supplied one.
    pub fn default_username(id: UserId) -> String {
        format!("User{id}")
    }

    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.iter().any(|b| b == name)
    }

    /// Append a badge unless already owned. Returns whether it was added.
    pub fn push_badge(&mut self, name: &str) -> bool {
        if self.has_badge(name) {
            return false;
        }
        self.badges.push(name.to_string());
        true
    }

    /// Credit XP, optionally mirroring it into the weekly total.
    ///
    /// Returns the new rank if the credit crossed a tier threshold.
    pub fn credit_xp(&mut self, amount: u64, mirror_weekly: bool) -> Option<Rank> {
        self.xp = self.xp.saturating_add(amount);
        if mirror_weekly {
            self.weekly.xp = self.weekly.xp.saturating_add(amount);
        }
        self.recompute_rank()
    }

    /// Debit XP, flooring at zero. Weekly XP is never debited.
    pub fn debit_xp(&mut self, amount: u64) -> Option<Rank> {
        self.xp = self.xp.saturating_sub(amount);
        self.recompute_rank()
    }

    /// Bring `rank` in line with `xp`, returning the new rank on change.
    pub fn recompute_rank(&mut self) -> Option<Rank> {
        let rank = Rank::for_xp(self.xp);
        if rank == self.rank {
            return None;
        }
        self.rank = rank;
        Some(rank)
    }

    /// Prepend an activity line and trim the feed to `cap` entries.
    pub fn push_activity(&mut self, time: i64, text: impl Into<String>, cap: usize) {
        self.activity.insert(
            0,
            ActivityEntry {
                time,
                text: text.into(),
            },
        );
        self.activity.truncate(cap);
    }

    /// Badges earned since the last weekly reset snapshot.
    pub fn badges_this_week(&self) -> u64 {
        (self.badges.len() as u64).saturating_sub(self.weekly.badges)
    }
}

/// Accepts integer or fractional epoch seconds (older writers stored floats),
/// and null as 0.
fn epoch_secs<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_epoch_secs(deserializer)?.unwrap_or(0))
}

fn opt_epoch_secs<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(|secs| secs.trunc() as i64))
}
