//! Daily and weekly challenge quotas.
//!
//! Progress entries live in the user's [`ChallengeBook`] and are created
//! lazily, the first time the board is viewed. Ledger counters are pushed in
//! as absolute values; a key that has not been initialised yet is ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::user::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeSection {
    Daily,
    Weekly,
}

/// Counters the ledger feeds into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKey {
    GrindsToday,
    XpToday,
    StreakDay,
    XpWeek,
    GrindsWeek,
    BadgeCollector,
}

impl ChallengeKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeKey::GrindsToday => "grinds_today",
            ChallengeKey::XpToday => "xp_today",
            ChallengeKey::StreakDay => "streak_day",
            ChallengeKey::XpWeek => "xp_week",
            ChallengeKey::GrindsWeek => "grinds_week",
            ChallengeKey::BadgeCollector => "badge_collector",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeDefinition {
    pub section: ChallengeSection,
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub required: u64,
    /// Shown to players; never paid out automatically.
    pub reward_xp: u64,
}

const CHALLENGES: [ChallengeDefinition; 6] = [
    ChallengeDefinition {
        section: ChallengeSection::Daily,
        key: "grinds_today",
        title: "Grind 20 times today",
        description: "You gain speed, momentum, and discipline.",
        required: 20,
        reward_xp: 200,
    },
    ChallengeDefinition {
        section: ChallengeSection::Daily,
        key: "xp_today",
        title: "Earn 500 XP today",
        description: "Push yourself past your daily limit.",
        required: 500,
        reward_xp: 300,
    },
    ChallengeDefinition {
        section: ChallengeSection::Daily,
        key: "streak_day",
        title: "Maintain your streak today",
        description: "Log in and grind at least once today.",
        required: 1,
        reward_xp: 150,
    },
    ChallengeDefinition {
        section: ChallengeSection::Weekly,
        key: "xp_week",
        title: "Earn 5,000 XP this week",
        description: "Only the consistent rise.",
        required: 5000,
        reward_xp: 500,
    },
    ChallengeDefinition {
        section: ChallengeSection::Weekly,
        key: "grinds_week",
        title: "Perform 100 grinds this week",
        description: "Prove your dedication.",
        required: 100,
        reward_xp: 600,
    },
    ChallengeDefinition {
        section: ChallengeSection::Weekly,
        key: "badge_collector",
        title: "Unlock a new badge this week",
        description: "Badge collectors dominate the hall of honor.",
        required: 1,
        reward_xp: 300,
    },
];

pub fn challenge_definitions() -> &'static [ChallengeDefinition] {
    &CHALLENGES
}

pub fn find_challenge(
    section: ChallengeSection,
    key: &str,
) -> Option<&'static ChallengeDefinition> {
    CHALLENGES
        .iter()
        .find(|c| c.section == section && c.key == key)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub completed: bool,
}

/// Persisted per-user progress, one map per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeBook {
    #[serde(default)]
    pub daily: IndexMap<String, ChallengeProgress>,
    #[serde(default)]
    pub weekly: IndexMap<String, ChallengeProgress>,
}

impl ChallengeBook {
    /// Create any missing entry as `{current: 0, completed: false}`.
    pub fn initialise(&mut self) {
        for def in &CHALLENGES {
            self.section_mut(def.section)
                .entry(def.key.to_string())
                .or_default();
        }
    }

    /// Overwrite `current` wherever `key` already exists.
    pub fn update(&mut self, key: &str, value: u64) {
        for section in [ChallengeSection::Daily, ChallengeSection::Weekly] {
            let Some(entry) = self.section_mut(section).get_mut(key) else {
                continue;
            };
            entry.current = value;
            if let Some(def) = find_challenge(section, key) {
                entry.completed = value >= def.required;
            }
        }
    }

    /// Zero every weekly entry that exists.
    pub fn reset_weekly(&mut self) {
        for entry in self.weekly.values_mut() {
            *entry = ChallengeProgress::default();
        }
    }

    pub fn get(&self, section: ChallengeSection, key: &str) -> Option<&ChallengeProgress> {
        match section {
            ChallengeSection::Daily => self.daily.get(key),
            ChallengeSection::Weekly => self.weekly.get(key),
        }
    }

    fn section_mut(&mut self, section: ChallengeSection) -> &mut IndexMap<String, ChallengeProgress> {
        match section {
            ChallengeSection::Daily => &mut self.daily,
            ChallengeSection::Weekly => &mut self.weekly,
        }
    }
}

/// Push a counter into the user's challenge book.
pub fn update_progress(user: &mut UserRecord, key: ChallengeKey, value: u64) {
    update_progress_by_name(user, key.as_str(), value);
}

/// Like [`update_progress`] for caller-supplied key names.
pub fn update_progress_by_name(user: &mut UserRecord, key: &str, value: u64) {
    user.challenges
        .get_or_insert_with(ChallengeBook::default)
        .update(key, value);
}

/// A definition joined with the user's progress on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub definition: ChallengeDefinition,
    pub current: u64,
    pub completed: bool,
}

/// Initialise the user's book and return every challenge with progress.
pub fn board(user: &mut UserRecord) -> Vec<ChallengeStatus> {
    let book = user.challenges.get_or_insert_with(ChallengeBook::default);
    book.initialise();

    CHALLENGES
        .iter()
        .map(|def| {
            let progress = book.get(def.section, def.key).cloned().unwrap_or_default();
            ChallengeStatus {
                definition: *def,
                current: progress.current,
                completed: progress.completed,
            }
        })
        .collect()
}
