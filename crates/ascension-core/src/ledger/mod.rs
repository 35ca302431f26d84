//! Progression ledger.
//!
//! [`Ledger`] is the entry point for every user-facing operation. Each call
//! is one transaction over the whole document:
//!
//! ```text
//! in-process guard -> store lock -> load -> mutate -> save (if changed)
//! ```
//!
//! The pure rules live in the submodules and in the sibling domain modules;
//! this layer only sequences them and persists the result.

pub mod grind;
mod rank;
mod streak;

pub use grind::{run_grind, GrindRules, COOLDOWN_SECS, GRIND_XP};
pub use rank::Rank;
pub use streak::{is_milestone, next_streak, DATE_FORMAT, STREAK_MILESTONES};

use std::sync::Mutex;

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::badges;
use crate::challenges::{self, ChallengeStatus};
use crate::error::{Result, StoreError, ValidationError};
use crate::events::GrindOutcome;
use crate::games::{GameResult, Settlement};
use crate::leaderboard::{self, LeaderboardRow, Metric, WeeklyResetSummary};
use crate::onboarding::{self, OnboardingProgress};
use crate::spin::{self, SpinOutcome, SPIN_COOLDOWN_HOURS};
use crate::storage::{data_dir, Config, Document, DocumentStore, JsonFileStore};
use crate::user::{ActivityEntry, Theme, UserId, UserRecord};

/// Activity entries per page.
pub const ACTIVITY_PAGE_SIZE: usize = 10;

/// XP and rank after a direct XP change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpChange {
    pub xp: u64,
    pub weekly_xp: u64,
    pub rank: Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_up: Option<Rank>,
}

impl XpChange {
    fn of(user: &UserRecord, rank_up: Option<Rank>) -> Self {
        Self {
            xp: user.xp,
            weekly_xp: user.weekly.xp,
            rank: user.rank,
            rank_up,
        }
    }
}

/// A settled mini-game round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub game: &'static str,
    pub settlement: Settlement,
    /// Reward badge, only when newly earned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_awarded: Option<&'static str>,
    #[serde(flatten)]
    pub xp: XpChange,
}

/// One page of a user's activity feed, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPage {
    pub page: usize,
    pub entries: Vec<ActivityEntry>,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Transactional front door to the document.
pub struct Ledger<S: DocumentStore> {
    store: S,
    rules: GrindRules,
    spin_cooldown_hours: i64,
    guard: Mutex<()>,
}

impl Ledger<JsonFileStore> {
    /// Open the ledger in the data directory with the saved configuration.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> Result<Self> {
        let config = Config::load_or_default();
        let dir = data_dir()?;
        let store = JsonFileStore::new(config.store_path(&dir));
        Ok(Self::with_config(store, &config))
    }
}

impl<S: DocumentStore> Ledger<S> {
    /// Ledger with default tunables.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rules: GrindRules::default(),
            spin_cooldown_hours: SPIN_COOLDOWN_HOURS,
            guard: Mutex::new(()),
        }
    }

    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store,
            rules: config.grind_rules(),
            spin_cooldown_hours: config.spin.cooldown_hours,
            guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &GrindRules {
        &self.rules
    }

    /// Run `f` as one serialized read-modify-write.
    ///
    /// `f` returns its value and whether the document changed; unchanged
    /// documents are not rewritten.
    fn transact<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Document) -> Result<(T, bool)>,
    ) -> Result<T> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let _lock = self.store.lock()?;

        let mut doc = self.store.load();
        let (value, dirty) = f(&mut doc)?;
        if dirty {
            self.store.save(&doc)?;
        }
        tracing::debug!(op, dirty, "ledger transaction");
        Ok(value)
    }

    /// [`Ledger::transact`] scoped to one user, created on first contact.
    fn with_user<T>(
        &self,
        op: &'static str,
        id: UserId,
        username: Option<&str>,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut UserRecord) -> Result<(T, bool)>,
    ) -> Result<T> {
        self.transact(op, |doc| {
            let (user, changed) = doc.ensure_user(id, username, now);
            if changed {
                tracing::debug!(user_id = id, username = %user.username, "user record created or renamed");
            }
            let (value, dirty) = f(user)?;
            Ok((value, changed || dirty))
        })
    }

    // ── User lifecycle ───────────────────────────────────────────────────

    /// Return the user's record, creating it or syncing the username.
    pub fn ensure_user(&self, id: UserId, username: Option<&str>) -> Result<UserRecord> {
        self.ensure_user_at(id, username, Utc::now())
    }

    pub fn ensure_user_at(
        &self,
        id: UserId,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<UserRecord> {
        self.with_user("ensure_user", id, username, now, |user| {
            Ok((user.clone(), false))
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<UserRecord> {
        self.ensure_user(id, None)
    }

    pub fn log_activity(&self, id: UserId, text: &str) -> Result<()> {
        self.log_activity_at(id, text, Utc::now())
    }

    pub fn log_activity_at(&self, id: UserId, text: &str, now: DateTime<Utc>) -> Result<()> {
        let cap = self.rules.activity_cap;
        self.with_user("log_activity", id, None, now, |user| {
            user.push_activity(now.timestamp(), text, cap);
            Ok(((), true))
        })
    }

    /// Replace the record with fresh defaults, keeping id and username.
    pub fn reset_account(&self, id: UserId) -> Result<UserRecord> {
        self.reset_account_at(id, Utc::now())
    }

    pub fn reset_account_at(&self, id: UserId, now: DateTime<Utc>) -> Result<UserRecord> {
        self.with_user("reset_account", id, None, now, |user| {
            let username = std::mem::take(&mut user.username);
            *user = UserRecord::new(id, Some(&username), now);
            tracing::info!(user_id = id, "account reset");
            Ok((user.clone(), true))
        })
    }

    /// Page `page` (from 0) of the activity feed.
    pub fn activity_page(&self, id: UserId, page: usize) -> Result<ActivityPage> {
        self.with_user("activity_page", id, None, Utc::now(), |user| {
            let start = page.saturating_mul(ACTIVITY_PAGE_SIZE);
            let entries: Vec<ActivityEntry> = user
                .activity
                .iter()
                .skip(start)
                .take(ACTIVITY_PAGE_SIZE)
                .cloned()
                .collect();
            let has_next = user.activity.len() > start.saturating_add(ACTIVITY_PAGE_SIZE);
            Ok((
                ActivityPage {
                    page,
                    entries,
                    has_prev: page > 0,
                    has_next,
                },
                false,
            ))
        })
    }

    // ── Progression ──────────────────────────────────────────────────────

    pub fn perform_grind(&self, id: UserId, username: Option<&str>) -> Result<GrindOutcome> {
        self.perform_grind_at(id, username, Utc::now())
    }

    pub fn perform_grind_at(
        &self,
        id: UserId,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GrindOutcome> {
        let rules = self.rules;
        self.with_user("perform_grind", id, username, now, |user| {
            let outcome = run_grind(user, now, &rules);
            match &outcome {
                GrindOutcome::Cooldown { remaining_secs } => {
                    tracing::debug!(user_id = id, remaining_secs, "grind on cooldown");
                }
                GrindOutcome::BadgeUnlocked { badge } => {
                    tracing::info!(user_id = id, badge = %badge, "badge unlocked");
                }
                GrindOutcome::RankUp { rank } => {
                    tracing::info!(user_id = id, rank = %rank, "rank up");
                }
                _ => {}
            }
            let accepted = outcome.accepted();
            Ok((outcome, accepted))
        })
    }

    /// Credit XP, optionally mirrored into the weekly total.
    pub fn add_xp(&self, id: UserId, amount: u64, mirror_weekly: bool) -> Result<XpChange> {
        self.with_user("add_xp", id, None, Utc::now(), |user| {
            let rank_up = user.credit_xp(amount, mirror_weekly);
            Ok((XpChange::of(user, rank_up), amount > 0))
        })
    }

    /// Debit XP, flooring at zero. Weekly XP is untouched.
    pub fn subtract_xp(&self, id: UserId, amount: u64) -> Result<XpChange> {
        self.with_user("subtract_xp", id, None, Utc::now(), |user| {
            let before = user.xp;
            let rank_up = user.debit_xp(amount);
            Ok((XpChange::of(user, rank_up), user.xp != before))
        })
    }

    // ── Badges ───────────────────────────────────────────────────────────

    /// Give a badge directly. Returns false if it was already owned.
    ///
    /// # Errors
    /// Rejects names that are neither catalog nor reward badges.
    pub fn grant_badge(&self, id: UserId, name: &str) -> Result<bool> {
        if !badges::is_known(name) {
            return Err(ValidationError::UnknownBadge(name.to_string()).into());
        }
        let cap = self.rules.activity_cap;
        let now = Utc::now();
        self.with_user("grant_badge", id, None, now, |user| {
            let added = badges::unlock(user, name, now.timestamp(), cap);
            if added {
                tracing::info!(user_id = id, badge = name, "badge granted");
            }
            Ok((added, added))
        })
    }

    /// Award the first newly satisfied catalog badge, if any.
    pub fn check_for_new_badges(&self, id: UserId) -> Result<Option<String>> {
        let cap = self.rules.activity_cap;
        let now = Utc::now();
        self.with_user("check_for_new_badges", id, None, now, |user| {
            let Some(badge) = badges::unlock_next(user, now.timestamp(), cap) else {
                return Ok((None, false));
            };
            tracing::info!(user_id = id, badge, "badge unlocked");
            Ok((Some(badge.to_string()), true))
        })
    }

    // ── Challenges ───────────────────────────────────────────────────────

    /// Set the progress of every initialised challenge named `key`.
    pub fn update_challenge_progress(&self, id: UserId, key: &str, value: u64) -> Result<()> {
        self.with_user("update_challenge_progress", id, None, Utc::now(), |user| {
            challenges::update_progress_by_name(user, key, value);
            Ok(((), true))
        })
    }

    /// Every challenge with the user's progress, initialising entries.
    pub fn challenge_board(&self, id: UserId) -> Result<Vec<ChallengeStatus>> {
        self.with_user("challenge_board", id, None, Utc::now(), |user| {
            let before = user.challenges.clone();
            let board = challenges::board(user);
            let initialised = user.challenges != before;
            Ok((board, initialised))
        })
    }

    // ── Leaderboards ─────────────────────────────────────────────────────

    pub fn top_xp(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::top(&self.store.load(), Metric::WeeklyXp, limit)
    }

    pub fn top_grinds(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::top(&self.store.load(), Metric::WeeklyGrinds, limit)
    }

    pub fn top_badge_count(&self, limit: usize) -> Vec<LeaderboardRow> {
        leaderboard::top(&self.store.load(), Metric::Badges, limit)
    }

    pub fn weekly_reset(&self) -> Result<WeeklyResetSummary> {
        self.weekly_reset_at(Utc::now())
    }

    pub fn weekly_reset_at(&self, now: DateTime<Utc>) -> Result<WeeklyResetSummary> {
        let cap = self.rules.activity_cap;
        self.transact("weekly_reset", |doc| {
            let summary = leaderboard::run_weekly_reset(doc, now);
            for award in &summary.awarded {
                if let Some(user) = doc.user_mut(award.user_id) {
                    user.push_activity(
                        now.timestamp(),
                        format!("Unlocked badge: {}", award.badge),
                        cap,
                    );
                }
            }
            tracing::info!(
                flagged = ?summary.flagged,
                users = summary.users_reset,
                next_reset = %summary.next_reset,
                "weekly reset"
            );
            Ok((summary, true))
        })
    }

    /// Stored time of the next weekly reset (UTC).
    pub fn next_reset(&self) -> Option<NaiveDateTime> {
        self.store.load().next_reset_at()
    }

    // ── Mini-games and spin ──────────────────────────────────────────────

    pub fn apply_game_result(&self, id: UserId, result: GameResult) -> Result<GameReport> {
        self.apply_game_result_at(id, result, Utc::now())
    }

    pub fn apply_game_result_at(
        &self,
        id: UserId,
        result: GameResult,
        now: DateTime<Utc>,
    ) -> Result<GameReport> {
        let cap = self.rules.activity_cap;
        self.with_user("apply_game_result", id, None, now, |user| {
            let settlement = result.settle(user.streak);
            let rank_up = if settlement.delta >= 0 {
                user.credit_xp(settlement.delta.unsigned_abs(), settlement.mirror_weekly)
            } else {
                user.debit_xp(settlement.delta.unsigned_abs())
            };
            let badge_awarded = settlement
                .badge
                .filter(|badge| badges::unlock(user, badge, now.timestamp(), cap));
            user.push_activity(
                now.timestamp(),
                format!("{}: {:+} XP", result.name(), settlement.delta),
                cap,
            );
            if let Some(badge) = badge_awarded {
                tracing::info!(user_id = id, badge, "reward badge unlocked");
            }

            let report = GameReport {
                game: result.name(),
                settlement,
                badge_awarded,
                xp: XpChange::of(user, rank_up),
            };
            Ok((report, true))
        })
    }

    pub fn spin(&self, id: UserId) -> Result<SpinOutcome> {
        self.spin_at(id, Utc::now(), &mut rand::thread_rng())
    }

    pub fn spin_at<R: Rng + ?Sized>(
        &self,
        id: UserId,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<SpinOutcome> {
        let cap = self.rules.activity_cap;
        let cooldown_hours = self.spin_cooldown_hours;
        self.with_user("spin", id, None, now, |user| {
            let outcome = spin::run_spin(user, now, cooldown_hours, rng, cap);
            let won = matches!(outcome, SpinOutcome::Won { .. });
            Ok((outcome, won))
        })
    }

    // ── Onboarding and settings ──────────────────────────────────────────

    pub fn record_onboarding_answer(&self, id: UserId, answer: &str) -> Result<OnboardingProgress> {
        let cap = self.rules.activity_cap;
        let now = Utc::now();
        self.with_user("record_onboarding_answer", id, None, now, |user| {
            let progress = onboarding::record_answer(user, answer)?;
            if let Some(badge) = progress.badge {
                user.push_activity(now.timestamp(), format!("Unlocked badge: {badge}"), cap);
            }
            let recorded = progress.recorded;
            Ok((progress, recorded))
        })
    }

    /// Flip notifications, returning the new value.
    pub fn toggle_notifications(&self, id: UserId) -> Result<bool> {
        self.with_user("toggle_notifications", id, None, Utc::now(), |user| {
            user.settings.notifications = !user.settings.notifications;
            Ok((user.settings.notifications, true))
        })
    }

    /// Flip between dark and light, returning the new theme.
    pub fn toggle_theme(&self, id: UserId) -> Result<Theme> {
        self.with_user("toggle_theme", id, None, Utc::now(), |user| {
            user.settings.theme = user.settings.theme.toggled();
            Ok((user.settings.theme, true))
        })
    }

    pub fn set_language(&self, id: UserId, language: &str) -> Result<String> {
        let language = language.trim();
        if language.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "language".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        self.with_user("set_language", id, None, Utc::now(), |user| {
            let changed = user.settings.language != language;
            user.settings.language = language.to_string();
            Ok((language.to_string(), changed))
        })
    }
}
