//! # Ascension Core Library
//!
//! Progression and reward ledger for a chat-bot gamification engine. Users
//! earn XP through periodic grinds and mini-games; the ledger derives ranks,
//! streaks, badges, challenge progress and weekly leaderboards from it.
//!
//! All state lives in one JSON document. Every operation on [`Ledger`] is a
//! serialized load-mutate-save transaction against a [`DocumentStore`], so the
//! CLI and any other caller share the same rules.
//!
//! ## Key Components
//!
//! - [`Ledger`]: transactional entry point for every operation
//! - [`run_grind`]: the grind state machine (cooldown, rollover, streaks)
//! - [`badges`] / [`challenges`]: static catalogs and progress tracking
//! - [`leaderboard`]: weekly rankings and the weekly reset
//! - [`GameResult`]: mini-game outcomes and their XP settlement
//! - [`JsonFileStore`] / [`Config`]: persistence and configuration

pub mod badges;
pub mod challenges;
pub mod error;
pub mod events;
pub mod games;
pub mod leaderboard;
pub mod ledger;
pub mod onboarding;
pub mod spin;
pub mod storage;
pub mod user;

pub use badges::{badge_definitions, badge_progress, BadgeCriterion, BadgeDefinition};
pub use challenges::{challenge_definitions, ChallengeDefinition, ChallengeSection, ChallengeStatus};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::GrindOutcome;
pub use games::{GameResult, Settlement};
pub use leaderboard::{LeaderboardRow, Metric, WeeklyResetSummary};
pub use ledger::{run_grind, ActivityPage, GameReport, GrindRules, Ledger, Rank, XpChange};
pub use onboarding::OnboardingProgress;
pub use spin::{SpinOutcome, SpinPrize};
pub use storage::{Config, Document, DocumentStore, JsonFileStore, MemoryStore};
pub use user::{Settings, Theme, UserId, UserRecord};
