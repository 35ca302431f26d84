//! Weekly leaderboards and the weekly reset.

use chrono::{DateTime, Datelike, Days, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badges;
use crate::storage::Document;
use crate::user::{UserId, UserRecord, WeeklyStats};

/// Number of users flagged at the weekly reset.
pub const TOP3: usize = 3;

/// Value a leaderboard ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// XP earned this week.
    WeeklyXp,
    /// Grinds performed this week.
    WeeklyGrinds,
    /// Lifetime badge count.
    Badges,
}

impl Metric {
    pub fn value(self, user: &UserRecord) -> u64 {
        match self {
            Metric::WeeklyXp => user.weekly.xp,
            Metric::WeeklyGrinds => user.weekly.grinds,
            Metric::Badges => user.badges.len() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub user_id: UserId,
    pub username: String,
    pub value: u64,
}

/// Top `limit` users by `metric`, descending. Ties keep document order.
pub fn top(doc: &Document, metric: Metric, limit: usize) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = doc
        .users
        .iter()
        .map(|(id, user)| LeaderboardRow {
            user_id: *id,
            username: user.username.clone(),
            value: metric.value(user),
        })
        .collect();
    // sort_by is stable
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows.truncate(limit);
    rows
}

/// Next Monday 00:00 UTC, or today's midnight when `now` is a Monday.
pub fn next_weekly_reset(now: DateTime<Utc>) -> NaiveDateTime {
    let today = now.date_naive();
    let days = (7 - today.weekday().num_days_from_monday()) % 7;
    let monday = today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(today);
    monday.and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardedBadge {
    pub user_id: UserId,
    pub badge: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyResetSummary {
    /// Users flagged as the week's top 3, best first.
    pub flagged: Vec<UserId>,
    /// Badges the flagged users unlocked.
    pub awarded: Vec<AwardedBadge>,
    pub users_reset: usize,
    pub next_reset: NaiveDateTime,
}

/// Close the leaderboard week.
///
/// The top 3 by weekly XP (fewer if fewer users exist) are flagged and run
/// through the badge scan, which unlocks Dominator. Every user then
/// starts the new week with zeroed counters, a fresh badge snapshot and
/// zeroed weekly challenges.
pub fn run_weekly_reset(doc: &mut Document, now: DateTime<Utc>) -> WeeklyResetSummary {
    let flagged: Vec<UserId> = top(doc, Metric::WeeklyXp, TOP3)
        .into_iter()
        .map(|row| row.user_id)
        .collect();

    let mut awarded = Vec::new();
    for id in &flagged {
        let Some(user) = doc.user_mut(*id) else {
            continue;
        };
        user.weekly.top3 = true;
        while let Some(badge) = badges::scan_new_badge(user) {
            tracing::info!(user_id = *id, badge, "weekly badge unlocked");
            awarded.push(AwardedBadge {
                user_id: *id,
                badge: badge.to_string(),
            });
        }
    }

    for user in doc.users.values_mut() {
        user.weekly = WeeklyStats {
            xp: 0,
            grinds: 0,
            badges: user.badges.len() as u64,
            top3: false,
        };
        if let Some(book) = user.challenges.as_mut() {
            book.reset_weekly();
        }
    }

    let next_reset = next_weekly_reset(now);
    doc.set_next_reset(next_reset);

    WeeklyResetSummary {
        flagged,
        awarded,
        users_reset: doc.users.len(),
        next_reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        // A Wednesday.
        Utc.with_ymd_and_hms(2025, 3, 12, 15, 30, 0).unwrap()
    }

    fn doc_with_weekly_xp(values: &[u64]) -> Document {
        let mut doc = Document::new();
        for (i, xp) in values.iter().enumerate() {
            let id = i as UserId + 1;
            let (user, _) = doc.ensure_user(id, Some(&format!("u{id}")), now());
            user.weekly.xp = *xp;
            user.weekly.grinds = *xp / 50;
        }
        doc
    }

    #[test]
    fn top_is_descending_and_stable() {
        let doc = doc_with_weekly_xp(&[50, 200, 200, 10]);
        let rows = top(&doc, Metric::WeeklyXp, 3);
        let got: Vec<(UserId, u64)> = rows.iter().map(|r| (r.user_id, r.value)).collect();
        assert_eq!(got, vec![(2, 200), (3, 200), (1, 50)]);
        assert_eq!(rows[0].username, "u2");
    }

    #[test]
    fn top_with_large_limit_returns_everyone() {
        let doc = doc_with_weekly_xp(&[1, 2]);
        assert_eq!(top(&doc, Metric::WeeklyGrinds, 10).len(), 2);
        assert!(top(&Document::new(), Metric::Badges, 10).is_empty());
    }

    #[test]
    fn badge_metric_counts_lifetime_badges() {
        let mut doc = doc_with_weekly_xp(&[0, 0]);
        doc.user_mut(2).unwrap().badges = vec!["Initiate".into(), "XP Hunter".into()];
        let rows = top(&doc, Metric::Badges, 1);
        assert_eq!((rows[0].user_id, rows[0].value), (2, 2));
    }

    #[test]
    fn next_reset_is_upcoming_monday_midnight() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 17)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(next_weekly_reset(now()), expected);

        let sunday = Utc.with_ymd_and_hms(2025, 3, 16, 23, 59, 59).unwrap();
        assert_eq!(next_weekly_reset(sunday), expected);
    }

    #[test]
    fn next_reset_on_monday_is_today() {
        let monday = Utc.with_ymd_and_hms(2025, 3, 17, 9, 0, 0).unwrap();
        assert_eq!(
            next_weekly_reset(monday),
            NaiveDate::from_ymd_opt(2025, 3, 17)
                .unwrap()
                .and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn reset_awards_dominator_and_clears_week() {
        let mut doc = doc_with_weekly_xp(&[50, 200, 200, 10, 0]);
        let summary = run_weekly_reset(&mut doc, now());

        assert_eq!(summary.flagged, vec![2, 3, 1]);
        for id in [1, 2, 3] {
            assert!(doc.user(id).unwrap().has_badge("Dominator"));
        }
        assert!(!doc.user(4).unwrap().has_badge("Dominator"));

        for user in doc.users.values() {
            assert_eq!(user.weekly.xp, 0);
            assert_eq!(user.weekly.grinds, 0);
            assert!(!user.weekly.top3);
            assert_eq!(user.weekly.badges, user.badges.len() as u64);
        }
        assert_eq!(doc.next_reset.as_deref(), Some("2025-03-17 00:00:00"));
        assert_eq!(summary.users_reset, 5);
    }

    #[test]
    fn reset_flags_three_even_without_weekly_xp() {
        let mut doc = doc_with_weekly_xp(&[0, 0, 30]);
        let summary = run_weekly_reset(&mut doc, now());
        assert_eq!(summary.flagged, vec![3, 1, 2]);
        for id in [1, 2, 3] {
            assert!(doc.user(id).unwrap().has_badge("Dominator"));
        }
    }

    #[test]
    fn reset_flags_everyone_when_fewer_than_three() {
        let mut doc = doc_with_weekly_xp(&[0, 10]);
        let summary = run_weekly_reset(&mut doc, now());
        assert_eq!(summary.flagged, vec![2, 1]);
        assert!(run_weekly_reset(&mut Document::new(), now()).flagged.is_empty());
    }

    #[test]
    fn reset_zeroes_weekly_challenges_only() {
        let mut doc = doc_with_weekly_xp(&[100]);
        let user = doc.user_mut(1).unwrap();
        crate::challenges::board(user);
        crate::challenges::update_progress(user, crate::challenges::ChallengeKey::XpWeek, 100);
        crate::challenges::update_progress(user, crate::challenges::ChallengeKey::XpToday, 100);

        run_weekly_reset(&mut doc, now());
        let book = doc.user(1).unwrap().challenges.as_ref().unwrap();
        assert_eq!(book.weekly["xp_week"].current, 0);
        assert_eq!(book.weekly["badge_collector"].current, 0);
        assert_eq!(book.daily["xp_today"].current, 100);
    }
}
