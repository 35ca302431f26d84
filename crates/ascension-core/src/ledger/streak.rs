//! Consecutive-day streak rule.

use chrono::NaiveDate;

/// Date format used for `last_grind_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Streak values that earn a milestone notification.
pub const STREAK_MILESTONES: [u32; 4] = [5, 10, 20, 30];

/// Streak after the first grind of `today`.
///
/// Continues only when the previous grind day is exactly yesterday. A
/// missing or unparseable previous date starts over at 1.
pub fn next_streak(current: u32, last_date: Option<&str>, today: NaiveDate) -> u32 {
    let Some(last) = last_date.and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok()) else {
        return 1;
    };
    if today.signed_duration_since(last).num_days() == 1 {
        current.saturating_add(1)
    } else {
        1
    }
}

pub fn is_milestone(streak: u32) -> bool {
    STREAK_MILESTONES.contains(&streak)
}
