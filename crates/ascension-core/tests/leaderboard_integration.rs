//! Integration tests for weekly leaderboards and the weekly reset.

use ascension_core::games::{Difficulty, DiceOutcome};
use ascension_core::{GameResult, JsonFileStore, Ledger, MemoryStore, UserId};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

fn t0() -> DateTime<Utc> {
    // Thursday
    Utc.with_ymd_and_hms(2025, 3, 13, 18, 0, 0).unwrap()
}

fn seed_weekly_xp(ledger: &Ledger<MemoryStore>, values: &[(UserId, u64)]) {
    for (id, xp) in values {
        ledger.ensure_user_at(*id, Some(&format!("player{id}")), t0()).unwrap();
        if *xp > 0 {
            ledger.add_xp(*id, *xp, true).unwrap();
        }
    }
}

#[test]
fn test_top_xp_is_stable_on_ties() {
    let ledger = Ledger::new(MemoryStore::new());
    seed_weekly_xp(&ledger, &[(1, 50), (2, 200), (3, 200), (4, 10)]);

    let top: Vec<(UserId, u64)> = ledger
        .top_xp(3)
        .into_iter()
        .map(|row| (row.user_id, row.value))
        .collect();
    assert_eq!(top, vec![(2, 200), (3, 200), (1, 50)]);
}

#[test]
fn test_top_grinds_and_badges() {
    let ledger = Ledger::new(MemoryStore::new());
    for i in 0..3 {
        ledger
            .perform_grind_at(10, Some("grinder"), t0() + Duration::seconds(30 * i))
            .unwrap();
    }
    ledger.perform_grind_at(11, Some("casual"), t0()).unwrap();
    ledger.grant_badge(11, "Wheel Master").unwrap();
    ledger.grant_badge(11, "XP Hunter").unwrap();

    let grinds = ledger.top_grinds(10);
    assert_eq!(grinds[0].user_id, 10);
    assert_eq!(grinds[0].value, 3);
    assert_eq!(grinds[0].username, "grinder");

    let badges = ledger.top_badge_count(1);
    assert_eq!(badges.len(), 1);
    assert_eq!((badges[0].user_id, badges[0].value), (11, 3));
}

#[test]
fn test_weekly_reset_awards_dominator_to_top_three() {
    let ledger = Ledger::new(MemoryStore::new());
    seed_weekly_xp(&ledger, &[(1, 300), (2, 900), (3, 100), (4, 600), (5, 0)]);

    let summary = ledger.weekly_reset_at(t0()).unwrap();
    assert_eq!(summary.flagged, vec![2, 4, 1]);
    assert!(summary
        .awarded
        .iter()
        .any(|a| a.user_id == 2 && a.badge == "Dominator"));

    for id in [1, 2, 4] {
        let user = ledger.get_user(id).unwrap();
        assert!(user.has_badge("Dominator"));
        assert!(user
            .activity
            .iter()
            .any(|e| e.text == "Unlocked badge: Dominator"));
    }
    assert!(!ledger.get_user(3).unwrap().has_badge("Dominator"));

    for row in ledger.top_xp(10) {
        assert_eq!(row.value, 0);
    }
    for id in 1..=5 {
        let user = ledger.get_user(id).unwrap();
        assert!(!user.weekly.top3);
        assert_eq!(user.weekly.grinds, 0);
        assert_eq!(user.weekly.badges, user.badges.len() as u64);
    }

    let expected = NaiveDate::from_ymd_opt(2025, 3, 17)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(summary.next_reset, expected);
    assert_eq!(ledger.next_reset(), Some(expected));
}

#[test]
fn test_lifetime_xp_survives_reset() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger
        .apply_game_result_at(
            1,
            GameResult::MindHack {
                solved: Some(Difficulty::Hard),
            },
            t0(),
        )
        .unwrap();
    ledger.weekly_reset_at(t0()).unwrap();

    let user = ledger.get_user(1).unwrap();
    assert_eq!(user.xp, 260);
    assert_eq!(user.weekly.xp, 0);
}

#[test]
fn test_reset_persists_next_reset_string() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    let ledger = Ledger::new(JsonFileStore::new(&path));
    ledger
        .apply_game_result_at(
            7,
            GameResult::DiceBattle {
                outcome: DiceOutcome::Draw,
            },
            t0(),
        )
        .unwrap();

    // A Monday reset schedules for the same day.
    let monday = Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 5).unwrap();
    ledger.weekly_reset_at(monday).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["next_reset"], "2025-03-17 00:00:00");
    assert_eq!(raw["7"]["weekly"]["xp"], 0);
    assert_eq!(raw["7"]["xp"], 100);
}
