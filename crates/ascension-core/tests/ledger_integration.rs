//! Integration tests for the ledger over real document stores.
//!
//! Covers the grind day cycle, account reset, document preservation across
//! load/save, and serialized transactions under concurrent callers.

use std::sync::Arc;

use ascension_core::games::{DiceOutcome, FlipOutcome};
use ascension_core::{
    DocumentStore, GameResult, GrindOutcome, JsonFileStore, Ledger, MemoryStore, Rank,
    SpinOutcome,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

fn file_ledger(dir: &tempfile::TempDir) -> Ledger<JsonFileStore> {
    Ledger::new(JsonFileStore::new(dir.path().join("database.json")))
}

#[test]
fn test_grind_week_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    for day in 0..7 {
        // A fresh ledger per day proves nothing is cached in memory.
        let ledger = file_ledger(&dir);
        let morning = t0() + Duration::days(day);
        ledger.perform_grind_at(42, Some("neo"), morning).unwrap();
        ledger
            .perform_grind_at(42, Some("neo"), morning + Duration::minutes(1))
            .unwrap();
    }

    let user = file_ledger(&dir).get_user(42).unwrap();
    assert_eq!(user.streak, 7);
    assert_eq!(user.xp, 700);
    assert_eq!(user.grinds_today, 2);
    assert_eq!(user.weekly.grinds, 14);
    assert_eq!(user.rank, Rank::Bronze);
    assert!(user.has_badge("First Grind"));
    assert!(user.has_badge("Streak Keeper"));
    assert_eq!(user.last_grind_date.as_deref(), Some("2025-03-16"));
}

#[test]
fn test_streak_milestone_reported_on_fifth_day() {
    let ledger = Ledger::new(MemoryStore::new());
    let mut outcomes = Vec::new();
    for day in 0..5 {
        outcomes.push(
            ledger
                .perform_grind_at(1, None, t0() + Duration::days(day))
                .unwrap(),
        );
    }
    assert_eq!(
        outcomes[0],
        GrindOutcome::BadgeUnlocked {
            badge: "First Grind".into()
        }
    );
    assert_eq!(outcomes[4], GrindOutcome::StreakMilestone { streak: 5 });
}

#[test]
fn test_account_reset_keeps_identity_only() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger.perform_grind_at(9, Some("trinity"), t0()).unwrap();
    ledger.add_xp(9, 2_000, true).unwrap();
    for answer in ["A", "B", "C", "D", "E"] {
        ledger.record_onboarding_answer(9, answer).unwrap();
    }
    ledger.toggle_theme(9).unwrap();

    let later = t0() + Duration::days(3);
    let fresh = ledger.reset_account_at(9, later).unwrap();

    assert_eq!(fresh.username, "trinity");
    assert_eq!(fresh.xp, 0);
    assert_eq!(fresh.rank, Rank::Bronze);
    assert_eq!(fresh.streak, 0);
    assert!(fresh.badges.is_empty());
    assert!(!fresh.onboarding_complete);
    assert_eq!(fresh.onboarding_step, 1);
    assert_eq!(fresh.created_at, later.timestamp());
    assert_eq!(ledger.store().load().users.len(), 1);
    assert_eq!(ledger.get_user(9).unwrap(), fresh);
}

#[test]
fn test_legacy_document_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    std::fs::write(
        &path,
        r#"{
            "100": {
                "username": "legacy",
                "xp": 800,
                "rank": "Silver",
                "last_grind": 1741597200.5,
                "verified": true,
                "weekly": {"xp": 0, "grinds": 0, "badges": 0}
            },
            "next_reset": "2025-03-17 00:00:00",
            "motd": {"text": "welcome"}
        }"#,
    )
    .unwrap();

    let ledger = file_ledger(&dir);
    ledger.perform_grind_at(200, Some("newcomer"), t0()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["100"]["verified"], true);
    assert_eq!(raw["100"]["last_grind"], 1_741_597_200);
    assert_eq!(raw["next_reset"], "2025-03-17 00:00:00");
    assert_eq!(raw["motd"]["text"], "welcome");
    assert_eq!(raw["200"]["xp"], 50);

    // The reloaded document serializes identically.
    let store = JsonFileStore::new(&path);
    let before = std::fs::read_to_string(&path).unwrap();
    store.save(&store.load()).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_out_of_range_timestamps_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("database.json"),
        r#"{"1": {"last_spin": 1e300, "last_grind": -1e300}}"#,
    )
    .unwrap();

    let ledger = file_ledger(&dir);
    assert!(matches!(ledger.spin(1).unwrap(), SpinOutcome::Cooldown { .. }));
    assert!(ledger.perform_grind_at(1, None, t0()).unwrap().accepted());
}

#[test]
fn test_non_string_next_reset_is_replaced_on_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    std::fs::write(&path, r#"{"1": {"xp": 5}, "next_reset": null}"#).unwrap();

    file_ledger(&dir).weekly_reset_at(t0()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.matches("\"next_reset\"").count(), 1);
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["next_reset"], "2025-03-10 00:00:00");
}

#[test]
fn test_legacy_user_without_username_gets_default_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("database.json"), r#"{"7": {"xp": 5}}"#).unwrap();

    let user = file_ledger(&dir).get_user(7).unwrap();
    assert_eq!(user.username, "User7");
    assert_eq!(user.xp, 5);
}

#[test]
fn test_corrupt_document_starts_empty_and_heals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");
    std::fs::write(&path, "{\"1\": {\"xp\": 5").unwrap();

    let ledger = file_ledger(&dir);
    let user = ledger.get_user(1).unwrap();
    assert_eq!(user.xp, 0);
    assert_eq!(user.username, "User1");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["1"]["username"], "User1");
}

#[test]
fn test_concurrent_xp_credits_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(file_ledger(&dir));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            scope.spawn(move || {
                for _ in 0..10 {
                    ledger.add_xp(1, 10, true).unwrap();
                }
            });
        }
    });

    let user = ledger.get_user(1).unwrap();
    assert_eq!(user.xp, 800);
    assert_eq!(user.weekly.xp, 800);
    assert_eq!(user.rank, Rank::Silver);
}

#[test]
fn test_separate_ledgers_on_one_file_serialize_through_lock() {
    let dir = tempfile::tempdir().unwrap();

    std::thread::scope(|scope| {
        for id in 0..4 {
            let ledger = file_ledger(&dir);
            scope.spawn(move || {
                for i in 0..10 {
                    ledger
                        .perform_grind_at(id, None, t0() + Duration::seconds(30 * i))
                        .unwrap();
                }
            });
        }
    });

    let doc = JsonFileStore::new(dir.path().join("database.json")).load();
    assert_eq!(doc.users.len(), 4);
    for user in doc.users.values() {
        assert_eq!(user.grinds_today, 10);
        assert_eq!(user.xp, 500);
    }
    assert!(dir.path().join("database.json.lock").exists());
}

#[test]
fn test_games_and_spin_flow() {
    let ledger = Ledger::new(MemoryStore::new());

    let win = ledger
        .apply_game_result_at(
            5,
            GameResult::DiceBattle {
                outcome: DiceOutcome::Win,
            },
            t0(),
        )
        .unwrap();
    assert_eq!((win.xp.xp, win.xp.weekly_xp), (200, 200));

    let edge = ledger
        .apply_game_result_at(
            5,
            GameResult::QuantumFlip {
                outcome: FlipOutcome::Edge,
            },
            t0(),
        )
        .unwrap();
    assert_eq!(edge.badge_awarded, Some("Quantum Master"));
    assert_eq!((edge.xp.xp, edge.xp.weekly_xp), (700, 200));

    let again = ledger
        .apply_game_result_at(
            5,
            GameResult::QuantumFlip {
                outcome: FlipOutcome::Edge,
            },
            t0(),
        )
        .unwrap();
    assert_eq!(again.badge_awarded, None);
    assert_eq!(again.xp.rank_up, Some(Rank::Silver));

    let mut rng = StdRng::seed_from_u64(3);
    assert!(matches!(
        ledger.spin_at(5, t0(), &mut rng).unwrap(),
        SpinOutcome::Won { .. }
    ));
    assert_eq!(
        ledger
            .spin_at(5, t0() + Duration::hours(1), &mut rng)
            .unwrap(),
        SpinOutcome::Cooldown {
            remaining_secs: 23 * 3600
        }
    );

    let user = ledger.get_user(5).unwrap();
    assert_eq!(user.last_spin, Some(t0().timestamp()));
    assert!(user.activity[0].text.starts_with("Daily Spin: "));
    let unlocks = user
        .activity
        .iter()
        .filter(|e| e.text == "Unlocked badge: Quantum Master")
        .count();
    assert_eq!(unlocks, 1);
}

#[test]
fn test_onboarding_completion_unlocks_initiate() {
    let ledger = Ledger::new(MemoryStore::new());
    let mut last = None;
    for answer in ["A", "C", "B", "E", "D"] {
        last = Some(ledger.record_onboarding_answer(3, answer).unwrap());
    }
    let last = last.unwrap();
    assert!(last.complete);
    assert_eq!(last.badge, Some("Initiate"));

    let user = ledger.get_user(3).unwrap();
    assert_eq!(user.xp, 500);
    assert_eq!(user.weekly.xp, 0);
    assert_eq!(user.badges, vec!["Initiate".to_string()]);
    assert_eq!(user.activity[0].text, "Unlocked badge: Initiate");
    assert_eq!(ledger.check_for_new_badges(3).unwrap(), None);
}

#[test]
fn test_challenge_board_tracks_grinds() {
    let ledger = Ledger::new(MemoryStore::new());
    ledger.perform_grind_at(8, None, t0()).unwrap();

    // Not initialised yet, so the first grind was not recorded.
    let board = ledger.challenge_board(8).unwrap();
    assert!(board.iter().all(|c| c.current == 0));

    ledger
        .perform_grind_at(8, None, t0() + Duration::minutes(1))
        .unwrap();
    let board = ledger.challenge_board(8).unwrap();
    let grinds = board
        .iter()
        .find(|c| c.definition.key == "grinds_today")
        .unwrap();
    assert_eq!(grinds.current, 2);

    ledger.update_challenge_progress(8, "grinds_today", 20).unwrap();
    ledger.update_challenge_progress(8, "no_such_key", 99).unwrap();
    let board = ledger.challenge_board(8).unwrap();
    assert!(board
        .iter()
        .find(|c| c.definition.key == "grinds_today")
        .unwrap()
        .completed);
    assert_eq!(board.len(), 6);
}

proptest! {
    #[test]
    fn prop_accepted_grinds_add_exactly_fifty(gaps in prop::collection::vec(0i64..120, 1..40)) {
        let ledger = Ledger::new(MemoryStore::new());
        let mut now = t0();
        let mut accepted = 0u64;
        let mut last_accepted: Option<DateTime<Utc>> = None;

        for gap in gaps {
            now += Duration::seconds(gap);
            let outcome = ledger.perform_grind_at(1, None, now).unwrap();
            let expected_ok = last_accepted.map_or(true, |t| (now - t).num_seconds() >= 30);
            prop_assert_eq!(outcome.accepted(), expected_ok);
            if let GrindOutcome::Cooldown { remaining_secs } = outcome {
                let elapsed = (now - last_accepted.unwrap()).num_seconds();
                prop_assert_eq!(remaining_secs, 30 - elapsed);
            } else {
                accepted += 1;
                last_accepted = Some(now);
            }
        }

        let user = ledger.get_user(1).unwrap();
        prop_assert_eq!(user.xp, accepted * 50);
        prop_assert_eq!(user.rank, Rank::for_xp(user.xp));
    }
}
