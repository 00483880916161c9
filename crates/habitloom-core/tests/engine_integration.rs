//! Integration tests for the completion & reward engine.
//!
//! These tests exercise the full toggle → rate → award path and the
//! read-side views against a real (in-memory) database.

use chrono::NaiveDate;
use habitloom_core::{Database, HabitEngine, StaticPool};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Create a user with `n` active habits; returns (user_id, habit_ids).
fn seed_user(db: &Database, n: usize) -> (String, Vec<String>) {
    let user = db.create_user("daily").unwrap();
    let habits = (0..n)
        .map(|i| db.create_habit(&user.id, &format!("habit {i}")).unwrap().id)
        .collect();
    (user.id, habits)
}

#[test]
fn full_day_earns_award_with_full_percentage() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg", "owl.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 4);
    let day = date("2024-03-01");

    let mut last = None;
    for habit_id in &habits {
        last = Some(engine.toggle_completion(&user_id, habit_id, day, true).unwrap());
    }
    let outcome = last.unwrap();
    assert_eq!(outcome.rate, 1.0);
    let award = outcome.awarded.expect("4/4 must award");
    assert_eq!(award.completion_percentage, 100.0);
    assert_eq!(award.earned_date, day);
}

#[test]
fn three_of_four_earns_nothing() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 4);
    let day = date("2024-03-01");

    let mut last = None;
    for habit_id in habits.iter().take(3) {
        last = Some(engine.toggle_completion(&user_id, habit_id, day, true).unwrap());
    }
    let outcome = last.unwrap();
    assert_eq!(outcome.rate, 0.75);
    assert!(outcome.awarded.is_none());
    assert!(engine.collectibles_owned(&user_id).unwrap().is_empty());
}

#[test]
fn requalifying_later_the_same_day_keeps_one_award() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg", "owl.svg", "bee.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 4);
    let day = date("2024-03-01");

    for habit_id in &habits {
        engine.toggle_completion(&user_id, habit_id, day, true).unwrap();
    }
    assert_eq!(engine.collectibles_owned(&user_id).unwrap().len(), 1);

    // Drop one habit, then complete it again: rate dips to 0.75 and
    // returns to 1.0, but day one's award must stay unique.
    engine
        .toggle_completion(&user_id, &habits[0], day, false)
        .unwrap();
    let outcome = engine
        .toggle_completion(&user_id, &habits[0], day, true)
        .unwrap();
    assert_eq!(outcome.rate, 1.0);
    assert!(outcome.awarded.is_none());
    assert_eq!(engine.collectibles_owned(&user_id).unwrap().len(), 1);
}

#[test]
fn repeat_toggle_does_not_change_rate() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 2);
    let day = date("2024-03-01");

    let first = engine
        .toggle_completion(&user_id, &habits[0], day, true)
        .unwrap();
    let second = engine
        .toggle_completion(&user_id, &habits[0], day, true)
        .unwrap();
    assert_eq!(first.rate, 0.5);
    assert_eq!(second.rate, 0.5);
    assert_eq!(db.completed_count_on(&user_id, day).unwrap(), 1);
}

#[test]
fn awards_accumulate_across_days_without_repeats() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["a.svg", "b.svg", "c.svg", "d.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 1);

    for day in ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04"] {
        engine
            .toggle_completion(&user_id, &habits[0], date(day), true)
            .unwrap();
    }

    let owned = engine.collectibles_owned(&user_id).unwrap();
    assert_eq!(owned.len(), 4);
    let mut ids: Vec<_> = owned.iter().map(|a| a.collectible_id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4, "all four awards must be distinct");

    // Listing is most-recent-first.
    assert_eq!(owned[0].earned_date, date("2024-03-04"));
    assert_eq!(owned[3].earned_date, date("2024-03-01"));
}

#[test]
fn deactivating_a_habit_reshapes_history() {
    // Live-recompute policy: the heatmap reflects the current active
    // set, so deactivating a habit changes past percentages.
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 2);
    let day = date("2024-03-01");

    engine
        .toggle_completion(&user_id, &habits[0], day, true)
        .unwrap();
    let before = engine.heatmap(&user_id, day, day).unwrap();
    assert_eq!(before[0].percentage, 50);

    db.deactivate_habit(&user_id, &habits[0]).unwrap();
    let after = engine.heatmap(&user_id, day, day).unwrap();
    assert_eq!(after[0].active_habit_total, 1);
    assert_eq!(after[0].completed_count, 0);
    assert_eq!(after[0].percentage, 0);
}

#[test]
fn profile_is_public_and_complete() {
    let db = Database::open_memory().unwrap();
    let pool = StaticPool::new(["fox.svg"]);
    let engine = HabitEngine::new(&db, &pool);
    let (user_id, habits) = seed_user(&db, 1);
    let day = date("2024-03-10");

    engine
        .toggle_completion(&user_id, &habits[0], day, true)
        .unwrap();

    let profile = engine.public_profile_at("daily", date("2024-03-20")).unwrap();
    assert_eq!(profile.username, "daily");
    assert_eq!(profile.heatmap.len(), 31);
    assert_eq!(profile.stats.total_collectibles, 1);
    // Streaks are placeholders.
    assert_eq!(profile.stats.current_streak, 0);
    assert_eq!(profile.stats.best_streak, 0);
}
