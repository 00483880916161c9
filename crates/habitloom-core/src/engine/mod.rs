//! Completion & reward engine.
//!
//! [`HabitEngine`] is the single entry point the surrounding service
//! layer talks to. A completion toggle is one logical operation: the
//! mark write, the rate recomputation, and the best-effort reward check
//! happen within one call. Read paths (snapshot, heatmap, profile)
//! share the same rate formula as the write path.

pub mod rate;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::habit::{HabitId, UserId};
use crate::rewards::{CollectibleAward, CollectiblePool, RewardAllocator};
use crate::stats::{month_range, range_heatmap, DayRate};
use crate::storage::Database;

use self::rate::completion_rate;

/// Result of a completion toggle: the day's new rate and the award the
/// toggle may have triggered.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
    pub rate: f64,
    pub awarded: Option<CollectibleAward>,
}

/// One habit's completion state in a daily snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHabit {
    pub id: HabitId,
    pub name: String,
    pub completed: bool,
}

/// The "today" view: active habits with completion flags and the rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub habits: Vec<SnapshotHabit>,
    pub rate: f64,
}

/// Aggregate counters shown on a public profile.
///
/// Streak fields are placeholders and always 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_collectibles: usize,
    pub current_streak: u32,
    pub best_streak: u32,
}

/// Public profile payload: explicitly public data, no ownership check.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub member_since: DateTime<Utc>,
    pub collectibles: Vec<CollectibleAward>,
    pub heatmap: Vec<DayRate>,
    pub stats: ProfileStats,
}

/// The completion & reward engine.
pub struct HabitEngine<'a> {
    db: &'a Database,
    pool: &'a dyn CollectiblePool,
}

impl<'a> HabitEngine<'a> {
    pub fn new(db: &'a Database, pool: &'a dyn CollectiblePool) -> Self {
        Self { db, pool }
    }

    /// Apply a completion toggle and run the reward check.
    ///
    /// Idempotent with respect to repeated toggles of the same state;
    /// at most one award can result per (user, date) regardless of how
    /// many qualifying toggles occur.
    ///
    /// # Errors
    /// Returns NotFound for an unknown habit; storage failures
    /// propagate unchanged.
    pub fn toggle_completion(
        &self,
        user_id: &str,
        habit_id: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<ToggleOutcome> {
        self.db.set_completion(user_id, habit_id, date, completed)?;
        debug!(user_id, habit_id, %date, completed, "completion toggled");

        let rate = completion_rate(self.db, user_id, date)?;
        let awarded = RewardAllocator::new(self.db, self.pool).maybe_award(user_id, date)?;
        Ok(ToggleOutcome { rate, awarded })
    }

    /// Toggle for today (UTC).
    pub fn toggle_today(
        &self,
        user_id: &str,
        habit_id: &str,
        completed: bool,
    ) -> Result<ToggleOutcome> {
        self.toggle_completion(user_id, habit_id, Utc::now().date_naive(), completed)
    }

    /// The "today" view for an arbitrary date.
    pub fn daily_snapshot(&self, user_id: &str, date: NaiveDate) -> Result<DailySnapshot> {
        let habits = self.db.active_habits(user_id)?;
        let completed_ids = self.db.completions_on(user_id, date)?;
        let rate = completion_rate(self.db, user_id, date)?;
        Ok(DailySnapshot {
            date,
            habits: habits
                .into_iter()
                .map(|h| SnapshotHabit {
                    completed: completed_ids.contains(&h.id),
                    id: h.id,
                    name: h.name,
                })
                .collect(),
            rate,
        })
    }

    /// One entry per day over [start, end] inclusive.
    pub fn heatmap(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayRate>> {
        range_heatmap(self.db, user_id, start, end)
    }

    /// All earned collectibles, most recent first.
    pub fn collectibles_owned(&self, user_id: &str) -> Result<Vec<CollectibleAward>> {
        self.db.collectibles_owned(user_id)
    }

    /// Public profile for a username, with the current month's heatmap.
    ///
    /// # Errors
    /// Returns NotFound for an unknown username.
    pub fn public_profile(&self, username: &str) -> Result<PublicProfile> {
        self.public_profile_at(username, Utc::now().date_naive())
    }

    /// Public profile with an explicit "today", for deterministic tests.
    pub fn public_profile_at(&self, username: &str, today: NaiveDate) -> Result<PublicProfile> {
        let user = self
            .db
            .find_user_by_username(username)?
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: username.to_string(),
            })?;
        let collectibles = self.db.collectibles_owned(&user.id)?;
        let (start, end) = month_range(today);
        let heatmap = range_heatmap(self.db, &user.id, start, end)?;
        Ok(PublicProfile {
            username: user.username,
            member_since: user.created_at,
            stats: ProfileStats {
                total_collectibles: collectibles.len(),
                current_streak: 0,
                best_streak: 0,
            },
            collectibles,
            heatmap,
        })
    }

    /// Resolve a username to its user id.
    ///
    /// # Errors
    /// Returns NotFound for an unknown username.
    pub fn resolve_user(&self, username: &str) -> Result<UserId> {
        self.db
            .find_user_by_username(username)?
            .map(|u| u.id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: username.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::StaticPool;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn snapshot_flags_completed_habits() {
        let db = Database::open_memory().unwrap();
        let pool = StaticPool::new(["fox.svg"]);
        let engine = HabitEngine::new(&db, &pool);

        let user = db.create_user("runner").unwrap();
        let stretch = db.create_habit(&user.id, "Stretch").unwrap();
        let read = db.create_habit(&user.id, "Read").unwrap();
        let day = date("2024-03-01");

        engine
            .toggle_completion(&user.id, &stretch.id, day, true)
            .unwrap();

        let snapshot = engine.daily_snapshot(&user.id, day).unwrap();
        assert_eq!(snapshot.habits.len(), 2);
        let by_id = |id: &str| snapshot.habits.iter().find(|h| h.id == id).unwrap();
        assert!(by_id(&stretch.id).completed);
        assert!(!by_id(&read.id).completed);
        assert_eq!(snapshot.rate, 0.5);
    }

    #[test]
    fn toggle_reports_rate_and_award() {
        let db = Database::open_memory().unwrap();
        let pool = StaticPool::new(["fox.svg"]);
        let engine = HabitEngine::new(&db, &pool);

        let user = db.create_user("runner").unwrap();
        let habit = db.create_habit(&user.id, "Stretch").unwrap();
        let day = date("2024-03-01");

        let outcome = engine
            .toggle_completion(&user.id, &habit.id, day, true)
            .unwrap();
        assert_eq!(outcome.rate, 1.0);
        let award = outcome.awarded.unwrap();
        assert_eq!(award.completion_percentage, 100.0);

        // Un-toggle then re-toggle: the day's award stays unique.
        engine
            .toggle_completion(&user.id, &habit.id, day, false)
            .unwrap();
        let outcome = engine
            .toggle_completion(&user.id, &habit.id, day, true)
            .unwrap();
        assert!(outcome.awarded.is_none());
        assert_eq!(engine.collectibles_owned(&user.id).unwrap().len(), 1);
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let db = Database::open_memory().unwrap();
        let pool = StaticPool::new(["fox.svg"]);
        let engine = HabitEngine::new(&db, &pool);
        assert!(engine.public_profile_at("ghost", date("2024-03-01")).is_err());
    }

    #[test]
    fn profile_contains_month_heatmap_and_stats() {
        let db = Database::open_memory().unwrap();
        let pool = StaticPool::new(["fox.svg"]);
        let engine = HabitEngine::new(&db, &pool);

        let user = db.create_user("runner").unwrap();
        let habit = db.create_habit(&user.id, "Stretch").unwrap();
        let day = date("2024-03-10");
        engine
            .toggle_completion(&user.id, &habit.id, day, true)
            .unwrap();

        let profile = engine.public_profile_at("runner", date("2024-03-15")).unwrap();
        assert_eq!(profile.heatmap.len(), 31);
        assert_eq!(profile.stats.total_collectibles, 1);
        assert_eq!(profile.stats.current_streak, 0);
        assert_eq!(profile.collectibles.len(), 1);
    }
}
