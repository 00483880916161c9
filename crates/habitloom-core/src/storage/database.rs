//! SQLite-based storage for users, habits, completion marks, and the
//! collectible award ledger.
//!
//! Uniqueness invariants live here as schema constraints:
//! - one completion mark per (habit, date)
//! - one collectible award per (user, earned_date)
//!
//! The award write path tolerates losing a concurrent race: the insert
//! is a no-op on conflict and reports whether a row was written.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::habit::{Habit, HabitId, User, MAX_HABITS_PER_USER};
use crate::habit::{validate_habit_name, validate_username};
use crate::rewards::CollectibleAward;

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Format a calendar date for storage.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a stored calendar date.
fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Build a Habit from a database row (id, user_id, name, is_active, created_at).
fn row_to_habit(row: &rusqlite::Row) -> std::result::Result<Habit, rusqlite::Error> {
    let created_at_str: String = row.get(4)?;
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// SQLite database for habit tracking.
///
/// Stores users, habits, per-day completion marks, and earned
/// collectibles.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitloom/habitloom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitloom.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and ephemeral use).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id         TEXT PRIMARY KEY,
                    username   TEXT NOT NULL UNIQUE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habits (
                    id         TEXT PRIMARY KEY,
                    user_id    TEXT NOT NULL REFERENCES users(id),
                    name       TEXT NOT NULL,
                    is_active  INTEGER NOT NULL DEFAULT 1,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS habit_completions (
                    id             TEXT PRIMARY KEY,
                    user_id        TEXT NOT NULL REFERENCES users(id),
                    habit_id       TEXT NOT NULL REFERENCES habits(id),
                    completed_date TEXT NOT NULL,
                    UNIQUE(habit_id, completed_date)
                );

                CREATE TABLE IF NOT EXISTS user_collectibles (
                    id                    TEXT PRIMARY KEY,
                    user_id               TEXT NOT NULL REFERENCES users(id),
                    collectible_id        TEXT NOT NULL,
                    earned_date           TEXT NOT NULL,
                    completion_percentage REAL NOT NULL,
                    UNIQUE(user_id, earned_date)
                );",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Users ===

    /// Create a new user.
    ///
    /// # Errors
    /// Returns a validation error for a malformed or taken username.
    pub fn create_user(&self, username: &str) -> Result<User> {
        validate_username(username)?;
        if self.find_user_by_username(username)?.is_some() {
            return Err(ValidationError::InvalidValue {
                field: "username".to_string(),
                message: "already taken".to_string(),
            }
            .into());
        }
        let user = User::new(username);
        self.conn.execute(
            "INSERT INTO users (id, username, created_at) VALUES (?1, ?2, ?3)",
            params![user.id, user.username, user.created_at.to_rfc3339()],
        )?;
        Ok(user)
    }

    /// Look up a user by id.
    pub fn find_user(&self, id: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, created_at FROM users WHERE id = ?1")?;
        let user = stmt
            .query_row(params![id], |row| {
                let created_at_str: String = row.get(2)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    created_at: parse_datetime_fallback(&created_at_str),
                })
            })
            .optional()?;
        Ok(user)
    }

    /// Look up a user by username.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, created_at FROM users WHERE username = ?1")?;
        let user = stmt
            .query_row(params![username], |row| {
                let created_at_str: String = row.get(2)?;
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    created_at: parse_datetime_fallback(&created_at_str),
                })
            })
            .optional()?;
        Ok(user)
    }

    /// List all users, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, created_at FROM users ORDER BY created_at ASC")?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            let created_at_str: String = row.get(2)?;
            users.push(User {
                id: row.get(0)?,
                username: row.get(1)?,
                created_at: parse_datetime_fallback(&created_at_str),
            });
        }
        Ok(users)
    }

    // === Habits ===

    /// Create a new habit for `user_id`.
    ///
    /// # Errors
    /// Returns NotFound for an unknown user, a validation error for an
    /// empty name or when the per-user habit limit is reached.
    pub fn create_habit(&self, user_id: &str, name: &str) -> Result<Habit> {
        validate_habit_name(name)?;
        if self.find_user(user_id)?.is_none() {
            return Err(crate::error::CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            });
        }
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if count as usize >= MAX_HABITS_PER_USER {
            return Err(ValidationError::LimitExceeded {
                what: "habits",
                limit: MAX_HABITS_PER_USER,
            }
            .into());
        }
        let habit = Habit::new(user_id, name.trim());
        self.conn.execute(
            "INSERT INTO habits (id, user_id, name, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                habit.id,
                habit.user_id,
                habit.name,
                habit.is_active,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(habit)
    }

    /// Rename a habit owned by `user_id`.
    ///
    /// # Errors
    /// Returns NotFound if the habit does not exist for this user.
    pub fn rename_habit(&self, user_id: &str, habit_id: &str, name: &str) -> Result<()> {
        validate_habit_name(name)?;
        let changed = self.conn.execute(
            "UPDATE habits SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            params![name.trim(), habit_id, user_id],
        )?;
        if changed == 0 {
            return Err(crate::error::CoreError::NotFound {
                entity: "habit",
                id: habit_id.to_string(),
            });
        }
        Ok(())
    }

    /// Deactivate (soft-delete) a habit. Completion marks are retained
    /// but stop counting toward rates.
    ///
    /// # Errors
    /// Returns NotFound if the habit does not exist for this user.
    pub fn deactivate_habit(&self, user_id: &str, habit_id: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
            params![habit_id, user_id],
        )?;
        if changed == 0 {
            return Err(crate::error::CoreError::NotFound {
                entity: "habit",
                id: habit_id.to_string(),
            });
        }
        Ok(())
    }

    /// Current active habit set for a user, oldest first.
    pub fn active_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, is_active, created_at
             FROM habits
             WHERE user_id = ?1 AND is_active = 1
             ORDER BY created_at ASC",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(row_to_habit(row)?);
        }
        Ok(habits)
    }

    /// Current active habit count for a user.
    pub fn active_habit_count(&self, user_id: &str) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?1 AND is_active = 1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Completion marks ===

    /// Apply a completion toggle for (user, habit, date).
    ///
    /// Marking complete is idempotent: a second insert for the same
    /// (habit, date) is a no-op. Unmarking removes the row entirely.
    ///
    /// # Errors
    /// Returns NotFound if the habit does not exist for this user, or
    /// is inactive when marking complete.
    pub fn set_completion(
        &self,
        user_id: &str,
        habit_id: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<()> {
        let habit: Option<(String, bool)> = self
            .conn
            .query_row(
                "SELECT user_id, is_active FROM habits WHERE id = ?1",
                params![habit_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (owner, is_active) = habit.ok_or_else(|| crate::error::CoreError::NotFound {
            entity: "habit",
            id: habit_id.to_string(),
        })?;
        if owner != user_id || (completed && !is_active) {
            return Err(crate::error::CoreError::NotFound {
                entity: "habit",
                id: habit_id.to_string(),
            });
        }

        if completed {
            self.conn.execute(
                "INSERT OR IGNORE INTO habit_completions (id, user_id, habit_id, completed_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    habit_id,
                    format_date(date),
                ],
            )?;
        } else {
            self.conn.execute(
                "DELETE FROM habit_completions WHERE habit_id = ?1 AND completed_date = ?2",
                params![habit_id, format_date(date)],
            )?;
        }
        Ok(())
    }

    /// Habit ids completed by `user_id` on `date`, restricted to
    /// currently-active habits.
    pub fn completions_on(&self, user_id: &str, date: NaiveDate) -> Result<HashSet<HabitId>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.habit_id
             FROM habit_completions c
             JOIN habits h ON h.id = c.habit_id AND h.is_active = 1
             WHERE c.user_id = ?1 AND c.completed_date = ?2",
        )?;
        let mut rows = stmt.query(params![user_id, format_date(date)])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            ids.insert(row.get(0)?);
        }
        Ok(ids)
    }

    /// Count of active-habit completions for (user, date).
    pub fn completed_count_on(&self, user_id: &str, date: NaiveDate) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM habit_completions c
             JOIN habits h ON h.id = c.habit_id AND h.is_active = 1
             WHERE c.user_id = ?1 AND c.completed_date = ?2",
            params![user_id, format_date(date)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-day active-habit completion counts over [start, end], only
    /// for days with at least one mark. Gap filling is the range
    /// aggregator's job.
    pub fn completion_counts_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.completed_date, COUNT(*)
             FROM habit_completions c
             JOIN habits h ON h.id = c.habit_id AND h.is_active = 1
             WHERE c.user_id = ?1 AND c.completed_date BETWEEN ?2 AND ?3
             GROUP BY c.completed_date
             ORDER BY c.completed_date ASC",
        )?;
        let mut rows = stmt.query(params![user_id, format_date(start), format_date(end)])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let date_str: String = row.get(0)?;
            if let Some(date) = parse_date(&date_str) {
                counts.push((date, row.get(1)?));
            }
        }
        Ok(counts)
    }

    // === Collectible awards ===

    /// Whether an award already exists for (user, date).
    pub fn award_exists(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM user_collectibles WHERE user_id = ?1 AND earned_date = ?2",
                params![user_id, format_date(date)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    /// Collectible ids the user already owns.
    pub fn owned_collectible_ids(&self, user_id: &str) -> Result<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT collectible_id FROM user_collectibles WHERE user_id = ?1")?;
        let mut rows = stmt.query(params![user_id])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            ids.insert(row.get(0)?);
        }
        Ok(ids)
    }

    /// Persist an award. Returns false when a concurrent writer already
    /// stored an award for the same (user, earned_date); the caller
    /// treats that as "already awarded", not an error.
    pub fn insert_award(&self, award: &CollectibleAward) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT INTO user_collectibles
                 (id, user_id, collectible_id, earned_date, completion_percentage)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, earned_date) DO NOTHING",
            params![
                award.id,
                award.user_id,
                award.collectible_id,
                format_date(award.earned_date),
                award.completion_percentage,
            ],
        )?;
        Ok(changed == 1)
    }

    /// All awards for a user, most recently earned first.
    pub fn collectibles_owned(&self, user_id: &str) -> Result<Vec<CollectibleAward>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, collectible_id, earned_date, completion_percentage
             FROM user_collectibles
             WHERE user_id = ?1
             ORDER BY earned_date DESC",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        let mut awards = Vec::new();
        while let Some(row) = rows.next()? {
            let date_str: String = row.get(3)?;
            let earned_date = match parse_date(&date_str) {
                Some(d) => d,
                None => continue,
            };
            awards.push(CollectibleAward {
                id: row.get(0)?,
                user_id: row.get(1)?,
                collectible_id: row.get(2)?,
                earned_date,
                completion_percentage: row.get(4)?,
            });
        }
        Ok(awards)
    }
}
