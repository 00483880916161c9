//! Habit and user domain types.
//!
//! A habit is owned by exactly one user and carries an active flag.
//! Deleting a habit is a soft transition to inactive; completion marks
//! for it are retained but stop counting toward daily rates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier types are uuid-v4 strings at the storage boundary.
pub type UserId = String;
pub type HabitId = String;

/// Most habits a single user may have, active or inactive.
pub const MAX_HABITS_PER_USER: usize = 20;

/// Minimal user record.
///
/// Registration, authentication, and sessions live outside this crate;
/// the engine keeps only what it needs to scope data and render public
/// profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}

/// A tracked habit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new active habit for `user_id`.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Validate a username: 3-20 characters, no surrounding whitespace.
pub fn validate_username(username: &str) -> Result<(), crate::error::ValidationError> {
    let trimmed = username.trim();
    if trimmed != username || trimmed.len() < 3 || trimmed.len() > 20 {
        return Err(crate::error::ValidationError::InvalidValue {
            field: "username".to_string(),
            message: "must be 3-20 characters with no surrounding whitespace".to_string(),
        });
    }
    Ok(())
}

/// Validate a habit display name: non-empty after trimming.
pub fn validate_habit_name(name: &str) -> Result<(), crate::error::ValidationError> {
    if name.trim().is_empty() {
        return Err(crate::error::ValidationError::InvalidValue {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_habit_is_active() {
        let habit = Habit::new("user-1", "Stretch");
        assert!(habit.is_active);
        assert_eq!(habit.name, "Stretch");
        assert_eq!(habit.user_id, "user-1");
    }

    #[test]
    fn username_bounds() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username("  padded  ").is_err());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn habit_name_required() {
        assert!(validate_habit_name("Read").is_ok());
        assert!(validate_habit_name("   ").is_err());
    }
}
