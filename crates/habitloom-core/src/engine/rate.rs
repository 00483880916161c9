//! Daily completion rate.
//!
//! The single formula shared by the write path (reward checks) and the
//! read path (snapshots, heatmaps): marks for currently-active habits
//! divided by the current active habit count. Zero active habits means
//! a rate of exactly 0.0, never a division error.

use chrono::NaiveDate;

use crate::error::Result;
use crate::storage::Database;

/// Completion rate in [0, 1] for (user, date).
///
/// Future dates are legal and simply have no completions yet. The
/// returned ratio is exact; rounding for display happens at the
/// presentation layer.
///
/// # Errors
/// Propagates storage failures unchanged.
pub fn completion_rate(db: &Database, user_id: &str, date: NaiveDate) -> Result<f64> {
    let active = db.active_habit_count(user_id)?;
    if active == 0 {
        return Ok(0.0);
    }
    let completed = db.completed_count_on(user_id, date)?;
    Ok(f64::from(completed) / f64::from(active))
}
