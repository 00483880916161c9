//! Calendar heatmap aggregation.
//!
//! Produces one rate sample per calendar day over an inclusive range,
//! with no gaps: days without completions appear as zero entries. The
//! active habit total is the current count for the user; historical
//! habit-set changes are not reconstructed.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::storage::Database;

/// One day's aggregate in a heatmap range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRate {
    pub date: NaiveDate,
    pub completed_count: u32,
    pub active_habit_total: u32,
    /// round(completed / total * 100); 0 when the total is 0.
    pub percentage: u8,
}

impl DayRate {
    /// Character for ASCII calendar visualization.
    pub fn heat_char(&self) -> char {
        match self.percentage {
            0 => ' ',
            1..=25 => '░',
            26..=50 => '▒',
            51..=75 => '▓',
            _ => '█',
        }
    }
}

/// One entry per day in [start, end] inclusive, ascending, no gaps.
///
/// # Errors
/// Returns an InvalidDateRange validation error when start > end;
/// storage failures propagate unchanged.
pub fn range_heatmap(
    db: &Database,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DayRate>> {
    if start > end {
        return Err(ValidationError::InvalidDateRange { start, end }.into());
    }

    let active_habit_total = db.active_habit_count(user_id)?;
    let counts: HashMap<NaiveDate, u32> = db
        .completion_counts_between(user_id, start, end)?
        .into_iter()
        .collect();

    let mut entries = Vec::new();
    for date in start.iter_days().take_while(|d| *d <= end) {
        let completed_count = counts.get(&date).copied().unwrap_or(0);
        let percentage = if active_habit_total == 0 {
            0
        } else {
            (f64::from(completed_count) / f64::from(active_habit_total) * 100.0).round() as u8
        };
        entries.push(DayRate {
            date,
            completed_count,
            active_habit_total,
            percentage,
        });
    }
    Ok(entries)
}

/// First and last day of `date`'s month.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    let next_first = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let last = next_first.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

/// Default own-calendar window: previous month start through current
/// month end.
pub fn default_calendar_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (current_first, current_last) = month_range(today);
    let prev_first = current_first
        .pred_opt()
        .map(|d| month_range(d).0)
        .unwrap_or(current_first);
    (prev_first, current_last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn january_has_31_entries_without_gaps() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("runner").unwrap();
        let habit = db.create_habit(&user.id, "Stretch").unwrap();
        db.set_completion(&user.id, &habit.id, date("2024-01-15"), true)
            .unwrap();

        let entries =
            range_heatmap(&db, &user.id, date("2024-01-01"), date("2024-01-31")).unwrap();
        assert_eq!(entries.len(), 31);
        for window in entries.windows(2) {
            assert!(window[0].date < window[1].date);
        }
        assert_eq!(entries[14].completed_count, 1);
        assert_eq!(entries[14].percentage, 100);
        assert_eq!(entries[0].completed_count, 0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("runner").unwrap();
        let result = range_heatmap(&db, &user.id, date("2024-02-01"), date("2024-01-01"));
        assert!(result.is_err());
    }

    #[test]
    fn single_day_range_is_one_entry() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("runner").unwrap();
        let entries =
            range_heatmap(&db, &user.id, date("2024-01-01"), date("2024-01-01")).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn zero_habits_yields_zero_percentages() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("runner").unwrap();
        let entries =
            range_heatmap(&db, &user.id, date("2024-01-01"), date("2024-01-07")).unwrap();
        assert!(entries.iter().all(|e| e.percentage == 0));
        assert!(entries.iter().all(|e| e.active_habit_total == 0));
    }

    #[test]
    fn percentage_rounds() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("runner").unwrap();
        let day = date("2024-01-10");
        for i in 0..3 {
            let habit = db.create_habit(&user.id, &format!("habit {i}")).unwrap();
            if i < 2 {
                db.set_completion(&user.id, &habit.id, day, true).unwrap();
            }
        }
        let entries = range_heatmap(&db, &user.id, day, day).unwrap();
        // 2/3 = 66.66..% rounds to 67.
        assert_eq!(entries[0].percentage, 67);
    }

    #[test]
    fn month_range_handles_december() {
        let (first, last) = month_range(date("2024-12-15"));
        assert_eq!(first, date("2024-12-01"));
        assert_eq!(last, date("2024-12-31"));
    }

    #[test]
    fn month_range_handles_leap_february() {
        let (first, last) = month_range(date("2024-02-10"));
        assert_eq!(first, date("2024-02-01"));
        assert_eq!(last, date("2024-02-29"));
    }

    #[test]
    fn default_calendar_spans_previous_and_current_month() {
        let (start, end) = default_calendar_range(date("2024-03-15"));
        assert_eq!(start, date("2024-02-01"));
        assert_eq!(end, date("2024-03-31"));
    }

    #[test]
    fn default_calendar_crosses_year_boundary() {
        let (start, end) = default_calendar_range(date("2024-01-15"));
        assert_eq!(start, date("2023-12-01"));
        assert_eq!(end, date("2024-01-31"));
    }

    #[test]
    fn heat_chars_scale_with_percentage() {
        let mut entry = DayRate {
            date: date("2024-01-01"),
            completed_count: 0,
            active_habit_total: 4,
            percentage: 0,
        };
        assert_eq!(entry.heat_char(), ' ');
        entry.percentage = 25;
        assert_eq!(entry.heat_char(), '░');
        entry.percentage = 50;
        assert_eq!(entry.heat_char(), '▒');
        entry.percentage = 75;
        assert_eq!(entry.heat_char(), '▓');
        entry.percentage = 100;
        assert_eq!(entry.heat_char(), '█');
    }
}
