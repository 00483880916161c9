use chrono::Utc;
use clap::Subcommand;
use habitloom_core::{default_calendar_range, DayRate, HabitEngine};

use super::{open_stores, parse_date, resolve_user};

#[derive(Subcommand)]
pub enum HeatmapAction {
    /// Show the heatmap for a date range
    Show {
        /// Owner username
        user: String,
        /// Range start (YYYY-MM-DD); defaults to previous month start
        #[arg(long)]
        start: Option<String>,
        /// Range end (YYYY-MM-DD); defaults to current month end
        #[arg(long)]
        end: Option<String>,
        /// Render an ASCII calendar instead of JSON
        #[arg(long)]
        calendar: bool,
    },
}

pub fn run(action: HeatmapAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, pool) = open_stores()?;
    let engine = HabitEngine::new(&db, &pool);

    match action {
        HeatmapAction::Show {
            user,
            start,
            end,
            calendar,
        } => {
            let user_id = resolve_user(&db, &user)?;
            let (default_start, default_end) = default_calendar_range(Utc::now().date_naive());
            let start = match start {
                Some(s) => parse_date(&s)?,
                None => default_start,
            };
            let end = match end {
                Some(s) => parse_date(&s)?,
                None => default_end,
            };
            let entries = engine.heatmap(&user_id, start, end)?;
            if calendar {
                print!("{}", render_calendar(&entries));
            } else {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
        }
    }
    Ok(())
}

/// Render one line per day: date, heat cell, percentage.
fn render_calendar(entries: &[DayRate]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!(
            "{} {} {:>3}% ({}/{})\n",
            entry.date,
            entry.heat_char(),
            entry.percentage,
            entry.completed_count,
            entry.active_habit_total,
        ));
    }
    output
}
