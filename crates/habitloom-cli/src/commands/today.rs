use chrono::Utc;
use clap::Subcommand;
use habitloom_core::HabitEngine;

use super::{open_stores, parse_date, resolve_user};

#[derive(Subcommand)]
pub enum TodayAction {
    /// Show today's habits with completion state
    Show {
        /// Owner username
        user: String,
        /// Date override (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Toggle a habit's completion for today
    Toggle {
        /// Owner username
        user: String,
        /// Habit id
        habit_id: String,
        /// Un-complete instead of complete
        #[arg(long)]
        undo: bool,
        /// Date override (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: TodayAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, pool) = open_stores()?;
    let engine = HabitEngine::new(&db, &pool);

    match action {
        TodayAction::Show { user, date } => {
            let user_id = resolve_user(&db, &user)?;
            let date = match date {
                Some(s) => parse_date(&s)?,
                None => Utc::now().date_naive(),
            };
            let snapshot = engine.daily_snapshot(&user_id, date)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TodayAction::Toggle {
            user,
            habit_id,
            undo,
            date,
        } => {
            let user_id = resolve_user(&db, &user)?;
            let outcome = match date {
                Some(s) => {
                    engine.toggle_completion(&user_id, &habit_id, parse_date(&s)?, !undo)?
                }
                None => engine.toggle_today(&user_id, &habit_id, !undo)?,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let Some(award) = &outcome.awarded {
                eprintln!("Earned collectible: {}", award.collectible_id);
            }
        }
    }
    Ok(())
}
