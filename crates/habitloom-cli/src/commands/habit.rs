use clap::Subcommand;
use habitloom_core::storage::Database;

use super::resolve_user;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit
    Add {
        /// Owner username
        user: String,
        /// Habit display name
        name: String,
    },
    /// Rename a habit
    Rename {
        /// Owner username
        user: String,
        /// Habit id
        habit_id: String,
        /// New display name
        name: String,
    },
    /// Remove (deactivate) a habit
    Remove {
        /// Owner username
        user: String,
        /// Habit id
        habit_id: String,
    },
    /// List active habits
    List {
        /// Owner username
        user: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HabitAction::Add { user, name } => {
            let user_id = resolve_user(&db, &user)?;
            let habit = db.create_habit(&user_id, &name)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Rename {
            user,
            habit_id,
            name,
        } => {
            let user_id = resolve_user(&db, &user)?;
            db.rename_habit(&user_id, &habit_id, &name)?;
            println!("Renamed habit {habit_id}");
        }
        HabitAction::Remove { user, habit_id } => {
            let user_id = resolve_user(&db, &user)?;
            db.deactivate_habit(&user_id, &habit_id)?;
            println!("Removed habit {habit_id}");
        }
        HabitAction::List { user } => {
            let user_id = resolve_user(&db, &user)?;
            let habits = db.active_habits(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
    }
    Ok(())
}
