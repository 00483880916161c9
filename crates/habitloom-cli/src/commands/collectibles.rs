use clap::Subcommand;
use habitloom_core::HabitEngine;

use super::{open_stores, resolve_user};

#[derive(Subcommand)]
pub enum CollectiblesAction {
    /// List earned collectibles, most recent first
    List {
        /// Owner username
        user: String,
    },
}

pub fn run(action: CollectiblesAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, pool) = open_stores()?;
    let engine = HabitEngine::new(&db, &pool);

    match action {
        CollectiblesAction::List { user } => {
            let user_id = resolve_user(&db, &user)?;
            let owned = engine.collectibles_owned(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&owned)?);
        }
    }
    Ok(())
}
