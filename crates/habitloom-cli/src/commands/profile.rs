use clap::Subcommand;
use habitloom_core::HabitEngine;

use super::open_stores;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show a user's public profile
    Show {
        /// Username
        username: String,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, pool) = open_stores()?;
    let engine = HabitEngine::new(&db, &pool);

    match action {
        ProfileAction::Show { username } => {
            let profile = engine.public_profile(&username)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
