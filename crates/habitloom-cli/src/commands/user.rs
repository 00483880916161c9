use clap::Subcommand;
use habitloom_core::storage::Database;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user
    Create {
        /// Username (3-20 characters)
        username: String,
    },
    /// List users
    List,
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        UserAction::Create { username } => {
            let user = db.create_user(&username)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::List => {
            let users = db.list_users()?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
    }
    Ok(())
}
