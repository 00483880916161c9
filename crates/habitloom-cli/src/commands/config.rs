use std::path::PathBuf;

use clap::Subcommand;
use habitloom_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set the collectible pool directory
    SetPool {
        /// Directory holding collectible assets
        dir: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetPool { dir } => {
            let mut config = Config::load()?;
            config.pool.dir = dir;
            config.save()?;
            println!("Pool directory updated");
        }
    }
    Ok(())
}
