pub mod collectibles;
pub mod config;
pub mod habit;
pub mod heatmap;
pub mod profile;
pub mod today;
pub mod user;

use chrono::NaiveDate;
use habitloom_core::{AssetPool, Config, Database, UserId};

/// Open the database and the configured collectible pool.
pub fn open_stores() -> Result<(Database, AssetPool), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let pool = AssetPool::new(config.pool_dir()?);
    Ok((db, pool))
}

/// Resolve a username to its user id.
pub fn resolve_user(db: &Database, username: &str) -> Result<UserId, Box<dyn std::error::Error>> {
    let user = db
        .find_user_by_username(username)?
        .ok_or_else(|| format!("unknown user: {username}"))?;
    Ok(user.id)
}

/// Parse a YYYY-MM-DD date argument.
pub fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {s}"))?)
}
