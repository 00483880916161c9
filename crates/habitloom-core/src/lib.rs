//! # Habitloom Core Library
//!
//! This library provides the core business logic for Habitloom, a daily
//! habit tracker with collectible rewards. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary, with any service layer being a thin wrapper over the same
//! core library.
//!
//! ## Architecture
//!
//! - **Engine**: A single entry point combining completion toggles with
//!   the daily reward check
//! - **Storage**: SQLite-based habit/completion/award storage and
//!   TOML-based configuration
//! - **Rewards**: Collectible pool providers and the once-per-day
//!   allocator
//! - **Stats**: Calendar heatmap aggregation over arbitrary date ranges
//!
//! ## Key Components
//!
//! - [`HabitEngine`]: Toggle, snapshot, heatmap, and profile entry point
//! - [`Database`]: Habit, completion mark, and award persistence
//! - [`Config`]: Application configuration management
//! - [`CollectiblePool`]: Trait for pool membership providers

pub mod engine;
pub mod error;
pub mod habit;
pub mod rewards;
pub mod stats;
pub mod storage;

pub use engine::{DailySnapshot, HabitEngine, ProfileStats, PublicProfile, ToggleOutcome};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Habit, HabitId, User, UserId};
pub use rewards::{
    AssetPool, CollectibleAward, CollectibleId, CollectiblePool, RewardAllocator, StaticPool,
    REWARD_THRESHOLD,
};
pub use stats::{default_calendar_range, month_range, DayRate};
pub use storage::{Config, Database};
