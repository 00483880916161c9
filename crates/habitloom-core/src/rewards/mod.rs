//! Collectible reward allocation.
//!
//! A user earns at most one collectible per day, granted when the
//! day's completion rate reaches [`REWARD_THRESHOLD`]. Allocation
//! draws uniformly from the unowned part of the pool; once a user owns
//! every collectible the draw falls back to the full pool. Exactly-once
//! issuance under concurrent toggles is enforced by the storage layer's
//! UNIQUE(user_id, earned_date) constraint; the allocator treats a lost
//! insert race as "already awarded" rather than an error.

pub mod pool;

use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::rate::completion_rate;
use crate::error::Result;
use crate::habit::UserId;
use crate::storage::Database;

pub use pool::{AssetPool, CollectiblePool, StaticPool};

/// A collectible is identified by its asset filename.
pub type CollectibleId = String;

/// Daily completion rate required to earn a collectible.
pub const REWARD_THRESHOLD: f64 = 0.90;

/// One earned collectible. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectibleAward {
    pub id: String,
    pub user_id: UserId,
    pub collectible_id: CollectibleId,
    pub earned_date: NaiveDate,
    /// Completion percentage at the time of the award, rounded.
    pub completion_percentage: f64,
}

impl CollectibleAward {
    pub fn new(
        user_id: impl Into<String>,
        collectible_id: impl Into<String>,
        earned_date: NaiveDate,
        completion_percentage: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            collectible_id: collectible_id.into(),
            earned_date,
            completion_percentage,
        }
    }
}

/// Decides and persists daily collectible awards.
pub struct RewardAllocator<'a> {
    db: &'a Database,
    pool: &'a dyn CollectiblePool,
    seed: Option<u64>,
}

impl<'a> RewardAllocator<'a> {
    pub fn new(db: &'a Database, pool: &'a dyn CollectiblePool) -> Self {
        Self {
            db,
            pool,
            seed: None,
        }
    }

    /// Allocator with a deterministic pick, for reproducible tests.
    pub fn with_seed(db: &'a Database, pool: &'a dyn CollectiblePool, seed: u64) -> Self {
        Self {
            db,
            pool,
            seed: Some(seed),
        }
    }

    /// Award a collectible for (user, date) if the day qualifies and
    /// none has been granted yet. Idempotent: a second call for the
    /// same day returns None.
    ///
    /// # Errors
    /// Propagates storage and pool I/O failures unchanged. A lost
    /// insert race against a concurrent writer is not an error.
    pub fn maybe_award(&self, user_id: &str, date: NaiveDate) -> Result<Option<CollectibleAward>> {
        let rate = completion_rate(self.db, user_id, date)?;
        if rate < REWARD_THRESHOLD {
            return Ok(None);
        }
        if self.db.award_exists(user_id, date)? {
            return Ok(None);
        }

        let members = self.pool.members()?;
        if members.is_empty() {
            debug!(user_id, "collectible pool is empty, no award");
            return Ok(None);
        }

        let owned = self.db.owned_collectible_ids(user_id)?;
        let mut candidates: Vec<CollectibleId> = members
            .iter()
            .filter(|id| !owned.contains(*id))
            .cloned()
            .collect();
        if candidates.is_empty() {
            // Pool exhausted for this user: re-award from the full pool.
            candidates = members;
        }

        let collectible_id = self.pick(&candidates);
        let award = CollectibleAward::new(user_id, collectible_id, date, (rate * 100.0).round());

        if self.db.insert_award(&award)? {
            info!(
                user_id,
                collectible = %award.collectible_id,
                %date,
                "collectible awarded"
            );
            Ok(Some(award))
        } else {
            debug!(user_id, %date, "award already granted by concurrent writer");
            Ok(None)
        }
    }

    fn pick(&self, candidates: &[CollectibleId]) -> CollectibleId {
        let index = match self.seed {
            Some(seed) => {
                let mut rng = Mcg128Xsl64::seed_from_u64(seed);
                rng.gen_range(0..candidates.len())
            }
            None => rand::thread_rng().gen_range(0..candidates.len()),
        };
        candidates[index].clone()
    }
}
