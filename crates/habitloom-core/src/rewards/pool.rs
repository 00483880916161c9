//! Collectible pool providers.
//!
//! The pool is externally managed and read-only to the engine; each
//! allocation takes a fresh snapshot of its membership.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rewards::CollectibleId;

/// Asset file extensions that count as pool members.
const POOL_EXTENSIONS: &[&str] = &["svg", "png", "jpg"];

/// Read-only view of the collectible pool membership.
pub trait CollectiblePool {
    /// Snapshot of all collectible ids currently in the pool.
    fn members(&self) -> Result<Vec<CollectibleId>>;
}

/// Directory-backed pool: every svg/png/jpg file in the directory is a
/// collectible, identified by its filename. Hidden files are skipped.
/// A missing directory is an empty pool, not an error.
pub struct AssetPool {
    dir: PathBuf,
}

impl AssetPool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CollectiblePool for AssetPool {
    fn members(&self) -> Result<Vec<CollectibleId>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut members = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let has_pool_ext = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| POOL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if has_pool_ext {
                members.push(name);
            }
        }
        members.sort();
        Ok(members)
    }
}

/// Fixed in-memory pool, used by tests and embedders that manage their
/// own asset listing.
pub struct StaticPool {
    members: Vec<CollectibleId>,
}

impl StaticPool {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CollectibleId>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

impl CollectiblePool for StaticPool {
    fn members(&self) -> Result<Vec<CollectibleId>> {
        Ok(self.members.clone())
    }
}
