//! Loading and replacing whole data snapshots.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::Result,
    gazetteer::Gazetteer,
    location::Location,
    paths::{PathRecord, PathTable},
};

/// Provenance of a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotMetadata {
    pub version: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            source: "unspecified".to_string(),
            generated_at: None,
            description: String::new(),
        }
    }
}

/// Serialized form of a gazetteer plus its precomputed paths.
///
/// This is the file produced by the ingestion pipeline. Path images are not
/// part of it; they are attached to a [`PathTable`] separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampusSnapshot {
    #[serde(default)]
    pub metadata: SnapshotMetadata,
    pub locations: Vec<Location>,
    #[serde(default)]
    pub paths: Vec<PathRecord>,
}

impl CampusSnapshot {
    #[instrument(
        name = "Load Campus Snapshot",
        level = "info",
        skip_all,
        fields(path = %path.as_ref().display())
    )]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        info!(
            version = %snapshot.metadata.version,
            source = %snapshot.metadata.source,
            locations = snapshot.locations.len(),
            paths = snapshot.paths.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the indexed stores. Fails on any id, code or path duplicate.
    pub fn into_stores(self) -> Result<(Gazetteer, PathTable)> {
        let gazetteer = Gazetteer::new(self.locations)?;
        let paths = PathTable::from_records(self.paths)?;
        Ok((gazetteer, paths))
    }

    /// Display names sorted case-insensitively, as used for a location menu.
    #[must_use]
    pub fn location_names(&self) -> Vec<&str> {
        self.locations
            .iter()
            .map(|l| l.name.as_str())
            .sorted_by_key(|name| name.to_lowercase())
            .dedup()
            .collect()
    }
}

/// Shared, swappable reference to an immutable snapshot.
///
/// Readers take an `Arc` to the current value and keep using it for the rest
/// of their request even if a writer replaces it meanwhile. Writers replace
/// the whole value; nothing is ever mutated in place. The version is bumped
/// while the write lock is held, so a reader of
/// [`current_versioned`](Self::current_versioned) never pairs a snapshot with
/// another generation's version.
#[derive(Debug)]
pub struct SnapshotHandle<T> {
    current: RwLock<Arc<T>>,
    version: AtomicU64,
}

impl<T> SnapshotHandle<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(1),
        }
    }

    /// The snapshot in effect right now.
    #[must_use]
    pub fn current(&self) -> Arc<T> {
        Arc::clone(&self.read_guard())
    }

    /// Monotonic counter bumped on each replacement.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// The current snapshot and its version, read under one lock.
    #[must_use]
    pub fn current_versioned(&self) -> (u64, Arc<T>) {
        let guard = self.read_guard();
        let version = self.version.load(Ordering::Acquire);
        (version, Arc::clone(&guard))
    }

    // The guarded value is only ever swapped whole, so a poisoned lock still
    // holds a complete snapshot.
    fn read_guard(&self) -> RwLockReadGuard<'_, Arc<T>> {
        let lock = &self.current;
        lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Arc<T>> {
        let lock = &self.current;
        lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swaps in a new snapshot and returns its version.
    pub fn replace(&self, next: T) -> u64 {
        let next = Arc::new(next);
        let mut guard = self.write_guard();
        *guard = next;
        // Bumped under the write lock; current_versioned relies on it
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        drop(guard);
        info!(version, "Snapshot replaced");
        version
    }
}
