//! Path Store: precomputed path geometry and rendered path images.
//!
//! Paths are undirected. Every lookup normalizes its two ids into a
//! [`PathKey`] (smaller id first), so `(a, b)` and `(b, a)` address the same
//! record. Asking for a path from a location to itself is a malformed request
//! and fails with [`DataError::InvalidPair`].

use std::fmt;

use ahash::AHashMap as HashMap;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace, warn};

use crate::{
    error::{DataError, Result},
    location::LocationId,
};

/// Axis-aligned rectangle in base map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self { x, y, w, h }
    }

    /// Geometric center, using floor division on the pixel grid.
    #[must_use]
    pub const fn center(&self) -> (i64, i64) {
        (
            self.x + self.w.div_euclid(2),
            self.y + self.h.div_euclid(2),
        )
    }
}

/// Normalized, unordered pair of distinct location ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey {
    low: LocationId,
    high: LocationId,
}

impl PathKey {
    /// Orders the pair. Fails when both ids are the same location.
    pub fn new(a: LocationId, b: LocationId) -> Result<Self> {
        if a == b {
            warn!(id = %a, "Attempt to address a path from and to the same location");
            return Err(DataError::InvalidPair(a));
        }
        Ok(Self {
            low: a.min(b),
            high: a.max(b),
        })
    }

    #[must_use]
    pub const fn low(&self) -> LocationId {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> LocationId {
        self.high
    }

    #[must_use]
    pub fn contains(&self, id: LocationId) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Precomputed path between two locations: the box enclosing the path and
/// its length, both in base map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathRecord", into = "RawPathRecord")]
pub struct PathRecord {
    key: PathKey,
    bounds: BoundingBox,
    dist: i64,
}

impl PathRecord {
    pub fn new(a: LocationId, b: LocationId, bounds: BoundingBox, dist: i64) -> Result<Self> {
        Ok(Self {
            key: PathKey::new(a, b)?,
            bounds,
            dist,
        })
    }

    #[must_use]
    pub const fn key(&self) -> PathKey {
        self.key
    }

    #[must_use]
    pub const fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    /// Path length in base map pixels.
    #[must_use]
    pub const fn dist(&self) -> i64 {
        self.dist
    }
}

impl fmt::Display for PathRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds;
        write!(
            f,
            "<PathRecord {} {}: {}x{}@{},{} ({})>",
            self.key.low, self.key.high, b.w, b.h, b.x, b.y, self.dist
        )
    }
}

/// Flat on-disk shape of a [`PathRecord`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPathRecord {
    id0: LocationId,
    id1: LocationId,
    x: i64,
    y: i64,
    w: i64,
    h: i64,
    dist: i64,
}

impl TryFrom<RawPathRecord> for PathRecord {
    type Error = DataError;

    fn try_from(raw: RawPathRecord) -> Result<Self> {
        Self::new(
            raw.id0,
            raw.id1,
            BoundingBox::new(raw.x, raw.y, raw.w, raw.h),
            raw.dist,
        )
    }
}

impl From<PathRecord> for RawPathRecord {
    fn from(record: PathRecord) -> Self {
        let b = record.bounds;
        Self {
            id0: record.key.low,
            id1: record.key.high,
            x: b.x,
            y: b.y,
            w: b.w,
            h: b.h,
            dist: record.dist,
        }
    }
}

/// Read-only access to precomputed paths.
pub trait PathStore: fmt::Debug + Send + Sync {
    /// Path record between two locations, in either order.
    ///
    /// `Ok(None)` means no path was precomputed for the pair.
    fn lookup_path(&self, a: LocationId, b: LocationId) -> Result<Option<PathRecord>>;

    /// Rendered path image for the pair at a zoom level.
    fn lookup_image(&self, a: LocationId, b: LocationId, zoom: usize) -> Result<Option<Bytes>>;
}

/// In-memory [`PathStore`].
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    records: HashMap<PathKey, PathRecord>,
    images: HashMap<(PathKey, usize), Bytes>,
}

impl PathTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from records, rejecting two records for the same pair.
    pub fn from_records(records: impl IntoIterator<Item = PathRecord>) -> Result<Self> {
        let mut table = Self::new();
        for record in records {
            table.insert(record)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, record: PathRecord) -> Result<()> {
        let key = record.key();
        if self.records.contains_key(&key) {
            return Err(DataError::DuplicatePath(key));
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Stores a rendered image, replacing any previous image for the same pair and zoom.
    pub fn insert_image(
        &mut self,
        a: LocationId,
        b: LocationId,
        zoom: usize,
        image: impl Into<Bytes>,
    ) -> Result<()> {
        let key = PathKey::new(a, b)?;
        self.images.insert((key, zoom), image.into());
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &PathRecord> {
        self.records.values()
    }
}

impl PathStore for PathTable {
    #[instrument(level = "trace", skip(self))]
    fn lookup_path(&self, a: LocationId, b: LocationId) -> Result<Option<PathRecord>> {
        let key = PathKey::new(a, b)?;
        let found = self.records.get(&key).copied();
        trace!(%key, found = found.is_some(), "Path lookup");
        Ok(found)
    }

    #[instrument(level = "trace", skip(self))]
    fn lookup_image(&self, a: LocationId, b: LocationId, zoom: usize) -> Result<Option<Bytes>> {
        let key = PathKey::new(a, b)?;
        Ok(self.images.get(&(key, zoom)).cloned())
    }
}
