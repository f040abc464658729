//! Gazetteer Store: an immutable catalogue of locations with lookup indexes.

use std::fmt;

use ahash::AHashMap as HashMap;
use tracing::{debug, instrument};

use crate::{
    error::{DataError, Result},
    location::{Location, LocationId},
};

/// Read-only access to a gazetteer snapshot.
///
/// Implementations must be immutable for the lifetime of a borrow; replacing
/// a snapshot is done by swapping whole values (see
/// [`SnapshotHandle`](crate::SnapshotHandle)), never by mutating one in place.
pub trait GazetteerStore: fmt::Debug + Send + Sync {
    /// Exact lookup by id.
    fn lookup_by_id(&self, id: LocationId) -> Option<&Location>;

    /// Lookup by building code, case-insensitive.
    fn lookup_by_code(&self, code: &str) -> Option<&Location>;

    /// Every location tagged with `keyword` (case-insensitive), in gazetteer order.
    fn lookup_by_keyword(&self, keyword: &str) -> Vec<&Location>;

    /// All locations in gazetteer order.
    fn all_locations(&self) -> &[Location];

    fn len(&self) -> usize {
        self.all_locations().len()
    }

    fn is_empty(&self) -> bool {
        self.all_locations().is_empty()
    }
}

/// In-memory gazetteer snapshot.
///
/// The three indexes are derived from the location list once, in
/// [`Gazetteer::new`], and hold positions into it.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    locations: Vec<Location>,
    by_id: HashMap<LocationId, usize>,
    by_code: HashMap<String, usize>,
    by_keyword: HashMap<String, Vec<usize>>,
}

impl Gazetteer {
    /// Builds a gazetteer and its indexes.
    ///
    /// Keywords are indexed trimmed and lowercased, whatever the records were
    /// deserialized with; blank keywords are skipped. Fails on a repeated id
    /// or on two codes that collide after lowercasing.
    #[instrument(
        name = "Build Gazetteer",
        level = "debug",
        skip_all,
        fields(num_locations = locations.len())
    )]
    pub fn new(locations: Vec<Location>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(locations.len());
        let mut by_code: HashMap<String, usize> = HashMap::new();
        let mut by_keyword: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, loc) in locations.iter().enumerate() {
            if by_id.insert(loc.id, idx).is_some() {
                return Err(DataError::DuplicateId(loc.id));
            }

            if let Some(code) = loc.normalized_code() {
                if let Some(&first) = by_code.get(&code) {
                    return Err(DataError::DuplicateCode {
                        code,
                        first: locations[first].id,
                        second: loc.id,
                    });
                }
                by_code.insert(code, idx);
            }

            for keyword in &loc.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    continue;
                }
                let tagged = by_keyword.entry(keyword).or_default();
                // "Food" and " food" on one record index it once
                if tagged.last() != Some(&idx) {
                    tagged.push(idx);
                }
            }
        }

        debug!(
            codes = by_code.len(),
            keywords = by_keyword.len(),
            "Gazetteer indexes built"
        );

        Ok(Self {
            locations,
            by_id,
            by_code,
            by_keyword,
        })
    }

    /// Keywords known to this gazetteer, sorted.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.by_keyword.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }
}

impl GazetteerStore for Gazetteer {
    fn lookup_by_id(&self, id: LocationId) -> Option<&Location> {
        self.by_id.get(&id).map(|&idx| &self.locations[idx])
    }

    fn lookup_by_code(&self, code: &str) -> Option<&Location> {
        self.by_code
            .get(&code.to_lowercase())
            .map(|&idx| &self.locations[idx])
    }

    fn lookup_by_keyword(&self, keyword: &str) -> Vec<&Location> {
        self.by_keyword
            .get(&keyword.to_lowercase())
            .map(|indices| indices.iter().map(|&idx| &self.locations[idx]).collect())
            .unwrap_or_default()
    }

    fn all_locations(&self) -> &[Location] {
        &self.locations
    }
}

impl TryFrom<Vec<Location>> for Gazetteer {
    type Error = DataError;

    fn try_from(locations: Vec<Location>) -> Result<Self> {
        Self::new(locations)
    }
}
