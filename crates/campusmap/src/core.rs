//! The [`CampusMap`] facade: resolution, path lookup and viewport planning
//! against one swappable data snapshot.
//!
//! ```rust
//! use campusmap::{CampusMap, data::test_data::sample_campus};
//!
//! let map = CampusMap::from_snapshot(sample_campus())?;
//!
//! let plan = map.plan_route(Some("LIB"), "Student Union")?;
//! let summary = plan.summary.expect("sample campus has this path");
//! println!("{:.2} miles, about {}", summary.distance_miles, summary.walking_time);
//! # Ok::<(), campusmap::error::CampusMapError>(())
//! ```

use std::{path::Path, sync::Arc};

use bytes::Bytes;
use campusmap_data::{
    CampusSnapshot, Gazetteer, Location, LocationId, PathRecord, PathStore, PathTable,
    SnapshotHandle,
};
use rayon::prelude::*;
use tracing::{error, info, instrument};

use crate::{
    config::MapConfig,
    error::Result,
    resolver::{LocationResolver, ResolutionResult},
    route::RouteSummary,
    viewport::{Viewport, ViewportPlanner},
};

/// One immutable generation of gazetteer and path data.
#[derive(Debug, Default)]
pub struct MapData {
    gazetteer: Gazetteer,
    paths: PathTable,
}

impl MapData {
    #[must_use]
    pub fn new(gazetteer: Gazetteer, paths: PathTable) -> Self {
        Self { gazetteer, paths }
    }

    pub fn from_snapshot(snapshot: CampusSnapshot) -> Result<Self> {
        let (gazetteer, paths) = snapshot.into_stores()?;
        Ok(Self::new(gazetteer, paths))
    }

    #[must_use]
    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    #[must_use]
    pub fn paths(&self) -> &PathTable {
        &self.paths
    }
}

/// Everything a presentation layer needs to render a query pair.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub source: ResolutionResult,
    pub destination: ResolutionResult,
    /// Path between the two endpoints when both resolved uniquely
    pub path: Option<PathRecord>,
    pub viewport: Viewport,
    pub summary: Option<RouteSummary>,
    /// Miles from a unique source to each destination candidate, aligned with
    /// `destination.matches()`. Empty unless the destination is ambiguous.
    pub destination_distances: Vec<Option<f64>>,
}

/// Campus location search and map framing.
///
/// Every call reads the snapshot current at its start and uses it
/// throughout, so a concurrent [`replace_data`](Self::replace_data) never
/// mixes two generations within one answer.
#[derive(Debug)]
pub struct CampusMap {
    data: SnapshotHandle<MapData>,
    config: MapConfig,
    resolver: LocationResolver,
    planner: ViewportPlanner,
}

impl CampusMap {
    #[must_use]
    pub fn new(data: MapData) -> Self {
        Self::with_config(data, MapConfig::default())
    }

    #[must_use]
    pub fn with_config(data: MapData, config: MapConfig) -> Self {
        Self {
            data: SnapshotHandle::new(data),
            resolver: LocationResolver::new(config.resolver.clone()),
            planner: ViewportPlanner::new(config.viewport.clone()),
            config,
        }
    }

    #[instrument(name = "Create CampusMap from Snapshot", level = "info", skip_all)]
    pub fn from_snapshot(snapshot: CampusSnapshot) -> Result<Self> {
        let t_init = std::time::Instant::now();
        let map = Self::new(MapData::from_snapshot(snapshot)?);
        info!(elapsed_seconds = ?t_init.elapsed(), "CampusMap ready");
        Ok(map)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_snapshot(CampusSnapshot::from_path(path)?)
    }

    /// Swaps in a new data generation and returns its version.
    pub fn replace_data(&self, data: MapData) -> u64 {
        self.data.replace(data)
    }

    pub fn replace_snapshot(&self, snapshot: CampusSnapshot) -> Result<u64> {
        Ok(self.replace_data(MapData::from_snapshot(snapshot)?))
    }

    /// The data generation in effect right now.
    #[must_use]
    pub fn data(&self) -> Arc<MapData> {
        self.data.current()
    }

    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data.version()
    }

    /// The current data generation together with its version, read at once so
    /// the pair always belongs to the same generation.
    #[must_use]
    pub fn data_versioned(&self) -> (u64, Arc<MapData>) {
        self.data.current_versioned()
    }

    #[must_use]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Returns true when `query` uses the configured keyword marker.
    #[must_use]
    pub fn is_keyword_query(&self, query: &str) -> bool {
        self.resolver.is_keyword_query(query)
    }

    #[must_use]
    pub fn resolve(&self, query: &str) -> ResolutionResult {
        self.resolver.resolve(self.data().gazetteer(), query)
    }

    #[must_use]
    pub fn resolve_optional(&self, query: Option<&str>) -> ResolutionResult {
        self.resolver
            .resolve_optional(self.data().gazetteer(), query)
    }

    /// Resolves many queries in parallel against a single snapshot.
    /// Results are in input order.
    #[instrument(
        name = "Resolve Bulk",
        level = "info",
        skip_all,
        fields(count = queries.len())
    )]
    #[must_use]
    pub fn resolve_bulk<S>(&self, queries: &[S]) -> Vec<ResolutionResult>
    where
        S: AsRef<str> + Sync,
    {
        let t_start = std::time::Instant::now();
        let data = self.data();
        let gazetteer = data.gazetteer();
        let results: Vec<_> = queries
            .par_iter()
            .map(|query| self.resolver.resolve(gazetteer, query.as_ref()))
            .collect();
        info!(elapsed_seconds = ?t_start.elapsed(), "Bulk resolution complete");
        results
    }

    /// Path between two locations in either order. Fails only when both ids
    /// are the same.
    pub fn lookup_path(&self, a: LocationId, b: LocationId) -> Result<Option<PathRecord>> {
        Ok(self.data().paths().lookup_path(a, b)?)
    }

    pub fn lookup_path_image(
        &self,
        a: LocationId,
        b: LocationId,
        zoom: usize,
    ) -> Result<Option<Bytes>> {
        Ok(self.data().paths().lookup_image(a, b, zoom)?)
    }

    #[must_use]
    pub fn plan_viewport(
        &self,
        src: Option<&Location>,
        dst: Option<&Location>,
        path: Option<&PathRecord>,
    ) -> Viewport {
        self.planner.plan(src, dst, path)
    }

    /// Resolves both endpoints, looks up their path and frames the result,
    /// walking at the configured pace.
    pub fn plan_route(&self, from: Option<&str>, to: &str) -> Result<RoutePlan> {
        self.plan_route_with_pace(from, to, None)
    }

    /// Like [`plan_route`](Self::plan_route) with a caller-supplied pace in
    /// minutes per mile. A missing or non-positive pace uses the default.
    #[instrument(name = "Plan Route", level = "info", skip(self))]
    pub fn plan_route_with_pace(
        &self,
        from: Option<&str>,
        to: &str,
        pace: Option<f64>,
    ) -> Result<RoutePlan> {
        let data = self.data();
        let gazetteer = data.gazetteer();
        let source = self.resolver.resolve_optional(gazetteer, from);
        let destination = self.resolver.resolve(gazetteer, to);

        let src = source.unique();
        let dst = destination.unique();

        let path = match (src, dst) {
            (Some(src), Some(dst)) => {
                let found = data.paths().lookup_path(src.id, dst.id)?;
                if found.is_none() {
                    error!(src = %src, dst = %dst, "No path record for a resolved pair");
                }
                found
            }
            _ => None,
        };

        let destination_distances = match src {
            Some(src) if destination.is_ambiguous() => destination
                .locations()
                .map(|candidate| -> Result<Option<f64>> {
                    if candidate.id == src.id {
                        return Ok(None);
                    }
                    let found = data.paths().lookup_path(src.id, candidate.id)?;
                    Ok(found.map(|p| self.config.route.miles(p.dist())))
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let viewport = self.planner.plan(src, dst, path.as_ref());
        let summary = path.as_ref().map(|p| self.config.route.summarize(p, pace));

        info!(
            source = source.len(),
            destination = destination.len(),
            has_path = path.is_some(),
            zoom = viewport.zoom,
            "Route planned"
        );

        Ok(RoutePlan {
            source,
            destination,
            path,
            viewport,
            summary,
            destination_distances,
        })
    }
}

#[cfg(test)]
mod tests {
    use campusmap_data::{
        GazetteerStore,
        test_data::{sample_campus, sample_locations, sample_path_table},
    };

    use super::*;

    fn map() -> CampusMap {
        let data = MapData::new(
            Gazetteer::new(sample_locations()).unwrap(),
            sample_path_table().unwrap(),
        );
        CampusMap::new(data)
    }

    #[test]
    fn test_route_between_unique_endpoints() {
        let plan = map().plan_route(Some("LIB"), "SU").unwrap();
        let path = plan.path.expect("path 1-3 exists");
        assert_eq!(path.dist(), 1100);
        assert_eq!(plan.viewport.zoom, 0);
        let view = plan.viewport;
        assert_eq!((view.center_x, view.center_y), (350, 550));
        assert!(plan.summary.is_some());
        assert!(plan.destination_distances.is_empty());
    }

    #[test]
    fn test_route_to_same_location_is_invalid_pair() {
        let err = map().plan_route(Some("LIB"), "1").unwrap_err();
        assert!(err.is_invalid_pair());
    }

    #[test]
    fn test_route_without_path_record() {
        let plan = map().plan_route(Some("Health Center"), "SU").unwrap();
        assert!(plan.path.is_none());
        assert!(plan.summary.is_none());
        // Two endpoints but no box: center on the source
        let view = plan.viewport;
        assert_eq!(view.zoom, 1);
        assert_eq!((view.center_x, view.center_y), (4000, 3000));
    }

    #[test]
    fn test_destination_only() {
        let plan = map().plan_route(None, "Science Hall").unwrap();
        assert!(plan.source.is_empty());
        let view = plan.viewport;
        assert_eq!(view.zoom, 1);
        assert_eq!((view.center_x, view.center_y), (3000, 2400));
    }

    #[test]
    fn test_ambiguous_destination_gets_distance_hints() {
        let plan = map().plan_route(Some("LIB"), "keyword:food").unwrap();
        assert!(plan.path.is_none());
        assert_eq!(plan.destination.ids(), vec![LocationId(3), LocationId(4)]);
        let miles: Vec<f64> = plan
            .destination_distances
            .iter()
            .map(|d| d.unwrap())
            .collect();
        assert!((miles[0] - 1100.0 / 3894.0).abs() < 1e-12);
        assert!((miles[1] - 1500.0 / 3894.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_hints_skip_the_source_itself() {
        let plan = map().plan_route(Some("SU"), "keyword:parking").unwrap();
        assert_eq!(plan.destination.len(), 3);
        assert_eq!(plan.destination_distances[0], None);
        assert_eq!(plan.destination_distances[1], None);
        assert_eq!(plan.destination_distances[2], None);
    }

    #[test]
    fn test_nothing_resolved_uses_defaults() {
        let plan = map().plan_route(Some(""), "zzzz").unwrap();
        let view = plan.viewport;
        assert_eq!(view.zoom, 3);
        assert_eq!((view.center_x, view.center_y), (4608, 3172));
    }

    #[test]
    fn test_path_image_lookup() {
        let m = map();
        let image = m.lookup_path_image(LocationId(3), LocationId(1), 0).unwrap();
        assert_eq!(image.as_deref(), Some(&b"png:1-3-0"[..]));
        let same = m.lookup_path_image(LocationId(1), LocationId(1), 0);
        assert!(same.is_err());
    }

    #[test]
    fn test_replace_data_changes_answers() {
        let m = CampusMap::from_snapshot(sample_campus()).unwrap();
        assert_eq!(m.resolve("LIB").len(), 1);

        let version = m.replace_data(MapData::new(
            Gazetteer::new(vec![Location::new(1, "Bookstore", 0, 0)]).unwrap(),
            PathTable::new(),
        ));
        assert_eq!(version, 2);
        assert!(m.resolve("LIB").is_empty());
        assert_eq!(m.resolve("Bookstore").ids(), vec![LocationId(1)]);
    }

    #[test]
    fn test_data_versioned_pairs_version_with_generation() {
        let m = map();
        let (version, data) = m.data_versioned();
        assert_eq!(version, 1);
        assert_eq!(data.gazetteer().len(), 12);

        m.replace_data(MapData::new(
            Gazetteer::new(vec![Location::new(1, "Bookstore", 0, 0)]).unwrap(),
            PathTable::new(),
        ));
        let (version, data) = m.data_versioned();
        assert_eq!(version, 2);
        assert_eq!(data.gazetteer().len(), 1);
        assert_eq!(m.data_version(), version);
    }

    #[test]
    fn test_keyword_query_uses_configured_marker() {
        let config = MapConfig::builder()
            .keyword_marker("closest ")
            .build()
            .unwrap();
        let data = MapData::new(
            Gazetteer::new(sample_locations()).unwrap(),
            sample_path_table().unwrap(),
        );
        let m = CampusMap::with_config(data, config);
        assert!(m.is_keyword_query("closest submarine"));
        assert!(!m.is_keyword_query("keyword:zzz"));
        assert!(map().is_keyword_query("keyword:zzz"));
    }
}
