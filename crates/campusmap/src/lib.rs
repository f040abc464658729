//! Campusmap - campus place search and map framing
//!
//! Campusmap turns free-text place queries ("LIB", "student union",
//! "keyword:food") into locations from a fixed campus gazetteer, and plans the
//! map view (zoom level and center) that frames one location or the path
//! between two.
//!
//! # Quick Start
//!
//! ```rust
//! use campusmap::{CampusMap, data::test_data::sample_campus};
//!
//! let map = CampusMap::from_snapshot(sample_campus())?;
//!
//! // Codes are matched case-insensitively
//! let library = map.resolve("lib");
//! assert_eq!(library.unique().map(|l| l.name.as_str()), Some("Library"));
//!
//! // Misspellings go through fuzzy matching
//! let union = map.resolve("studnt union");
//! let names: Vec<_> = union.locations().map(|l| &l.name).collect();
//! println!("Did you mean: {names:?}");
//!
//! // Frame the walk between two places
//! let plan = map.plan_route(Some("Library"), "Campus Center")?;
//! let view = plan.viewport;
//! println!("zoom {} at ({}, {})", view.zoom, view.center_x, view.center_y);
//! # Ok::<(), campusmap::error::CampusMapError>(())
//! ```
//!
//! # Resolution
//!
//! A query is tried as an id, then a building code, then an exact name, then
//! a keyword group, then fuzzily against every name and alias. See
//! [`LocationResolver`] for the details. Not finding anything is an empty
//! result, never an error; the only error on the query path is asking for a
//! path from a location to itself.
//!
//! # Data
//!
//! Locations and paths live in [`campusmap_data`] (re-exported as [`data`]).
//! A [`CampusMap`] holds one immutable generation of that data and can swap
//! in a new one atomically while queries are running.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
pub mod resolver;
pub mod route;
pub mod viewport;

pub use campusmap_data as data;
pub use campusmap_data::{BoundingBox, Location, LocationId, PathRecord};
pub use config::{MapConfig, MapConfigBuilder};
pub use error::{CampusMapError, Result};
pub use resolver::{
    LocationMatch, LocationResolver, MatchStage, NameCollisionPolicy, Resolution,
    ResolutionResult, ResolverConfig, ScorerKind, is_keyword_query, normalize_name,
};
pub use route::{RouteConfig, RouteSummary, WalkingTime};
pub use viewport::{Viewport, ViewportConfig, ViewportPlanner};

pub use crate::core::{CampusMap, MapData, RoutePlan};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the campusmap library.
///
/// `RUST_LOG` takes precedence over `level` when it is set. Only the first
/// call has any effect.
///
/// ```rust
/// use campusmap::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), campusmap::error::CampusMapError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static ()> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("rayon_core=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        GazetteerStore,
        test_data::{sample_campus, write_sample_snapshot},
    };

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_map_creation() {
        setup_test_env();

        let map = CampusMap::from_snapshot(sample_campus());
        assert!(
            map.is_ok(),
            "Should be able to build a map from the sample campus"
        );
    }

    #[test]
    fn test_map_from_file() {
        setup_test_env();

        let file = write_sample_snapshot().unwrap();
        let map = CampusMap::from_path(file.path()).unwrap();
        assert_eq!(map.data().gazetteer().len(), 12);
    }

    #[test]
    fn test_missing_file_is_data_error() {
        setup_test_env();

        let err = CampusMap::from_path("/no/such/campus.json").unwrap_err();
        assert!(matches!(err, CampusMapError::Data(data::DataError::Io(_))));
    }

    #[test]
    fn test_basic_resolution() {
        setup_test_env();

        let map = CampusMap::from_snapshot(sample_campus()).unwrap();
        for (query, expected) in [
            ("LIB", 1),
            ("12", 12),
            ("Sci Hall", 6),
            ("keyword:sports", 11),
        ] {
            let result = map.resolve(query);
            assert_eq!(result.ids(), vec![LocationId(expected)], "query {query}");
        }
    }

    #[test]
    fn test_logging_init_is_idempotent() {
        setup_test_env();

        assert!(init_logging(tracing::Level::DEBUG).is_ok());
        assert!(init_logging(tracing::Level::TRACE).is_ok());
    }
}
