//! Read-only data stores behind the campusmap resolver.
//!
//! This crate holds the value types shared by every part of the system
//! ([`Location`], [`PathRecord`], [`BoundingBox`]) and the two collaborators
//! the resolver and viewport planner read from:
//!
//! - a **Gazetteer Store** ([`GazetteerStore`], implemented by [`Gazetteer`])
//!   with by-id, by-code and by-keyword indexes built once at load time;
//! - a **Path Store** ([`PathStore`], implemented by [`PathTable`]) holding
//!   precomputed path bounding boxes and rendered path images, addressed by
//!   an unordered pair of location ids.
//!
//! Snapshots are loaded from JSON ([`CampusSnapshot`]) and can be replaced
//! wholesale at runtime through a [`SnapshotHandle`].

pub mod gazetteer;
pub mod location;
pub mod paths;
pub mod snapshot;
pub mod test_data;

mod error {
    use thiserror::Error;

    use crate::location::LocationId;

    #[derive(Error, Debug)]
    pub enum DataError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("Serialization error: {0}")]
        Serde(#[from] serde_json::Error),
        #[error("Invalid location pair: a path cannot start and end at location {0}")]
        InvalidPair(LocationId),
        #[error("Duplicate location id {0} in gazetteer")]
        DuplicateId(LocationId),
        #[error("Duplicate location code '{code}' (ids {first} and {second})")]
        DuplicateCode {
            code: String,
            first: LocationId,
            second: LocationId,
        },
        #[error("Duplicate path record for pair {0}")]
        DuplicatePath(crate::paths::PathKey),
    }

    pub type Result<T> = std::result::Result<T, DataError>;
}

pub use error::{DataError, Result};

pub use gazetteer::{Gazetteer, GazetteerStore};
pub use location::{Location, LocationId};
pub use paths::{BoundingBox, PathKey, PathRecord, PathStore, PathTable};
pub use snapshot::{CampusSnapshot, SnapshotHandle, SnapshotMetadata};
