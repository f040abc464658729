use std::io::Write;

use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;
use crate::{
    location::{Location, LocationId},
    paths::{BoundingBox, PathRecord, PathTable},
    snapshot::{CampusSnapshot, SnapshotMetadata},
};

/// A small campus used by tests, doctests and the demos.
///
/// Ids 1 and 2 are the "Library"/"Library Annex" pair, ids 8 and 9 share the
/// name "Lecture Hall", and several locations carry the `food` and `parking`
/// keywords.
#[must_use]
pub fn sample_locations() -> Vec<Location> {
    vec![
        Location::new(1, "Library", 100, 200)
            .with_code("LIB")
            .with_aliases(["Main Library"])
            .with_keywords(["study"]),
        Location::new(2, "Library Annex", 150, 250).with_keywords(["study"]),
        Location::new(3, "Student Union", 600, 900)
            .with_code("SU")
            .with_aliases(["Union", "Memorial Union"])
            .with_keywords(["food", "parking"]),
        Location::new(4, "Campus Center", 1200, 700)
            .with_code("CC")
            .with_aliases(["Food Court"])
            .with_keywords(["food"]),
        Location::new(5, "North Parking Garage", 2000, 300)
            .with_code("NPG")
            .with_keywords(["parking"]),
        Location::new(6, "Science Hall", 3000, 2400)
            .with_code("SCI")
            .with_aliases(["Sci Hall"]),
        Location::new(7, "Health Center", 4000, 3000).with_code("HC"),
        Location::new(8, "Lecture Hall", 800, 1600),
        Location::new(9, "Lecture Hall", 2600, 1900),
        Location::new(10, "Engineering Building", 5200, 4100)
            .with_code("ENG")
            .with_aliases(["Eng. Bldg."]),
        Location::new(11, "Athletics Arena", 7000, 5000)
            .with_code("ARENA")
            .with_keywords(["parking", "sports"]),
        Location::new(12, "O'Brien Hall", 3500, 1200).with_code("OBH"),
    ]
}

fn path(a: u32, b: u32, bounds: BoundingBox, dist: i64) -> PathRecord {
    PathRecord::new(LocationId(a), LocationId(b), bounds, dist)
        .expect("sample paths never join a location to itself")
}

/// Precomputed paths between some of the [`sample_locations`].
#[must_use]
pub fn sample_paths() -> Vec<PathRecord> {
    vec![
        path(1, 2, BoundingBox::new(100, 200, 50, 50), 80),
        path(1, 3, BoundingBox::new(100, 200, 500, 700), 1100),
        path(1, 4, BoundingBox::new(100, 200, 1100, 500), 1500),
        path(1, 6, BoundingBox::new(100, 200, 2900, 2200), 5400),
        path(3, 4, BoundingBox::new(600, 700, 600, 200), 700),
        path(5, 1, BoundingBox::new(100, 200, 1900, 100), 2100),
        path(4, 11, BoundingBox::new(1200, 700, 5800, 4300), 9000),
        path(7, 10, BoundingBox::new(4000, 3000, 1200, 1100), 2000),
    ]
}

/// The sample campus as a loadable snapshot.
#[must_use]
pub fn sample_campus() -> CampusSnapshot {
    CampusSnapshot {
        metadata: SnapshotMetadata {
            version: "1.0.0".to_string(),
            source: "sample_campus".to_string(),
            generated_at: Utc.with_ymd_and_hms(2010, 8, 30, 23, 30, 13).single(),
            description: "Sample campus gazetteer for tests".to_string(),
        },
        locations: sample_locations(),
        paths: sample_paths(),
    }
}

/// Path table for the sample campus, with a placeholder image for the
/// Library to Student Union path at zoom levels 0 through 3.
pub fn sample_path_table() -> Result<PathTable> {
    let mut table = PathTable::from_records(sample_paths())?;
    for zoom in 0..4 {
        table.insert_image(
            LocationId(1),
            LocationId(3),
            zoom,
            format!("png:1-3-{zoom}").into_bytes(),
        )?;
    }
    Ok(table)
}

/// Writes [`sample_campus`] to a temporary JSON file.
pub fn write_sample_snapshot() -> Result<NamedTempFile> {
    let snapshot = sample_campus();
    info!(
        locations = snapshot.locations.len(),
        paths = snapshot.paths.len(),
        "Writing sample snapshot"
    );
    let mut file = NamedTempFile::new()?;
    file.write_all(snapshot.to_json()?.as_bytes())?;
    file.flush()?;
    Ok(file)
}
