//! Basic query resolution
//!
//! This example demonstrates the resolution cascade against the sample
//! campus:
//! - Lookups by id, building code and exact name
//! - Keyword groups such as `keyword:parking`
//! - Fuzzy matching and disambiguation lists

use campusmap::{CampusMap, Resolution, data::test_data::sample_campus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    campusmap::init_logging(tracing::Level::WARN)?;

    let map = CampusMap::from_snapshot(sample_campus())?;

    let queries = [
        "3",
        "lib",
        "Health Center",
        "keyword:parking",
        "Keyword: Nightlife",
        "sci hal",
        "lecture",
        "zzzz",
    ];

    for query in queries {
        let result = map.resolve(query);
        let stage = result
            .stage()
            .map_or_else(|| "none".to_string(), |stage| stage.to_string());
        println!("'{query}' ({stage}):");
        print_resolution(result.outcome());
    }

    // Many queries at once, resolved in parallel
    let batch = map.resolve_bulk(&["SU", "CC", "eng bldg"]);
    println!("\nBatch:");
    for result in &batch {
        print_resolution(result.outcome());
    }

    Ok(())
}

fn print_resolution(resolution: Resolution<'_>) {
    match resolution {
        Resolution::NotFound => println!("  could not be found"),
        Resolution::Unique(location) => println!("  {location}"),
        Resolution::Ambiguous(candidates) => {
            println!("  did you mean:");
            for candidate in candidates {
                println!("    {} ({:.2})", candidate.location.name, candidate.score);
            }
        }
    }
}
