//! Route planning and map framing
//!
//! Resolves a source and destination, frames the path between them and
//! reports its length and walking time. An ambiguous destination lists the
//! candidates with their distance from the source.

use campusmap::{CampusMap, MapConfigBuilder, MapData, data::test_data::sample_campus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    campusmap::init_logging(tracing::Level::WARN)?;

    let config = MapConfigBuilder::new().walking_pace(18.0).build()?;
    let map = CampusMap::with_config(MapData::from_snapshot(sample_campus())?, config);

    for (from, to) in [
        (Some("Library"), "Science Hall"),
        (Some("LIB"), "keyword:food"),
        (None, "Athletics Arena"),
        (Some("Health Center"), "ENG"),
    ] {
        let plan = map.plan_route(from, to)?;
        println!("{} -> {to}", from.unwrap_or("(anywhere)"));
        println!(
            "  view: zoom {} centered at ({}, {})",
            plan.viewport.zoom, plan.viewport.center_x, plan.viewport.center_y
        );
        if let Some(summary) = plan.summary {
            println!(
                "  {:.2} miles, {} at {} min/mile",
                summary.distance_miles, summary.walking_time, summary.minutes_per_mile
            );
        }
        let distances = &plan.destination_distances;
        for (candidate, miles) in plan.destination.locations().zip(distances) {
            match miles {
                Some(miles) => println!("  {}: {miles:.2} miles", candidate.name),
                None => println!("  {}: no path", candidate.name),
            }
        }
    }

    // A path from a place to itself is a malformed request
    if let Err(err) = map.plan_route(Some("SU"), "Student Union") {
        println!("error: {err}");
    }

    Ok(())
}
