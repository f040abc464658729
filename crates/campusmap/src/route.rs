//! Distance and walking time for a precomputed path.

use std::fmt;

use campusmap_data::PathRecord;

/// Conversion constants for route summaries.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RouteConfig {
    /// Base map pixels per mile
    pub pixels_per_mile: f64,
    /// Default walking pace
    pub minutes_per_mile: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            pixels_per_mile: 3894.0,
            minutes_per_mile: 20.0,
        }
    }
}

impl RouteConfig {
    /// Path length in miles.
    #[must_use]
    pub fn miles(&self, dist: i64) -> f64 {
        dist as f64 / self.pixels_per_mile
    }

    /// The caller's pace when it is a usable positive number, else the default.
    #[must_use]
    pub fn pace_or_default(&self, pace: Option<f64>) -> f64 {
        pace.filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.minutes_per_mile)
    }

    #[must_use]
    pub fn summarize(&self, path: &PathRecord, pace: Option<f64>) -> RouteSummary {
        let distance_miles = self.miles(path.dist());
        let minutes_per_mile = self.pace_or_default(pace);
        RouteSummary {
            distance_miles,
            minutes_per_mile,
            walking_time: WalkingTime::from_minutes(distance_miles * minutes_per_mile),
        }
    }
}

/// Walking duration split into whole minutes and rounded seconds.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WalkingTime {
    pub minutes: u64,
    pub seconds: u8,
}

impl WalkingTime {
    #[must_use]
    pub fn from_minutes(total: f64) -> Self {
        let total = if total.is_finite() {
            total.max(0.0)
        } else {
            0.0
        };
        let mut minutes = total.floor() as u64;
        let mut seconds = ((total - total.floor()) * 60.0).round() as u8;
        if seconds == 60 {
            minutes += 1;
            seconds = 0;
        }
        Self { minutes, seconds }
    }
}

impl fmt::Display for WalkingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Length and walking time of one path.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_miles: f64,
    pub minutes_per_mile: f64,
    pub walking_time: WalkingTime,
}
