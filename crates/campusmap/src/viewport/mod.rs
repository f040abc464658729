//! Viewport Planner: zoom level and center for a map view.
//!
//! The map is pre-rendered at a handful of scales. A bounding box in base
//! pixels is framed at the largest scale that fits inside the viewport minus
//! its margin; with no box the view falls back to a fixed zoom and centers on
//! whichever location is known.

use campusmap_data::{BoundingBox, Location, PathRecord};
use tracing::{debug, instrument};

/// Fixed rendering parameters of the map viewer.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    /// Scale multiplier per zoom level, largest first
    pub scales: Vec<f64>,
    pub width: i64,
    pub height: i64,
    /// Pixels kept free on each axis when fitting a box
    pub margin: i64,
    /// Zoom when there is nothing to frame
    pub default_zoom: usize,
    /// Zoom when framing one location without a path
    pub single_location_zoom: usize,
    /// Center when no location is known
    pub default_center: (i64, i64),
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scales: vec![0.5, 0.25, 0.125, 0.0625],
            width: 600,
            height: 475,
            margin: 5,
            default_zoom: 3,
            single_location_zoom: 1,
            default_center: (4608, 3172),
        }
    }
}

/// Zoom level index and center point in base pixels.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub zoom: usize,
    pub center_x: i64,
    pub center_y: i64,
}

impl Viewport {
    /// Scale multiplier for this viewport's zoom level.
    #[must_use]
    pub fn scale(&self, config: &ViewportConfig) -> Option<f64> {
        config.scales.get(self.zoom).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportPlanner {
    config: ViewportConfig,
}

impl ViewportPlanner {
    #[must_use]
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Index of the largest scale at which `bounds` fits, or the smallest
    /// scale when none does. No box means the default zoom.
    #[must_use]
    pub fn pick_zoom_level(&self, bounds: Option<&BoundingBox>) -> usize {
        let Some(bounds) = bounds else {
            return self.config.default_zoom;
        };
        let max_w = (self.config.width - self.config.margin) as f64;
        let max_h = (self.config.height - self.config.margin) as f64;
        self.config
            .scales
            .iter()
            .position(|&scale| {
                let too_wide = bounds.w as f64 * scale > max_w;
                let too_tall = bounds.h as f64 * scale > max_h;
                !(too_wide || too_tall)
            })
            .unwrap_or_else(|| self.config.scales.len().saturating_sub(1))
    }

    /// Box center when there is a box, otherwise the source, otherwise the
    /// destination, otherwise the default center.
    #[must_use]
    pub fn pick_center(
        &self,
        src: Option<&Location>,
        dst: Option<&Location>,
        bounds: Option<&BoundingBox>,
    ) -> (i64, i64) {
        if let Some(bounds) = bounds {
            return bounds.center();
        }
        src.or(dst)
            .map_or(self.config.default_center, Location::position)
    }

    /// Plans the view for up to two resolved locations and their path.
    ///
    /// A path frames its bounding box. Without a path, a known location is
    /// shown at `single_location_zoom`, which is deliberately closer than the
    /// `default_zoom` that [`pick_zoom_level(None)`](Self::pick_zoom_level)
    /// returns; only when nothing resolved does the default zoom apply.
    #[instrument(name = "Plan Viewport", level = "debug", skip_all)]
    #[must_use]
    pub fn plan(
        &self,
        src: Option<&Location>,
        dst: Option<&Location>,
        path: Option<&PathRecord>,
    ) -> Viewport {
        let bounds = path.map(PathRecord::bounding_box);
        let zoom = match (&bounds, src.or(dst)) {
            (Some(b), _) => self.pick_zoom_level(Some(b)),
            (None, Some(_)) => self.config.single_location_zoom,
            (None, None) => self.pick_zoom_level(None),
        };
        let (center_x, center_y) = self.pick_center(src, dst, bounds.as_ref());
        debug!(
            zoom,
            center_x,
            center_y,
            framed_path = bounds.is_some(),
            "Viewport planned"
        );
        Viewport {
            zoom,
            center_x,
            center_y,
        }
    }
}
