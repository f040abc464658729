use crate::{
    error::{CampusMapError, Result},
    resolver::{NameCollisionPolicy, ResolverConfig, ScorerKind},
    route::RouteConfig,
    viewport::ViewportConfig,
};

/// Complete configuration of a [`CampusMap`](crate::CampusMap).
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapConfig {
    pub resolver: ResolverConfig,
    pub viewport: ViewportConfig,
    pub route: RouteConfig,
}

impl MapConfig {
    #[must_use]
    pub fn builder() -> MapConfigBuilder {
        MapConfigBuilder::new()
    }
}

/// Builder for [`MapConfig`] with validation on [`build`](Self::build)
#[derive(Debug, Clone, Default)]
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    /// Create a new builder with the stock campus map settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MapConfig::default(),
        }
    }

    /// Fewer, more confident fuzzy candidates; exact-name ties are reported
    /// rather than guessed
    #[must_use]
    pub fn strict() -> Self {
        let mut builder = Self::new();
        builder.config.resolver.fuzzy_cutoff = 0.6;
        builder.config.resolver.fuzzy_limit = 3;
        builder.config.resolver.high_confidence = 0.9;
        builder.config.resolver.name_collision = NameCollisionPolicy::ReturnAll;
        builder
    }

    /// More forgiving matching for typo-heavy input
    #[must_use]
    pub fn lenient() -> Self {
        let mut builder = Self::new();
        builder.config.resolver.fuzzy_cutoff = 0.3;
        builder.config.resolver.fuzzy_limit = 10;
        builder.config.resolver.high_confidence = 0.75;
        builder.config.resolver.scorer = ScorerKind::Indel;
        builder
    }

    /// Set the prefix that marks a keyword query
    #[must_use]
    pub fn keyword_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.resolver.keyword_marker = marker.into();
        self
    }

    /// Set the minimum similarity for fuzzy candidates
    #[must_use]
    pub fn fuzzy_cutoff(mut self, cutoff: f64) -> Self {
        self.config.resolver.fuzzy_cutoff = cutoff;
        self
    }

    /// Set the maximum number of fuzzy candidates returned
    #[must_use]
    pub fn fuzzy_limit(mut self, limit: usize) -> Self {
        self.config.resolver.fuzzy_limit = limit;
        self
    }

    /// Set the score above which a fuzzy match is taken as the answer
    #[must_use]
    pub fn high_confidence(mut self, threshold: f64) -> Self {
        self.config.resolver.high_confidence = threshold;
        self
    }

    #[must_use]
    pub fn scorer(mut self, scorer: ScorerKind) -> Self {
        self.config.resolver.scorer = scorer;
        self
    }

    #[must_use]
    pub fn name_collision(mut self, policy: NameCollisionPolicy) -> Self {
        self.config.resolver.name_collision = policy;
        self
    }

    /// Set the scale multipliers, largest first
    #[must_use]
    pub fn scales(mut self, scales: impl Into<Vec<f64>>) -> Self {
        self.config.viewport.scales = scales.into();
        self
    }

    /// Set the viewport size in screen pixels
    #[must_use]
    pub fn viewport_size(mut self, width: i64, height: i64) -> Self {
        self.config.viewport.width = width;
        self.config.viewport.height = height;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: i64) -> Self {
        self.config.viewport.margin = margin;
        self
    }

    #[must_use]
    pub fn default_center(mut self, x: i64, y: i64) -> Self {
        self.config.viewport.default_center = (x, y);
        self
    }

    #[must_use]
    pub fn pixels_per_mile(mut self, pixels: f64) -> Self {
        self.config.route.pixels_per_mile = pixels;
        self
    }

    /// Set the default walking pace in minutes per mile
    #[must_use]
    pub fn walking_pace(mut self, minutes_per_mile: f64) -> Self {
        self.config.route.minutes_per_mile = minutes_per_mile;
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<MapConfig> {
        let MapConfig {
            resolver,
            viewport,
            route,
        } = &self.config;

        for (name, value) in [
            ("fuzzy_cutoff", resolver.fuzzy_cutoff),
            ("high_confidence", resolver.high_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CampusMapError::ConfigError(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if resolver.fuzzy_cutoff > resolver.high_confidence {
            return Err(CampusMapError::ConfigError(format!(
                "fuzzy_cutoff ({}) must not exceed high_confidence ({})",
                resolver.fuzzy_cutoff, resolver.high_confidence
            )));
        }
        if resolver.fuzzy_limit == 0 {
            return Err(CampusMapError::ConfigError(
                "fuzzy_limit must be at least 1".to_string(),
            ));
        }
        if resolver.keyword_marker.trim().is_empty() {
            return Err(CampusMapError::ConfigError(
                "keyword_marker must not be empty".to_string(),
            ));
        }

        if viewport.scales.is_empty() {
            return Err(CampusMapError::ConfigError(
                "at least one scale is required".to_string(),
            ));
        }
        if viewport.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(CampusMapError::ConfigError(format!(
                "scales must be positive, got {:?}",
                viewport.scales
            )));
        }
        if viewport.margin < 0
            || viewport.width <= 2 * viewport.margin
            || viewport.height <= 2 * viewport.margin
        {
            return Err(CampusMapError::ConfigError(format!(
                "viewport {}x{} is too small for margin {}",
                viewport.width, viewport.height, viewport.margin
            )));
        }
        if viewport.default_zoom >= viewport.scales.len()
            || viewport.single_location_zoom >= viewport.scales.len()
        {
            return Err(CampusMapError::ConfigError(format!(
                "zoom levels must index into {} scales",
                viewport.scales.len()
            )));
        }

        if !(route.pixels_per_mile.is_finite() && route.pixels_per_mile > 0.0) {
            return Err(CampusMapError::ConfigError(format!(
                "pixels_per_mile must be positive, got {}",
                route.pixels_per_mile
            )));
        }
        if !(route.minutes_per_mile.is_finite() && route.minutes_per_mile > 0.0) {
            return Err(CampusMapError::ConfigError(format!(
                "walking pace must be positive, got {}",
                route.minutes_per_mile
            )));
        }

        Ok(self.config)
    }
}
