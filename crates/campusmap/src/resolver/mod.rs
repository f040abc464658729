//! Location Resolver: free-text query to ranked locations.
//!
//! A query runs through a fixed cascade and stops at the first stage with a
//! result:
//!
//! 1. **Identifier**: the query parses as an id present in the gazetteer.
//! 2. **Code**: the lowercased query is a building code.
//! 3. **Exact name**: exactly one location carries the query as its name.
//! 4. **Keyword**: the query starts with the keyword marker (`keyword:food`).
//!    A keyword query never falls through to fuzzy matching.
//! 5. **Fuzzy**: similarity against every name and alias.
//!
//! Nothing in the cascade is an error. An empty query, an unknown keyword and
//! a query nothing resembles all produce an empty [`ResolutionResult`].

use std::fmt;

use campusmap_data::{GazetteerStore, Location, LocationId};
use tracing::{debug, info, instrument, trace};

mod fuzzy;
mod similarity;

pub use similarity::{ScorerKind, block_ratio, normalize_name};

/// Default marker introducing a keyword query.
pub const KEYWORD_MARKER: &str = "keyword:";

/// What to do when several locations share the queried name exactly.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameCollisionPolicy {
    /// Continue down the cascade (keyword, then fuzzy matching).
    #[default]
    FallThrough,
    /// Return every location with that name, in gazetteer order.
    ReturnAll,
}

/// Tuning for the resolution cascade.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Prefix marking a keyword query, compared case-insensitively
    pub keyword_marker: String,
    /// Minimum similarity for a fuzzy candidate to be kept
    pub fuzzy_cutoff: f64,
    /// Maximum number of fuzzy candidates returned
    pub fuzzy_limit: usize,
    /// A best fuzzy score above this collapses the result to that one location
    pub high_confidence: f64,
    /// Similarity measure for the fuzzy stage
    pub scorer: ScorerKind,
    /// Handling of exact-name ties
    pub name_collision: NameCollisionPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            keyword_marker: KEYWORD_MARKER.to_string(),
            fuzzy_cutoff: 0.4,
            fuzzy_limit: 5,
            high_confidence: 0.8,
            scorer: ScorerKind::default(),
            name_collision: NameCollisionPolicy::default(),
        }
    }
}

/// The cascade stage that produced a result.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStage {
    Identifier,
    Code,
    ExactName,
    Keyword,
    Fuzzy,
}

impl fmt::Display for MatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identifier => "identifier",
            Self::Code => "code",
            Self::ExactName => "exact name",
            Self::Keyword => "keyword",
            Self::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}

/// A resolved location with its match confidence (1.0 for exact stages).
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch {
    pub location: Location,
    pub score: f64,
}

impl LocationMatch {
    fn exact(location: &Location) -> Self {
        Self {
            location: location.clone(),
            score: 1.0,
        }
    }
}

/// Ordered matches for one query, most confident first.
///
/// The result owns copies of the matched locations; it does not follow later
/// snapshot replacements.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResult {
    stage: Option<MatchStage>,
    matches: Vec<LocationMatch>,
}

impl ResolutionResult {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn single(location: &Location, stage: MatchStage) -> Self {
        Self {
            stage: Some(stage),
            matches: vec![LocationMatch::exact(location)],
        }
    }

    fn exact_set<'a>(locations: impl IntoIterator<Item = &'a Location>, stage: MatchStage) -> Self {
        Self {
            stage: Some(stage),
            matches: locations.into_iter().map(LocationMatch::exact).collect(),
        }
    }

    /// Stage that decided the result; `None` for an empty query.
    #[must_use]
    pub fn stage(&self) -> Option<MatchStage> {
        self.stage
    }

    #[must_use]
    pub fn matches(&self) -> &[LocationMatch] {
        &self.matches
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.matches.iter().map(|m| &m.location)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<LocationId> {
        self.locations().map(|l| l.id).collect()
    }

    #[must_use]
    pub fn into_locations(self) -> Vec<Location> {
        self.matches.into_iter().map(|m| m.location).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The location when exactly one matched.
    #[must_use]
    pub fn unique(&self) -> Option<&Location> {
        match self.matches.as_slice() {
            [only] => Some(&only.location),
            _ => None,
        }
    }

    /// More than one candidate: the caller should ask the user to choose.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.matches.len() > 1
    }

    /// The result as the three cases a presentation layer distinguishes.
    #[must_use]
    pub fn outcome(&self) -> Resolution<'_> {
        match self.matches.as_slice() {
            [] => Resolution::NotFound,
            [only] => Resolution::Unique(&only.location),
            many => Resolution::Ambiguous(many),
        }
    }
}

/// Borrowed view of a [`ResolutionResult`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    NotFound,
    Unique(&'a Location),
    Ambiguous(&'a [LocationMatch]),
}

/// Returns true when `query` uses the default keyword marker (e.g.
/// `keyword:food`). A resolver configured with another marker answers through
/// [`LocationResolver::is_keyword_query`].
#[must_use]
pub fn is_keyword_query(query: &str) -> bool {
    keyword_token(query.trim(), KEYWORD_MARKER).is_some()
}

/// The lowercased, trimmed token after `marker`, if `query` starts with it.
fn keyword_token(query: &str, marker: &str) -> Option<String> {
    let lowered = query.to_lowercase();
    lowered
        .strip_prefix(&marker.to_lowercase())
        .map(|rest| rest.trim().to_string())
}

/// Runs the resolution cascade against a gazetteer snapshot.
///
/// The resolver holds only configuration; the snapshot is passed to every
/// call, so one resolver can serve any number of threads and snapshots.
#[derive(Debug, Clone, Default)]
pub struct LocationResolver {
    config: ResolverConfig,
}

impl LocationResolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns true when `query` starts with this resolver's keyword marker.
    #[must_use]
    pub fn is_keyword_query(&self, query: &str) -> bool {
        keyword_token(query.trim(), &self.config.keyword_marker).is_some()
    }

    /// Resolves `query` to zero, one or several locations.
    #[instrument(name = "Resolve", level = "debug", skip(self, store))]
    #[must_use]
    pub fn resolve<G>(&self, store: &G, query: &str) -> ResolutionResult
    where
        G: GazetteerStore + ?Sized,
    {
        let query = query.trim();
        if query.is_empty() {
            debug!("Empty query");
            return ResolutionResult::empty();
        }

        info!(query, "Resolving location");

        if let Some(found) = query
            .parse::<u32>()
            .ok()
            .and_then(|id| store.lookup_by_id(LocationId(id)))
        {
            info!(query, found = %found, "Found location by id");
            return ResolutionResult::single(found, MatchStage::Identifier);
        }

        if let Some(found) = store.lookup_by_code(&query.to_lowercase()) {
            info!(query, found = %found, "Found location by code");
            return ResolutionResult::single(found, MatchStage::Code);
        }

        let same_name: Vec<&Location> = store
            .all_locations()
            .iter()
            .filter(|loc| loc.name == query)
            .collect();
        match (same_name.as_slice(), self.config.name_collision) {
            ([found], _) => {
                info!(query, found = %found, "Found location by exact name match");
                return ResolutionResult::single(found, MatchStage::ExactName);
            }
            ([], _) => trace!(query, "No exact name match"),
            (_, NameCollisionPolicy::ReturnAll) => {
                info!(
                    query,
                    count = same_name.len(),
                    "Several locations share this name"
                );
                return ResolutionResult::exact_set(same_name, MatchStage::ExactName);
            }
            (_, NameCollisionPolicy::FallThrough) => {
                debug!(
                    query,
                    count = same_name.len(),
                    "Exact name is not unique, continuing to fuzzy matching"
                );
            }
        }

        if let Some(keyword) = keyword_token(query, &self.config.keyword_marker) {
            let tagged = store.lookup_by_keyword(&keyword);
            info!(
                keyword = keyword.as_str(),
                count = tagged.len(),
                "Keyword lookup"
            );
            return ResolutionResult::exact_set(tagged, MatchStage::Keyword);
        }

        let ranked = fuzzy::rank(store, query, &self.config);
        match ranked.first() {
            Some(best) if best.score > self.config.high_confidence => {
                info!(
                    query,
                    found = %best.location,
                    score = best.score,
                    "Top location by fuzzy match"
                );
                ResolutionResult {
                    stage: Some(MatchStage::Fuzzy),
                    matches: ranked.into_iter().take(1).collect(),
                }
            }
            Some(_) => {
                info!(query, count = ranked.len(), "Top locations by fuzzy match");
                ResolutionResult {
                    stage: Some(MatchStage::Fuzzy),
                    matches: ranked,
                }
            }
            None => {
                info!(query, "Found nothing");
                ResolutionResult {
                    stage: Some(MatchStage::Fuzzy),
                    matches: Vec::new(),
                }
            }
        }
    }

    /// Like [`resolve`](Self::resolve) for a query that may be missing.
    #[must_use]
    pub fn resolve_optional<G>(&self, store: &G, query: Option<&str>) -> ResolutionResult
    where
        G: GazetteerStore + ?Sized,
    {
        query.map_or_else(ResolutionResult::empty, |q| self.resolve(store, q))
    }
}

#[cfg(test)]
mod tests {
    use campusmap_data::{Gazetteer, test_data::sample_locations};

    use super::*;

    fn gazetteer() -> Gazetteer {
        Gazetteer::new(sample_locations()).unwrap()
    }

    fn ids(result: &ResolutionResult) -> Vec<u32> {
        result.ids().into_iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_identifier_stage() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "3");
        assert_eq!(ids(&result), vec![3]);
        assert_eq!(result.stage(), Some(MatchStage::Identifier));
    }

    #[test]
    fn test_unknown_id_is_not_an_error() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "4242");
        assert!(result.is_empty());
        assert_eq!(result.stage(), Some(MatchStage::Fuzzy));
    }

    #[test]
    fn test_code_stage_is_case_insensitive() {
        let g = gazetteer();
        let resolver = LocationResolver::default();
        for query in ["lib", "LIB", "Lib"] {
            let result = resolver.resolve(&g, query);
            assert_eq!(ids(&result), vec![1], "query {query}");
            assert_eq!(result.stage(), Some(MatchStage::Code));
        }
    }

    #[test]
    fn test_exact_name_stage() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "Student Union");
        assert_eq!(ids(&result), vec![3]);
        assert_eq!(result.stage(), Some(MatchStage::ExactName));
        assert!((result.matches()[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_name_is_case_sensitive() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "student union");
        assert_eq!(ids(&result), vec![3]);
        assert_eq!(result.stage(), Some(MatchStage::Fuzzy));
    }

    #[test]
    fn test_name_collision_falls_through_to_fuzzy() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "Lecture Hall");
        // Both score 1.0; the stable sort keeps gazetteer order and the
        // high-confidence rule keeps the first.
        assert_eq!(result.stage(), Some(MatchStage::Fuzzy));
        assert_eq!(ids(&result), vec![8]);
    }

    #[test]
    fn test_name_collision_return_all() {
        let g = gazetteer();
        let resolver = LocationResolver::new(ResolverConfig {
            name_collision: NameCollisionPolicy::ReturnAll,
            ..Default::default()
        });
        let result = resolver.resolve(&g, "Lecture Hall");
        assert_eq!(result.stage(), Some(MatchStage::ExactName));
        assert_eq!(ids(&result), vec![8, 9]);
        assert!(result.is_ambiguous());
    }

    #[test]
    fn test_keyword_stage() {
        let g = gazetteer();
        let resolver = LocationResolver::default();
        let plain = resolver.resolve(&g, "keyword:food");
        let messy = resolver.resolve(&g, "Keyword:  Food ");
        assert_eq!(ids(&plain), vec![3, 4]);
        assert_eq!(plain, messy);
        assert_eq!(plain.stage(), Some(MatchStage::Keyword));
    }

    #[test]
    fn test_unknown_keyword_does_not_fall_through() {
        let g = gazetteer();
        let resolver = LocationResolver::default();
        // "library" would fuzzy-match, but keyword queries never reach that stage
        let result = resolver.resolve(&g, "keyword:library");
        assert!(result.is_empty());
        assert_eq!(result.stage(), Some(MatchStage::Keyword));
        assert!(resolver.resolve(&g, "keyword:").is_empty());
    }

    #[test]
    fn test_custom_keyword_marker() {
        let g = gazetteer();
        let resolver = LocationResolver::new(ResolverConfig {
            keyword_marker: "closest ".to_string(),
            ..Default::default()
        });
        let result = resolver.resolve(&g, "Closest Parking");
        assert_eq!(ids(&result), vec![3, 5, 11]);
    }

    #[test]
    fn test_keyword_query_follows_configured_marker() {
        let resolver = LocationResolver::new(ResolverConfig {
            keyword_marker: "closest ".to_string(),
            ..Default::default()
        });
        assert!(resolver.is_keyword_query("closest submarine"));
        assert!(resolver.is_keyword_query("  Closest Parking"));
        assert!(!resolver.is_keyword_query("keyword:zzz"));
        assert!(!resolver.is_keyword_query("parking"));

        let default = LocationResolver::default();
        assert!(default.is_keyword_query("keyword:zzz"));
        assert!(!default.is_keyword_query("closest submarine"));
    }

    #[test]
    fn test_empty_and_missing_queries() {
        let g = gazetteer();
        let resolver = LocationResolver::default();
        for query in ["", "   ", "\t\n"] {
            let result = resolver.resolve(&g, query);
            assert!(result.is_empty());
            assert_eq!(result.stage(), None);
        }
        assert!(resolver.resolve_optional(&g, None).is_empty());
        assert_eq!(ids(&resolver.resolve_optional(&g, Some("SU"))), vec![3]);
    }

    #[test]
    fn test_fuzzy_high_confidence_collapses() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "library");
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result.stage(), Some(MatchStage::Fuzzy));
        assert!(result.matches()[0].score > 0.8);
    }

    #[test]
    fn test_fuzzy_ambiguous_ranking() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "hall");
        // Science Hall scores highest; the three 0.5 ties keep gazetteer order
        assert_eq!(ids(&result), vec![6, 8, 9, 12]);
        assert!(result.is_ambiguous());
        assert!(result.unique().is_none());
        match result.outcome() {
            Resolution::Ambiguous(m) => assert_eq!(m.len(), 4),
            other => panic!("expected an ambiguous result, got {other:?}"),
        }
        let scores: Vec<f64> = result.matches().iter().map(|m| m.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_fuzzy_matches_aliases() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "union");
        assert_eq!(ids(&result), vec![3]);
        assert!((result.matches()[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_punctuation_in_names() {
        let g = gazetteer();
        let result = LocationResolver::default().resolve(&g, "obrien hall");
        assert_eq!(ids(&result), vec![12]);
    }

    #[test]
    fn test_nothing_similar() {
        let g = gazetteer();
        assert!(LocationResolver::default().resolve(&g, "zzzz").is_empty());
    }

    #[test]
    fn test_is_keyword_query() {
        assert!(is_keyword_query("keyword:food"));
        assert!(is_keyword_query("KEYWORD: parking"));
        assert!(is_keyword_query("  keyword:food"));
        assert!(!is_keyword_query("food"));
        assert!(!is_keyword_query("key word:food"));
    }
}
