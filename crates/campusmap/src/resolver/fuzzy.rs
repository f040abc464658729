//! Fuzzy stage of the cascade.

use ahash::AHashMap as HashMap;
use campusmap_data::{GazetteerStore, LocationId};
use itertools::Itertools;
use tracing::trace;

use super::{LocationMatch, ResolverConfig};

/// Scores `query` against every name and alias in the store.
///
/// Each location keeps its best-scoring name. Candidates below the cutoff are
/// dropped, the rest are sorted by descending score (ties keep gazetteer
/// order) and truncated to the configured limit.
pub(super) fn rank<G>(store: &G, query: &str, config: &ResolverConfig) -> Vec<LocationMatch>
where
    G: GazetteerStore + ?Sized,
{
    let query = query.to_lowercase();
    let locations = store.all_locations();

    let mut best: HashMap<LocationId, (usize, f64)> = HashMap::new();
    for (position, location) in locations.iter().enumerate() {
        for name in location.names() {
            let score = config.scorer.ratio(&query, &name.to_lowercase());
            if score < config.fuzzy_cutoff {
                continue;
            }
            trace!(%location, name, score, "Fuzzy candidate");
            best.entry(location.id)
                .and_modify(|entry| entry.1 = entry.1.max(score))
                .or_insert((position, score));
        }
    }

    best.into_values()
        .sorted_by(|(pos_a, score_a), (pos_b, score_b)| {
            score_b.total_cmp(score_a).then(pos_a.cmp(pos_b))
        })
        .take(config.fuzzy_limit)
        .map(|(position, score)| LocationMatch {
            location: locations[position].clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use campusmap_data::{Gazetteer, Location, test_data::sample_locations};

    use super::*;
    use crate::resolver::ScorerKind;

    fn ranked_ids(store: &Gazetteer, query: &str, config: &ResolverConfig) -> Vec<u32> {
        rank(store, query, config)
            .into_iter()
            .map(|m| m.location.id.0)
            .collect()
    }

    #[test]
    fn test_best_name_per_location() {
        let g = Gazetteer::new(vec![
            Location::new(1, "Memorial Union", 0, 0).with_aliases(["Union"]),
            Location::new(2, "Union Station", 0, 0),
        ])
        .unwrap();
        let ranked = rank(&g, "union", &ResolverConfig::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].location.id.0, 1);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranking_before_collapse() {
        let g = Gazetteer::new(sample_locations()).unwrap();
        let config = ResolverConfig::default();
        assert_eq!(ranked_ids(&g, "lecture hall", &config), [8, 9, 6, 12, 11]);
        assert_eq!(ranked_ids(&g, "library", &config), vec![1, 2]);
        assert_eq!(ranked_ids(&g, "center", &config), vec![4, 7]);
    }

    #[test]
    fn test_limit_and_cutoff() {
        let g = Gazetteer::new(sample_locations()).unwrap();
        let config = ResolverConfig {
            fuzzy_limit: 2,
            ..Default::default()
        };
        assert_eq!(ranked_ids(&g, "lecture hall", &config), vec![8, 9]);

        let strict = ResolverConfig {
            fuzzy_cutoff: 0.9,
            ..Default::default()
        };
        assert_eq!(ranked_ids(&g, "hall", &strict), Vec::<u32>::new());
    }

    #[test]
    fn test_indel_scorer_ranks_punctuated_names() {
        let g = Gazetteer::new(sample_locations()).unwrap();
        let config = ResolverConfig {
            scorer: ScorerKind::Indel,
            ..Default::default()
        };
        let ranked = rank(&g, "eng bldg", &config);
        assert_eq!(ranked[0].location.id.0, 10);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
    }
}
