//! Adaptive opponent: a stateless search policy for the AI tracker.
//!
//! The first search of a round is uniform over the unsearched locations. Every
//! later search is drawn from a roulette wheel where each unsearched location is
//! weighted by `1 / (d + 0.1)`, `d` being its distance to the most recent search.
//! Nearby districts are favored but every candidate keeps a nonzero chance.

use contracts::Location;

use crate::random::RandomSource;

/// Keeps the weight finite when a candidate sits on the last search.
pub const WEIGHT_EPSILON: f64 = 0.1;

pub fn selection_weight(distance: f64) -> f64 {
    1.0 / (distance.max(0.0) + WEIGHT_EPSILON)
}

pub fn candidate_weights(candidates: &[&Location], anchor: &Location) -> Vec<f64> {
    candidates
        .iter()
        .map(|candidate| selection_weight(anchor.distance_to(candidate)))
        .collect()
}

/// Normalized draw probabilities, in candidate order.
pub fn selection_probabilities(candidates: &[&Location], anchor: &Location) -> Vec<f64> {
    let weights = candidate_weights(candidates, anchor);
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return vec![0.0; weights.len()];
    }
    weights.into_iter().map(|weight| weight / total).collect()
}

/// Cumulative-weight scan against `unit * total`. Falls through to the last
/// slot when float residue leaves the draw unconsumed.
pub fn roulette_index(weights: &[f64], unit: f64) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    let mut remaining = unit * total;
    for (idx, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(idx);
        }
    }
    Some(weights.len() - 1)
}

/// Pick the next location to search. `last_search` is `None` on the opponent's
/// first turn of a round. Returns `None` only when nothing is left to search.
pub fn choose_search<'a>(
    candidates: &[&'a Location],
    last_search: Option<&Location>,
    rng: &mut dyn RandomSource,
) -> Option<&'a Location> {
    if candidates.is_empty() {
        return None;
    }

    let idx = match last_search {
        None => rng.index(candidates.len()),
        Some(anchor) => {
            let weights = candidate_weights(candidates, anchor);
            roulette_index(&weights, rng.unit())?
        }
    };
    candidates.get(idx).copied()
}

/// Continuation handle for a pending opponent turn. Tickets from a superseded
/// round carry a stale generation and are ignored when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentTicket {
    pub generation: u64,
    pub delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationRegistry;
    use crate::random::ScriptedRandom;

    #[test]
    fn weight_shrinks_with_distance_and_stays_finite_at_zero() {
        assert_eq!(selection_weight(0.0), 10.0);
        assert!(selection_weight(1.0) > selection_weight(2.0));
        assert!(selection_weight(50.0) > 0.0);
    }

    #[test]
    fn roulette_walks_cumulative_weights() {
        let weights = [1.0, 2.0, 1.0];
        assert_eq!(roulette_index(&weights, 0.0), Some(0));
        assert_eq!(roulette_index(&weights, 0.2), Some(0));
        assert_eq!(roulette_index(&weights, 0.5), Some(1));
        assert_eq!(roulette_index(&weights, 0.8), Some(2));
        assert_eq!(roulette_index(&weights, 0.999_999), Some(2));
        assert_eq!(roulette_index(&[], 0.3), None);
    }

    #[test]
    fn first_search_is_uniform_over_candidates() {
        let registry = LocationRegistry::new_orleans();
        let candidates: Vec<&Location> = registry.iter().collect();
        let mut rng = ScriptedRandom::new([9.5 / 12.0]);
        let pick = choose_search(&candidates, None, &mut rng).expect("non-empty");
        assert_eq!(pick.id, "gentilly");
    }

    #[test]
    fn later_searches_favor_the_neighborhood() {
        let registry = LocationRegistry::new_orleans();
        let anchor = registry.get("french-quarter").expect("anchor");
        let candidates: Vec<&Location> = registry
            .iter()
            .filter(|location| location.id != anchor.id)
            .collect();
        let probabilities = selection_probabilities(&candidates, anchor);

        let prob_of = |id: &str| {
            let idx = candidates
                .iter()
                .position(|location| location.id == id)
                .expect("candidate present");
            probabilities[idx]
        };
        assert!(prob_of("cbd") > prob_of("algiers"));
        assert!(prob_of("marigny") > prob_of("lakefront"));
        assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_candidate_set_yields_nothing() {
        let registry = LocationRegistry::new_orleans();
        let mut rng = ScriptedRandom::default();
        assert!(choose_search(&[], registry.get("cbd"), &mut rng).is_none());
    }
}
