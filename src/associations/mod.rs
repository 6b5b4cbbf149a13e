use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::str::FromStr;

use hashbrown::HashSet;
use serde_derive::Serialize;

use crate::associations::rating_index::RatingIndex;
use crate::errors::AssociationError;
use crate::io::{ItemId, UserId};

pub mod rating_index;

/// Which association-strength formula to score candidates with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Formula {
    /// Fraction of the reference item's raters that also rated the
    /// candidate. Always within [0, 1].
    Simple,
    /// The simple fraction re-weighted by how often the candidate is rated
    /// by users outside the reference item's audience.
    Advanced,
}

impl FromStr for Formula {
    type Err = AssociationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "simple" => Ok(Formula::Simple),
            "advanced" => Ok(Formula::Advanced),
            other => Err(AssociationError::InvalidInput(format!(
                "unknown formula '{}'",
                other
            ))),
        }
    }
}

/// One candidate item and its association strength with the reference item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredItem {
    pub id: ItemId,
    pub score: f64,
}

impl ScoredItem {
    fn new(id: ItemId, score: f64) -> Self {
        ScoredItem { id, score }
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score; exact score ties fall back to ascending
        // item id so rankings have one deterministic order
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.id.cmp(&other.id),
        }
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scores every item other than `reference` and returns the `how_many`
/// strongest associations, best first.
///
/// The returned ranking is shorter than `how_many` when fewer candidates
/// exist. Candidates without any rater take part and score zero. The call
/// is a pure function of its inputs; repeated calls over the same index
/// return bit-identical rankings.
pub fn top_associations(
    index: &RatingIndex,
    reference: &ItemId,
    how_many: usize,
    formula: Formula,
) -> Result<Vec<ScoredItem>, AssociationError> {
    if how_many == 0 {
        return Err(AssociationError::InvalidInput(
            "requested a top-0 ranking".to_string(),
        ));
    }

    let reference_raters = match index.raters_of(reference) {
        Ok(raters) => raters,
        Err(AssociationError::UnknownItem { item }) => {
            return Err(AssociationError::InvalidInput(format!(
                "reference item {} is not in the index",
                item
            )))
        }
        Err(error) => return Err(error),
    };

    let reference_count = reference_raters.len();
    if reference_count == 0 {
        return Err(AssociationError::DegenerateInput(format!(
            "reference item {} has no raters",
            reference
        )));
    }

    // The advanced formula needs the users that did not rate the reference
    // item. Computed once per call, not per candidate.
    let non_raters = match formula {
        Formula::Simple => None,
        Formula::Advanced => {
            let non_raters: HashSet<UserId> = index
                .all_users()
                .difference(reference_raters)
                .cloned()
                .collect();
            if non_raters.is_empty() {
                return Err(AssociationError::DegenerateInput(format!(
                    "every known user rated reference item {}",
                    reference
                )));
            }
            Some(non_raters)
        }
    };

    let mut top_items: BinaryHeap<ScoredItem> = BinaryHeap::with_capacity(how_many);

    for candidate in index.items() {
        if candidate == reference {
            continue;
        }
        let candidate_raters = index.raters_of(candidate)?;

        let simple_score =
            common_rater_count(reference_raters, candidate_raters) as f64 / reference_count as f64;

        let score = match &non_raters {
            None => simple_score,
            Some(non_raters) => {
                let outside_overlap = common_rater_count(non_raters, candidate_raters);
                if outside_overlap == 0 {
                    // No non-rater of the reference item ever rated the
                    // candidate. A shared audience means unbounded
                    // specificity; no audience at all scores zero.
                    if simple_score > 0.0 {
                        f64::INFINITY
                    } else {
                        0.0
                    }
                } else {
                    simple_score / (outside_overlap as f64 / non_raters.len() as f64)
                }
            }
        };

        let scored_item = ScoredItem::new(candidate.clone(), score);

        if top_items.len() < how_many {
            top_items.push(scored_item);
        } else {
            let mut bottom = top_items.peek_mut().unwrap();
            // ordering is reverse, the heap top is the weakest of the
            // current top-n
            if scored_item < *bottom {
                *bottom = scored_item;
            }
        }
    }

    Ok(top_items.into_sorted_vec())
}

/// Number of users present in both rater sets.
fn common_rater_count(left: &HashSet<UserId>, right: &HashSet<UserId>) -> usize {
    let (smaller, larger) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    smaller.iter().filter(|user| larger.contains(*user)).count()
}

#[cfg(test)]
mod association_test {
    use float_cmp::approx_eq;
    use hashbrown::HashSet;

    use crate::io::RatingObservation;

    use super::*;

    fn observations(pairs: &[(&str, &str)]) -> Vec<RatingObservation> {
        pairs
            .iter()
            .map(|(user, item)| (user.to_string(), item.to_string()))
            .collect()
    }

    fn users(ids: &[&str]) -> HashSet<UserId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    // itemA: {u1, u2, u3}, itemB: {u1, u2}, itemC: {u3}, itemD: {}
    fn scenario_index(roster: Option<&HashSet<UserId>>) -> RatingIndex {
        let observations = observations(&[
            ("u1", "itemA"),
            ("u2", "itemA"),
            ("u3", "itemA"),
            ("u1", "itemB"),
            ("u2", "itemB"),
            ("u3", "itemC"),
        ]);
        RatingIndex::with_item_catalog(&observations, roster, &["itemD".to_string()]).unwrap()
    }

    #[test]
    fn should_rank_by_simple_co_rating_fraction() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemA".to_string(), 2, Formula::Simple).unwrap();

        assert_eq!(2, ranking.len());
        assert_eq!("itemB", ranking[0].id);
        assert!(approx_eq!(f64, 2.0 / 3.0, ranking[0].score, epsilon = 1e-12));
        assert_eq!("itemC", ranking[1].id);
        assert!(approx_eq!(f64, 1.0 / 3.0, ranking[1].score, epsilon = 1e-12));
    }

    #[test]
    fn should_score_zero_rated_candidates_as_zero() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemA".to_string(), 3, Formula::Simple).unwrap();

        assert_eq!(3, ranking.len());
        assert_eq!("itemD", ranking[2].id);
        assert_eq!(0.0, ranking[2].score);
    }

    #[test]
    fn should_apply_unbounded_specificity_in_advanced_formula() {
        // u4 never rated anything, so the non-rater set of itemA is {u4}
        let roster = users(&["u1", "u2", "u3", "u4"]);
        let index = scenario_index(Some(&roster));

        let ranking =
            top_associations(&index, &"itemA".to_string(), 3, Formula::Advanced).unwrap();

        // itemB and itemC are rated by nobody outside itemA's audience and
        // tie at +infinity; the tie is broken by ascending item id
        assert_eq!("itemB", ranking[0].id);
        assert!(ranking[0].score.is_infinite());
        assert_eq!("itemC", ranking[1].id);
        assert!(ranking[1].score.is_infinite());
        assert_eq!("itemD", ranking[2].id);
        assert_eq!(0.0, ranking[2].score);
    }

    #[test]
    fn should_exclude_reference_item_from_ranking() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemA".to_string(), 10, Formula::Simple).unwrap();

        assert!(ranking.iter().all(|scored| scored.id != "itemA"));
    }

    #[test]
    fn should_return_all_candidates_when_fewer_than_requested() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemA".to_string(), 10, Formula::Simple).unwrap();

        // min(n, item_count - 1) candidates, never padded
        assert_eq!(index.item_count() - 1, ranking.len());
    }

    #[test]
    fn should_reject_zero_length_request() {
        let index = scenario_index(None);

        let result = top_associations(&index, &"itemA".to_string(), 0, Formula::Simple);
        assert!(matches!(result, Err(AssociationError::InvalidInput(_))));
    }

    #[test]
    fn should_reject_reference_without_raters() {
        let index = scenario_index(None);

        for formula in [Formula::Simple, Formula::Advanced] {
            let result = top_associations(&index, &"itemD".to_string(), 2, formula);
            assert!(matches!(
                result,
                Err(AssociationError::DegenerateInput(_))
            ));
        }
    }

    #[test]
    fn should_reject_unknown_reference_item() {
        let index = scenario_index(None);

        let result = top_associations(&index, &"item404".to_string(), 2, Formula::Simple);
        assert!(matches!(result, Err(AssociationError::InvalidInput(_))));
    }

    #[test]
    fn should_reject_advanced_formula_when_every_user_rated_reference() {
        // without a roster the universe is {u1, u2}, and both rated itemA
        let index = RatingIndex::new(
            &observations(&[("u1", "itemA"), ("u2", "itemA"), ("u1", "itemB")]),
            None,
        )
        .unwrap();

        let result = top_associations(&index, &"itemA".to_string(), 2, Formula::Advanced);
        assert!(matches!(
            result,
            Err(AssociationError::DegenerateInput(_))
        ));
    }

    #[test]
    fn should_keep_simple_scores_within_unit_interval() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemB".to_string(), 10, Formula::Simple).unwrap();

        assert!(ranking
            .iter()
            .all(|scored| (0.0..=1.0).contains(&scored.score)));
    }

    #[test]
    fn should_return_identical_rankings_across_calls() {
        let roster = users(&["u1", "u2", "u3", "u4"]);
        let index = scenario_index(Some(&roster));

        for formula in [Formula::Simple, Formula::Advanced] {
            let first = top_associations(&index, &"itemA".to_string(), 3, formula).unwrap();
            let second = top_associations(&index, &"itemA".to_string(), 3, formula).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn should_order_by_descending_score_then_ascending_id() {
        let index = scenario_index(None);

        let ranking =
            top_associations(&index, &"itemA".to_string(), 10, Formula::Simple).unwrap();

        for pair in ranking.windows(2) {
            let stronger = &pair[0];
            let weaker = &pair[1];
            assert!(
                stronger.score > weaker.score
                    || (stronger.score == weaker.score && stronger.id < weaker.id)
            );
        }
    }

    #[test]
    fn should_break_exact_score_ties_by_ascending_item_id() {
        // both candidates share the exact same rater set
        let index = RatingIndex::new(
            &observations(&[
                ("u1", "ref"),
                ("u2", "ref"),
                ("u1", "b-item"),
                ("u1", "a-item"),
            ]),
            None,
        )
        .unwrap();

        let ranking = top_associations(&index, &"ref".to_string(), 2, Formula::Simple).unwrap();

        assert_eq!("a-item", ranking[0].id);
        assert_eq!("b-item", ranking[1].id);
        assert_eq!(ranking[0].score, ranking[1].score);
    }

    #[test]
    fn handle_reverse_ordering_scored_item() {
        let largest = ScoredItem::new("123".to_string(), 5000_f64);
        let middle = ScoredItem::new("234".to_string(), 100_f64);
        let smallest = ScoredItem::new("543".to_string(), 1_f64);
        let items = vec![largest, smallest, middle];

        let how_many = 2;
        let mut top_items: BinaryHeap<ScoredItem> = BinaryHeap::with_capacity(how_many);

        for scored_item in items.into_iter() {
            if top_items.len() < how_many {
                top_items.push(scored_item);
            } else {
                let mut reverse_top = top_items.peek_mut().unwrap();
                if scored_item < *reverse_top {
                    // ordering is reverse thus, the stronger item compares lower.
                    *reverse_top = scored_item;
                }
            }
        }

        let ranked = top_items.into_sorted_vec();
        assert_eq!("123", ranked[0].id);
        assert_eq!("234", ranked[1].id);
    }

    #[test]
    fn should_parse_formula_names() {
        assert_eq!(Formula::Simple, "simple".parse().unwrap());
        assert_eq!(Formula::Advanced, " Advanced ".parse().unwrap());
        assert!("fancy".parse::<Formula>().is_err());
    }
}
