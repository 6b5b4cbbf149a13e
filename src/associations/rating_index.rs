use hashbrown::{HashMap, HashSet};

use crate::errors::AssociationError;
use crate::io::{ItemId, RatingObservation, UserId};

/// Read-only index over a sparse user-item rating matrix.
///
/// Answers "which users rated item X" in near-constant time. Rating values
/// are not stored; only the presence of a rating matters to the association
/// formulas. The index is built once and never mutated afterwards, so it
/// can be shared across any number of concurrent scoring calls.
pub struct RatingIndex {
    item_raters: HashMap<ItemId, HashSet<UserId>>,
    all_users: HashSet<UserId>,
}

impl RatingIndex {
    /// Builds an index from rating-presence observations and an optional
    /// user roster.
    ///
    /// Duplicate (user, item) observations are absorbed. Without a roster
    /// the user universe is the set of users seen in the observations; with
    /// one, it is the union of the roster and the observed raters, so every
    /// rater is always a member of the universe.
    pub fn new(
        observations: &[RatingObservation],
        roster: Option<&HashSet<UserId>>,
    ) -> Result<RatingIndex, AssociationError> {
        RatingIndex::with_item_catalog(observations, roster, &[])
    }

    /// Like [`RatingIndex::new`], but also registers every catalog item.
    /// Catalog items without any observed rating keep an empty rater set,
    /// so they still take part in scoring as candidates.
    pub fn with_item_catalog(
        observations: &[RatingObservation],
        roster: Option<&HashSet<UserId>>,
        catalog: &[ItemId],
    ) -> Result<RatingIndex, AssociationError> {
        if observations.is_empty() {
            return Err(AssociationError::InvalidInput(
                "no rating observations supplied".to_string(),
            ));
        }

        let mut item_raters: HashMap<ItemId, HashSet<UserId>> = HashMap::new();
        let mut all_users: HashSet<UserId> = match roster {
            Some(roster) => roster.clone(),
            None => HashSet::new(),
        };

        for (user, item) in observations {
            if user.is_empty() || item.is_empty() {
                return Err(AssociationError::InvalidInput(format!(
                    "observation with an empty user or item field: ({:?}, {:?})",
                    user, item
                )));
            }
            let raters = item_raters.entry(item.clone()).or_insert_with(HashSet::new);
            raters.insert(user.clone());
            all_users.insert(user.clone());
        }

        for item in catalog {
            item_raters.entry(item.clone()).or_insert_with(HashSet::new);
        }

        Ok(RatingIndex {
            item_raters,
            all_users,
        })
    }

    /// The set of users that rated `item`.
    pub fn raters_of(&self, item: &ItemId) -> Result<&HashSet<UserId>, AssociationError> {
        match self.item_raters.get(item) {
            Some(raters) => Ok(raters),
            None => Err(AssociationError::UnknownItem { item: item.clone() }),
        }
    }

    /// The full user universe: roster users plus every observed rater.
    pub fn all_users(&self) -> &HashSet<UserId> {
        &self.all_users
    }

    pub fn user_count(&self) -> usize {
        self.all_users.len()
    }

    /// All items known to the index. Iteration order is unspecified; the
    /// scoring side orders its results explicitly.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.item_raters.keys()
    }

    pub fn item_count(&self) -> usize {
        self.item_raters.len()
    }
}
