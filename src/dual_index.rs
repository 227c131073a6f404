//! Two indexes over one entity set, kept in lockstep.
//!
//! A [`DualIndex`] stores a small key record per entity, an [`Entry`] of identity and
//! rank, in two AVL trees: one ordered by identity and one ordered by rank (ties broken
//! by identity). It never owns the entities themselves.
//!
//! Every mutation either lands in both trees or in neither.

use core::cmp::Ordering;

use tracing::{debug, error};

use crate::AvlTree;
use crate::avl_tree::Iter;
use crate::compare::Comparator;
use crate::error::{IndexError, Side};

mod merge;
mod transaction;

pub use merge::{MembershipLedger, MergeSummary};
use transaction::Staged;

/// The key record a [`DualIndex`] keeps for one entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Entry<I, R> {
    pub id: I,
    pub rank: R,
}

/// Orders entries by identity alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ById;

impl<I: Ord, R> Comparator<Entry<I, R>> for ById {
    #[inline]
    fn compare(&self, a: &Entry<I, R>, b: &Entry<I, R>) -> Ordering {
        a.id.cmp(&b.id)
    }
}

/// Orders entries by rank, then by identity, so equal ranks resolve to the lowest id.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByRank;

impl<I: Ord, R: Ord> Comparator<Entry<I, R>> for ByRank {
    #[inline]
    fn compare(&self, a: &Entry<I, R>, b: &Entry<I, R>) -> Ordering {
        a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id))
    }
}

/// An identity index and a rank index over the same entities.
///
/// # Examples
///
/// ```
/// use avl_index::DualIndex;
///
/// let mut plays = DualIndex::new();
/// plays.insert(1, 40)?;
/// plays.insert(2, 10)?;
/// plays.insert(3, 10)?;
///
/// // Fewest plays at or above 5: ids 2 and 3 tie at 10, lowest id wins.
/// assert_eq!(plays.first_at_or_above(5).map(|e| e.id), Some(2));
///
/// plays.update_rank(2, 50)?;
/// assert_eq!(plays.first_at_or_above(5).map(|e| e.id), Some(3));
/// # Ok::<(), avl_index::IndexError>(())
/// ```
#[derive(Debug)]
pub struct DualIndex<I, R> {
    by_id: AvlTree<Entry<I, R>, ById>,
    by_rank: AvlTree<Entry<I, R>, ByRank>,
}

impl<I, R> DualIndex<I, R> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            by_id: AvlTree::with_comparator(ById),
            by_rank: AvlTree::with_comparator(ByRank),
        }
    }

    /// Number of entities; both indexes always agree on it.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Entries in ascending identity order.
    pub fn iter_by_id(&self) -> Iter<'_, Entry<I, R>> {
        self.by_id.iter()
    }

    /// Entries in ascending `(rank, id)` order.
    pub fn iter_by_rank(&self) -> Iter<'_, Entry<I, R>> {
        self.by_rank.iter()
    }

    /// Empties both indexes.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_rank.clear();
    }

    /// Reserves room in both indexes for `additional` more entities.
    ///
    /// # Errors
    ///
    /// As [`AvlTree::try_reserve`]. Capacity already reserved in the identity index is
    /// kept if the rank index fails; that has no observable effect.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), IndexError> {
        self.by_id.try_reserve(additional)?;
        self.by_rank.try_reserve(additional)
    }
}

impl<I: Ord + Copy, R: Ord + Copy> DualIndex<I, R> {
    fn find(&self, id: I) -> Option<&Entry<I, R>> {
        self.by_id.get_by(|entry| entry.id.cmp(&id))
    }

    #[must_use]
    pub fn contains(&self, id: I) -> bool {
        self.find(id).is_some()
    }

    /// The rank currently recorded for `id`.
    #[must_use]
    pub fn rank_of(&self, id: I) -> Option<R> {
        self.find(id).map(|entry| entry.rank)
    }

    /// Adds an entity to both indexes.
    ///
    /// Returns `Ok(false)` if `id` is already indexed. If the rank index cannot take the
    /// entry, the identity insertion is undone before the error is returned.
    ///
    /// # Errors
    ///
    /// [`IndexError::Alloc`] / [`IndexError::CapacityExceeded`] from either tree, or
    /// [`IndexError::Desynchronized`] if the rank index already held this entry.
    pub fn insert(&mut self, id: I, rank: R) -> Result<bool, IndexError> {
        let entry = Entry { id, rank };
        let Some(staged) = Staged::insert(&mut self.by_id, entry)? else {
            return Ok(false);
        };

        match self.by_rank.try_insert(entry) {
            Ok(true) => {
                staged.commit();
                Ok(true)
            }
            Ok(false) => {
                error!("rank index held an entry the identity index lacked");
                Err(IndexError::Desynchronized {
                    present: Side::Rank,
                    missing: Side::Identity,
                })
            }
            Err(err) => {
                debug!(error = %err, "rank index rejected entry");
                Err(err)
            }
        }
    }

    /// Adds an entry into space reserved beforehand with [`try_reserve`](Self::try_reserve).
    ///
    /// Returns whether the entity was new.
    fn insert_reserved(&mut self, entry: Entry<I, R>) -> bool {
        if !self.by_id.insert(entry) {
            return false;
        }
        let paired = self.by_rank.insert(entry);
        debug_assert!(paired, "rank index held an entry the identity index lacked");
        true
    }

    /// Removes an entity from both indexes, returning its rank.
    ///
    /// # Errors
    ///
    /// [`IndexError::Desynchronized`] if the identity entry had no rank counterpart.
    /// The identity entry is gone either way.
    pub fn remove(&mut self, id: I) -> Result<Option<R>, IndexError> {
        let Some(entry) = self.by_id.take_by(|entry| entry.id.cmp(&id)) else {
            return Ok(None);
        };
        if !self.by_rank.remove(&entry) {
            error!("identity entry had no rank counterpart");
            return Err(IndexError::Desynchronized {
                present: Side::Identity,
                missing: Side::Rank,
            });
        }
        Ok(Some(entry.rank))
    }

    /// Moves an entity to a new rank, returning the previous one.
    ///
    /// The rank entry is removed under the old key and reinserted under the new one in a
    /// single call, so no caller sees the entity at a stale position. The removal frees a
    /// node that the reinsertion reuses, so this step never allocates.
    ///
    /// # Errors
    ///
    /// [`IndexError::Desynchronized`] if the identity entry had no rank counterpart.
    pub fn update_rank(&mut self, id: I, rank: R) -> Result<Option<R>, IndexError> {
        let Some(&current) = self.find(id) else {
            return Ok(None);
        };
        if current.rank == rank {
            return Ok(Some(rank));
        }

        if !self.by_rank.remove(&current) {
            error!("identity entry had no rank counterpart");
            return Err(IndexError::Desynchronized {
                present: Side::Identity,
                missing: Side::Rank,
            });
        }
        let updated = Entry { id, rank };
        self.by_rank.insert(updated);
        self.by_id.replace(updated);
        Ok(Some(current.rank))
    }

    /// The entry with the smallest rank at or above `rank`, lowest id first on ties.
    #[must_use]
    pub fn first_at_or_above(&self, rank: R) -> Option<&Entry<I, R>> {
        self.by_rank.find_closest_by(|entry| entry.rank.cmp(&rank))
    }

    /// Confirms that both indexes hold exactly the same entries.
    ///
    /// # Errors
    ///
    /// [`IndexError::Desynchronized`] naming the index that holds the stray entry.
    pub fn check_consistency(&self) -> Result<(), IndexError> {
        if self.by_id.len() != self.by_rank.len() {
            let present = if self.by_id.len() > self.by_rank.len() {
                Side::Identity
            } else {
                Side::Rank
            };
            return Err(IndexError::Desynchronized {
                present,
                missing: present.other(),
            });
        }
        if self.by_id.iter().any(|entry| !self.by_rank.contains(entry)) {
            return Err(IndexError::Desynchronized {
                present: Side::Identity,
                missing: Side::Rank,
            });
        }
        Ok(())
    }
}

impl<I, R> Default for DualIndex<I, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Clone, R: Clone> Clone for DualIndex<I, R> {
    fn clone(&self) -> Self {
        Self {
            by_id: self.by_id.clone(),
            by_rank: self.by_rank.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn insert_lands_in_both() {
        let mut index = DualIndex::new();
        assert_eq!(index.insert(7, 3), Ok(true));
        assert_eq!(index.insert(7, 9), Ok(false));
        assert_eq!(index.rank_of(7), Some(3));
        assert_eq!(index.by_rank.len(), 1);
        index.check_consistency().unwrap();
    }

    #[test]
    fn insert_rolls_back_when_rank_index_disagrees() {
        let mut index = DualIndex::new();
        // Plant a stray rank entry to force the second insertion to report a duplicate.
        index.by_rank.insert(Entry { id: 1, rank: 5 });

        assert_eq!(
            index.insert(1, 5),
            Err(IndexError::Desynchronized {
                present: Side::Rank,
                missing: Side::Identity,
            })
        );
        assert!(!index.contains(1));
    }

    #[test]
    fn remove_reports_missing_rank_counterpart() {
        let mut index = DualIndex::new();
        index.insert(1, 5).unwrap();
        index.by_rank.clear();

        assert!(matches!(index.remove(1), Err(IndexError::Desynchronized { .. })));
        assert!(index.is_empty());
    }

    #[test]
    fn update_rank_moves_rank_entry() {
        let mut index = DualIndex::new();
        index.insert(1, 5).unwrap();
        index.insert(2, 8).unwrap();

        assert_eq!(index.update_rank(1, 10), Ok(Some(5)));
        assert_eq!(index.update_rank(9, 10), Ok(None));
        let by_rank: alloc::vec::Vec<_> = index.iter_by_rank().map(|e| (e.rank, e.id)).collect();
        assert_eq!(by_rank, [(8, 2), (10, 1)]);
        assert_eq!(index.rank_of(1), Some(10));
        index.check_consistency().unwrap();
    }

    #[test]
    fn debug_shows_both_indexes() {
        let mut index = DualIndex::new();
        index.insert(4, 9).unwrap();
        assert_eq!(
            alloc::format!("{index:?}"),
            "DualIndex { by_id: {Entry { id: 4, rank: 9 }}, by_rank: {Entry { id: 4, rank: 9 }} }"
        );
    }

    #[test]
    fn consistency_check_spots_stray_entries() {
        let mut index: DualIndex<u8, u8> = DualIndex::new();
        index.by_id.insert(Entry { id: 1, rank: 1 });
        assert_eq!(
            index.check_consistency(),
            Err(IndexError::Desynchronized {
                present: Side::Identity,
                missing: Side::Rank,
            })
        );
        index.by_rank.insert(Entry { id: 1, rank: 2 });
        assert!(index.check_consistency().is_err());
    }
}
