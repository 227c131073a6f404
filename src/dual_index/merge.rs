use core::mem;

use tracing::debug;

use super::DualIndex;
use crate::error::IndexError;

/// Records which collections an entity belongs to while a merge moves it.
///
/// Implementors know the source and target collections; the merge only names the
/// entity.
pub trait MembershipLedger<I> {
    /// Makes sure a later [`joined`](Self::joined) for `entity` cannot fail.
    ///
    /// Must not change any observable membership.
    ///
    /// # Errors
    ///
    /// Whatever prevents the room from being made; the merge is then abandoned with
    /// nothing changed.
    fn reserve(&mut self, entity: I) -> Result<(), IndexError>;

    /// `entity` now belongs to the target collection.
    fn joined(&mut self, entity: I);

    /// `entity` no longer belongs to the source collection.
    fn left(&mut self, entity: I);
}

/// A ledger for merges whose memberships are tracked nowhere else.
impl<I> MembershipLedger<I> for () {
    fn reserve(&mut self, _entity: I) -> Result<(), IndexError> {
        Ok(())
    }

    fn joined(&mut self, _entity: I) {}

    fn left(&mut self, _entity: I) {}
}

/// Outcome of [`DualIndex::merge_from`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MergeSummary {
    /// Entities that were only in the source and now live in the target.
    pub moved: usize,
    /// Entities that were already in the target.
    pub duplicates: usize,
}

impl<I: Ord + Copy, R: Ord + Copy> DualIndex<I, R> {
    /// Moves every entity of `other` into `self`, leaving `other` empty.
    ///
    /// Entities are visited in ascending identity order. One that `self` lacks is
    /// inserted into both of `self`'s indexes and reported to `ledger` as joined. Every
    /// entity is reported as having left `other`.
    ///
    /// The merge is all-or-nothing. All the room it needs, in `self` and in the ledger,
    /// is reserved before anything moves; once that succeeds the rest cannot fail.
    ///
    /// # Errors
    ///
    /// Any reservation failure, with `self`, `other` and the ledger's memberships
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{DualIndex, MergeSummary};
    ///
    /// let mut a = DualIndex::new();
    /// let mut b = DualIndex::new();
    /// for id in [1, 3, 5] {
    ///     a.insert(id, 0)?;
    /// }
    /// for id in [3, 7] {
    ///     b.insert(id, 0)?;
    /// }
    ///
    /// let summary = a.merge_from(&mut b, &mut ())?;
    /// assert_eq!(summary, MergeSummary { moved: 1, duplicates: 1 });
    /// assert!(a.iter_by_id().map(|e| e.id).eq([1, 3, 5, 7]));
    /// assert!(b.is_empty());
    /// # Ok::<(), avl_index::IndexError>(())
    /// ```
    pub fn merge_from<L>(&mut self, other: &mut Self, ledger: &mut L) -> Result<MergeSummary, IndexError>
    where
        L: MembershipLedger<I>,
    {
        let mut moved = 0;
        for entry in other.iter_by_id() {
            if !self.contains(entry.id) {
                ledger.reserve(entry.id)?;
                moved += 1;
            }
        }
        self.try_reserve(moved)?;

        let summary = MergeSummary {
            moved,
            duplicates: other.len() - moved,
        };

        let source = mem::take(other);
        for entry in source.by_id {
            if self.insert_reserved(entry) {
                ledger.joined(entry.id);
            }
            ledger.left(entry.id);
        }

        debug!(moved = summary.moved, duplicates = summary.duplicates, "merged dual index");
        Ok(summary)
    }
}
