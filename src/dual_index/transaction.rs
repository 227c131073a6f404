use tracing::debug;

use crate::AvlTree;
use crate::compare::Comparator;
use crate::error::IndexError;

/// An insertion applied to one index of a pair and not yet committed.
///
/// Dropping the guard without calling [`commit`](Self::commit) removes the value
/// again, so a failure on the paired index leaves both exactly as they were.
pub(crate) struct Staged<'a, T: Copy, C: Comparator<T>> {
    tree: &'a mut AvlTree<T, C>,
    pending: Option<T>,
}

impl<'a, T: Copy, C: Comparator<T>> Staged<'a, T, C> {
    /// Inserts `value` into `tree`.
    ///
    /// Returns `Ok(None)` if an equivalent element was already present, in which case
    /// there is nothing to undo.
    pub(crate) fn insert(tree: &'a mut AvlTree<T, C>, value: T) -> Result<Option<Self>, IndexError> {
        if !tree.try_insert(value)? {
            return Ok(None);
        }
        Ok(Some(Self {
            tree,
            pending: Some(value),
        }))
    }

    /// Keeps the insertion.
    pub(crate) fn commit(mut self) {
        self.pending = None;
    }
}

impl<T: Copy, C: Comparator<T>> Drop for Staged<'_, T, C> {
    fn drop(&mut self) {
        if let Some(value) = self.pending.take() {
            let undone = self.tree.remove(&value);
            debug_assert!(undone, "staged value vanished before rollback");
            debug!("rolled back staged insertion");
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn dropped_guard_undoes_insert() {
        let mut tree = AvlTree::from([1, 3]);
        {
            let staged = Staged::insert(&mut tree, 2).unwrap();
            assert!(staged.is_some());
        }
        assert!(tree.iter().eq(&[1, 3]));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn committed_guard_keeps_insert() {
        let mut tree = AvlTree::from([1, 3]);
        Staged::insert(&mut tree, 2).unwrap().unwrap().commit();
        assert!(tree.iter().eq(&[1, 2, 3]));
    }

    #[test]
    fn duplicate_has_nothing_to_undo() {
        let mut tree = AvlTree::from([1, 3]);
        assert!(Staged::insert(&mut tree, 3).unwrap().is_none());
        assert_eq!(tree.len(), 2);
    }
}
