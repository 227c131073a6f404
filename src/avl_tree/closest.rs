use core::cmp::Ordering;

use super::AvlTree;
use crate::compare::Comparator;
use crate::raw::OnEqual;

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Returns the smallest stored element that is greater than or equal to `value`.
    ///
    /// This is a one-sided bound, not a nearest-by-distance search: the comparator
    /// only orders elements. If `value` itself is stored, it is returned; if every
    /// element is smaller, the result is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree = AvlTree::from([10, 20, 30, 40, 50]);
    /// assert_eq!(tree.find_closest(&25), Some(&30));
    /// assert_eq!(tree.find_closest(&30), Some(&30));
    /// assert_eq!(tree.find_closest(&55), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find_closest(&self, value: &T) -> Option<&T> {
        let cmp = &self.cmp;
        self.raw
            .search_closest(|stored| cmp.compare(stored, value), OnEqual::Stop)
            .map(|h| self.raw.value(h))
    }
}

impl<T, C> AvlTree<T, C> {
    /// Returns the smallest stored element the probe does not report as `Less`.
    ///
    /// The probe may be coarser than the comparator. When it reports several elements
    /// as `Equal`, the smallest of them under the comparator wins. This is how a tree
    /// ordered by `(rank, id)` answers "first entry with at least this rank", breaking
    /// rank ties towards the lowest id.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// // (plays, id)
    /// let tree = AvlTree::from([(5, 1), (9, 4), (9, 2), (12, 3)]);
    /// let hit = tree.find_closest_by(|&(plays, _)| plays.cmp(&7));
    /// assert_eq!(hit, Some(&(9, 2)));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find_closest_by<F>(&self, probe: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.search_closest(probe, OnEqual::Descend).map(|h| self.raw.value(h))
    }
}
