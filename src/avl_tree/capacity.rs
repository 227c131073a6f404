use super::AvlTree;
use crate::compare::Natural;
use crate::error::IndexError;
use crate::raw::RawAvlTree;

impl<T> AvlTree<T, Natural> {
    /// Creates an empty tree with room for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree: AvlTree<i32> = AvlTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<T, C> AvlTree<T, C> {
    /// Creates an empty tree ordered by `cmp` with room for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        AvlTree {
            raw: RawAvlTree::with_capacity(capacity),
            cmp,
        }
    }

    /// Returns how many elements the tree can hold before its node storage grows.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Reserves room so that the next `additional` insertions cannot fail for lack of
    /// memory.
    ///
    /// Slots freed by earlier removals count towards `additional`. On error nothing
    /// changes.
    ///
    /// # Errors
    ///
    /// [`IndexError::Alloc`] if the allocator refuses, or
    /// [`IndexError::CapacityExceeded`] if the tree could never address that many nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.try_reserve(3)?;
    /// for value in [3, 1, 2] {
    ///     assert!(tree.try_insert(value)?);
    /// }
    /// # Ok::<(), avl_index::IndexError>(())
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), IndexError> {
        self.raw.try_reserve(additional)
    }
}
