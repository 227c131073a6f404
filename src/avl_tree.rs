use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::compare::{Comparator, Natural};
use crate::error::{IndexError, Violation};
use crate::raw::{Handle, RawAvlTree};

mod capacity;
mod closest;

/// Traversal stack. AVL height stays below `1.45 * log2(n + 2)`, so 48 entries cover
/// any tree a `u32` handle can address without spilling.
type Stack = SmallVec<[Handle; 48]>;

/// An ordered set based on an AVL tree with a pluggable [`Comparator`].
///
/// Elements are unique under the comparator: inserting an element equivalent to one
/// already stored is a no-op. All mutations touch only the path from the root to the
/// affected node and leave every node's balance factor in `{-1, 0, 1}`.
///
/// Lookups come in two flavours. The plain forms (`get`, `contains`, `remove`,
/// `find_closest`) take a full element and order it with the tree's comparator. The
/// `_by` forms take a *probe*, a closure telling how a stored element orders relative
/// to the key being sought, so a caller can search by key without building a whole
/// element. A probe must agree with the comparator.
///
/// It is a logic error for an element to be modified in such a way that its ordering
/// relative to any other element changes while it is in the tree.
///
/// # Examples
///
/// ```
/// use avl_index::AvlTree;
///
/// let mut plays = AvlTree::new();
/// plays.insert(40);
/// plays.insert(10);
/// plays.insert(30);
///
/// assert!(plays.contains(&10));
/// assert_eq!(plays.find_closest(&25), Some(&30));
/// assert!(plays.iter().eq(&[10, 30, 40]));
/// ```
///
/// Searching by key with a probe:
///
/// ```
/// use avl_index::{AvlTree, compare::ByKey};
///
/// struct Track { id: u32, title: &'static str }
///
/// let mut tracks = AvlTree::with_comparator(ByKey::new(|t: &Track| t.id));
/// tracks.insert(Track { id: 7, title: "Intro" });
/// tracks.insert(Track { id: 3, title: "Outro" });
///
/// let found = tracks.get_by(|t| t.id.cmp(&7)).map(|t| t.title);
/// assert_eq!(found, Some("Intro"));
/// ```
pub struct AvlTree<T, C = Natural> {
    raw: RawAvlTree<T>,
    cmp: C,
}

/// An iterator over the elements of an `AvlTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`AvlTree`]. Cloning it
/// restarts nothing: the clone continues from the same position, independently.
///
/// [`iter`]: AvlTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a RawAvlTree<T>,
    stack: Stack,
    remaining: usize,
}

/// An owning iterator over the elements of an `AvlTree`, in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`AvlTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: AvlTree#method.into_iter
pub struct IntoIter<T> {
    tree: RawAvlTree<T>,
    stack: Stack,
}

fn push_left_spine<T>(tree: &RawAvlTree<T>, stack: &mut Stack, mut node: Option<Handle>) {
    while let Some(h) = node {
        stack.push(h);
        node = tree.node(h).left;
    }
}

impl<T> AvlTree<T, Natural> {
    /// Makes a new, empty `AvlTree` ordered by `T`'s own [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let mut tree: AvlTree<i32> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<T, C> AvlTree<T, C> {
    /// Makes a new, empty `AvlTree` ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{AvlTree, compare::Reverse, compare::Natural};
    ///
    /// let mut tree = AvlTree::with_comparator(Reverse(Natural));
    /// tree.extend([1, 2, 3]);
    /// assert_eq!(tree.first(), Some(&3));
    /// ```
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            raw: RawAvlTree::new(),
            cmp,
        }
    }

    /// Returns the comparator ordering this tree.
    pub const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree; `0` when empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree = AvlTree::from([10, 20, 30, 40, 50]);
    /// assert_eq!(tree.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every element, releasing all nodes.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// Each call starts a fresh traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree = AvlTree::from([3, 1, 2]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        let mut stack = Stack::new();
        push_left_spine(&self.raw, &mut stack, self.raw.root());
        Iter {
            tree: &self.raw,
            stack,
            remaining: self.raw.len(),
        }
    }

    /// Returns the smallest element, if any.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|h| self.raw.value(h))
    }

    /// Returns the largest element, if any.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|h| self.raw.value(h))
    }

    /// Returns the element currently stored at the root, if any.
    ///
    /// Which element sits at the root depends on the rotation history; it is exposed for
    /// diagnostics and tests.
    #[must_use]
    pub fn root(&self) -> Option<&T> {
        self.raw.root().map(|h| self.raw.value(h))
    }

    /// Returns the element the probe reports as `Equal`.
    ///
    /// The probe returns how a stored element orders relative to the sought key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree = AvlTree::from([(1, 'a'), (2, 'b')]);
    /// assert_eq!(tree.get_by(|(id, _)| id.cmp(&2)), Some(&(2, 'b')));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_by<F>(&self, probe: F) -> Option<&T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.search(probe).map(|h| self.raw.value(h))
    }

    /// Returns a mutable reference to the element the probe reports as `Equal`.
    ///
    /// It is a logic error to change the element's ordering through this reference.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut_by<F>(&mut self, probe: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let handle = self.raw.search(probe)?;
        Some(self.raw.value_mut(handle))
    }

    /// Returns `true` if the probe reports some element as `Equal`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_by<F>(&self, probe: F) -> bool
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.search(probe).is_some()
    }

    /// Removes and returns the element the probe reports as `Equal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let mut tree = AvlTree::from([(1, 'a'), (2, 'b')]);
    /// assert_eq!(tree.take_by(|(id, _)| id.cmp(&1)), Some((1, 'a')));
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn take_by<F>(&mut self, probe: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.raw.remove_by(probe)
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Adds a value to the tree.
    ///
    /// Returns whether the value was newly inserted. If an equivalent element is already
    /// stored the tree is unchanged and `value` is dropped.
    ///
    /// Like `Vec::push`, this aborts if the allocator fails; use
    /// [`try_insert`](Self::try_insert) to observe the failure instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.insert(2), true);
    /// assert_eq!(tree.insert(2), false);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.raw.insert(value, &self.cmp)
    }

    /// Adds a value to the tree, reporting allocation failure.
    ///
    /// Returns `Ok(true)` if the value was newly inserted and `Ok(false)` if an
    /// equivalent element is already stored. On `Err` the tree is exactly as it was
    /// before the call.
    ///
    /// # Errors
    ///
    /// [`IndexError::Alloc`] if memory for the node cannot be obtained, or
    /// [`IndexError::CapacityExceeded`] if the tree already holds as many nodes as it
    /// can address.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn try_insert(&mut self, value: T) -> Result<bool, IndexError> {
        self.raw.try_insert(value, &self.cmp)
    }

    /// Adds a value, replacing the equivalent stored element if there is one.
    /// Returns the replaced element.
    ///
    /// Replacement happens in place; the tree shape does not change.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{AvlTree, compare::ByKey};
    ///
    /// let mut tree = AvlTree::with_comparator(ByKey::new(|p: &(u8, u8)| p.0));
    /// tree.insert((1, 10));
    /// assert_eq!(tree.replace((1, 11)), Some((1, 10)));
    /// assert_eq!(tree.replace((2, 20)), None);
    /// assert_eq!(tree.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn replace(&mut self, value: T) -> Option<T> {
        let cmp = &self.cmp;
        let found = self.raw.search(|stored| cmp.compare(stored, &value));
        match found {
            Some(handle) => Some(core::mem::replace(self.raw.value_mut(handle), value)),
            None => {
                self.raw.insert(value, &self.cmp);
                None
            }
        }
    }

    /// Removes the element equivalent to `value`. Returns whether one was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let mut tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.remove(&2), true);
    /// assert_eq!(tree.remove(&2), false);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the element equivalent to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn take(&mut self, value: &T) -> Option<T> {
        let cmp = &self.cmp;
        self.raw.remove_by(|stored| cmp.compare(stored, value))
    }

    /// Returns the stored element equivalent to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlTree;
    ///
    /// let tree = AvlTree::from([1, 2, 3]);
    /// assert_eq!(tree.get(&2), Some(&2));
    /// assert_eq!(tree.get(&4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get(&self, value: &T) -> Option<&T> {
        self.get_by(|stored| self.cmp.compare(stored, value))
    }

    /// Returns `true` if an element equivalent to `value` is stored.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Verifies the structural invariants: strictly ascending in-order sequence, correct
    /// cached heights, balance factors in `{-1, 0, 1}`, and `len` matching the nodes
    /// reachable from the root.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check_invariants(&self) -> Result<(), Violation> {
        self.raw.check_invariants(&self.cmp)
    }
}

impl<T: Clone, C: Clone> Clone for AvlTree<T, C> {
    /// Deep copy: the clone owns its own nodes.
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for AvlTree<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: PartialEq, C> PartialEq for AvlTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for AvlTree<T, C> {}

impl<T, C: Comparator<T> + Default> FromIterator<T> for AvlTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T, C: Comparator<T>> Extend<T> for AvlTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: 'a + Copy, C: Comparator<T>> Extend<&'a T> for AvlTree<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlTree<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, C> IntoIterator for AvlTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the tree's contents in ascending order.
    fn into_iter(self) -> IntoIter<T> {
        let mut stack = Stack::new();
        push_left_spine(&self.raw, &mut stack, self.raw.root());
        IntoIter { tree: self.raw, stack }
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let h = self.stack.pop()?;
        push_left_spine(self.tree, &mut self.stack, self.tree.node(h).right);
        self.remaining -= 1;
        Some(self.tree.value(h))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let h = self.stack.pop()?;
        // Everything left of `h` is already gone, so unlinking it is safe.
        let (value, right) = self.tree.take_node(h);
        push_left_spine(&self.tree, &mut self.stack, right);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.tree.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.tree.len()).finish()
    }
}
