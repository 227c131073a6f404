use core::cmp::Ordering::{self, Equal, Greater, Less};
use core::mem;

use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;
use crate::compare::Comparator;
use crate::error::{IndexError, Violation};

/// The core AVL implementation backing `AvlTree`.
///
/// Lookups are driven by *probes*: closures reporting how a stored element orders
/// relative to the sought key (`Less` means the element is smaller than the key).
/// Insertion needs the full comparator because the rebalancing step compares the
/// inserted element against the child on its path.
#[derive(Clone)]
pub(crate) struct RawAvlTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of nodes reachable from `root`.
    len: usize,
}

/// What a closest-match descent does when the probe reports `Equal`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OnEqual {
    /// The probe identifies a single element; stop there.
    Stop,
    /// The probe may cover several elements; keep looking for a smaller one.
    Descend,
}

impl<T> RawAvlTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), IndexError> {
        self.nodes.try_reserve(additional)
    }

    /// Frees every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        self.nodes.get(handle)
    }

    pub(crate) fn value(&self, handle: Handle) -> &T {
        &self.nodes.get(handle).value
    }

    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.nodes.get_mut(handle).value
    }

    /// Height of the whole tree (0 when empty).
    pub(crate) fn height(&self) -> usize {
        usize::from(self.height_of(self.root))
    }

    /// Unlinks `handle` and returns its value along with its right child.
    ///
    /// Only for draining: the caller must already have taken the left subtree and must
    /// not reach `handle` again.
    pub(crate) fn take_node(&mut self, handle: Handle) -> (T, Option<Handle>) {
        let node = self.nodes.take(handle);
        self.len -= 1;
        if self.len == 0 {
            self.root = None;
        }
        (node.value, node.right)
    }

    #[inline]
    fn height_of(&self, node: Option<Handle>) -> u8 {
        node.map_or(0, |h| self.nodes.get(h).height)
    }

    #[inline]
    fn balance(&self, handle: Handle) -> i32 {
        let node = self.nodes.get(handle);
        i32::from(self.height_of(node.left)) - i32::from(self.height_of(node.right))
    }

    #[inline]
    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.nodes.get_mut(handle).height = height;
    }

    /// Rotates right around `y`; its left child takes its place and is returned.
    fn rotate_right(&mut self, y: Handle) -> Handle {
        let x = self.nodes.get(y).left.expect("`rotate_right()` - node has no left child!");
        let t2 = self.nodes.get(x).right;

        self.nodes.get_mut(y).left = t2;
        self.nodes.get_mut(x).right = Some(y);

        self.update_height(y);
        self.update_height(x);
        trace!(demoted = y.to_index(), promoted = x.to_index(), "rotate right");
        x
    }

    /// Rotates left around `x`; its right child takes its place and is returned.
    fn rotate_left(&mut self, x: Handle) -> Handle {
        let y = self.nodes.get(x).right.expect("`rotate_left()` - node has no right child!");
        let t2 = self.nodes.get(y).left;

        self.nodes.get_mut(x).right = t2;
        self.nodes.get_mut(y).left = Some(x);

        self.update_height(x);
        self.update_height(y);
        trace!(demoted = x.to_index(), promoted = y.to_index(), "rotate left");
        y
    }

    /// Locates the element the probe reports as `Equal`.
    pub(crate) fn search<F>(&self, mut probe: F) -> Option<Handle>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut current = self.root;
        while let Some(h) = current {
            let node = self.nodes.get(h);
            current = match probe(&node.value) {
                Greater => node.left,
                Less => node.right,
                Equal => return Some(h),
            };
        }
        None
    }

    /// Finds the smallest element the probe does not report as `Less`.
    pub(crate) fn search_closest<F>(&self, mut probe: F, on_equal: OnEqual) -> Option<Handle>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(h) = current {
            let node = self.nodes.get(h);
            current = match probe(&node.value) {
                Less => node.right,
                Equal if on_equal == OnEqual::Stop => return Some(h),
                Equal | Greater => {
                    best = Some(h);
                    node.left
                }
            };
        }
        best
    }

    /// Leftmost node.
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left {
            current = left;
        }
        Some(current)
    }

    /// Rightmost node.
    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right {
            current = right;
        }
        Some(current)
    }

    /// Removes the element the probe reports as `Equal`, rebalancing on the way up.
    pub(crate) fn remove_by<F>(&mut self, mut probe: F) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut removed = None;
        self.root = self.remove_at(self.root, &mut probe, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn remove_at<F>(&mut self, node: Option<Handle>, probe: &mut F, removed: &mut Option<T>) -> Option<Handle>
    where
        F: FnMut(&T) -> Ordering,
    {
        let h = node?;
        let (left, right) = {
            let node = self.nodes.get(h);
            (node.left, node.right)
        };

        match probe(&self.nodes.get(h).value) {
            Greater => {
                let left = self.remove_at(left, probe, removed);
                self.nodes.get_mut(h).left = left;
            }
            Less => {
                let right = self.remove_at(right, probe, removed);
                self.nodes.get_mut(h).right = right;
            }
            Equal => match (left, right) {
                (Some(_), Some(right)) => {
                    // Two children: the in-order successor's value moves up and the
                    // successor node is physically unlinked from the right subtree.
                    let (right, successor) = self.take_min(right);
                    let node = self.nodes.get_mut(h);
                    node.right = right;
                    *removed = Some(mem::replace(&mut node.value, successor));
                }
                (only, None) | (None, only) => {
                    *removed = Some(self.nodes.take(h).value);
                    return only;
                }
            },
        }

        if removed.is_none() {
            return Some(h);
        }
        Some(self.rebalance_after_remove(h))
    }

    /// Unlinks the minimum of the subtree at `h`, returning the new subtree root and
    /// the minimum's value.
    fn take_min(&mut self, h: Handle) -> (Option<Handle>, T) {
        match self.nodes.get(h).left {
            Some(left) => {
                let (left, value) = self.take_min(left);
                self.nodes.get_mut(h).left = left;
                (Some(self.rebalance_after_remove(h)), value)
            }
            None => {
                let node = self.nodes.take(h);
                (node.right, node.value)
            }
        }
    }

    // Either subtree of the heavy child may have shrunk, so the case is chosen from
    // the child's own balance rather than from the removed key.
    fn rebalance_after_remove(&mut self, h: Handle) -> Handle {
        self.update_height(h);
        let balance = self.balance(h);
        let node = self.nodes.get(h);

        match (balance, node.left, node.right) {
            (2.., Some(left), _) => {
                if self.balance(left) < 0 {
                    let left = self.rotate_left(left);
                    self.nodes.get_mut(h).left = Some(left);
                }
                self.rotate_right(h)
            }
            (..=-2, _, Some(right)) => {
                if self.balance(right) > 0 {
                    let right = self.rotate_right(right);
                    self.nodes.get_mut(h).right = Some(right);
                }
                self.rotate_left(h)
            }
            _ => h,
        }
    }

    /// Checks the subtree at `node` in order, returning its height.
    fn check_at<C>(
        &self,
        node: Option<Handle>,
        cmp: &C,
        position: &mut usize,
        previous: &mut Option<Handle>,
    ) -> Result<u8, Violation>
    where
        C: Comparator<T>,
    {
        let Some(h) = node else {
            return Ok(0);
        };
        let current = self.nodes.get(h);

        let left = self.check_at(current.left, cmp, position, previous)?;

        let here = *position;
        if let Some(prev) = *previous {
            if cmp.compare(self.value(prev), &current.value) != Less {
                return Err(Violation::Unordered { position: here - 1 });
            }
        }
        *previous = Some(h);
        *position += 1;

        let right = self.check_at(current.right, cmp, position, previous)?;

        let actual = 1 + left.max(right);
        if current.height != actual {
            return Err(Violation::HeightMismatch {
                position: here,
                cached: current.height,
                actual,
            });
        }
        let balance = i32::from(left) - i32::from(right);
        if !(-1..=1).contains(&balance) {
            return Err(Violation::Unbalanced { position: here, balance });
        }
        Ok(actual)
    }

    /// Verifies ordering, cached heights, balance factors and `len`.
    pub(crate) fn check_invariants<C>(&self, cmp: &C) -> Result<(), Violation>
    where
        C: Comparator<T>,
    {
        let mut reachable = 0;
        let mut previous = None;
        self.check_at(self.root, cmp, &mut reachable, &mut previous)?;
        if reachable != self.len || self.nodes.len() != self.len {
            return Err(Violation::LenMismatch {
                reported: self.len,
                reachable,
            });
        }
        Ok(())
    }
}

impl<T> RawAvlTree<T> {
    /// Inserts `value` unless an equivalent element exists.
    ///
    /// Room for the node is reserved before the descent, so on error nothing has been
    /// linked and the tree is exactly as it was.
    pub(crate) fn try_insert<C>(&mut self, value: T, cmp: &C) -> Result<bool, IndexError>
    where
        C: Comparator<T>,
    {
        if let Err(error) = self.nodes.try_reserve(1) {
            // A duplicate needs no room, so it is still a plain "not inserted".
            if self.search(|stored| cmp.compare(stored, &value)).is_some() {
                return Ok(false);
            }
            return Err(error);
        }
        Ok(self.insert(value, cmp))
    }

    /// Inserts `value` unless an equivalent element exists, growing the arena as needed.
    pub(crate) fn insert<C>(&mut self, value: T, cmp: &C) -> bool
    where
        C: Comparator<T>,
    {
        let mut inserted = None;
        self.root = Some(self.insert_at(self.root, value, cmp, &mut inserted));
        if inserted.is_some() {
            self.len += 1;
        }
        inserted.is_some()
    }

    fn insert_at<C>(&mut self, node: Option<Handle>, value: T, cmp: &C, inserted: &mut Option<Handle>) -> Handle
    where
        C: Comparator<T>,
    {
        let Some(h) = node else {
            let leaf = self.nodes.alloc(Node::leaf(value));
            *inserted = Some(leaf);
            return leaf;
        };

        match cmp.compare(&value, self.value(h)) {
            Less => {
                let left = self.insert_at(self.nodes.get(h).left, value, cmp, inserted);
                self.nodes.get_mut(h).left = Some(left);
            }
            Greater => {
                let right = self.insert_at(self.nodes.get(h).right, value, cmp, inserted);
                self.nodes.get_mut(h).right = Some(right);
            }
            // Equivalent key already stored; the new value is dropped.
            Equal => return h,
        }

        match *inserted {
            Some(leaf) => self.rebalance_after_insert(h, leaf, cmp),
            None => h,
        }
    }

    // An insertion grows one subtree by at most one level, so at most one of the
    // four cases fires on each ancestor; which one follows from where the new key went.
    fn rebalance_after_insert<C>(&mut self, h: Handle, leaf: Handle, cmp: &C) -> Handle
    where
        C: Comparator<T>,
    {
        self.update_height(h);
        let balance = self.balance(h);
        let node = self.nodes.get(h);

        match (balance, node.left, node.right) {
            (2.., Some(left), _) => {
                // Left-right: the new key landed right of the left child.
                if cmp.compare(self.value(leaf), self.value(left)) == Greater {
                    let left = self.rotate_left(left);
                    self.nodes.get_mut(h).left = Some(left);
                }
                self.rotate_right(h)
            }
            (..=-2, _, Some(right)) => {
                // Right-left: the new key landed left of the right child.
                if cmp.compare(self.value(leaf), self.value(right)) == Less {
                    let right = self.rotate_right(right);
                    self.nodes.get_mut(h).right = Some(right);
                }
                self.rotate_left(h)
            }
            _ => h,
        }
    }
}
