//! Ordering strategies for [`AvlTree`](crate::AvlTree).
//!
//! A comparator must be a strict weak order: irreflexive, transitive, and consistent
//! for elements it considers equivalent. Two elements that compare `Equal` are the
//! same key as far as the tree is concerned.

use core::cmp::Ordering;
use core::marker::PhantomData;

/// Orders elements of type `T`.
///
/// Any `Fn(&T, &T) -> Ordering` is a comparator, so closures work directly:
///
/// ```
/// use avl_index::AvlTree;
///
/// let mut tree = AvlTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
/// tree.extend([1, 3, 2]);
/// assert!(tree.iter().eq(&[3, 2, 1]));
/// ```
pub trait Comparator<T: ?Sized> {
    /// Returns how `a` orders relative to `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The element type's own [`Ord`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders elements by a key extracted from each one.
///
/// ```
/// use avl_index::{AvlTree, compare::ByKey};
///
/// let mut tree = AvlTree::with_comparator(ByKey::new(|pair: &(u32, char)| pair.0));
/// tree.insert((2, 'b'));
/// tree.insert((1, 'a'));
/// assert_eq!(tree.insert((2, 'z')), false);
/// assert_eq!(tree.first(), Some(&(1, 'a')));
/// ```
pub struct ByKey<T: ?Sized, F> {
    key: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized, F> ByKey<T, F> {
    pub const fn new(key: F) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, F: Clone> Clone for ByKey<T, F> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T: ?Sized, K: Ord, F> Comparator<T> for ByKey<T, F>
where
    F: Fn(&T) -> K,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }
}

/// Reverses another comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reverse<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}
