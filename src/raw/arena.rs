use alloc::vec::Vec;

use tracing::warn;

use super::handle::Handle;
use crate::error::IndexError;

/// Slot storage for tree nodes.
///
/// Freed slots are recycled through `free`. The free list always has room for every
/// live slot, so releasing a node never allocates.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T: Clone> Clone for Arena<T> {
    fn clone(&self) -> Self {
        let mut free = Vec::with_capacity(self.slots.len());
        free.extend_from_slice(&self.free);
        Self {
            slots: self.slots.clone(),
            free,
        }
    }
}

impl<T> Arena<T> {
    /// Maximum number of slots an arena can hold.
    pub(crate) const MAX_LEN: usize = Handle::MAX;

    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    #[cfg(test)]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes sure the next `additional` calls to [`alloc`](Self::alloc) neither allocate
    /// nor exceed [`MAX_LEN`](Self::MAX_LEN).
    ///
    /// On error the arena is unchanged.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), IndexError> {
        let fresh = additional.saturating_sub(self.free.len());
        if fresh == 0 {
            return Ok(());
        }

        let Some(target) = self.slots.len().checked_add(fresh).filter(|&n| n <= Self::MAX_LEN) else {
            warn!(max = Self::MAX_LEN, requested = additional, "arena is at maximum capacity");
            return Err(IndexError::CapacityExceeded { max: Self::MAX_LEN });
        };

        // Reserving only grows capacity, so a failure on the second call leaves the
        // arena logically untouched.
        self.slots.try_reserve(fresh)?;
        self.free.try_reserve(target.saturating_sub(self.free.len()))?;
        Ok(())
    }

    /// Stores `element` in a free slot.
    ///
    /// Never allocates after a successful [`try_reserve`](Self::try_reserve) covering this call.
    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            assert!(
                self.slots.len() < Self::MAX_LEN,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Self::MAX_LEN
            );
            self.slots.push(Some(element));
            // Keep the free list able to absorb every live slot.
            self.free.reserve(self.slots.len().saturating_sub(self.free.len()));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_capacity() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert_eq!(arena.capacity(), 10);
    }

    #[test]
    fn reserve_then_alloc_does_not_grow() {
        let mut arena: Arena<u32> = Arena::new();
        arena.try_reserve(8).unwrap();
        let capacity = arena.capacity();
        for value in 0..8 {
            arena.alloc(value);
        }
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(arena.len(), 8);
    }

    #[test]
    fn reserve_counts_free_slots() {
        let mut arena: Arena<u32> = Arena::new();
        let handles: Vec<Handle> = (0..4).map(|value| arena.alloc(value)).collect();
        for handle in handles {
            arena.take(handle);
        }
        let capacity = arena.capacity();
        arena.try_reserve(4).unwrap();
        assert_eq!(arena.capacity(), capacity);
    }

    #[test]
    fn reserve_past_max_len_is_rejected() {
        let mut arena: Arena<u8> = Arena::new();
        arena.alloc(0);
        assert_eq!(
            arena.try_reserve(Arena::<u8>::MAX_LEN),
            Err(IndexError::CapacityExceeded {
                max: Arena::<u8>::MAX_LEN
            })
        );
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn fill_to_max_len() {
        let mut arena: Arena<()> = Arena::new();
        arena.try_reserve(Arena::<()>::MAX_LEN).unwrap();
        for _ in 0..Arena::<()>::MAX_LEN {
            arena.alloc(());
        }
        assert!(arena.try_reserve(1).is_err());
        assert_eq!(arena.len(), Arena::<()>::MAX_LEN);
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        prop_assert!(arena.try_reserve(1).is_ok());
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let value1 = arena.take(handle);
                        let (_, value2) = model.swap_remove(index);
                        prop_assert_eq!(value1, value2);
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
                prop_assert_eq!(arena.is_empty(), model.is_empty());

                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
