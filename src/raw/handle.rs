use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in an [`Arena`](super::arena::Arena).
///
/// Stored off-by-one in a `NonZero` so that `Option<Handle>` (an absent child link)
/// costs nothing extra.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest slot index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Converts a slot index into a handle, or `None` if the index is out of range.
    #[inline]
    pub(crate) const fn try_from_index(index: usize) -> Option<Self> {
        if index > Self::MAX {
            return None;
        }
        // `index + 1` cannot be zero and cannot overflow `RawHandle`.
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((index + 1) as RawHandle) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        match Self::try_from_index(index) {
            Some(handle) => handle,
            None => panic!("`Handle::from_index()` - `index` > `Handle::MAX`!"),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // Child links are `Option<Handle>`; they must stay pointer-free and niche-packed.
    assert_eq_size!(Handle, Option<Handle>);
    assert_eq_size!(Handle, RawHandle);

    #[test]
    #[should_panic(expected = "`Handle::from_index()` - `index` > `Handle::MAX`!")]
    fn invalid_handle() {
        let _ = Handle::from_index(Handle::MAX + 1);
    }

    #[test]
    fn try_from_index_rejects_out_of_range() {
        assert_eq!(Handle::try_from_index(Handle::MAX + 1), None);
        assert_eq!(Handle::try_from_index(Handle::MAX).map(Handle::to_index), Some(Handle::MAX));
    }

    proptest! {
        #[test]
        fn handle_round_trip(index in 0..=Handle::MAX) {
            let handle = Handle::from_index(index);
            prop_assert_eq!(handle.to_index(), index);
        }
    }
}
