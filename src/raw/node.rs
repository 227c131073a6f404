use super::handle::Handle;

/// A single AVL node.
///
/// Children are owned through their handles: every live node is linked from exactly
/// one parent (or is the root), so freeing a subtree touches each slot once.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    // Height of the subtree rooted here; a leaf is 1 and an absent child is 0.
    pub(crate) height: u8,
}

impl<T> Node<T> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
            height: 1,
        }
    }
}
