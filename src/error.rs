use thiserror::Error;

/// A structural defect found by [`Tree::validate`][crate::Tree::validate].
///
/// None of the tree's own operations can produce these; they exist to catch corruption while
/// testing code that builds on the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The root node still points at a parent.
    #[error("the root node has a parent link")]
    RootHasParent,

    /// A child's parent link doesn't point back at the node that owns it.
    #[error("a node at depth {depth} does not link back to its parent")]
    BrokenParentLink {
        /// Depth of the offending child, the root being at depth 1.
        depth: usize,
    },

    /// An in-order neighbour pair is not strictly ascending under the comparator.
    #[error("in-order value {position} is not greater than the value before it")]
    OutOfOrder {
        /// Zero-based in-order index of the later value of the pair.
        position: usize,
    },

    /// The stored length disagrees with the number of reachable nodes.
    #[error("tree reports {expected} values but {found} are reachable")]
    LenMismatch {
        /// The tree's recorded length.
        expected: usize,
        /// Nodes actually reachable from the root.
        found: usize,
    },
}
