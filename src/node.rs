//! The linked cells of a [`Tree`][crate::Tree] and the borrowed [`NodeRef`] handle callers use to
//! walk them.
//!
//! Every cell owns its two children through raw [`Link`]s and points back at its parent with a
//! non-owning [`Link`]. Only the [`Tree`][crate::Tree] allocates and frees cells.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub(crate) struct Link<T>(pub(crate) Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Link<T>,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    pub(crate) fn new_boxed(value: T, parent: Link<T>) -> Box<Self> {
        Box::new(Node {
            value,
            parent,
            left: Link(None),
            right: Link(None),
        })
    }

    /// Follows left links from `node` until there are none.
    ///
    /// # Safety
    ///
    /// `node` and everything below it must be live nodes of one tree.
    pub(crate) unsafe fn min(mut node: NonNull<Self>) -> NonNull<Self> {
        while let Some(left) = node.as_ref().left.0 {
            node = left;
        }
        node
    }

    /// Follows right links from `node` until there are none.
    ///
    /// # Safety
    ///
    /// `node` and everything below it must be live nodes of one tree.
    pub(crate) unsafe fn max(mut node: NonNull<Self>) -> NonNull<Self> {
        while let Some(right) = node.as_ref().right.0 {
            node = right;
        }
        node
    }

    /// The in-order successor of `node`, found through its right subtree or, failing that, the
    /// first ancestor reached from a left child.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of a tree whose parent links are consistent.
    pub(crate) unsafe fn successor(node: NonNull<Self>) -> Link<T> {
        if let Some(right) = node.as_ref().right.0 {
            return Link(Some(Self::min(right)));
        }
        let mut current = node;
        let mut parent = node.as_ref().parent;
        while let Some(p) = parent.0 {
            if p.as_ref().right.0 != Some(current) {
                break;
            }
            current = p;
            parent = p.as_ref().parent;
        }
        parent
    }

    /// Mirror image of [`Node::successor`].
    ///
    /// # Safety
    ///
    /// `node` must be a live node of a tree whose parent links are consistent.
    pub(crate) unsafe fn predecessor(node: NonNull<Self>) -> Link<T> {
        if let Some(left) = node.as_ref().left.0 {
            return Link(Some(Self::max(left)));
        }
        let mut current = node;
        let mut parent = node.as_ref().parent;
        while let Some(p) = parent.0 {
            if p.as_ref().left.0 != Some(current) {
                break;
            }
            current = p;
            parent = p.as_ref().parent;
        }
        parent
    }

    /// Number of levels in the subtree rooted at `node`, counted one level at a time so that
    /// degenerate (list shaped) trees don't exhaust the stack.
    ///
    /// # Safety
    ///
    /// `node` and everything below it must be live nodes of one tree.
    pub(crate) unsafe fn height(node: NonNull<Self>) -> usize {
        let mut height = 0;
        let mut level = vec![node];
        while !level.is_empty() {
            height += 1;
            let mut below = Vec::with_capacity(level.len() * 2);
            for node in level {
                let node = node.as_ref();
                below.extend(node.left.0);
                below.extend(node.right.0);
            }
            level = below;
        }
        height
    }
}

/// A handle on one node of a [`Tree`][crate::Tree].
///
/// A `NodeRef` borrows the tree it came from, and it carries that tree's comparator so searches
/// can start from any node. Because of the borrow, the tree cannot be mutated while a handle is
/// alive; in particular a handle can never observe its own node being deleted.
///
/// # Examples
///
/// ```
/// use ordtree::Tree;
///
/// let mut tree = Tree::new(|a: &i32, b: &i32| a < b);
/// tree.init_sequential([4, 2, 6, 1, 3]);
///
/// let two = tree.find(&2).unwrap();
/// assert_eq!(two.next().map(|n| *n.value()), Some(3));
/// assert_eq!(two.prev().map(|n| *n.value()), Some(1));
/// assert_eq!(two.to_string(), "[1 2 3]");
/// ```
pub struct NodeRef<'a, T, F> {
    node: NonNull<Node<T>>,
    less: &'a F,
    _marker: PhantomData<&'a Node<T>>,
}

impl<T, F> Clone for NodeRef<'_, T, F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, F> Copy for NodeRef<'_, T, F> {}

// SAFETY: A `NodeRef` only ever hands out shared references to values and the comparator.
unsafe impl<T: Sync, F: Sync> Send for NodeRef<'_, T, F> {}
unsafe impl<T: Sync, F: Sync> Sync for NodeRef<'_, T, F> {}

impl<'a, T, F> NodeRef<'a, T, F> {
    /// # Safety
    ///
    /// `node` must be a live node of the tree that `less` was borrowed from, and that tree must
    /// stay borrowed for `'a`.
    pub(crate) unsafe fn new(node: NonNull<Node<T>>, less: &'a F) -> Self {
        Self {
            node,
            less,
            _marker: PhantomData,
        }
    }

    pub(crate) fn as_ptr(&self) -> NonNull<Node<T>> {
        self.node
    }

    fn with(&self, node: NonNull<Node<T>>) -> Self {
        Self {
            node,
            less: self.less,
            _marker: PhantomData,
        }
    }

    fn get(&self) -> &'a Node<T> {
        // SAFETY: The tree is borrowed for `'a` so the node can't be freed or mutated before then.
        unsafe { &*self.node.as_ptr() }
    }

    /// The value stored in this node.
    pub fn value(&self) -> &'a T {
        &self.get().value
    }

    /// This node's parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.get().parent.0.map(|parent| self.with(parent))
    }

    /// The root of this node's left subtree.
    pub fn left(&self) -> Option<Self> {
        self.get().left.0.map(|left| self.with(left))
    }

    /// The root of this node's right subtree.
    pub fn right(&self) -> Option<Self> {
        self.get().right.0.map(|right| self.with(right))
    }

    /// The node holding the smallest value in this subtree.
    pub fn min(&self) -> Self {
        // SAFETY: The tree is borrowed for `'a` so every node below this one is live.
        self.with(unsafe { Node::min(self.node) })
    }

    /// The node holding the largest value in this subtree.
    pub fn max(&self) -> Self {
        // SAFETY: See `min`.
        self.with(unsafe { Node::max(self.node) })
    }

    /// The in-order successor of this node in the whole tree, or `None` if this is the maximum.
    pub fn next(&self) -> Option<Self> {
        // SAFETY: The tree is borrowed for `'a` and keeps its parent links consistent.
        unsafe { Node::successor(self.node) }
            .0
            .map(|node| self.with(node))
    }

    /// The in-order predecessor of this node in the whole tree, or `None` if this is the minimum.
    pub fn prev(&self) -> Option<Self> {
        // SAFETY: See `next`.
        unsafe { Node::predecessor(self.node) }
            .0
            .map(|node| self.with(node))
    }

    /// Number of nodes on the longest path from this node down to a leaf. A node without children
    /// has a height of 1.
    pub fn height(&self) -> usize {
        // SAFETY: The tree is borrowed for `'a` so every node below this one is live.
        unsafe { Node::height(self.node) }
    }

    /// Whether two handles point at the very same node.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.node == other.node
    }
}

impl<'a, T, F> NodeRef<'a, T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Searches this subtree for a node whose value is equal to `value` under the tree's
    /// comparator.
    pub fn find(&self, value: &T) -> Option<Self> {
        let mut current = Some(self.node);
        while let Some(ptr) = current {
            // SAFETY: The tree is borrowed for `'a` so every node below this one is live.
            let node = unsafe { ptr.as_ref() };
            if (self.less)(value, &node.value) {
                current = node.left.0;
            } else if (self.less)(&node.value, value) {
                current = node.right.0;
            } else {
                return Some(self.with(ptr));
            }
        }
        None
    }

    /// Whether this subtree holds a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }
}

/// Writes the subtree in ascending order as `[v1 v2 ... vn]`.
impl<T, F> fmt::Display for NodeRef<'_, T, F>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.max().node;
        let mut current = Some(self.min().node);

        f.write_str("[")?;
        while let Some(ptr) = current {
            // SAFETY: Walking from this subtree's minimum to its maximum never leaves the subtree,
            // and the tree is borrowed for the duration.
            write!(f, "{}", unsafe { &ptr.as_ref().value })?;
            if ptr == last {
                break;
            }
            f.write_str(" ")?;
            current = unsafe { Node::successor(ptr) }.0;
        }
        f.write_str("]")
    }
}

impl<T, F> fmt::Debug for NodeRef<'_, T, F>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("value", self.value())
            .finish()
    }
}
