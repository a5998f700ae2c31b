//! A plain, unbalanced Binary Search Tree whose nodes keep a link to their parent. The parent
//! links let [`NodeRef::next`] and [`NodeRef::prev`] walk the tree in order without a stack, and
//! let deletion splice a node out in place.
//!
//! # Examples
//!
//! ```
//! use ordtree::Tree;
//!
//! let mut tree = Tree::new(|a: &i32, b: &i32| a < b);
//!
//! // Nothing in here yet.
//! assert!(tree.find(&1).is_none());
//! assert_eq!(tree.to_string(), "[]");
//!
//! tree.init_sequential([5, 2, 7, 3, 1, 6, 9, 4, 8]);
//! assert_eq!(tree.len(), 9);
//! assert_eq!(tree.to_string(), "[1 2 3 4 5 6 7 8 9]");
//!
//! // Inserting an equal value does nothing.
//! tree.insert(5);
//! assert_eq!(tree.len(), 9);
//!
//! // Deleting reports whether something was removed.
//! assert!(tree.delete(&6));
//! assert!(!tree.delete(&6));
//! assert_eq!(tree.to_vec(), [1, 2, 3, 4, 5, 7, 8, 9]);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use rand::Rng;
use tracing::{debug, trace};

use crate::error::InvariantError;
use crate::iter::Iter;
use crate::node::{Link, Node, NodeRef};

/// A Binary Search Tree ordered by a caller supplied "less than" function `F`.
///
/// Two values `a` and `b` are considered equal when neither `less(a, b)` nor `less(b, a)` holds,
/// and the tree never stores two equal values. The tree is never rebalanced, so its height depends
/// entirely on insertion order. [`Tree::init_randomized`] is the way to keep it shallow.
pub struct Tree<T, F> {
    root: Link<T>,
    len: usize,
    less: F,
    _owns: PhantomData<Box<Node<T>>>,
}

/// A [`Tree`] ordered by its values' own [`Ord`] implementation.
pub type OrdTree<T> = Tree<T, fn(&T, &T) -> bool>;

// SAFETY: The tree exclusively owns its nodes. Links only escape through borrows of the tree, so
// sending or sharing the tree is exactly as safe as sending or sharing the values and comparator.
unsafe impl<T: Send, F: Send> Send for Tree<T, F> {}
unsafe impl<T: Sync, F: Sync> Sync for Tree<T, F> {}

fn ascending<T: Ord>(a: &T, b: &T) -> bool {
    a < b
}

impl<T: Ord> Default for OrdTree<T> {
    fn default() -> Self {
        Self::new(ascending)
    }
}

impl<T: Ord> FromIterator<T> for OrdTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.init_sequential(iter);
        tree
    }
}

impl<T, F> Drop for Tree<T, F> {
    fn drop(&mut self) {
        self.free_nodes();
    }
}

impl<T, F> Clone for Tree<T, F>
where
    T: Clone,
    F: Clone,
{
    /// Copies the tree node by node so the clone has exactly the same shape.
    fn clone(&self) -> Self {
        let mut tree = Self {
            root: Link(None),
            len: 0,
            less: self.less.clone(),
            _owns: PhantomData,
        };
        let Some(root) = self.root.0 else {
            return tree;
        };

        // SAFETY: Every source pointer is a live node of `self`, which we borrow for the whole
        // copy. Every target pointer was just leaked from a `Box` and is owned by `tree`.
        unsafe {
            let new_root = NonNull::from(Box::leak(Node::new_boxed(
                root.as_ref().value.clone(),
                Link(None),
            )));
            tree.root = Link(Some(new_root));

            let mut stack = vec![(root, new_root)];
            while let Some((source, mut target)) = stack.pop() {
                let source = source.as_ref();
                if let Some(left) = source.left.0 {
                    let new_left = NonNull::from(Box::leak(Node::new_boxed(
                        left.as_ref().value.clone(),
                        Link(Some(target)),
                    )));
                    target.as_mut().left = Link(Some(new_left));
                    stack.push((left, new_left));
                }
                if let Some(right) = source.right.0 {
                    let new_right = NonNull::from(Box::leak(Node::new_boxed(
                        right.as_ref().value.clone(),
                        Link(Some(target)),
                    )));
                    target.as_mut().right = Link(Some(new_right));
                    stack.push((right, new_right));
                }
            }
        }
        tree.len = self.len;
        tree
    }
}

impl<T, F> fmt::Debug for Tree<T, F>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Writes the values in ascending order as `[v1 v2 ... vn]`, or `[]` for an empty tree.
impl<T, F> fmt::Display for Tree<T, F>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => fmt::Display::fmt(&root, f),
            None => f.write_str("[]"),
        }
    }
}

impl<'a, T, F> IntoIterator for &'a Tree<T, F> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, F> Extend<T> for Tree<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.init_sequential(iter);
    }
}

impl<T, F> Tree<T, F> {
    /// The number of values in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef<'_, T, F>> {
        // SAFETY: The root is a live node of this tree and the handle borrows `self`.
        self.root
            .0
            .map(|root| unsafe { NodeRef::new(root, &self.less) })
    }

    /// The node holding the smallest value.
    pub fn min(&self) -> Option<NodeRef<'_, T, F>> {
        self.root().map(|root| root.min())
    }

    /// The node holding the largest value.
    pub fn max(&self) -> Option<NodeRef<'_, T, F>> {
        self.root().map(|root| root.max())
    }

    /// Number of nodes on the longest path from the root to a leaf. An empty tree has a height of
    /// 0 and a tree with a single value a height of 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Tree;
    ///
    /// let mut tree = Tree::new(|a: &u8, b: &u8| a < b);
    /// assert_eq!(tree.height(), 0);
    ///
    /// // Sorted input makes a list.
    /// tree.init_sequential(1..=5);
    /// assert_eq!(tree.height(), 5);
    /// ```
    pub fn height(&self) -> usize {
        self.root().map_or(0, |root| root.height())
    }

    /// An iterator over the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        // SAFETY: `self.len` nodes hang off the root and the iterator borrows `self`.
        unsafe { Iter::new(self.root, self.len) }
    }

    /// Copies the values, in ascending order, into a new `Vec` that is detached from the tree.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        let released = self.len;
        self.free_nodes();
        debug!(released, "cleared tree");
    }

    /// Frees every node without recursing, so a degenerate tree can't overflow the stack.
    fn free_nodes(&mut self) {
        let mut stack: Vec<_> = self.root.0.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            // SAFETY: Each node is owned by exactly one link. We detached the root above and
            // every other node is pushed only when its (now freed) parent is released, so each
            // node is turned back into a `Box` exactly once.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            stack.extend(node.left.0);
            stack.extend(node.right.0);
        }
        self.len = 0;
    }

    /// Replaces `node`'s position in the tree with `replacement`.
    ///
    /// Only the pointer from `node`'s parent (or the tree's root) and `replacement`'s parent
    /// pointer are rewritten. `node`'s own links are left untouched for the caller to deal with.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree and `replacement` must be empty or a live node of
    /// this tree.
    unsafe fn transplant(&mut self, node: NonNull<Node<T>>, replacement: Link<T>) {
        let parent = node.as_ref().parent;
        match parent.0 {
            None => self.root = replacement,
            Some(mut parent) => {
                let parent = parent.as_mut();
                if parent.left.0 == Some(node) {
                    parent.left = replacement;
                } else {
                    parent.right = replacement;
                }
            }
        }
        if let Some(mut replacement) = replacement.0 {
            replacement.as_mut().parent = parent;
        }
    }

    /// Splices `node` out of the tree, frees it, and returns its value.
    ///
    /// # Safety
    ///
    /// `node` must be a live node of this tree. It is dangling afterwards.
    unsafe fn unlink(&mut self, node: NonNull<Node<T>>) -> T {
        let Node { left, right, .. } = *node.as_ref();
        match (left.0, right.0) {
            (None, _) => {
                trace!(case = "left-empty", "splicing node out");
                self.transplant(node, right);
            }
            (_, None) => {
                trace!(case = "right-empty", "splicing node out");
                self.transplant(node, left);
            }
            (Some(mut left_child), Some(mut right_child)) => {
                // The successor is the leftmost node of the right subtree so it has no left child.
                let mut successor = Node::min(right_child);
                if successor != right_child {
                    trace!(case = "successor-deep", "splicing node out");
                    let successor_right = successor.as_ref().right;
                    self.transplant(successor, successor_right);
                    successor.as_mut().right = right;
                    right_child.as_mut().parent = Link(Some(successor));
                } else {
                    trace!(case = "successor-child", "splicing node out");
                }
                self.transplant(node, Link(Some(successor)));
                successor.as_mut().left = left;
                left_child.as_mut().parent = Link(Some(successor));

                if cfg!(debug_assertions) {
                    let successor_node = successor.as_ref();
                    assert_eq!(successor_node.parent.0, node.as_ref().parent.0);
                    assert_eq!(left_child.as_ref().parent.0, Some(successor));
                    if let Some(right) = successor_node.right.0 {
                        assert_eq!(right.as_ref().parent.0, Some(successor));
                    }
                }
            }
        }
        self.len -= 1;

        let Node { value, .. } = *Box::from_raw(node.as_ptr());
        value
    }
}

impl<T, F> Tree<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Generates a new, empty `Tree` ordered by `less`, which must return whether its first
    /// argument is strictly less than its second.
    ///
    /// `less` has to be consistent: `less(a, b)` and `less(b, a)` must never both hold.
    pub fn new(less: F) -> Self {
        Self {
            root: Link(None),
            len: 0,
            less,
            _owns: PhantomData,
        }
    }

    /// Inserts each value in the order given.
    ///
    /// Sorted (or nearly sorted) input turns the tree into a list. Prefer
    /// [`init_randomized`][Tree::init_randomized] unless `values` is already in random order.
    pub fn init_sequential<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.len;
        let mut loaded = 0usize;
        for value in values {
            self.insert(value);
            loaded += 1;
        }
        debug!(loaded, inserted = self.len - before, "loaded values in order");
    }

    /// Inserts the values in a uniformly random order drawn from `rng`, which makes a shallow tree
    /// overwhelmingly likely whatever order `values` comes in.
    ///
    /// The order is a Fisher-Yates shuffle: for `i` from `n - 1` down to `0` an index in `0..=i` is
    /// drawn and that value is inserted next. Seeding `rng` is up to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Tree;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut tree = Tree::new(|a: &u32, b: &u32| a < b);
    /// tree.init_randomized(0..1000, &mut StdRng::seed_from_u64(7));
    ///
    /// assert_eq!(tree.len(), 1000);
    /// assert!(tree.height() < 1000);
    /// ```
    pub fn init_randomized<I, R>(&mut self, values: I, rng: &mut R)
    where
        I: IntoIterator<Item = T>,
        R: Rng + ?Sized,
    {
        let mut values: Vec<T> = values.into_iter().collect();
        let loaded = values.len();
        for i in (0..values.len()).rev() {
            let picked = rng.gen_range(0..=i);
            values.swap(picked, i);
        }

        let before = self.len;
        // Slot `i` holds the value picked at step `i`, and the steps ran from the back.
        for value in values.into_iter().rev() {
            self.insert(value);
        }
        debug!(loaded, inserted = self.len - before, "loaded values in random order");
    }

    /// Searches for the node holding a value equal to `value`.
    pub fn find(&self, value: &T) -> Option<NodeRef<'_, T, F>> {
        self.root()?.find(value)
    }

    /// Whether the tree holds a value equal to `value`.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Inserts `value` and returns the node holding it. If an equal value is already present the
    /// tree is left untouched (and `value` dropped) and the existing node is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Tree;
    ///
    /// let mut tree = Tree::new(|a: &(u8, char), b: &(u8, char)| a.0 < b.0);
    ///
    /// assert_eq!(tree.insert((1, 'a')).value().1, 'a');
    /// // Equal under the comparator, so the original stays.
    /// assert_eq!(tree.insert((1, 'b')).value().1, 'a');
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> NodeRef<'_, T, F> {
        // The last node visited and whether `value` belongs to its left.
        let mut parent: Option<(NonNull<Node<T>>, bool)> = None;
        let mut current = self.root.0;
        while let Some(ptr) = current {
            // SAFETY: Every link reachable from the root points at a live node of this tree.
            let node = unsafe { ptr.as_ref() };
            if (self.less)(&value, &node.value) {
                parent = Some((ptr, true));
                current = node.left.0;
            } else if (self.less)(&node.value, &value) {
                parent = Some((ptr, false));
                current = node.right.0;
            } else {
                trace!("equal value already present");
                // SAFETY: `ptr` is a live node of this tree and the handle borrows `self`.
                return unsafe { NodeRef::new(ptr, &self.less) };
            }
        }

        let new = NonNull::from(Box::leak(Node::new_boxed(
            value,
            Link(parent.map(|(parent, _)| parent)),
        )));
        // SAFETY: `parent` is a live node of this tree and nothing else borrows it.
        match parent {
            None => self.root = Link(Some(new)),
            Some((mut parent, true)) => unsafe { parent.as_mut().left = Link(Some(new)) },
            Some((mut parent, false)) => unsafe { parent.as_mut().right = Link(Some(new)) },
        }
        self.len += 1;

        if cfg!(debug_assertions) {
            if let Some((parent, _)) = parent {
                // SAFETY: Both nodes are live and only read here.
                let (parent, new) = unsafe { (parent.as_ref(), new.as_ref()) };
                if parent.left.0 == Some(NonNull::from(new)) {
                    assert!((self.less)(&new.value, &parent.value));
                } else {
                    assert_eq!(parent.right.0, Some(NonNull::from(new)));
                    assert!((self.less)(&parent.value, &new.value));
                }
            }
        }

        // SAFETY: `new` is now a live node of this tree and the handle borrows `self`.
        unsafe { NodeRef::new(new, &self.less) }
    }

    /// Removes the value equal to `value`, returning `true` if there was one.
    pub fn delete(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes the value equal to `value` and hands it back. If the tree holds no such value,
    /// nothing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Tree;
    ///
    /// let mut tree = Tree::new(|a: &String, b: &String| a < b);
    /// tree.insert("lisa".to_string());
    ///
    /// assert_eq!(tree.take(&"lisa".to_string()), Some("lisa".to_string()));
    /// assert_eq!(tree.take(&"lisa".to_string()), None);
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        let node = self.find(value)?.as_ptr();
        // SAFETY: `find` only returns live nodes of this tree, and no handle to it survives.
        Some(unsafe { self.unlink(node) })
    }

    /// Checks every structural invariant: the root has no parent, each child links back to its
    /// parent, in-order values are strictly ascending, and the length matches the node count.
    ///
    /// A tree only modified through its own methods always passes.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let Some(root) = self.root.0 else {
            return match self.len {
                0 => Ok(()),
                expected => Err(InvariantError::LenMismatch { expected, found: 0 }),
            };
        };

        // SAFETY: Every link reachable from the root points at a live node of this tree.
        unsafe {
            if root.as_ref().parent.0.is_some() {
                return Err(InvariantError::RootHasParent);
            }

            let mut found = 0;
            let mut stack = vec![(root, 1)];
            while let Some((ptr, depth)) = stack.pop() {
                found += 1;
                let node = ptr.as_ref();
                for child in [node.left.0, node.right.0].into_iter().flatten() {
                    if child.as_ref().parent.0 != Some(ptr) {
                        return Err(InvariantError::BrokenParentLink { depth: depth + 1 });
                    }
                    stack.push((child, depth + 1));
                }
            }
            if found != self.len {
                return Err(InvariantError::LenMismatch {
                    expected: self.len,
                    found,
                });
            }
        }

        // With the parent links known good, in-order ascending is the BST property.
        let mut values = self.iter();
        let Some(mut previous) = values.next() else {
            return Ok(());
        };
        for (position, value) in values.enumerate() {
            if !(self.less)(previous, value) {
                return Err(InvariantError::OutOfOrder {
                    position: position + 1,
                });
            }
            previous = value;
        }
        Ok(())
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a `BTreeSet`.
    /// This way we can ensure that after a random smattering of inserts
    /// and deletes we have the same set of values in both.
    fn do_ops<T>(ops: &[Op<T>], bst: &mut OrdTree<T>, set: &mut BTreeSet<T>)
    where
        T: Ord + Clone + std::fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Insert(v) => {
                    bst.insert(v.clone());
                    set.insert(v.clone());
                }
                Op::Remove(v) => {
                    assert_eq!(bst.delete(v), set.remove(v));
                }
                Op::Iter => {
                    assert!(bst.iter().eq(set.iter()));
                }
            }
            assert_eq!(bst.len(), set.len());
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = OrdTree::default();
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set);
            tree.validate().is_ok()
                && set.iter().all(|value| tree.contains(value))
                && tree.iter().rev().eq(set.iter().rev())
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let mut tree = OrdTree::default();
            for x in &xs {
                tree.insert(*x);
            }

            xs.iter().all(|x| tree.find(x).map(|n| *n.value()) == Some(*x))
        }
    }

    quickcheck::quickcheck! {
        fn successor_walk_matches_sorted_input(xs: Vec<i16>) -> bool {
            let tree: OrdTree<_> = xs.iter().copied().collect();
            let mut sorted = xs;
            sorted.sort_unstable();
            sorted.dedup();

            let mut walked = Vec::new();
            let mut current = tree.min();
            while let Some(node) = current {
                walked.push(*node.value());
                current = node.next();
            }
            walked == sorted
        }
    }
}
