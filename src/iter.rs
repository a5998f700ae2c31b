use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node};

/// An in-order iterator over the values of a [`Tree`][crate::Tree].
///
/// Created by [`Tree::iter`][crate::Tree::iter]. It follows parent links rather than keeping a
/// stack, so it needs constant space however tall the tree is.
pub struct Iter<'a, T> {
    front: Link<T>,
    back: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a Node<T>>,
}

// SAFETY: An `Iter` only hands out shared references to values.
unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<'a, T> Iter<'a, T> {
    /// # Safety
    ///
    /// `root` must be the root of a tree holding `len` nodes that stays borrowed for `'a`.
    pub(crate) unsafe fn new(root: Link<T>, len: usize) -> Self {
        Self {
            front: Link(root.0.map(|root| Node::min(root))),
            back: Link(root.0.map(|root| Node::max(root))),
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.0?;
        self.remaining -= 1;
        // SAFETY: `remaining` stops us before walking past the back cursor, and the tree is
        // borrowed for `'a` so every node we reach is live.
        unsafe {
            self.front = Node::successor(node);
            Some(&(*node.as_ptr()).value)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.0?;
        self.remaining -= 1;
        // SAFETY: See `next`.
        unsafe {
            self.back = Node::predecessor(node);
            Some(&(*node.as_ptr()).value)
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}
