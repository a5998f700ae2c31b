//! This crate exposes an ordered container backed by a plain Binary Search Tree (BST) whose nodes
//! keep links to their parents.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is the number of `Node`s on
//! the longest path from the root `Node` to a leaf `Node`). This tree never rebalances itself, so
//! inserting sorted values builds a list with a height of `N`. Inserting the same values in a
//! random order ([`Tree::init_randomized`]) makes a height of `O(lg N)` overwhelmingly likely.
//!
//! ## Ordering
//!
//! A [`Tree`] doesn't require `Ord`. It is built with a "less than" function which decides every
//! comparison, so any type the caller can order can be stored, in any order the caller likes.
//! Values the function considers equal are stored only once.
//!
//! ```
//! use ordtree::Tree;
//!
//! // Ordered by the last two digits only.
//! let mut tree = Tree::new(|a: &u32, b: &u32| a % 100 < b % 100);
//! tree.init_sequential([150, 3, 205, 103]);
//!
//! // 103 ends like 3 so it was never stored.
//! assert_eq!(tree.to_string(), "[3 205 150]");
//! ```
//!
//! ## Parent links
//!
//! Each `Node` links to its parent, which lets [`NodeRef::next`] and [`NodeRef::prev`] step through
//! the tree in order from any node, and lets deletion splice a node out in place.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
mod iter;
mod node;
mod tree;


pub use error::InvariantError;
pub use iter::Iter;
pub use node::NodeRef;
pub use tree::{OrdTree, Tree};
