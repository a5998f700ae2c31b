use ordtree::{OrdTree, Tree};
use rand::rngs::StdRng;
use rand::SeedableRng;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same set of values in both.
fn do_ops<T>(ops: &[Op<T>], bst: &mut OrdTree<T>, set: &mut BTreeSet<T>)
where
    T: Ord + Clone,
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
        }
    }
}

fn sorted_distinct<T: Ord>(mut xs: Vec<T>) -> Vec<T> {
    xs.sort_unstable();
    xs.dedup();
    xs
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = OrdTree::default();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.len() == set.len() && tree.iter().eq(set.iter()) && tree.validate().is_ok()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut tree = OrdTree::default();
    for x in &xs {
        tree.insert(*x);
    }

    xs.iter().all(|x| tree.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: OrdTree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.find(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: OrdTree<_> = xs.iter().copied().collect();
    let distinct = tree.len();
    let mut deleted = 0;
    for delete in &deletes {
        if tree.delete(delete) {
            deleted += 1;
        }
        // A second delete of the same value never succeeds.
        assert!(!tree.delete(delete));
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    tree.len() == distinct - deleted
        && deletes.iter().all(|x| tree.find(x).is_none())
        && still_present.iter().all(|x| tree.find(x).is_some())
}

#[quickcheck]
fn duplicate_insert_is_idempotent(xs: Vec<i16>) -> bool {
    let mut tree: OrdTree<_> = xs.iter().copied().collect();
    let before = tree.to_vec();
    for x in &xs {
        tree.insert(*x);
    }

    tree.to_vec() == before && tree.len() == before.len()
}

#[quickcheck]
fn sequential_init_is_sorted_and_distinct(xs: Vec<i16>) -> bool {
    let tree: OrdTree<_> = xs.iter().copied().collect();

    tree.to_vec() == sorted_distinct(xs) && tree.validate().is_ok()
}

#[quickcheck]
fn randomized_init_is_sorted_and_distinct(xs: Vec<i16>, seed: u64) -> bool {
    let mut tree = OrdTree::default();
    tree.init_randomized(xs.iter().copied(), &mut StdRng::seed_from_u64(seed));

    tree.to_vec() == sorted_distinct(xs) && tree.validate().is_ok()
}

#[quickcheck]
fn round_trip_through_vec(xs: Vec<i16>, seed: u64) -> bool {
    let mut tree = Tree::new(|a: &i16, b: &i16| a > b);
    tree.init_randomized(xs, &mut StdRng::seed_from_u64(seed));

    let mut copy = Tree::new(|a: &i16, b: &i16| a > b);
    copy.init_sequential(tree.to_vec());

    copy.to_vec() == tree.to_vec()
}

#[quickcheck]
fn walks_visit_every_value_once(xs: Vec<i16>) -> bool {
    let tree: OrdTree<_> = xs.iter().copied().collect();
    let sorted = sorted_distinct(xs);

    let mut forwards = Vec::new();
    let mut current = tree.min();
    while let Some(node) = current {
        forwards.push(*node.value());
        current = node.next();
    }

    let mut backwards = Vec::new();
    let mut current = tree.max();
    while let Some(node) = current {
        backwards.push(*node.value());
        current = node.prev();
    }
    backwards.reverse();

    forwards == sorted && backwards == sorted
}

#[quickcheck]
fn deleting_a_two_child_node_keeps_its_right_subtree(xs: Vec<i8>, pick: usize) -> bool {
    let mut tree: OrdTree<_> = xs.into_iter().collect();
    let two_child: Vec<i8> = tree
        .iter()
        .copied()
        .filter(|x| {
            let node = tree.find(x).unwrap();
            node.left().is_some() && node.right().is_some()
        })
        .collect();
    if two_child.is_empty() {
        return true;
    }

    let target = two_child[pick % two_child.len()];
    let right_subtree: Vec<i8> = {
        let right = tree.find(&target).unwrap().right().unwrap();
        let (first, last) = (right.min(), right.max());
        let mut values = vec![*first.value()];
        let mut current = first;
        while !ordtree::NodeRef::ptr_eq(&current, &last) {
            current = current.next().unwrap();
            values.push(*current.value());
        }
        values
    };

    assert!(tree.delete(&target));
    tree.validate().is_ok()
        && !tree.contains(&target)
        && right_subtree.iter().all(|x| tree.contains(x))
}
