//! Property-based tests for the meldable tree and queue.
//!
//! Every property drains the structure and compares against a sorted model.

use meldstar::{FanOut, MeldableQueue, MeldableTree, NodeId};
use proptest::prelude::*;
use std::cmp::Ordering;

// ============================================================================
//  Strategies
// ============================================================================

fn fan_out() -> impl Strategy<Value = FanOut> {
    (2usize..=8).prop_map(|k| FanOut::new(k).unwrap())
}

/// A value with a tag that takes no part in ordering
#[derive(Clone, Copy, Debug)]
struct Tagged {
    value: u8,
    tag: usize,
}

impl PartialEq for Tagged {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Tagged {}

impl PartialOrd for Tagged {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tagged {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

// ============================================================================
//  Helpers
// ============================================================================

fn drain<T: Ord>(tree: &mut MeldableTree<T>, mut root: Option<NodeId>) -> Vec<T> {
    let mut out = Vec::with_capacity(tree.len());
    while let Some(r) = root {
        let (value, next) = tree.delete_min(r);
        out.push(value);
        root = next;
    }
    out
}

/// Walks the tree checking heap order and parent links, returns the node count
fn check_heap<T: Ord>(tree: &MeldableTree<T>, root: NodeId) -> usize {
    let mut stack = vec![root];
    let mut count = 0;
    while let Some(id) = stack.pop() {
        count += 1;
        for child in tree.children(id).iter().flatten() {
            assert!(tree[*child] >= tree[id]);
            assert_eq!(tree.parent(*child), Some(id));
            stack.push(*child);
        }
    }
    count
}

// ============================================================================
//  Tree Properties
// ============================================================================

proptest! {
    /// Draining the tree yields the inserted values in ascending order.
    #[test]
    fn drain_is_sorted(values in prop::collection::vec(any::<i32>(), 0..200), k in fan_out(), seed in any::<u64>()) {
        let mut tree = MeldableTree::seeded(k, seed);
        let mut root = None;
        for v in &values {
            root = Some(tree.insert(root, *v).0);
        }
        prop_assert_eq!(tree.len(), values.len());
        if let Some(r) = root {
            prop_assert_eq!(check_heap(&tree, r), values.len());
        }

        let mut expected = values.clone();
        expected.sort();
        prop_assert_eq!(tree.peek(root), expected.first());
        prop_assert_eq!(drain(&mut tree, root), expected);
        prop_assert!(tree.is_empty());
    }

    /// Melding two independent trees drains to the merged multiset.
    #[test]
    fn meld_merges_multisets(
        left in prop::collection::vec(-50i32..50, 0..60),
        right in prop::collection::vec(-50i32..50, 0..60),
        k in fan_out(),
        seed in any::<u64>()
    ) {
        let mut tree = MeldableTree::seeded(k, seed);
        let (mut a, mut b) = (None, None);
        for v in &left {
            a = Some(tree.insert(a, *v).0);
        }
        for v in &right {
            b = Some(tree.insert(b, *v).0);
        }
        let root = tree.meld(a, b);
        if let Some(r) = root {
            prop_assert_eq!(check_heap(&tree, r), left.len() + right.len());
        }

        let mut expected: Vec<i32> = left.iter().chain(&right).copied().collect();
        expected.sort();
        prop_assert_eq!(drain(&mut tree, root), expected);
    }

    /// Decrease-key on arbitrary nodes keeps the heap ordered, and zero deltas change nothing.
    #[test]
    fn decrease_key_keeps_order(
        values in prop::collection::vec(0i64..1000, 1..120),
        updates in prop::collection::vec((any::<prop::sample::Index>(), 0i64..500), 0..80),
        k in fan_out(),
        seed in any::<u64>()
    ) {
        let mut tree = MeldableTree::seeded(k, seed);
        let mut root = None;
        let mut model = Vec::with_capacity(values.len());
        for v in &values {
            let (r, id) = tree.insert(root, *v);
            root = Some(r);
            model.push((id, *v));
        }
        let mut root = root.unwrap();

        for (index, delta) in updates {
            let slot = index.index(model.len());
            let (id, old) = model[slot];
            root = tree.decrease_key(root, id, old - delta);
            model[slot].1 = old - delta;
            prop_assert_eq!(tree[id], old - delta);
        }
        prop_assert_eq!(check_heap(&tree, root), values.len());
        prop_assert_eq!(tree[root], model.iter().map(|(_, v)| *v).min().unwrap());

        let mut expected: Vec<i64> = model.iter().map(|(_, v)| *v).collect();
        expected.sort();
        prop_assert_eq!(drain(&mut tree, Some(root)), expected);
    }

    /// A larger "decrease" is ignored.
    #[test]
    fn increase_is_ignored(values in prop::collection::vec(0i32..100, 1..50), bump in 1i32..100, k in fan_out()) {
        let mut tree = MeldableTree::seeded(k, 7);
        let mut root = None;
        let mut ids = Vec::new();
        for v in &values {
            let (r, id) = tree.insert(root, *v);
            root = Some(r);
            ids.push(id);
        }
        let mut root = root.unwrap();
        for (id, v) in ids.iter().zip(&values) {
            root = tree.decrease_key(root, *id, v + bump);
            prop_assert_eq!(tree[*id], *v);
        }
        let mut expected = values.clone();
        expected.sort();
        prop_assert_eq!(drain(&mut tree, Some(root)), expected);
    }

    /// Equal values come back most recently inserted first.
    #[test]
    fn equal_values_drain_lifo(values in prop::collection::vec(0u8..4, 0..100), k in fan_out(), seed in any::<u64>()) {
        let mut tree = MeldableTree::seeded(k, seed);
        let mut root = None;
        for (tag, value) in values.iter().enumerate() {
            root = Some(tree.insert(root, Tagged { value: *value, tag }).0);
        }

        let drained = drain(&mut tree, root);
        prop_assert_eq!(drained.len(), values.len());
        for pair in drained.windows(2) {
            prop_assert!(pair[0].value <= pair[1].value);
            if pair[0].value == pair[1].value {
                prop_assert!(pair[0].tag > pair[1].tag, "{:?} before {:?}", pair[0], pair[1]);
            }
        }
    }
}

// ============================================================================
//  Queue Properties
// ============================================================================

proptest! {
    /// Removing arbitrary values leaves exactly the rest, still in order.
    #[test]
    fn queue_remove_arbitrary(
        values in prop::collection::btree_set(any::<u32>(), 0..150),
        removals in prop::collection::vec(any::<prop::sample::Index>(), 0..60),
        k in fan_out(),
        seed in any::<u64>()
    ) {
        let mut queue = MeldableQueue::seeded(k, seed);
        for v in &values {
            prop_assert!(queue.enqueue(*v));
        }
        let mut remaining: Vec<u32> = values.iter().copied().collect();

        for index in removals {
            if remaining.is_empty() {
                break;
            }
            let v = remaining.remove(index.index(remaining.len()));
            prop_assert!(queue.remove(&v));
            prop_assert!(!queue.remove(&v));
            prop_assert!(!queue.contains(&v));
        }
        prop_assert_eq!(queue.len(), remaining.len());
        prop_assert_eq!(queue.to_sorted_vec(), remaining.clone());
        prop_assert_eq!(queue.peek(), remaining.first());

        let mut drained = Vec::new();
        while let Some(v) = queue.dequeue() {
            drained.push(v);
        }
        prop_assert_eq!(drained, remaining);
        prop_assert!(queue.is_empty());
    }

    /// Duplicates are rejected and never double-counted.
    #[test]
    fn queue_rejects_duplicates(values in prop::collection::vec(0u16..64, 0..200), k in fan_out()) {
        let mut queue = MeldableQueue::seeded(k, 11);
        let mut seen = std::collections::BTreeSet::new();
        for v in &values {
            prop_assert_eq!(queue.enqueue(*v), seen.insert(*v));
        }
        prop_assert_eq!(queue.len(), seen.len());
        let drained: Vec<u16> = std::iter::from_fn(|| queue.dequeue()).collect();
        prop_assert_eq!(drained, seen.into_iter().collect::<Vec<_>>());
    }
}
