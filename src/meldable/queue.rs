use std::hash::Hash;
use rand::{Rng, rngs::SmallRng};

use crate::collections::FxIndexMap;
use crate::config::FanOut;
use super::{
    rng::SlotPicker,
    tree::{MeldableTree, NodeId},
};


/// Priority queue over a single meldable tree that holds each value at most once.
/// Keeps a value -> node index so arbitrary values can be removed.
pub struct MeldableQueue<T, R = SmallRng> {
    tree: MeldableTree<T, R>,
    root: Option<NodeId>,
    index: FxIndexMap<T, NodeId>,
}

impl<T: Ord + Hash + Clone> MeldableQueue<T, SmallRng> {

    pub fn new(fan_out: FanOut) -> Self {
        Self::with_tree(MeldableTree::new(fan_out))
    }

    pub fn seeded(fan_out: FanOut, seed: u64) -> Self {
        Self::with_tree(MeldableTree::seeded(fan_out, seed))
    }
}

impl<T: Ord + Hash + Clone, R: Rng> MeldableQueue<T, R> {

    pub fn with_picker(fan_out: FanOut, picker: SlotPicker<R>) -> Self {
        Self::with_tree(MeldableTree::with_picker(fan_out, picker))
    }

    fn with_tree(tree: MeldableTree<T, R>) -> Self {
        Self { tree, root: None, index: FxIndexMap::default() }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    /// Adds `value` unless an equal one is already queued; returns whether it was added
    pub fn enqueue(&mut self, value: T) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        let (root, id) = self.tree.insert(self.root, value.clone());
        self.root = Some(root);
        self.index.insert(value, id);
        true
    }

    pub fn peek(&self) -> Option<&T> {
        self.root.map(|r| &self.tree[r])
    }

    pub fn dequeue(&mut self) -> Option<T> {
        let root = self.root?;
        let (value, next) = self.tree.delete_min(root);
        self.root = next;
        self.index.swap_remove(&value);
        Some(value)
    }

    /// Removes `value` from wherever it sits in the tree
    pub fn remove(&mut self, value: &T) -> bool {
        match self.index.swap_remove(value) {
            Some(id) => {
                let (_, root) = self.tree.delete_min(id);
                self.root = root;
                true
            }
            None => false,
        }
    }

    /// Queued values in dequeue order, leaving the queue untouched
    pub fn to_sorted_vec(&self) -> Vec<T> {
        let mut values: Vec<T> = self.index.keys().cloned().collect();
        values.sort();
        values
    }
}
