use std::{cmp::Ordering, fmt, ops::Index};
use rand::{Rng, rngs::SmallRng};

use crate::config::FanOut;
use super::rng::SlotPicker;



/// Handle to a node stored in a [`MeldableTree`] arena.
/// Only valid until the node is removed with [`MeldableTree::delete_min`].
///
/// # Panics
///
/// Indexing the tree or calling `delete_min` with a removed id panics. Removed
/// slots are recycled, so an old id may also silently refer to a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: Option<T>, // None while the slot sits on the free list
    stamp: u64, // insertion order, newer wins ties
    parent: Option<NodeId>,
}


/// Randomized meldable priority tree
/// https://en.wikipedia.org/wiki/Randomized_meldable_heap
///
/// A min-heap where every node has `k` child slots and melding walks down a random
/// slot at each level, which keeps the expected depth logarithmic without any
/// explicit balancing. Nodes live in an arena and refer to each other by index:
/// children are owning slots, parents are back-references used by decrease-key
/// and by removal of inner nodes.
///
/// One arena can hold several independent trees; every operation takes the root it
/// works on and hands back the new root. Values that compare equal drain in LIFO
/// order (most recently inserted first).
pub struct MeldableTree<T, R = SmallRng> {
    nodes: Vec<Node<T>>,
    links: Vec<Option<NodeId>>, // children of node i live at [i * k, (i + 1) * k)
    free: Vec<usize>,
    k: usize,
    picker: SlotPicker<R>,
    next_stamp: u64,
    len: usize,
}

impl<T> MeldableTree<T, SmallRng> {

    /// Tree whose slot picker is seeded from OS entropy
    pub fn new(fan_out: FanOut) -> Self {
        Self::with_picker(fan_out, SlotPicker::from_entropy())
    }

    pub fn seeded(fan_out: FanOut, seed: u64) -> Self {
        Self::with_picker(fan_out, SlotPicker::seeded(seed))
    }
}

impl<T, R> MeldableTree<T, R> {

    pub fn with_picker(fan_out: FanOut, picker: SlotPicker<R>) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            free: Vec::new(),
            k: fan_out.get(),
            picker,
            next_stamp: 0,
            len: 0,
        }
    }

    pub fn fan_out(&self) -> usize {
        self.k
    }

    /// Live nodes across every tree in the arena
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).and_then(|n| n.value.as_ref())
    }

    /// Minimum of the tree rooted at `root`
    pub fn peek(&self, root: Option<NodeId>) -> Option<&T> {
        root.and_then(|r| self.get(r))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[Option<NodeId>] {
        &self.links[id.0 * self.k..(id.0 + 1) * self.k]
    }

    /// New one-node tree, detached from everything else in the arena
    pub fn singleton(&mut self, value: T) -> NodeId {
        let stamp = self.bump_stamp();
        let node = Node { value: Some(value), stamp, parent: None };
        let id = match self.free.pop() {
            Some(i) => {
                self.nodes[i] = node;
                self.links[i * self.k..(i + 1) * self.k].fill(None);
                NodeId(i)
            }
            None => {
                self.nodes.push(node);
                self.links.resize(self.links.len() + self.k, None);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.len += 1;
        id
    }

    fn bump_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(p) = self.nodes[id.0].parent {
            id = p;
        }
        id
    }

    fn slot_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == Some(child))
    }

    /// Cut the link between a node and its parent, if any
    fn detach(&mut self, id: NodeId) {
        if let Some(p) = self.nodes[id.0].parent.take() {
            if let Some(i) = self.slot_of(p, id) {
                self.links[p.0 * self.k + i] = None;
            }
        }
    }

    fn attach(&mut self, parent: NodeId, slot: usize, child: NodeId) {
        self.links[parent.0 * self.k + slot] = Some(child);
        self.nodes[child.0].parent = Some(parent);
    }
}

impl<T: Ord, R: Rng> MeldableTree<T, R> {

    /// Heap order: smaller value first, newer insertion first among equals
    fn rank(&self, a: NodeId, b: NodeId) -> Ordering {
        let (na, nb) = (&self.nodes[a.0], &self.nodes[b.0]);
        na.value.cmp(&nb.value).then_with(|| nb.stamp.cmp(&na.stamp))
    }

    /// Merge two trees, returning the root of the result.
    /// Either side may be empty; both inputs are detached from any former parent.
    pub fn meld(&mut self, a: Option<NodeId>, b: Option<NodeId>) -> Option<NodeId> {
        let (a, b) = match (a, b) {
            (None, None) => return None,
            (Some(x), None) | (None, Some(x)) => {
                self.detach(x);
                return Some(x);
            }
            (Some(a), Some(b)) => (a, b),
        };

        if a == b {
            debug_assert_ne!(a, b, "melding a tree with itself");
            return Some(a);
        }

        // q1 is always the smaller of the pair being merged
        let (mut q1, mut q2) = match self.rank(a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        self.detach(q1);
        self.detach(q2);
        let root = q1;

        loop {
            let slot = self.picker.pick(self.k);
            match self.links[q1.0 * self.k + slot] {
                None => {
                    self.attach(q1, slot, q2);
                    break;
                }
                // occupant still belongs above q2, keep going down
                Some(child) if self.rank(child, q2) != Ordering::Greater => {
                    q1 = child;
                }
                // q2 takes the occupant's place, the occupant is merged below q2
                Some(child) => {
                    self.nodes[child.0].parent = None;
                    self.attach(q1, slot, q2);
                    q1 = q2;
                    q2 = child;
                }
            }
        }

        Some(root)
    }

    /// Convenience for `meld(root, singleton(value))`.
    /// Returns `(new_root, inserted_node)`.
    pub fn insert(&mut self, root: Option<NodeId>, value: T) -> (NodeId, NodeId) {
        let id = self.singleton(value);
        let root = self.meld(root, Some(id)).unwrap_or(id);
        (root, id)
    }

    /// Remove `node` by melding its children into a replacement subtree.
    ///
    /// Normally `node` is a root, but inner nodes work too: the replacement is
    /// wired into the slot `node` occupied under its parent. Returns the removed value
    /// along with the new root of the tree `node` belonged to (None once it is empty).
    ///
    /// # Panics
    ///
    /// If `node` was already removed. The tree is left untouched in that case.
    pub fn delete_min(&mut self, node: NodeId) -> (T, Option<NodeId>) {
        let value = match self.nodes[node.0].value.take() {
            Some(value) => value,
            None => panic!("delete_min on a removed node {node:?}"),
        };
        let parent = self.nodes[node.0].parent;
        let slot = parent.and_then(|p| self.slot_of(p, node));

        let mut replacement = None;
        for i in 0..self.k {
            if let Some(child) = self.links[node.0 * self.k + i] {
                replacement = self.meld(replacement, Some(child));
            }
        }

        let root = match (parent, slot) {
            (Some(p), Some(i)) => {
                self.links[p.0 * self.k + i] = replacement;
                if let Some(r) = replacement {
                    self.nodes[r.0].parent = Some(p);
                }
                Some(self.root_of(p))
            }
            _ => replacement,
        };

        self.nodes[node.0].parent = None;
        self.links[node.0 * self.k..(node.0 + 1) * self.k].fill(None);
        self.free.push(node.0);
        self.len -= 1;

        (value, root)
    }

    /// Like [`delete_min`](Self::delete_min), but None for a removed node
    pub fn try_delete_min(&mut self, node: NodeId) -> Option<(T, Option<NodeId>)> {
        self.get(node)?;
        Some(self.delete_min(node))
    }

    /// Lower the value stored at `node` and restore heap order.
    ///
    /// A no-op when `value` is not strictly smaller than the current one. The node
    /// counts as freshly inserted afterwards for tie-breaking.
    pub fn decrease_key(&mut self, root: NodeId, node: NodeId, value: T) -> NodeId {
        let stamp = self.next_stamp;
        let current = &mut self.nodes[node.0];
        match &current.value {
            Some(old) if value < *old => {}
            _ => return root,
        }
        current.value = Some(value);
        current.stamp = stamp;
        self.next_stamp += 1;

        if current.parent.is_none() {
            // already a root, a smaller value cannot break anything
            return root;
        }
        self.detach(node);
        self.meld(Some(root), Some(node)).unwrap_or(root)
    }
}

/// # Panics
///
/// If `id` was removed; use [`MeldableTree::get`] for a checked lookup.
impl<T, R> Index<NodeId> for MeldableTree<T, R> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl<T, R> fmt::Debug for MeldableTree<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeldableTree")
            .field("fan_out", &self.k)
            .field("len", &self.len)
            .field("capacity", &self.nodes.len())
            .finish()
    }
}
