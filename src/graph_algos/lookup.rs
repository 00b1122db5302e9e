use std::{hash::Hash, sync::Arc};

use crate::collections::FxIndexMap;
use crate::meldable::{MeldableTree, NodeId};
use super::{Explored, search_node::SearchNode};


/// Where a position stands in one search direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Undiscovered,
    Open(NodeId), // waiting in the frontier at this tree node
    Closed, // expanded, never revisited
}

#[derive(Debug)]
enum Mark<P> {
    Open(NodeId),
    Closed(Arc<SearchNode<P>>),
}


/// Open/closed bookkeeping for one frontier, keyed by position.
/// Handed to termination predicates so they can inspect search progress.
#[derive(Debug)]
pub struct Lookup<P> {
    marks: FxIndexMap<P, Mark<P>>,
}

impl<P> Default for Lookup<P> {
    fn default() -> Self {
        Self { marks: FxIndexMap::default() }
    }
}

impl<P: Eq + Hash> Lookup<P> {

    /// Distinct positions discovered so far
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn state(&self, position: &P) -> State {
        match self.marks.get(position) {
            None => State::Undiscovered,
            Some(Mark::Open(id)) => State::Open(*id),
            Some(Mark::Closed(_)) => State::Closed,
        }
    }

    pub fn is_open(&self, position: &P) -> bool {
        matches!(self.state(position), State::Open(_))
    }

    pub fn is_closed(&self, position: &P) -> bool {
        matches!(self.state(position), State::Closed)
    }

    pub fn positions(&self) -> impl Iterator<Item = &P> {
        self.marks.keys()
    }

    pub(crate) fn open(&mut self, position: P, id: NodeId) {
        self.marks.insert(position, Mark::Open(id));
    }

    pub(crate) fn close(&mut self, position: P, node: Arc<SearchNode<P>>) {
        self.marks.insert(position, Mark::Closed(node));
    }

    /// Resolve open entries against the frontier tree, keeping discovery order
    pub(crate) fn into_explored<T, R>(self, tree: &MeldableTree<T, R>) -> Explored<P>
    where
        T: AsRef<Arc<SearchNode<P>>>,
    {
        self.marks
            .into_iter()
            .map(|(position, mark)| {
                let node = match mark {
                    Mark::Open(id) => Arc::clone(tree[id].as_ref()),
                    Mark::Closed(node) => node,
                };
                (position, node)
            })
            .collect()
    }
}
