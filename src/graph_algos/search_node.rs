use std::{
    fmt::{self, Debug},
    hash::{Hash, Hasher},
    sync::Arc,
};


/// Node on the search tree: a position plus the cost accounting to reach it.
///
/// `g` and `h` are fixed at construction. Equality and hashing only look at the
/// position, so two nodes for the same place are the same node whatever they cost.
pub struct SearchNode<P> {
    position: P,
    predecessor: Option<Arc<SearchNode<P>>>,
    g: f64, // exact cost from the start node
    h: f64, // admissible estimate to the goal
}

impl<P> SearchNode<P> {

    /// Root of a path, g = 0
    pub fn start(position: P, h: f64) -> Self {
        Self { position, predecessor: None, g: 0.0, h }
    }

    /// Node reached from `predecessor` over an edge costing `edge_cost`
    pub fn successor(predecessor: &Arc<SearchNode<P>>, position: P, edge_cost: f64, h: f64) -> Self {
        Self {
            position,
            g: predecessor.g + edge_cost,
            predecessor: Some(Arc::clone(predecessor)),
            h,
        }
    }

    pub fn position(&self) -> &P {
        &self.position
    }

    pub fn predecessor(&self) -> Option<&Arc<SearchNode<P>>> {
        self.predecessor.as_ref()
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn f(&self) -> f64 {
        self.g + self.h
    }

    /// This node followed by every predecessor back to the start
    pub fn ancestors(&self) -> Ancestors<'_, P> {
        Ancestors { next: Some(self) }
    }

    /// Positions from the start of the chain to this node, inclusive
    pub fn path(&self) -> Vec<P>
    where
        P: Clone,
    {
        let mut path: Vec<P> = self.ancestors().map(|n| n.position.clone()).collect();
        path.reverse();
        path
    }
}

/// Iterator walking predecessor links
pub struct Ancestors<'a, P> {
    next: Option<&'a SearchNode<P>>,
}

impl<'a, P> Iterator for Ancestors<'a, P> {
    type Item = &'a SearchNode<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.predecessor.as_deref();
        Some(node)
    }
}

// Long chains would otherwise drop recursively, one frame per predecessor
impl<P> Drop for SearchNode<P> {
    fn drop(&mut self) {
        let mut next = self.predecessor.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut inner) => next = inner.predecessor.take(),
                Err(_) => break, // still shared by another branch
            }
        }
    }
}

impl<P: PartialEq> PartialEq for SearchNode<P> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}
impl<P: Eq> Eq for SearchNode<P> {}

impl<P: Hash> Hash for SearchNode<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

impl<P: Debug> Debug for SearchNode<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("position", &self.position)
            .field("f", &self.f())
            .field("g", &self.g)
            .field("h", &self.h)
            .finish()
    }
}
