use crate::cancel::CancelToken;
use crate::config::{FanOut, SearchConfig};
use crate::meldable::{MeldableTree, SlotPicker};
use super::{
    Explored,
    lookup::{Lookup, State},
    search_node::SearchNode,
};

use std::{
    cmp::Ordering,
    fmt::Debug,
    hash::Hash,
    sync::Arc,
};
use rand::Rng;
use tracing::{debug, trace};



/// Frontier entry, ordered by f = g + h.
/// Ties are left to the tree, which surfaces the newest entry first.
struct Ranked<P>(Arc<SearchNode<P>>);

impl<P> Ord for Ranked<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.f().total_cmp(&other.0.f())
    }
}
impl<P> PartialOrd for Ranked<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<P> PartialEq for Ranked<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<P> Eq for Ranked<P> {}

impl<P> AsRef<Arc<SearchNode<P>>> for Ranked<P> {
    fn as_ref(&self) -> &Arc<SearchNode<P>> {
        &self.0
    }
}


/// Why a frontier stopped expanding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The termination predicate held for the current best node
    Done,
    /// The frontier ran dry before the predicate ever held
    Exhausted,
    /// The cancel token was set
    Cancelled,
}

/// Raw outcome of one frontier run
#[derive(Debug)]
pub struct Expansion<P> {
    /// Node the predicate accepted, or the last node popped otherwise
    pub best: Arc<SearchNode<P>>,
    pub termination: Termination,
    pub explored: Explored<P>,
}

impl<P> Expansion<P> {

    /// Distinct positions discovered
    pub fn expansions(&self) -> usize {
        self.explored.len()
    }
}

/// Outcome of a search between two positions
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult<P> {
    pub path: Vec<P>, // start to goal inclusive, empty when unsuccessful
    pub distance: f64, // infinite when unsuccessful
    pub success: bool,
    pub expansions: usize,
}

impl<P> PathResult<P> {

    pub(crate) fn failure(expansions: usize) -> Self {
        Self {
            path: Vec::new(),
            distance: f64::INFINITY,
            success: false,
            expansions,
        }
    }
}


/// A* Algorithm
/// https://en.wikipedia.org/wiki/A*_search_algorithm
#[derive(Clone, Debug, Default)]
pub struct AStar {
    config: SearchConfig,
    cancel: Option<CancelToken>,
}

impl AStar {

    pub fn new(config: SearchConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Checked once per expansion; a cancelled search reports failure
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// From start position, expand until the goal is the cheapest open node.
    /// The approach has 2 requirements for the result to be a shortest path:
    /// 1. Edge costs are non-negative (infinite cost marks an impassable edge)
    /// 2. The heuristic is admissible (never overestimates the remaining cost)
    pub fn plan<P, IT, NN, S, H>(&self, start: P, goal: P, neighbors: NN, score_between: S, heuristic: H) -> PathResult<P>
    where
        P: Eq + Hash + Clone + Debug,
        NN: Fn(&P) -> IT, // positions directly reachable from a position
        IT: IntoIterator<Item = P>,
        S: Fn(&P, &P) -> f64, // cost of the edge between two adjacent positions
        H: Fn(&P) -> f64, // estimated cost from a position to the goal
    {
        debug!(?start, ?goal, fan_out = self.config.fan_out.get(), "a* search starting");

        let start = SearchNode::start(start.clone(), heuristic(&start));
        let expansion = self.expand(
            start,
            |node| successors(Arc::clone(node), &neighbors, &score_between, &heuristic),
            |_, best| *best.position() == goal,
        );

        let result = match expansion.termination {
            Termination::Done => PathResult {
                path: expansion.best.path(),
                distance: expansion.best.g(),
                success: true,
                expansions: expansion.expansions(),
            },
            Termination::Exhausted | Termination::Cancelled => PathResult::failure(expansion.expansions()),
        };
        debug!(success = result.success, distance = result.distance, expansions = result.expansions, "a* search finished");
        result
    }

    /// Low-level entry point: run one frontier from a caller-built start node.
    ///
    /// `neighbors` builds candidate nodes with their costs already computed relative
    /// to the given parent. `is_done` is asked about the cheapest open node before it
    /// is expanded; the search stops as soon as it returns true.
    pub fn expand<P, IT, NN, D>(&self, start: SearchNode<P>, neighbors: NN, is_done: D) -> Expansion<P>
    where
        P: Eq + Hash + Clone + Debug,
        NN: FnMut(&Arc<SearchNode<P>>) -> IT,
        IT: IntoIterator<Item = SearchNode<P>>,
        D: FnMut(&Lookup<P>, &Arc<SearchNode<P>>) -> bool,
    {
        run_frontier(
            self.config.fan_out,
            SlotPicker::from_seed_option(self.config.seed),
            Arc::new(start),
            self.cancel.as_ref(),
            neighbors,
            is_done,
        )
    }
}


/// Candidate nodes for every neighbor of `parent`, built lazily
pub(crate) fn successors<'a, P, IT, NN, S, H>(parent: Arc<SearchNode<P>>, neighbors: &'a NN, score_between: &'a S, heuristic: &'a H) -> impl Iterator<Item = SearchNode<P>> + 'a
where
    P: 'a,
    NN: Fn(&P) -> IT,
    IT: IntoIterator<Item = P>,
    IT::IntoIter: 'a,
    S: Fn(&P, &P) -> f64,
    H: Fn(&P) -> f64,
{
    neighbors(parent.position()).into_iter().map(move |position| {
        let edge_cost = score_between(parent.position(), &position);
        let h = heuristic(&position);
        SearchNode::successor(&parent, position, edge_cost, h)
    })
}


/// The expansion loop shared by both search drivers
pub(crate) fn run_frontier<P, R, IT, NN, D>(
    fan_out: FanOut,
    picker: SlotPicker<R>,
    start: Arc<SearchNode<P>>,
    cancel: Option<&CancelToken>,
    mut neighbors: NN,
    mut is_done: D,
) -> Expansion<P>
where
    P: Eq + Hash + Clone + Debug,
    R: Rng,
    NN: FnMut(&Arc<SearchNode<P>>) -> IT,
    IT: IntoIterator<Item = SearchNode<P>>,
    D: FnMut(&Lookup<P>, &Arc<SearchNode<P>>) -> bool,
{
    // Open list
    // Nodes that need to be evaluated, kept in a meldable tree ordered by f
    let mut open: MeldableTree<Ranked<P>, R> = MeldableTree::with_picker(fan_out, picker);

    // Positions we have seen: open ones point at their tree node, closed ones
    // are settled and ignored from then on
    let mut lookup: Lookup<P> = Lookup::default();

    let mut root = open.singleton(Ranked(start));

    let (best, termination) = loop {
        let lowest = Arc::clone(&open[root].0);

        if cancel.is_some_and(CancelToken::is_cancelled) {
            break (lowest, Termination::Cancelled);
        }
        // asked before closing, so the predicate still sees lowest as open
        if is_done(&lookup, &lowest) {
            break (lowest, Termination::Done);
        }

        let (_, mut next) = open.delete_min(root);
        lookup.close(lowest.position().clone(), Arc::clone(&lowest));
        trace!(position = ?lowest.position(), f = lowest.f(), g = lowest.g(), "expanding");

        for candidate in neighbors(&lowest) {
            // impassable edge, not a path
            if !candidate.g().is_finite() {
                continue;
            }
            match lookup.state(candidate.position()) {
                // already settled, a closed position is never improved upon
                State::Closed => continue,
                State::Open(id) => {
                    // no-op unless the candidate is strictly cheaper
                    if let Some(r) = next {
                        next = Some(open.decrease_key(r, id, Ranked(Arc::new(candidate))));
                    }
                }
                State::Undiscovered => {
                    let position = candidate.position().clone();
                    let id = open.singleton(Ranked(Arc::new(candidate)));
                    next = open.meld(next, Some(id));
                    lookup.open(position, id);
                }
            }
        }

        match next {
            Some(r) => root = r,
            None => break (lowest, Termination::Exhausted),
        }
    };

    let explored = lookup.into_explored(&open);
    debug!(?termination, expansions = explored.len(), best = ?best.position(), "frontier stopped");

    Expansion { best, termination, explored }
}
