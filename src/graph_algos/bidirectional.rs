use crate::cancel::CancelToken;
use crate::collections::FxDashMap;
use crate::config::{MeetingRule, SearchConfig};
use crate::errors::SearchError;
use crate::meldable::SlotPicker;
use super::{
    a_star::{Expansion, PathResult, Termination, run_frontier, successors},
    search_node::SearchNode,
};

use std::{
    fmt::Debug,
    hash::Hash,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread,
};
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};



/// Which end of the path a search direction starts from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the start position towards the goal
    Forward,
    /// From the goal position towards the start
    Backward,
}

impl Direction {
    fn slot(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }
}


/// Meeting point shared by the two search directions.
///
/// Before closing its cheapest node, each direction claims that node's position.
/// The claim is an atomic insert-if-absent, so for any position exactly one direction
/// wins and the other one learns the frontiers have met.
///
/// Every node either direction generates is also recorded with its g. A position
/// reached from both ends yields a path of cost `g_forward + g_backward`, and the
/// smallest such sum is kept as the best total found so far.
pub struct Rendezvous<P: Eq + Hash> {
    claims: FxDashMap<P, (Direction, Arc<SearchNode<P>>)>,
    costs: FxDashMap<P, [f64; 2]>, // best g per direction, indexed by Direction::slot
    best_total: AtomicU64, // f64 bits, infinite until the frontiers overlap
    first_meeting: OnceLock<P>,
    halted: AtomicBool, // set once a direction is finished for good: met optimally, ran dry or died
}

impl<P: Eq + Hash + Clone> Rendezvous<P> {

    pub fn new() -> Self {
        Self {
            claims: FxDashMap::default(),
            costs: FxDashMap::default(),
            best_total: AtomicU64::new(f64::INFINITY.to_bits()),
            first_meeting: OnceLock::new(),
            halted: AtomicBool::new(false),
        }
    }

    /// Returns true if the opposite direction already claimed this position.
    /// A direction re-claiming its own position is not a meeting.
    pub fn claim(&self, direction: Direction, node: &Arc<SearchNode<P>>) -> bool {
        match self.claims.entry(node.position().clone()) {
            Entry::Occupied(entry) => {
                if entry.get().0 == direction {
                    return false;
                }
                // only the first collision is kept, later ones are expected
                let _ = self.first_meeting.set(node.position().clone());
                true
            }
            Entry::Vacant(slot) => {
                slot.insert((direction, Arc::clone(node)));
                false
            }
        }
    }

    /// Note that `direction` reached `node` at cost `node.g()`, lowering the best
    /// total if the other direction already knows this position
    pub fn record(&self, direction: Direction, node: &SearchNode<P>) {
        let g = node.g();
        if !g.is_finite() {
            return;
        }
        let total = {
            let mut entry = self.costs.entry(node.position().clone()).or_insert([f64::INFINITY; 2]);
            let best = entry.value_mut();
            let own = direction.slot();
            if g < best[own] {
                best[own] = g;
            }
            best[0] + best[1]
        };
        if total.is_finite() {
            self.lower_best_total(total);
        }
    }

    /// Cheapest `g_forward + g_backward` over every position both directions reached
    pub fn best_total(&self) -> f64 {
        f64::from_bits(self.best_total.load(Ordering::Acquire))
    }

    fn lower_best_total(&self, total: f64) {
        let mut current = self.best_total.load(Ordering::Acquire);
        while total < f64::from_bits(current) {
            match self.best_total.compare_exchange_weak(current, total.to_bits(), Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// Direction and node that claimed `position`, if any
    pub fn claimed(&self, position: &P) -> Option<(Direction, Arc<SearchNode<P>>)> {
        self.claims.get(position).map(|entry| {
            let (direction, node) = entry.value();
            (*direction, Arc::clone(node))
        })
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// The first position whose claim collided
    pub fn first_meeting(&self) -> Option<&P> {
        self.first_meeting.get()
    }

    pub fn halt(&self) {
        self.halted.store(true, Ordering::Release);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Termination predicate for one direction.
    ///
    /// Under [`MeetingRule::FirstMeeting`] a direction stops on its first collision.
    /// Under [`MeetingRule::MinimumSum`] it keeps expanding until its cheapest open
    /// node cannot lead to anything better than the best total, then halts both.
    fn should_stop(&self, direction: Direction, best: &Arc<SearchNode<P>>, meeting: MeetingRule) -> bool
    where
        P: Debug,
    {
        if self.is_halted() {
            return true;
        }
        let met = self.claim(direction, best);
        trace!(?direction, position = ?best.position(), met, "claim");
        match meeting {
            MeetingRule::FirstMeeting => met,
            MeetingRule::MinimumSum => {
                let bound = self.best_total();
                let settled = bound.is_finite() && best.f() >= bound;
                if settled {
                    debug!(?direction, bound, "no cheaper join left");
                    self.halt();
                }
                settled
            }
        }
    }
}

impl<P: Eq + Hash + Clone> Default for Rendezvous<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Halts the rendezvous if a worker unwinds, so the surviving direction stops too
struct HaltOnUnwind<'a, P: Eq + Hash + Clone>(&'a Rendezvous<P>);

impl<P: Eq + Hash + Clone> Drop for HaltOnUnwind<'_, P> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.halt();
        }
    }
}


/// Bidirectional A*: one search from each end, run on two threads until the
/// frontiers meet.
///
/// With [`MeetingRule::MinimumSum`] the directions keep expanding past their first
/// collision until one of them proves that no cheaper join is left: its cheapest open
/// node has `f` at least the best `g_forward + g_backward` found so far. Every
/// position known to both directions is then a join candidate and the smallest sum
/// wins. With a consistent heuristic the result is a shortest path.
#[derive(Clone, Debug, Default)]
pub struct BidirectionalAStar {
    config: SearchConfig,
    cancel: Option<CancelToken>,
}

impl BidirectionalAStar {

    pub fn new(config: SearchConfig) -> Self {
        Self { config, cancel: None }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Shortest path from `start` to `goal`.
    ///
    /// `heuristic` gets the direction being searched: Forward estimates the distance to
    /// `goal`, Backward the distance to `start`. The graph is treated as undirected,
    /// both directions walk it with the same `neighbors` and `score_between`.
    /// Callbacks are shared by both worker threads.
    pub fn plan<P, IT, NN, S, H>(&self, start: P, goal: P, neighbors: NN, score_between: S, heuristic: H) -> Result<PathResult<P>, SearchError>
    where
        P: Eq + Hash + Clone + Debug + Send + Sync,
        NN: Fn(&P) -> IT + Sync,
        IT: IntoIterator<Item = P>,
        S: Fn(&P, &P) -> f64 + Sync,
        H: Fn(&P, Direction) -> f64 + Sync,
    {
        debug!(?start, ?goal, fan_out = self.config.fan_out.get(), meeting = ?self.config.meeting, "bidirectional search starting");

        if start == goal {
            return Ok(PathResult {
                path: vec![start],
                distance: 0.0,
                success: true,
                expansions: 0,
            });
        }

        // Both ends are claimed up front: a direction reaching the opposite end always
        // registers a meeting, however the two threads happen to be scheduled
        let rendezvous = Rendezvous::new();
        let ahead = Arc::new(SearchNode::start(start.clone(), heuristic(&start, Direction::Forward)));
        let behind = Arc::new(SearchNode::start(goal.clone(), heuristic(&goal, Direction::Backward)));
        rendezvous.claim(Direction::Forward, &ahead);
        rendezvous.claim(Direction::Backward, &behind);
        rendezvous.record(Direction::Forward, &ahead);
        rendezvous.record(Direction::Backward, &behind);

        let (forward, backward) = thread::scope(|s| {
            let forward = s.spawn(|| self.run_direction(Direction::Forward, ahead, &rendezvous, &neighbors, &score_between, &heuristic));
            let backward = s.spawn(|| self.run_direction(Direction::Backward, behind, &rendezvous, &neighbors, &score_between, &heuristic));
            (forward.join(), backward.join())
        });
        let forward = forward.map_err(|_| SearchError::WorkerPanicked(Direction::Forward))?;
        let backward = backward.map_err(|_| SearchError::WorkerPanicked(Direction::Backward))?;

        let expansions = forward.expansions() + backward.expansions();
        let cancelled = [forward.termination, backward.termination].contains(&Termination::Cancelled);
        if cancelled {
            debug!(expansions, "bidirectional search cancelled");
            return Ok(PathResult::failure(expansions));
        }

        let result = match self.join_point(&forward, &backward, &rendezvous) {
            Some((ahead, behind)) => {
                // forward chain ends on the join point, the backward chain starts there
                let mut path = ahead.path();
                path.pop();
                path.extend(behind.ancestors().map(|n| n.position().clone()));
                PathResult {
                    path,
                    distance: ahead.g() + behind.g(),
                    success: true,
                    expansions,
                }
            }
            None => PathResult::failure(expansions),
        };

        debug!(success = result.success, distance = result.distance, expansions, "bidirectional search finished");
        Ok(result)
    }

    fn run_direction<P, IT, NN, S, H>(
        &self,
        direction: Direction,
        origin: Arc<SearchNode<P>>,
        rendezvous: &Rendezvous<P>,
        neighbors: &NN,
        score_between: &S,
        heuristic: &H,
    ) -> Expansion<P>
    where
        P: Eq + Hash + Clone + Debug,
        NN: Fn(&P) -> IT,
        IT: IntoIterator<Item = P>,
        S: Fn(&P, &P) -> f64,
        H: Fn(&P, Direction) -> f64,
    {
        let _guard = HaltOnUnwind(rendezvous);
        let estimate = |p: &P| heuristic(p, direction);
        let seed = match direction {
            Direction::Forward => self.config.seed,
            Direction::Backward => self.config.backward_seed(),
        };

        let expansion = run_frontier(
            self.config.fan_out,
            SlotPicker::from_seed_option(seed),
            origin,
            self.cancel.as_ref(),
            |node| {
                successors(Arc::clone(node), neighbors, score_between, &estimate)
                    .inspect(move |candidate| rendezvous.record(direction, candidate))
            },
            |_, best| rendezvous.should_stop(direction, best, self.config.meeting),
        );

        // every reachable position is settled, the other direction has nothing left to find
        if expansion.termination == Termination::Exhausted {
            rendezvous.halt();
        }
        debug!(?direction, termination = ?expansion.termination, expansions = expansion.expansions(), "direction finished");
        expansion
    }

    /// Pick the nodes to splice together: (forward node, backward node) for one position
    fn join_point<P>(&self, forward: &Expansion<P>, backward: &Expansion<P>, rendezvous: &Rendezvous<P>) -> Option<(Arc<SearchNode<P>>, Arc<SearchNode<P>>)>
    where
        P: Eq + Hash + Clone,
    {
        match self.config.meeting {
            MeetingRule::MinimumSum => {
                let mut best: Option<(f64, &Arc<SearchNode<P>>, &Arc<SearchNode<P>>)> = None;
                for (position, ahead) in &forward.explored {
                    let Some(behind) = backward.explored.get(position) else { continue };
                    let total = ahead.g() + behind.g();
                    if !total.is_finite() {
                        continue;
                    }
                    if best.is_none_or(|(t, _, _)| total < t) {
                        best = Some((total, ahead, behind));
                    }
                }
                best.map(|(_, ahead, behind)| (Arc::clone(ahead), Arc::clone(behind)))
            }
            MeetingRule::FirstMeeting => {
                let position = rendezvous.first_meeting()?;
                let ahead = forward.explored.get(position)?;
                let behind = backward.explored.get(position)?;
                Some((Arc::clone(ahead), Arc::clone(behind)))
            }
        }
    }
}
