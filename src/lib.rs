//! Shortest-path search over caller-defined graphs.
//!
//! The graph is never materialized: positions are opaque keys and the caller
//! supplies neighbor generation, edge costs and a heuristic. The frontier is a
//! randomized meldable priority tree; [`AStar`] runs one frontier,
//! [`BidirectionalAStar`] runs one from each end on two threads.

mod collections;

pub mod cancel;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod graph_algos;
pub mod meldable;

pub use cancel::CancelToken;
pub use config::{FanOut, MeetingRule, SearchConfig};
pub use errors::SearchError;
pub use graph_algos::{
    Explored,
    a_star::{AStar, Expansion, PathResult, Termination},
    bidirectional::{BidirectionalAStar, Direction, Rendezvous},
    lookup::{Lookup, State},
    search_node::{Ancestors, SearchNode},
};
pub use meldable::{MeldableQueue, MeldableTree, NodeId, SlotPicker};
