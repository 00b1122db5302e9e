use thiserror::Error;

use crate::graph_algos::bidirectional::Direction;


#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Priority tree nodes need at least two child slots
    #[error("fan-out must be at least 2, got {0}")]
    InvalidFanOut(usize),

    /// A callback panicked inside one of the bidirectional workers
    #[error("{0:?} search worker panicked")]
    WorkerPanicked(Direction),
}
