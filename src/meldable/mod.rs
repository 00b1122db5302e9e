pub mod rng;
pub mod tree;
pub mod queue;

pub use queue::MeldableQueue;
pub use rng::SlotPicker;
pub use tree::{MeldableTree, NodeId};
