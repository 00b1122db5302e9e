pub mod a_star;
pub mod bidirectional;
pub mod lookup;
pub mod search_node;

use std::sync::Arc;

use crate::collections::FxIndexMap;
use search_node::SearchNode;

/// Type alias for the positions one search direction discovered
/// P: Position - opaque key on the caller's graph
/// Every position maps to its current best node, open or closed,
/// in the order the positions were first discovered
pub type Explored<P> = FxIndexMap<P, Arc<SearchNode<P>>>;
