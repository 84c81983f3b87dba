//! Control flow graph abstraction and analyses.
//!
//! This module provides the block identity type, the capability traits the
//! loop analyses are written against, a compact concrete CFG, and dominator
//! computation:
//!
//! - [`BlockId`] - opaque basic-block identity
//! - [`GraphBase`], [`Successors`], [`Predecessors`], [`RootedGraph`] - the
//!   trait boundary any CFG representation can implement
//! - [`ControlFlowGraph`] - adjacency-list CFG over anonymous blocks
//! - [`DominatorTree`] / [`compute_dominators`] - dominance queries
//! - [`traversal`] - postorder and reverse postorder

mod block;
mod cfg;
mod dominators;
mod traits;
pub mod traversal;

pub use block::BlockId;
pub use cfg::ControlFlowGraph;
pub use dominators::{compute_dominators, DominatorIterator, DominatorTree};
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};
