use thiserror::Error;

/// The generic Error type covering all recoverable failures this library can return.
///
/// The taxonomy is deliberately narrow. Malformed input is only possible while a
/// [`ControlFlowGraph`](crate::ControlFlowGraph) is being assembled from external
/// block and edge data, so that is where `Result`s appear. Violating a precondition
/// of the loop forest itself (a non-dense loop index, an unknown loop id, a parent
/// that was never created) is a programming defect in the calling analysis pass,
/// not a recoverable condition, and panics instead of surfacing here.
///
/// # Examples
///
/// ```rust
/// use loopnest::{ControlFlowGraph, Error};
///
/// // A graph must have at least one block before edges make sense.
/// match ControlFlowGraph::from_edges(0, &[]) {
///     Err(Error::EmptyGraph) => {}
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A control flow graph was constructed with no basic blocks.
    ///
    /// A function body always has at least an entry block; an empty block list
    /// means the caller handed over data for something that is not a function.
    /// Note the distinction to a *loop-free* graph, which is perfectly valid and
    /// simply yields an empty loop forest.
    #[error("control flow graph has no blocks")]
    EmptyGraph,

    /// An edge referenced a block outside the graph.
    ///
    /// Block identifiers are dense indices; any edge endpoint must name one of
    /// the `count` blocks the graph was created with.
    #[error("block b{block} is out of range for a graph of {count} blocks")]
    BlockOutOfRange {
        /// The offending block index.
        block: usize,
        /// The number of blocks in the graph.
        count: usize,
    },
}

/// A specialized [`Result`](std::result::Result) type for loopnest operations.
pub type Result<T> = std::result::Result<T, Error>;
