//! Concrete control flow graph implementation.
//!
//! This module provides [`ControlFlowGraph`], a compact adjacency-list CFG over
//! dense block indices. It stores no instruction data, because the loop
//! analyses only ever need block identity and adjacency; whatever IR the
//! caller analyzes stays on the caller's side of the trait boundary.
//!
//! Both forward and reverse adjacency are maintained so that successor and
//! predecessor queries are O(out-degree) and O(in-degree) respectively.

use crate::{
    graph::{
        traversal,
        traits::{GraphBase, Predecessors, RootedGraph, Successors},
        BlockId,
    },
    Error, Result,
};

/// A control flow graph over anonymous basic blocks.
///
/// Blocks are identified by dense [`BlockId`]s assigned in creation order;
/// block 0 is the function entry. Edges are directed and parallel edges are
/// preserved: adding the same edge twice records two control flow edges, which
/// matters to consumers that count edges rather than neighbors (backedge
/// counting, for one).
///
/// # Construction
///
/// ```rust
/// use loopnest::{ControlFlowGraph, GraphBase};
///
/// // entry -> header -> body -> header (back edge), body -> exit
/// let cfg = ControlFlowGraph::from_edges(4, &[(0, 1), (1, 2), (2, 1), (2, 3)])?;
/// assert_eq!(cfg.block_count(), 4);
/// # Ok::<(), loopnest::Error>(())
/// ```
///
/// # Thread Safety
///
/// `ControlFlowGraph` is [`Send`] and [`Sync`]. Build it single-threaded, then
/// share it immutably; there is no interior mutability.
#[derive(Debug, Clone, Default)]
pub struct ControlFlowGraph {
    /// Outgoing adjacency per block.
    succs: Vec<Vec<BlockId>>,
    /// Incoming adjacency per block.
    preds: Vec<Vec<BlockId>>,
}

impl ControlFlowGraph {
    /// Creates a new empty control flow graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` blocks and no edges.
    #[must_use]
    pub fn with_blocks(count: usize) -> Self {
        Self {
            succs: vec![Vec::new(); count],
            preds: vec![Vec::new(); count],
        }
    }

    /// Builds a graph from a block count and an edge list.
    ///
    /// This is the usual way to materialize a CFG handed over from a decoder
    /// or another IR: `edges` holds `(from, to)` pairs of raw block indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGraph`] if `count` is zero, or
    /// [`Error::BlockOutOfRange`] if any edge endpoint is `>= count`.
    pub fn from_edges(count: usize, edges: &[(usize, usize)]) -> Result<Self> {
        if count == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut graph = Self::with_blocks(count);
        for &(from, to) in edges {
            graph.add_edge(BlockId::new(from), BlockId::new(to))?;
        }
        Ok(graph)
    }

    /// Appends a new block and returns its identifier.
    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId::new(self.succs.len());
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        id
    }

    /// Adds a directed control flow edge from `from` to `to`.
    ///
    /// Parallel edges are recorded as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlockOutOfRange`] if either endpoint does not name a
    /// block of this graph.
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) -> Result<()> {
        let count = self.succs.len();
        for endpoint in [from, to] {
            if endpoint.index() >= count {
                return Err(Error::BlockOutOfRange {
                    block: endpoint.index(),
                    count,
                });
            }
        }

        self.succs[from.index()].push(to);
        self.preds[to.index()].push(from);
        Ok(())
    }

    /// Returns the number of control flow edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.succs.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the graph has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.succs.is_empty()
    }

    /// Returns blocks in postorder, starting from the entry block.
    ///
    /// Only blocks reachable from the entry appear in the result.
    #[must_use]
    pub fn postorder(&self) -> Vec<BlockId> {
        traversal::postorder(self, self.entry())
    }

    /// Returns blocks in reverse postorder, starting from the entry block.
    ///
    /// Reverse postorder visits every block before its successors in acyclic
    /// regions, the order forward data flow analyses want.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        traversal::reverse_postorder(self, self.entry())
    }
}

impl GraphBase for ControlFlowGraph {
    fn block_count(&self) -> usize {
        self.succs.len()
    }

    fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.succs.len()).map(BlockId::new)
    }
}

impl Successors for ControlFlowGraph {
    fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.succs[block.index()].iter().copied()
    }
}

impl Predecessors for ControlFlowGraph {
    fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> {
        self.preds[block.index()].iter().copied()
    }
}

impl RootedGraph for ControlFlowGraph {
    /// The entry is always block 0, the first block of the function body.
    fn entry(&self) -> BlockId {
        BlockId::new(0)
    }
}
