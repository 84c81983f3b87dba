//! Depth-first traversal orders over control flow graphs.
//!
//! Postorder and reverse postorder are the two orders the analyses in this
//! crate consume: dominator computation iterates blocks in reverse postorder,
//! and the postorder numbering doubles as the comparison key for the
//! intersection step. Both functions visit only blocks reachable from the
//! given start block.

use crate::graph::{traits::Successors, BlockId};

/// Returns the blocks reachable from `start` in postorder.
///
/// A block appears after all of its descendants in the depth-first spanning
/// tree; `start` is always last. The traversal is iterative, so deep graphs do
/// not risk stack overflow.
#[must_use]
pub fn postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    let block_count = graph.block_count();
    if start.index() >= block_count {
        return Vec::new();
    }

    let mut visited = vec![false; block_count];
    let mut order = Vec::with_capacity(block_count);
    // Stack entries carry an "expanded" flag: a block is pushed once to expand
    // its successors and a second time to emit it after they finish.
    let mut stack = vec![(start, false)];
    visited[start.index()] = true;

    while let Some((block, expanded)) = stack.pop() {
        if expanded {
            order.push(block);
            continue;
        }

        stack.push((block, true));
        let successors: Vec<BlockId> = graph.successors(block).collect();
        for &succ in successors.iter().rev() {
            if !visited[succ.index()] {
                visited[succ.index()] = true;
                stack.push((succ, false));
            }
        }
    }

    order
}

/// Returns the blocks reachable from `start` in reverse postorder.
///
/// Equivalent to reversing [`postorder`]; `start` is always first.
#[must_use]
pub fn reverse_postorder<G: Successors>(graph: &G, start: BlockId) -> Vec<BlockId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlFlowGraph;

    #[test]
    fn test_postorder_diamond() {
        //      0
        //     / \
        //    1   2
        //     \ /
        //      3
        let cfg = ControlFlowGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();

        let post = postorder(&cfg, BlockId::new(0));
        assert_eq!(post.len(), 4);
        // The join block finishes first, the entry last.
        assert_eq!(post[3], BlockId::new(0));
        assert_eq!(post[0], BlockId::new(3));
    }

    #[test]
    fn test_reverse_postorder_entry_first() {
        let cfg = ControlFlowGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();

        let rpo = reverse_postorder(&cfg, BlockId::new(0));
        assert_eq!(rpo[0], BlockId::new(0));
        assert_eq!(rpo[3], BlockId::new(3));
    }

    #[test]
    fn test_postorder_with_cycle_terminates() {
        // 0 -> 1 -> 2 -> 1
        let cfg = ControlFlowGraph::from_edges(3, &[(0, 1), (1, 2), (2, 1)]).unwrap();

        let post = postorder(&cfg, BlockId::new(0));
        assert_eq!(post.len(), 3);
        assert_eq!(post[2], BlockId::new(0));
    }

    #[test]
    fn test_postorder_invalid_start() {
        let cfg = ControlFlowGraph::from_edges(2, &[(0, 1)]).unwrap();
        assert!(postorder(&cfg, BlockId::new(9)).is_empty());
    }
}
