//! Loop shape classification.
//!
//! Downstream passes treat loops differently depending on where the exit test
//! sits: a pre-tested loop can be skipped entirely, a post-tested loop runs at
//! least once, an infinite loop has no exit to reason about. [`classify_loop`]
//! derives the shape from a loop's exit and latch structure at query time.

use strum::{EnumCount, EnumIter};

use crate::{
    graph::{BlockId, Predecessors, Successors},
    loops::{LoopForest, LoopId},
};

/// Classification of a natural loop by exit placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumCount, EnumIter)]
pub enum LoopKind {
    /// Exit condition at the header, `while`-shaped: the loop can run zero
    /// times.
    PreTested,

    /// Exit condition at the latch, `do`/`while`-shaped: the body runs at
    /// least once.
    PostTested,

    /// No exit edge leaves the loop body.
    Infinite,

    /// Multiple latches or an irregular exit structure.
    Complex,
}

/// Classifies a loop of the forest against the graph it was discovered in.
///
/// The latch set and exit edges are recomputed from the graph on each call,
/// consistent with the rest of the forest's query-time semantics.
///
/// # Panics
///
/// Panics if `id` does not name a loop of the forest.
#[must_use]
pub fn classify_loop<G>(forest: &LoopForest, id: LoopId, graph: &G) -> LoopKind
where
    G: Successors + Predecessors,
{
    let lp = forest.get(id);

    let latches: Vec<BlockId> = graph
        .predecessors(lp.header())
        .filter(|pred| lp.contains(*pred))
        .collect();

    let mut exit_sources: Vec<BlockId> = Vec::new();
    for &block in lp.blocks() {
        for succ in graph.successors(block) {
            if !lp.contains(succ) {
                exit_sources.push(block);
            }
        }
    }

    if exit_sources.is_empty() {
        return LoopKind::Infinite;
    }
    if latches.len() > 1 {
        return LoopKind::Complex;
    }

    if let Some(&latch) = latches.first() {
        if exit_sources.iter().all(|&source| source == latch) {
            return LoopKind::PostTested;
        }
    }
    if exit_sources.iter().all(|&source| source == lp.header()) {
        return LoopKind::PreTested;
    }

    LoopKind::Complex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_dominators, detect_loops, ControlFlowGraph, RootedGraph};
    use strum::IntoEnumIterator;

    fn classify_single(count: usize, edges: &[(usize, usize)]) -> LoopKind {
        let cfg = ControlFlowGraph::from_edges(count, edges).unwrap();
        let dominators = compute_dominators(&cfg, cfg.entry());
        let forest = detect_loops(&cfg, &dominators);
        assert_eq!(forest.len(), 1);
        let id = forest.roots().next().unwrap();
        classify_loop(&forest, id, &cfg)
    }

    #[test]
    fn test_pre_tested_loop() {
        // while-shape: header 1 branches out to 3 or into the body 2.
        // 0 -> 1, 1 -> 2, 2 -> 1, 1 -> 3
        let kind = classify_single(4, &[(0, 1), (1, 2), (2, 1), (1, 3)]);
        assert_eq!(kind, LoopKind::PreTested);
    }

    #[test]
    fn test_post_tested_loop() {
        // do-while-shape: latch 2 branches back to 1 or out to 3.
        // 0 -> 1, 1 -> 2, 2 -> 1, 2 -> 3
        let kind = classify_single(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);
        assert_eq!(kind, LoopKind::PostTested);
    }

    #[test]
    fn test_self_loop_with_exit_is_post_tested() {
        // A single block that is header and latch at once.
        // 0 -> 1, 1 -> 1, 1 -> 2
        let kind = classify_single(3, &[(0, 1), (1, 1), (1, 2)]);
        assert_eq!(kind, LoopKind::PostTested);
    }

    #[test]
    fn test_infinite_loop() {
        // No edge ever leaves {1, 2}.
        // 0 -> 1, 1 -> 2, 2 -> 1
        let kind = classify_single(3, &[(0, 1), (1, 2), (2, 1)]);
        assert_eq!(kind, LoopKind::Infinite);
    }

    #[test]
    fn test_multi_latch_is_complex() {
        // Two latches into header 1, exit from the header.
        // 0 -> 1, 1 -> 2, 2 -> 1, 1 -> 3, 3 -> 1, 1 -> 4
        let kind = classify_single(5, &[(0, 1), (1, 2), (2, 1), (1, 3), (3, 1), (1, 4)]);
        assert_eq!(kind, LoopKind::Complex);
    }

    #[test]
    fn test_mid_body_exit_is_complex() {
        // Exit leaves from the middle of the body, neither header nor latch.
        // 0 -> 1, 1 -> 2, 2 -> 3, 3 -> 1, 2 -> 4
        let kind = classify_single(5, &[(0, 1), (1, 2), (2, 3), (3, 1), (2, 4)]);
        assert_eq!(kind, LoopKind::Complex);
    }

    #[test]
    fn test_kind_enum_derives() {
        assert_eq!(LoopKind::COUNT, 4);
        assert_eq!(LoopKind::iter().count(), 4);
    }
}
