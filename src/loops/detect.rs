//! Natural loop discovery over a dominated control flow graph.
//!
//! Detection is dominance-based: a control flow edge `n -> h` is a backedge
//! exactly when `h` dominates `n`, and each such `h` is the header of one
//! natural loop. The loop body is every block that can reach a backedge
//! source without passing through the header, plus the header itself.
//! Multiple backedges sharing a header contribute to the same loop.
//!
//! The pass populates a [`LoopForest`] strictly through its construction API,
//! creating enclosing loops before the loops nested inside them so depths
//! come out right, then registering member blocks and exit targets. Exit
//! targets are successors of member blocks that lie outside the body, so no
//! block ever appears as both member and exit of the same loop.

use std::collections::HashSet;

use crate::{
    graph::{BlockId, DominatorTree, Predecessors, Successors},
    loops::{LoopForest, LoopId},
};

/// One natural loop as collected during the backedge scan, before the forest
/// is built.
struct DiscoveredLoop {
    header: BlockId,
    body: HashSet<BlockId>,
}

/// Detects all natural loops in a graph and returns the populated forest.
///
/// Unreachable blocks never form loops. A graph without backedges yields an
/// empty forest.
///
/// # Examples
///
/// ```rust
/// use loopnest::{compute_dominators, detect_loops, BlockId, ControlFlowGraph, RootedGraph};
///
/// // 0 -> 1 -> 2 -> 1 (back edge), 2 -> 3
/// let cfg = ControlFlowGraph::from_edges(4, &[(0, 1), (1, 2), (2, 1), (2, 3)])?;
/// let dominators = compute_dominators(&cfg, cfg.entry());
/// let forest = detect_loops(&cfg, &dominators);
///
/// assert_eq!(forest.len(), 1);
/// let lp = forest.iter().next().unwrap();
/// assert_eq!(lp.header(), BlockId::new(1));
/// assert_eq!(lp.depth(), 1);
/// # Ok::<(), loopnest::Error>(())
/// ```
#[must_use]
pub fn detect_loops<G>(graph: &G, dominators: &DominatorTree) -> LoopForest
where
    G: Successors + Predecessors,
{
    // Pass 1: find backedges and grow one body per header.
    let mut discovered: Vec<DiscoveredLoop> = Vec::new();
    for block in graph.block_ids() {
        if !dominators.is_reachable(block) {
            continue;
        }
        for succ in graph.successors(block) {
            if !dominators.dominates(succ, block) {
                continue;
            }

            // Backedge block -> succ; succ is the loop header.
            let header = succ;
            match discovered.iter_mut().find(|lp| lp.header == header) {
                Some(lp) => expand_loop_body(graph, &mut lp.body, header, block),
                None => {
                    let mut body = HashSet::new();
                    body.insert(header);
                    expand_loop_body(graph, &mut body, header, block);
                    discovered.push(DiscoveredLoop { header, body });
                }
            }
        }
    }

    // Pass 2: nesting. The parent of a loop is the smallest other loop whose
    // body contains its header; with natural loops that is the immediately
    // enclosing one.
    let parent_of: Vec<Option<usize>> = (0..discovered.len())
        .map(|i| {
            (0..discovered.len())
                .filter(|&j| j != i && discovered[j].body.contains(&discovered[i].header))
                .min_by_key(|&j| discovered[j].body.len())
        })
        .collect();

    // Pass 3: build the forest. An enclosing body is strictly larger than any
    // body nested in it, so ordering by descending body size puts every
    // parent before its children; header index breaks ties between unrelated
    // loops for determinism.
    let mut creation_order: Vec<usize> = (0..discovered.len()).collect();
    creation_order
        .sort_by_key(|&i| (std::cmp::Reverse(discovered[i].body.len()), discovered[i].header));

    let mut forest = LoopForest::with_capacity(discovered.len());
    let mut loop_ids: Vec<Option<LoopId>> = vec![None; discovered.len()];
    for (index, &i) in creation_order.iter().enumerate() {
        let parent = parent_of[i].map(|j| {
            loop_ids[j].expect("enclosing loop created before the loop it contains")
        });
        loop_ids[i] = Some(forest.create_loop(parent, index, discovered[i].header));
    }

    // Pass 4: members and exits, in block-index order for determinism.
    for &i in &creation_order {
        let id = loop_ids[i].expect("every discovered loop was created");
        let mut members: Vec<BlockId> = discovered[i].body.iter().copied().collect();
        members.sort_unstable();

        for &block in &members {
            forest.add_block(id, block);
        }
        for &block in &members {
            for succ in graph.successors(block) {
                if !discovered[i].body.contains(&succ) {
                    forest.add_exit(id, succ);
                }
            }
        }
    }

    forest
}

/// Checks whether the graph has any backedge at all.
///
/// Early-outs on the first hit; use this when only the existence of loops
/// matters, not their structure.
#[must_use]
pub fn has_back_edges<G>(graph: &G, dominators: &DominatorTree) -> bool
where
    G: Successors,
{
    for block in graph.block_ids() {
        if !dominators.is_reachable(block) {
            continue;
        }
        for succ in graph.successors(block) {
            if dominators.dominates(succ, block) {
                return true;
            }
        }
    }
    false
}

/// Grows `body` with every block that reaches `latch` without passing the
/// header, using a predecessor worklist.
fn expand_loop_body<G>(graph: &G, body: &mut HashSet<BlockId>, header: BlockId, latch: BlockId)
where
    G: Predecessors,
{
    if body.contains(&latch) {
        return;
    }

    let mut worklist = vec![latch];
    while let Some(block) = worklist.pop() {
        if body.insert(block) {
            for pred in graph.predecessors(block) {
                if pred != header && !body.contains(&pred) {
                    worklist.push(pred);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_dominators, ControlFlowGraph, RootedGraph};

    fn build_forest(count: usize, edges: &[(usize, usize)]) -> (ControlFlowGraph, LoopForest) {
        let cfg = ControlFlowGraph::from_edges(count, edges).unwrap();
        let dominators = compute_dominators(&cfg, cfg.entry());
        let forest = detect_loops(&cfg, &dominators);
        (cfg, forest)
    }

    #[test]
    fn test_no_loops_empty_forest() {
        let (cfg, forest) = build_forest(3, &[(0, 1), (1, 2)]);

        assert!(forest.is_empty());
        assert_eq!(forest.len(), 0);

        let dominators = compute_dominators(&cfg, cfg.entry());
        assert!(!has_back_edges(&cfg, &dominators));
    }

    #[test]
    fn test_simple_loop() {
        // 0 -> 1 -> 2 -> 1 (back edge), 2 -> 3
        let (cfg, forest) = build_forest(4, &[(0, 1), (1, 2), (2, 1), (2, 3)]);

        assert_eq!(forest.len(), 1);
        let id = forest.roots().next().unwrap();
        let lp = forest.get(id);

        assert_eq!(lp.header(), BlockId::new(1));
        assert_eq!(lp.depth(), 1);
        assert_eq!(lp.blocks(), &[BlockId::new(1), BlockId::new(2)]);
        assert_eq!(lp.exits(), &[BlockId::new(3)]);
        assert_eq!(forest.num_backedges(id, &cfg), 1);

        let dominators = compute_dominators(&cfg, cfg.entry());
        assert!(has_back_edges(&cfg, &dominators));
    }

    #[test]
    fn test_self_loop() {
        // 0 -> 1 -> 1 (self edge), 1 -> 2
        let (cfg, forest) = build_forest(3, &[(0, 1), (1, 1), (1, 2)]);

        assert_eq!(forest.len(), 1);
        let id = forest.roots().next().unwrap();
        let lp = forest.get(id);

        assert_eq!(lp.header(), BlockId::new(1));
        assert_eq!(lp.blocks(), &[BlockId::new(1)]);
        assert_eq!(lp.exits(), &[BlockId::new(2)]);
        assert_eq!(forest.num_backedges(id, &cfg), 1);
    }

    #[test]
    fn test_two_backedges_one_header() {
        // Two latches jumping to the same header form one loop.
        // 0 -> 1 -> 2 -> 1 and 1 -> 3 -> 1, 1 -> 4
        let (cfg, forest) = build_forest(5, &[(0, 1), (1, 2), (2, 1), (1, 3), (3, 1), (1, 4)]);

        assert_eq!(forest.len(), 1);
        let id = forest.roots().next().unwrap();
        let lp = forest.get(id);

        assert_eq!(lp.header(), BlockId::new(1));
        assert_eq!(
            lp.blocks(),
            &[BlockId::new(1), BlockId::new(2), BlockId::new(3)]
        );
        assert_eq!(forest.num_backedges(id, &cfg), 2);
    }

    #[test]
    fn test_nested_loops() {
        // 0 -> 1 (outer header) -> 2 (inner header) -> 3
        // 3 -> 2 (inner back edge), 3 -> 1 (outer back edge), 3 -> 4 (exit)
        let (cfg, forest) =
            build_forest(5, &[(0, 1), (1, 2), (2, 3), (3, 2), (3, 1), (3, 4)]);

        assert_eq!(forest.len(), 2);

        let outer = forest
            .iter()
            .find(|lp| lp.header() == BlockId::new(1))
            .unwrap();
        let inner = forest
            .iter()
            .find(|lp| lp.header() == BlockId::new(2))
            .unwrap();

        assert_eq!(outer.depth(), 1);
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.parent(), Some(outer.index()));
        assert_eq!(outer.children(), &[inner.index()]);
        assert!(forest.is_transitive_parent(outer.index(), inner.index()));
        assert!(!forest.is_transitive_parent(inner.index(), outer.index()));

        // Inner body is a subset of the outer body.
        for &block in inner.blocks() {
            assert!(outer.contains(block));
        }

        // Block 3 sits in both loops; the inner one is innermost.
        assert_eq!(forest.innermost_loop(BlockId::new(3)), Some(inner.index()));
        assert_eq!(forest.loop_depth(BlockId::new(3)), 2);
        assert_eq!(forest.loop_depth(BlockId::new(0)), 0);
        assert_eq!(forest.num_backedges(outer.index(), &cfg), 1);
        assert_eq!(forest.num_backedges(inner.index(), &cfg), 1);
    }

    #[test]
    fn test_three_level_nest() {
        // 0 -> 1 -> 2 -> 3 -> 4, with backedges 4 -> 3, 4 -> 2, 4 -> 1 and
        // exit 1 -> 5.
        let (_, forest) = build_forest(
            6,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 3), (4, 2), (4, 1), (1, 5)],
        );

        assert_eq!(forest.len(), 3);

        let a = forest
            .iter()
            .find(|lp| lp.header() == BlockId::new(1))
            .unwrap();
        let b = forest
            .iter()
            .find(|lp| lp.header() == BlockId::new(2))
            .unwrap();
        let c = forest
            .iter()
            .find(|lp| lp.header() == BlockId::new(3))
            .unwrap();

        assert_eq!(a.depth(), 1);
        assert_eq!(b.depth(), 2);
        assert_eq!(c.depth(), 3);
        assert_eq!(c.parent(), Some(b.index()));
        assert_eq!(b.parent(), Some(a.index()));
        assert!(forest.is_transitive_parent(a.index(), c.index()));
        assert_eq!(forest.by_depth_descending(), vec![c.index(), b.index(), a.index()]);
    }

    #[test]
    fn test_sibling_loops() {
        // Two loops side by side, no nesting:
        // 0 -> 1 -> 2 -> 1, 2 -> 3 -> 4 -> 3, 4 -> 5
        let (_, forest) =
            build_forest(6, &[(0, 1), (1, 2), (2, 1), (2, 3), (3, 4), (4, 3), (4, 5)]);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest.roots().count(), 2);
        for lp in forest.iter() {
            assert_eq!(lp.depth(), 1);
            assert_eq!(lp.parent(), None);
        }
    }

    #[test]
    fn test_exits_disjoint_from_blocks() {
        // Discovery policy: an exit target of a loop is never one of its
        // member blocks. Checked over a nest with multiple exit levels.
        let (_, forest) = build_forest(
            7,
            &[(0, 1), (1, 2), (2, 3), (3, 2), (3, 1), (1, 4), (2, 5), (4, 6), (5, 6)],
        );

        assert!(!forest.is_empty());
        for lp in forest.iter() {
            for &exit in lp.exits() {
                assert!(
                    !lp.contains(exit),
                    "{exit} is both member and exit of loop {}",
                    lp.index()
                );
            }
        }
    }

    #[test]
    fn test_duplicate_exit_targets_recorded_per_edge() {
        // Both 2 and 3 leave the loop to block 4: the shared target shows up
        // once per exiting edge.
        let (_, forest) = build_forest(
            5,
            &[(0, 1), (1, 2), (2, 3), (3, 1), (2, 4), (3, 4)],
        );

        assert_eq!(forest.len(), 1);
        let lp = forest.iter().next().unwrap();
        assert_eq!(lp.exits(), &[BlockId::new(4), BlockId::new(4)]);
    }

    #[test]
    fn test_unreachable_cycle_ignored() {
        // Blocks 2 and 3 form a cycle but are disconnected from the entry.
        let (_, forest) = build_forest(4, &[(0, 1), (2, 3), (3, 2)]);

        assert!(forest.is_empty());
    }
}
