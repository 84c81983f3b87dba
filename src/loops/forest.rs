//! The loop-nest forest.
//!
//! [`LoopForest`] owns every [`Loop`] discovered in one control flow graph and
//! maintains the nesting relation between them. Loops live in an arena and
//! refer to each other by [`LoopId`], so parent and child links are plain
//! indices with no ownership cycles; the forest is built incrementally by a
//! discovery pass and then frozen for reading.
//!
//! # Construction protocol
//!
//! The discovery pass drives three mutating operations, in this order per
//! loop: [`create_loop`](LoopForest::create_loop) once (parents strictly
//! before their children), then any number of
//! [`add_block`](LoopForest::add_block) and [`add_exit`](LoopForest::add_exit)
//! calls as membership and exit information accumulates. Nothing is ever
//! removed: blocks, exits and children only grow, and a loop's parent is fixed
//! at creation. Everything else on the forest is read-only.
//!
//! Violating the protocol (a non-dense index, an unknown parent or loop id) is
//! a defect in the calling pass and panics immediately rather than corrupting
//! the nesting structure.

use std::collections::HashMap;
use std::fmt;

use crate::graph::{BlockId, Predecessors};

/// A strongly-typed identifier for a loop within one [`LoopForest`].
///
/// `LoopId` is the arena address of the loop and also its identity: equality
/// and hashing go through the index alone. Two loops from *different* forests
/// may share an id value without being the same loop; ids must never cross
/// forest boundaries, which is not checked.
///
/// # Thread Safety
///
/// `LoopId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoopId(pub(crate) usize);

impl LoopId {
    /// Creates a new `LoopId` from a raw index value.
    ///
    /// Normal usage obtains loop ids from
    /// [`LoopForest::create_loop`](crate::LoopForest::create_loop); this
    /// constructor exists for tests and serialization bridges.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        LoopId(index)
    }

    /// Returns the raw 0-based index of this loop identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LoopId({})", self.0)
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// One natural loop: header, members, exits, and its place in the nest.
///
/// A `Loop` records bookkeeping only: it holds block *identities*, never
/// block contents, and it never walks control flow edges itself. All fields
/// are private; reading goes through the accessors, mutation goes through the
/// owning [`LoopForest`].
///
/// The nesting depth is fixed when the loop is created: 1 for a loop with no
/// parent, otherwise one more than the parent's depth. This is why discovery
/// must create parents before children: the depth is taken from the parent
/// at that moment and never recomputed.
#[derive(Debug, Clone)]
pub struct Loop {
    /// Arena address and identity within the owning forest.
    index: LoopId,
    /// Nesting depth, 1 at the outermost level.
    depth: usize,
    /// The single entry block dominating all members.
    header: BlockId,
    /// The immediately enclosing loop, if any.
    parent: Option<LoopId>,
    /// Immediately nested loops, in creation order.
    children: Vec<LoopId>,
    /// Member blocks, in registration order.
    blocks: Vec<BlockId>,
    /// Exit target blocks, in registration order; duplicates allowed.
    exits: Vec<BlockId>,
}

impl Loop {
    /// Returns this loop's identifier within its forest.
    #[must_use]
    #[inline]
    pub fn index(&self) -> LoopId {
        self.index
    }

    /// Returns the nesting depth; 1 for a top-level loop, parent depth + 1
    /// otherwise.
    #[must_use]
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the header block, the loop's single entry point.
    #[must_use]
    #[inline]
    pub fn header(&self) -> BlockId {
        self.header
    }

    /// Returns the immediately enclosing loop, or `None` for a top-level loop.
    #[must_use]
    #[inline]
    pub fn parent(&self) -> Option<LoopId> {
        self.parent
    }

    /// Returns the loops immediately nested inside this one, in the order they
    /// were created.
    #[must_use]
    pub fn children(&self) -> &[LoopId] {
        &self.children
    }

    /// Returns the member blocks, in the order they were registered.
    ///
    /// Whether blocks of nested loops appear here is the discovery pass's
    /// membership policy; the forest stores exactly what it was told.
    #[must_use]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns the exit target blocks, in registration order.
    ///
    /// Exits are *not* deduplicated: a target reached from several member
    /// blocks, or registered twice by the discovery pass, appears once per
    /// registration. Consumers must tolerate repeats or deduplicate
    /// themselves.
    #[must_use]
    pub fn exits(&self) -> &[BlockId] {
        &self.exits
    }

    /// Returns `true` if the block has been registered as a member of this
    /// loop.
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    /// Returns `true` if this loop has no parent.
    #[must_use]
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if no loop is nested inside this one.
    #[must_use]
    #[inline]
    pub fn is_innermost(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for Loop {
    /// Formats as `loop 1 depth 2 outer 0`; the `outer` part is omitted for
    /// top-level loops.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loop {} depth {}", self.index.index(), self.depth)?;
        if let Some(parent) = self.parent {
            write!(f, " outer {}", parent.index())?;
        }
        Ok(())
    }
}

/// The loop-nest forest of one control flow graph.
///
/// Owns all [`Loop`] records discovered in the graph and answers nesting and
/// membership queries for downstream passes. The parent/child relation forms
/// a forest by construction: a child names its (already existing) parent at
/// creation time and the edge is never rewritten afterwards, so no cycle can
/// ever be introduced.
///
/// # Examples
///
/// ```rust
/// use loopnest::{BlockId, LoopForest};
///
/// let mut forest = LoopForest::new();
/// let outer = forest.create_loop(None, 0, BlockId::new(1));
/// let inner = forest.create_loop(Some(outer), 1, BlockId::new(2));
///
/// assert_eq!(forest.get(inner).depth(), 2);
/// assert_eq!(forest.get(outer).children(), &[inner]);
/// assert!(forest.is_transitive_parent(outer, inner));
/// ```
///
/// # Thread Safety
///
/// Construction is single-threaded. Once the discovery pass is done the
/// forest is frozen by convention and may be read concurrently through
/// shared references; there is no interior mutability and no locking.
#[derive(Debug, Clone, Default)]
pub struct LoopForest {
    /// Arena of loop records; `LoopId` indexes into this.
    loops: Vec<Loop>,
    /// Deepest loop each block has been registered with.
    innermost: HashMap<BlockId, LoopId>,
}

impl LoopForest {
    /// Creates an empty forest.
    ///
    /// A CFG without loops keeps its forest empty; that is a valid result,
    /// not an error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty forest with space reserved for `capacity` loops.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            loops: Vec::with_capacity(capacity),
            innermost: HashMap::new(),
        }
    }

    /// Creates a new loop with the given parent and header and returns its id.
    ///
    /// The caller assigns the index. Because loops live in an arena, indices
    /// must be handed out densely in creation order: `index` has to equal the
    /// number of loops created so far. The new loop starts with empty blocks,
    /// children and exits; its depth is 1 without a parent, otherwise the
    /// parent's depth + 1, fixed here and never recomputed, so the parent
    /// must be fully constructed first. The new loop registers itself with
    /// its parent's children.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not the next free arena slot (a duplicate or
    /// out-of-order index), or if `parent` does not name an existing loop.
    /// Both are defects in the discovery pass, not recoverable conditions.
    pub fn create_loop(
        &mut self,
        parent: Option<LoopId>,
        index: usize,
        header: BlockId,
    ) -> LoopId {
        assert_eq!(
            index,
            self.loops.len(),
            "loop index {index} must be assigned densely in creation order",
        );

        let depth = match parent {
            Some(p) => {
                assert!(
                    p.index() < self.loops.len(),
                    "parent loop {p} does not exist yet",
                );
                self.loops[p.index()].depth + 1
            }
            None => 1,
        };

        let id = LoopId::new(index);
        if let Some(p) = parent {
            self.loops[p.index()].children.push(id);
        }
        self.loops.push(Loop {
            index: id,
            depth,
            header,
            parent,
            children: Vec::new(),
            blocks: Vec::new(),
            exits: Vec::new(),
        });
        id
    }

    /// Registers `block` as a member of the given loop.
    ///
    /// Membership accumulates in call order and is never retracted. The
    /// forest also tracks, per block, the deepest loop it was registered
    /// with, which feeds [`innermost_loop`](Self::innermost_loop) and
    /// [`loop_depth`](Self::loop_depth).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a loop of this forest.
    pub fn add_block(&mut self, id: LoopId, block: BlockId) {
        let depth = self.loops[id.index()].depth;
        self.loops[id.index()].blocks.push(block);

        let replace = match self.innermost.get(&block) {
            Some(&current) => self.loops[current.index()].depth < depth,
            None => true,
        };
        if replace {
            self.innermost.insert(block, id);
        }
    }

    /// Registers `block` as an exit target of the given loop.
    ///
    /// No deduplication is performed; discovery passes that reach the same
    /// exit over different paths record it once per visit, and that repeat is
    /// a valid outcome.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a loop of this forest.
    pub fn add_exit(&mut self, id: LoopId, block: BlockId) {
        self.loops[id.index()].exits.push(block);
    }

    /// Counts the control flow edges from inside the loop into its header.
    ///
    /// The counting capability is supplied by the CFG through the
    /// [`Predecessors`] trait: a predecessor of the header that is a
    /// registered member of the loop is the source of exactly one backedge
    /// per edge (parallel edges count separately). The result is accurate at
    /// call time and never cached; cost is O(in-degree of the header × loop
    /// size).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a loop of this forest.
    pub fn num_backedges<G: Predecessors>(&self, id: LoopId, graph: &G) -> usize {
        let lp = &self.loops[id.index()];
        graph
            .predecessors(lp.header)
            .filter(|pred| lp.blocks.contains(pred))
            .count()
    }

    /// Determines whether `ancestor` appears on the parent chain of
    /// `descendant`.
    ///
    /// The walk starts **at `descendant` itself**, so a loop counts as its own
    /// transitive parent: `is_transitive_parent(l, l)` is `true`. This
    /// self-inclusive reading is deliberate and kept stable; passes use the
    /// query as "is every iteration of `descendant` also an iteration of
    /// `ancestor`", which holds trivially for the loop itself.
    ///
    /// # Complexity
    ///
    /// O(depth of `descendant`), independent of the total number of loops.
    ///
    /// # Panics
    ///
    /// Panics if either id does not name a loop of this forest.
    #[must_use]
    pub fn is_transitive_parent(&self, ancestor: LoopId, descendant: LoopId) -> bool {
        assert!(
            ancestor.index() < self.loops.len(),
            "loop {ancestor} does not exist",
        );

        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.loops[id.index()].parent;
        }
        false
    }

    /// Returns the loop with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a loop of this forest.
    #[must_use]
    pub fn get(&self, id: LoopId) -> &Loop {
        &self.loops[id.index()]
    }

    /// Returns the number of loops in the forest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Returns `true` if the forest contains no loops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Iterates over all loops in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter()
    }

    /// Iterates over the ids of all top-level loops, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = LoopId> + '_ {
        self.loops
            .iter()
            .filter(|lp| lp.parent.is_none())
            .map(|lp| lp.index)
    }

    /// Returns the deepest loop the block has been registered with, if any.
    #[must_use]
    pub fn innermost_loop(&self, block: BlockId) -> Option<LoopId> {
        self.innermost.get(&block).copied()
    }

    /// Returns the nesting depth of the innermost loop containing `block`,
    /// or 0 if the block is in no loop.
    ///
    /// Consistent with loop depths starting at 1: a block directly inside a
    /// single top-level loop reports 1.
    #[must_use]
    pub fn loop_depth(&self, block: BlockId) -> usize {
        self.innermost_loop(block)
            .map_or(0, |id| self.loops[id.index()].depth)
    }

    /// Determines whether `block` belongs to the given loop, directly or via
    /// a nested loop.
    ///
    /// Runs a finger from the block's innermost loop up the parent chain, so
    /// the answer is right even when the discovery pass registers each block
    /// only with its innermost loop.
    #[must_use]
    pub fn is_in_loop(&self, block: BlockId, lp: LoopId) -> bool {
        match self.innermost_loop(block) {
            Some(innermost) => self.is_transitive_parent(lp, innermost),
            None => false,
        }
    }

    /// Returns all loop ids ordered innermost-first (descending depth).
    ///
    /// Optimization passes usually want this order, finishing inner loops
    /// before their enclosing loops.
    #[must_use]
    pub fn by_depth_descending(&self) -> Vec<LoopId> {
        let mut ids: Vec<LoopId> = self.loops.iter().map(|lp| lp.index).collect();
        ids.sort_by_key(|id| std::cmp::Reverse(self.loops[id.index()].depth));
        ids
    }
}
