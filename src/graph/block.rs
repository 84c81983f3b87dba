//! Block identifier implementation for control flow graphs.
//!
//! This module provides the [`BlockId`] type, a strongly-typed identifier for basic
//! blocks within a control flow graph. The newtype wrapper prevents accidental
//! confusion between block indices and other integer values such as loop indices.

use std::fmt;

/// A strongly-typed identifier for a basic block within a control flow graph.
///
/// `BlockId` wraps a `usize` index. Block IDs are assigned sequentially starting
/// from 0 as blocks are added to a [`ControlFlowGraph`](crate::ControlFlowGraph),
/// with block 0 conventionally being the function entry.
///
/// The loop forest treats block identity as opaque: it only ever compares block
/// IDs for equality and stores them in sequences and hash maps. The concrete CFG
/// additionally uses the index to address dense per-block tables.
///
/// # Examples
///
/// ```rust
/// use loopnest::BlockId;
/// use std::collections::HashMap;
///
/// let header = BlockId::new(3);
/// assert_eq!(header.index(), 3);
///
/// // Usable as a map key
/// let mut depths: HashMap<BlockId, usize> = HashMap::new();
/// depths.insert(header, 2);
/// assert_eq!(depths[&header], 2);
/// ```
///
/// # Thread Safety
///
/// `BlockId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Creates a new `BlockId` from a raw index value.
    ///
    /// Normal usage obtains block IDs from
    /// [`ControlFlowGraph::add_block`](crate::ControlFlowGraph::add_block); this
    /// constructor exists for tests and for callers bridging from their own
    /// dense block numbering.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        BlockId(index)
    }

    /// Returns the raw 0-based index of this block identifier.
    ///
    /// The index can be used to address vectors holding per-block data.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

impl From<usize> for BlockId {
    #[inline]
    fn from(index: usize) -> Self {
        BlockId(index)
    }
}

impl From<BlockId> for usize {
    #[inline]
    fn from(block: BlockId) -> Self {
        block.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_block_id_new_and_index() {
        let block = BlockId::new(42);
        assert_eq!(block.index(), 42);
    }

    #[test]
    fn test_block_id_equality() {
        assert_eq!(BlockId::new(5), BlockId::new(5));
        assert_ne!(BlockId::new(5), BlockId::new(10));
    }

    #[test]
    fn test_block_id_ordering() {
        let mut blocks = vec![BlockId::new(3), BlockId::new(1), BlockId::new(2)];
        blocks.sort();
        assert_eq!(
            blocks,
            vec![BlockId::new(1), BlockId::new(2), BlockId::new(3)]
        );
    }

    #[test]
    fn test_block_id_in_set() {
        let mut set: HashSet<BlockId> = HashSet::new();
        set.insert(BlockId::new(1));
        set.insert(BlockId::new(2));
        set.insert(BlockId::new(1)); // duplicate
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_block_id_conversions() {
        let block: BlockId = 7usize.into();
        assert_eq!(block.index(), 7);
        let raw: usize = block.into();
        assert_eq!(raw, 7);
    }

    #[test]
    fn test_block_id_formatting() {
        let block = BlockId::new(9);
        assert_eq!(format!("{block:?}"), "BlockId(9)");
        assert_eq!(format!("{block}"), "b9");
    }
}
