// Copyright 2025 The loopnest authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # loopnest
//!
//! Loop-nest forest construction and queries over control flow graphs, for
//! compiler and program-analysis passes.
//!
//! A **loop-nest forest** records, for every natural loop in a function's
//! CFG, its header block, member blocks, exit blocks, nesting depth, and its
//! parent/child relation to other loops. Optimization passes such as invariant
//! code motion, loop-bound analysis, or strength reduction scheduling query
//! this structure instead of re-deriving loop facts from raw edges.
//!
//! ## Quick Start
//!
//! ```rust
//! use loopnest::{compute_dominators, detect_loops, BlockId, ControlFlowGraph, RootedGraph};
//!
//! // A loop nest two deep:
//! //   0 -> 1 (outer header) -> 2 (inner header) -> 3
//! //   3 -> 2 (inner back edge), 3 -> 1 (outer back edge), 3 -> 4 (exit)
//! let cfg = ControlFlowGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 2), (3, 1), (3, 4)])?;
//!
//! let dominators = compute_dominators(&cfg, cfg.entry());
//! let forest = detect_loops(&cfg, &dominators);
//!
//! assert_eq!(forest.len(), 2);
//! let inner = forest.innermost_loop(BlockId::new(3)).unwrap();
//! assert_eq!(forest.get(inner).header(), BlockId::new(2));
//! assert_eq!(forest.get(inner).depth(), 2);
//! assert_eq!(forest.loop_depth(BlockId::new(3)), 2);
//! # Ok::<(), loopnest::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`loops`] - the [`LoopForest`]/[`Loop`] arena, the [`detect_loops`]
//!   discovery pass, and [`LoopKind`] classification
//! - [`graph`] - block identity, the capability traits
//!   ([`Successors`], [`Predecessors`], ...), the concrete
//!   [`ControlFlowGraph`], and [`DominatorTree`] computation
//! - [`Error`] and [`Result`] - error handling for CFG assembly
//!
//! The forest itself never touches CFG internals: it stores opaque
//! [`BlockId`]s and reaches into the graph only through the capability traits
//! (backedge counting runs over [`Predecessors`]). Any CFG representation,
//! not just the bundled [`ControlFlowGraph`], can drive discovery and
//! answer forest queries by implementing those traits.
//!
//! ## Build Once, Then Freeze
//!
//! A forest is built single-threaded by one discovery pass per CFG per
//! compilation, and is treated as immutable afterwards. There is no internal
//! locking; the freeze-then-read discipline plus the absence of interior
//! mutability is what makes concurrent reading by downstream passes safe.

mod error;
pub mod graph;
pub mod loops;

pub use error::{Error, Result};
pub use graph::{
    compute_dominators, BlockId, ControlFlowGraph, DominatorIterator, DominatorTree, GraphBase,
    Predecessors, RootedGraph, Successors,
};
pub use loops::{classify_loop, detect_loops, has_back_edges, Loop, LoopForest, LoopId, LoopKind};
