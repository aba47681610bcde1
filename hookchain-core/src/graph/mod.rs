//! Constraint graph.
//!
//! This module implements the store of named hooks and the partial-order
//! constraints declared between them.
//!
//! # Overview
//!
//! The graph is a directed graph where:
//!
//! - Nodes are hooks: named units of work with an optional callback
//! - An edge (`before`, `after`) means `before` must be satisfied earlier
//!   than `after`
//!
//! Constraints arrive independently and incrementally, so the graph tracks
//! a dirty flag and regenerates any derived order from scratch rather than
//! patching it.
//!
//! # Design Decisions
//!
//! 1. We use a centralized name→hook map rather than distributed node
//!    objects because:
//!    - It enables wave-based topological compilation for batch execution
//!    - It gives reachability queries a single place to walk
//!    - It makes the dirty flag trivially correct
//!
//! 2. The store is insertion-ordered (`IndexMap`), which doubles as the
//!    deterministic tie-break between hooks that the declared constraints
//!    leave unordered.
//!
//! 3. Edges are stored on both endpoints so that both compilation (forward,
//!    over after-sets) and cascading (reverse, over dependents) traverse in
//!    O(1) per edge.

mod constraint;
mod node;

pub use constraint::ConstraintGraph;
pub use node::{Callback, Hook, HookId};
