//! Chain strategies.
//!
//! Two execution strategies share one registration surface:
//!
//! - [`BatchChain`]: one-shot, full-chain execution. `call(args)` compiles
//!   the constraint graph (lazily, on a dirty flag) and invokes every
//!   callback once, in a dependency-consistent order.
//! - [`ReactiveChain`]: trigger-driven cascading execution. `call(key, args)`
//!   records external completion signals and invokes dependents as their
//!   whole after-set becomes satisfied, remembering completions across
//!   calls.
//!
//! Historically these were maintained as parallel implementations; here the
//! shared registration API lives in the [`Hookchain`] trait and the graph
//! substrate in [`crate::graph`], so only the execution semantics differ.
//!
//! # Concurrency
//!
//! Each chain instance is one mutual-exclusion domain: a single
//! `parking_lot::Mutex` covers registration, compilation, and execution.
//! Callbacks run synchronously on the calling thread with the lock held —
//! hooks in the same wave are never run in parallel. This is an intentional
//! tradeoff for startup-time sequencing, not a general-purpose job runner.

mod batch;
mod reactive;
mod registry;

pub use batch::BatchChain;
pub use reactive::{ReactiveChain, ROOT};
pub use registry::{install_all, HookRegistration};

use crate::error::ChainError;
use crate::graph::{Callback, HookId};

/// Shared registration surface of both chain strategies.
///
/// Discovery adapters (annotation scanners, metadata readers, event buses)
/// should be written against this trait so the same `(name, before, after,
/// callback)` tuples can drive either strategy.
pub trait Hookchain<A> {
    /// Create the named hook if absent, as a barrier with no callback.
    fn add(&self, name: &str) -> HookId;

    /// Create the named hook if absent and bind a callback.
    ///
    /// Fails with [`ChainError::DuplicateHook`] when a different callback is
    /// already bound under this name.
    fn add_hook(&self, name: &str, callback: Callback<A>) -> Result<HookId, ChainError>;

    /// Declare that `before` must be satisfied earlier than `after`.
    ///
    /// Both hooks are created as barriers if absent. A batch chain defers
    /// cycle detection to compile time and never fails here; a reactive
    /// chain rejects an edge that would close a cycle at insertion time.
    fn add_constraint(&self, before: &str, after: &str) -> Result<(), ChainError>;

    /// Aggregate-completion poll for staged-initialization gates.
    fn is_done(&self) -> bool;

    /// Number of registered hooks, barriers included.
    fn len(&self) -> usize;

    /// Whether no hooks are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
