//! Hookchain error types.
//!
//! All failure modes of the scheduler surface through a single [`ChainError`]
//! enum. Registration errors (`DuplicateHook`, `CyclicDependency`) are
//! returned synchronously from the mutating call that caused them and leave
//! the graph untouched beyond the offending edge. `Execution` wraps a
//! callback failure together with the name of the hook that raised it; it
//! aborts only the current `call()` and does not invalidate a compiled order.

use thiserror::Error;

/// Boxed error type carried out of hook callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by hookchain registration or execution.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A different non-null callback is already bound under this name.
    /// Re-attaching the identical callback is not an error.
    #[error("duplicate hook: a different callback is already bound to \"{name}\"")]
    DuplicateHook {
        /// Name the second callback was registered under.
        name: String,
    },

    /// The declared constraints admit no valid execution order.
    ///
    /// Batch chains report this from the compile step with the full set of
    /// unsatisfiable hooks; reactive chains report it from the
    /// `add_constraint` call that would close a cycle, naming the two
    /// endpoints of the rejected edge.
    #[error("cyclic dependency among hooks: {hooks:?}")]
    CyclicDependency {
        /// Hooks that cannot be ordered.
        hooks: Vec<String>,
    },

    /// A hook's callback returned an error. The remaining chain is aborted.
    #[error("hook \"{hook}\" failed")]
    Execution {
        /// Name of the hook whose callback failed.
        hook: String,
        /// The underlying error returned by the callback.
        #[source]
        source: BoxError,
    },
}
