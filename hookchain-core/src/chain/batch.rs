//! Batch chain.
//!
//! One-shot, full-chain execution: `call(args)` runs every registered
//! callback exactly once, in an order consistent with the declared
//! constraints.
//!
//! # How It Works
//!
//! 1. Registration calls mutate the constraint graph and set its dirty flag.
//!
//! 2. `call` first forces Dirty→Clean: if the graph is dirty, the order is
//!    recompiled from scratch and stored. Cycles surface here as
//!    `CyclicDependency`, before anything has executed.
//!
//! 3. The stored order is then invoked front to back, synchronously, with
//!    the caller's arguments.
//!
//! A failing callback aborts the remaining chain and surfaces as
//! `ChainError::Execution` naming the hook. The compiled order itself stays
//! valid: a later `call()` retries without recompiling unless new mutations
//! occurred in between.

use parking_lot::Mutex;

use crate::chain::Hookchain;
use crate::error::ChainError;
use crate::graph::{Callback, ConstraintGraph, HookId};

struct BatchInner<A> {
    graph: ConstraintGraph<A>,
    /// Last compiled order; valid exactly while the graph is not dirty.
    compiled: Vec<HookId>,
    /// Whether the most recent `call` ran the whole chain to completion.
    completed: bool,
}

/// Dependency-ordered one-shot scheduler.
///
/// # Example
///
/// ```rust,ignore
/// let chain: BatchChain<()> = BatchChain::new();
/// chain.add_hook("init", Callback::infallible(|_| println!("init")))?;
/// chain.add_hook("load", Callback::infallible(|_| println!("load")))?;
/// chain.add_constraint("init", "load")?;
/// chain.call(&())?;  // prints "init" then "load"
/// ```
pub struct BatchChain<A> {
    inner: Mutex<BatchInner<A>>,
}

impl<A> BatchChain<A> {
    /// Create an empty batch chain.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BatchInner {
                graph: ConstraintGraph::new(),
                compiled: Vec::new(),
                completed: false,
            }),
        }
    }

    /// Run the whole chain once with the given arguments.
    ///
    /// Recompiles first if the graph is dirty. Invokes every callback in the
    /// compiled order, synchronously, under the instance lock. On a callback
    /// failure the remaining hooks are skipped and the error is returned as
    /// [`ChainError::Execution`]; the compiled order remains usable for a
    /// retry.
    pub fn call(&self, args: &A) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        inner.completed = false;

        if inner.graph.is_dirty() {
            let order = inner.graph.compile()?;
            inner.compiled = order;
            inner.graph.mark_clean();
        }

        let BatchInner {
            graph,
            compiled,
            completed,
        } = &mut *inner;

        for &id in compiled.iter() {
            let hook = graph.hook_at(id);
            if let Some(callback) = hook.callback() {
                tracing::debug!(hook = hook.name(), "invoking hook");
                callback.invoke(args).map_err(|source| {
                    tracing::warn!(hook = hook.name(), error = %source, "hook failed, aborting chain");
                    ChainError::Execution {
                        hook: hook.name().to_string(),
                        source,
                    }
                })?;
            }
        }

        *completed = true;
        Ok(())
    }

    /// The execution order the next `call` will use, as hook names.
    ///
    /// Compiles (and stores the result) if the graph is dirty, so this is
    /// also a way to surface `CyclicDependency` without executing anything.
    pub fn execution_order(&self) -> Result<Vec<String>, ChainError> {
        let mut inner = self.inner.lock();
        if inner.graph.is_dirty() {
            let order = inner.graph.compile()?;
            inner.compiled = order;
            inner.graph.mark_clean();
        }
        Ok(inner
            .compiled
            .iter()
            .map(|&id| inner.graph.hook_at(id).name().to_string())
            .collect())
    }
}

impl<A> Hookchain<A> for BatchChain<A> {
    fn add(&self, name: &str) -> HookId {
        self.inner.lock().graph.ensure(name)
    }

    fn add_hook(&self, name: &str, callback: Callback<A>) -> Result<HookId, ChainError> {
        self.inner.lock().graph.bind(name, callback)
    }

    fn add_constraint(&self, before: &str, after: &str) -> Result<(), ChainError> {
        // Cycles are detected at compile time, never here.
        self.inner.lock().graph.link(before, after);
        Ok(())
    }

    fn is_done(&self) -> bool {
        let inner = self.inner.lock();
        inner.completed && !inner.graph.is_dirty()
    }

    fn len(&self) -> usize {
        self.inner.lock().graph.len()
    }
}

impl<A> Default for BatchChain<A> {
    fn default() -> Self {
        Self::new()
    }
}
