//! Reactive chain.
//!
//! Trigger-driven cascading execution: external collaborators report
//! completion signals with `call(key, args)`, and the chain invokes every
//! hook whose whole after-set has become satisfied, transitively.
//!
//! # How It Works
//!
//! 1. The chain keeps a per-instance completion record. A hook that has run
//!    once is never invoked again, but re-triggering its key still
//!    re-evaluates whether dependents registered since have become ready.
//!
//! 2. `call(key, args)` invokes `key`'s callback (unless it already
//!    completed), records the completion, then cascades: every dependent of
//!    a newly satisfied hook whose after-deps are all complete is emitted in
//!    turn. The cascade is a worklist, not recursion, so deep chains cannot
//!    overflow the stack. A transient per-call emitted set guards against
//!    re-entrant double-invocation.
//!
//! 3. The virtual root key [`ROOT`] has no predecessors: `call(ROOT, args)`
//!    seeds the cascade with every hook that has an empty after-set.
//!
//! # Cycle detection
//!
//! There is no global compile. Instead `add_constraint(before, after)` is
//! rejected when `before` is already reachable from `after` through existing
//! edges *at that moment*. Every earlier edge of a cycle is accepted without
//! complaint; only the edge that closes the loop fails, so which edge is
//! blamed — and when — depends on insertion order. This failure timing is
//! long-standing observable behavior for callers and is kept as documented
//! semantics rather than silently aligned with batch compile-time detection.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;

use crate::chain::Hookchain;
use crate::error::ChainError;
use crate::graph::{Callback, ConstraintGraph, Hook, HookId};

/// Virtual root key: no predecessors, triggers every zero-dependency hook.
pub const ROOT: &str = "";

struct ReactiveInner<A> {
    graph: ConstraintGraph<A>,
    /// Indices of hooks that have completed, across all calls.
    completed: HashSet<usize>,
}

/// Dependency-ordered cascading scheduler with completion memory.
///
/// # Example
///
/// ```rust,ignore
/// let chain: ReactiveChain<()> = ReactiveChain::new();
/// chain.add_hook("mixins", Callback::infallible(|_| bootstrap_mixins()))?;
/// chain.add_constraint("classloader", "mixins")?;
/// // Later, when the classloader reports in:
/// chain.call("classloader", &())?;  // "mixins" fires now
/// ```
pub struct ReactiveChain<A> {
    inner: Mutex<ReactiveInner<A>>,
}

fn invoke_hook<A>(hook: &Hook<A>, args: &A) -> Result<(), ChainError> {
    if let Some(callback) = hook.callback() {
        tracing::debug!(hook = hook.name(), "invoking hook");
        callback.invoke(args).map_err(|source| {
            tracing::warn!(hook = hook.name(), error = %source, "hook failed, aborting cascade");
            ChainError::Execution {
                hook: hook.name().to_string(),
                source,
            }
        })?;
    } else {
        tracing::trace!(hook = hook.name(), "barrier satisfied");
    }
    Ok(())
}

impl<A> ReactiveChain<A> {
    /// Create an empty reactive chain.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ReactiveInner {
                graph: ConstraintGraph::new(),
                completed: HashSet::new(),
            }),
        }
    }

    /// Report a completion signal for `key` and cascade.
    ///
    /// If `key` has not completed yet, its callback (if bound) is invoked
    /// and the completion recorded; if it has, invocation is skipped but the
    /// cascade still runs, because the same external trigger may fire again
    /// after new dependents were registered. Unknown keys are created on the
    /// fly with placeholder semantics.
    ///
    /// A failing callback aborts the cascade with [`ChainError::Execution`]
    /// and is *not* recorded as completed, so a later trigger retries it.
    pub fn call(&self, key: &str, args: &A) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        let ReactiveInner { graph, completed } = &mut *inner;

        // Emitted-this-call guard against re-entrant double-invocation.
        let mut emitted: HashSet<usize> = HashSet::new();
        let mut worklist: VecDeque<usize> = VecDeque::new();

        if key == ROOT {
            // The root is always complete; its "dependents" are the hooks
            // with an empty after-set.
            let roots: Vec<usize> = graph
                .iter()
                .filter(|(_, hook)| hook.deps().is_empty())
                .map(|(id, _)| id.raw())
                .collect();
            for idx in roots {
                emitted.insert(idx);
                if !completed.contains(&idx) {
                    invoke_hook(graph.hook_at(HookId(idx)), args)?;
                    completed.insert(idx);
                }
                worklist.push_back(idx);
            }
        } else {
            let idx = graph.ensure(key).raw();
            emitted.insert(idx);
            if !completed.contains(&idx) {
                invoke_hook(graph.hook_at(HookId(idx)), args)?;
                completed.insert(idx);
            }
            worklist.push_back(idx);
        }

        while let Some(idx) = worklist.pop_front() {
            for name in graph.hook_at(HookId(idx)).dependents() {
                let Some(did) = graph.index_of(name) else {
                    continue;
                };
                let didx = did.raw();
                if emitted.contains(&didx) {
                    continue;
                }
                if completed.contains(&didx) {
                    // Ran in an earlier call: skip invocation, keep cascading
                    // through it so late-registered dependents are reached.
                    emitted.insert(didx);
                    worklist.push_back(didx);
                    continue;
                }
                let hook = graph.hook_at(did);
                let ready = hook.deps().iter().all(|dep| {
                    graph
                        .index_of(dep)
                        .is_some_and(|d| completed.contains(&d.raw()))
                });
                if ready {
                    emitted.insert(didx);
                    invoke_hook(hook, args)?;
                    completed.insert(didx);
                    worklist.push_back(didx);
                }
            }
        }

        Ok(())
    }

    /// Whether the named hook has completed.
    pub fn has_run(&self, name: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .graph
            .index_of(name)
            .is_some_and(|id| inner.completed.contains(&id.raw()))
    }

    /// Names of registered hooks that have not completed yet.
    pub fn pending(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner
            .graph
            .iter()
            .filter(|(id, _)| !inner.completed.contains(&id.raw()))
            .map(|(_, hook)| hook.name().to_string())
            .collect()
    }
}

impl<A> Hookchain<A> for ReactiveChain<A> {
    fn add(&self, name: &str) -> HookId {
        self.inner.lock().graph.ensure(name)
    }

    fn add_hook(&self, name: &str, callback: Callback<A>) -> Result<HookId, ChainError> {
        self.inner.lock().graph.bind(name, callback)
    }

    /// Declare `before` → `after`, rejecting an edge that would close a
    /// cycle among already-linked hooks at this moment. See the module docs
    /// for the insertion-order caveat.
    fn add_constraint(&self, before: &str, after: &str) -> Result<(), ChainError> {
        let mut inner = self.inner.lock();
        if inner.graph.reaches(after, before) {
            return Err(ChainError::CyclicDependency {
                hooks: vec![before.to_string(), after.to_string()],
            });
        }
        inner.graph.link(before, after);
        Ok(())
    }

    fn is_done(&self) -> bool {
        let inner = self.inner.lock();
        let done = inner
            .graph
            .iter()
            .all(|(id, _)| inner.completed.contains(&id.raw()));
        done
    }

    fn len(&self) -> usize {
        self.inner.lock().graph.len()
    }
}

impl<A> Default for ReactiveChain<A> {
    fn default() -> Self {
        Self::new()
    }
}
