//! Constraint graph and order compiler.
//!
//! The graph is the shared substrate of both chain strategies: a name→hook
//! store with bidirectional edges and a dirty flag set on every mutation
//! that can change the compiled order.
//!
//! # Compilation
//!
//! Batch chains compile the edge set into a linear order with Kahn's
//! algorithm, wave by wave: each wave collects every not-yet-emitted hook
//! whose entire after-set has been emitted. Within a wave there is no
//! dependency order, so the tie-break is first-registration order — the
//! store is an `IndexMap`, making two runs of the same program produce
//! identical orders. An empty wave with hooks remaining means the residue
//! is unsatisfiable and compilation fails with `CyclicDependency` naming it.
//!
//! Barriers are emitted for readiness bookkeeping but excluded from the
//! returned order: they gate dependents without ever being invoked.
//!
//! # Reachability
//!
//! Reactive chains have no global order; instead they ask the graph for
//! reverse edges to drive cascading, and for reachability queries to reject
//! an edge that would close a cycle at insertion time. The walk is
//! iterative, so deep chains cannot overflow the stack.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::ChainError;
use crate::graph::node::{Callback, Hook, HookId};

/// Name→hook store with bidirectional constraint edges.
pub struct ConstraintGraph<A> {
    hooks: IndexMap<String, Hook<A>>,
    /// Set whenever a mutation may invalidate a previously compiled order.
    dirty: bool,
}

impl<A> ConstraintGraph<A> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            hooks: IndexMap::new(),
            dirty: false,
        }
    }

    /// Number of hooks in the graph, barriers included.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the graph has no hooks.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Whether a compiled order derived from this graph is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after a fresh compile has been stored.
    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Look up a hook by name.
    pub fn get(&self, name: &str) -> Option<&Hook<A>> {
        self.hooks.get(name)
    }

    /// Look up a hook's id by name.
    pub fn index_of(&self, name: &str) -> Option<HookId> {
        self.hooks.get_index_of(name).map(HookId)
    }

    /// The hook behind an id issued by this graph.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this graph.
    pub fn hook_at(&self, id: HookId) -> &Hook<A> {
        self.hooks
            .get_index(id.0)
            .map(|(_, hook)| hook)
            .unwrap_or_else(|| panic!("hook id {} out of bounds", id.0))
    }

    /// Create the named hook if absent, as a barrier.
    ///
    /// Marks the graph dirty only when the hook is newly created.
    pub fn ensure(&mut self, name: &str) -> HookId {
        if let Some(idx) = self.hooks.get_index_of(name) {
            return HookId(idx);
        }
        let entry = self.hooks.entry(name.to_string());
        let idx = entry.index();
        entry.or_insert_with(|| Hook::new(name));
        self.dirty = true;
        HookId(idx)
    }

    /// Create the named hook if absent and bind a callback to it.
    ///
    /// Fails with `DuplicateHook` when a different callback is already
    /// bound; re-binding the identical callback is a no-op. Marks the graph
    /// dirty when the hook or the binding is new.
    pub fn bind(&mut self, name: &str, callback: Callback<A>) -> Result<HookId, ChainError> {
        let id = self.ensure(name);
        let hook = self
            .hooks
            .get_index_mut(id.0)
            .map(|(_, hook)| hook)
            .unwrap_or_else(|| panic!("hook id {} out of bounds", id.0));
        if hook.attach(callback)? {
            self.dirty = true;
        }
        Ok(id)
    }

    /// Insert the directed constraint `before` → `after`.
    ///
    /// Both hooks are created as barriers if absent. The edge is stored on
    /// both endpoints; inserting an edge that already exists does not mark
    /// the graph dirty.
    pub fn link(&mut self, before: &str, after: &str) {
        self.ensure(before);
        self.ensure(after);
        if let Some(hook) = self.hooks.get_mut(after) {
            if hook.add_dep(before) {
                self.dirty = true;
            }
        }
        if let Some(hook) = self.hooks.get_mut(before) {
            if hook.add_dependent(after) {
                self.dirty = true;
            }
        }
    }

    /// Whether `target` can be reached from `start` by following constraint
    /// edges forward (from a hook to its dependents).
    ///
    /// `start == target` counts as reachable (the empty path), which is what
    /// rejects a self-edge. Used by the reactive insertion-time cycle check.
    pub fn reaches(&self, start: &str, target: &str) -> bool {
        if start == target {
            return true;
        }
        let Some(start_idx) = self.hooks.get_index_of(start) else {
            return false;
        };
        let mut seen = vec![false; self.hooks.len()];
        let mut stack = vec![start_idx];
        seen[start_idx] = true;
        while let Some(idx) = stack.pop() {
            let (_, hook) = self.hooks.get_index(idx).expect("index in bounds");
            for dependent in hook.dependents() {
                if dependent == target {
                    return true;
                }
                if let Some(didx) = self.hooks.get_index_of(dependent) {
                    if !seen[didx] {
                        seen[didx] = true;
                        stack.push(didx);
                    }
                }
            }
        }
        false
    }

    /// Compile the current edge set into a linear execution order.
    ///
    /// Kahn's algorithm, wave based. The returned order contains only
    /// callback-bearing hooks; barriers are consumed by the readiness
    /// bookkeeping and skipped. Fails with `CyclicDependency` naming every
    /// hook left unsatisfiable when no wave can be formed.
    pub fn compile(&self) -> Result<Vec<HookId>, ChainError> {
        let total = self.hooks.len();
        let mut emitted = vec![false; total];
        let mut order = Vec::with_capacity(total);
        let mut remaining = total;

        while remaining > 0 {
            let mut wave: SmallVec<[usize; 8]> = SmallVec::new();
            for (idx, (_, hook)) in self.hooks.iter().enumerate() {
                if emitted[idx] {
                    continue;
                }
                let satisfied = hook.deps().iter().all(|dep| {
                    self.hooks
                        .get_index_of(dep)
                        .is_some_and(|didx| emitted[didx])
                });
                if satisfied {
                    wave.push(idx);
                }
            }

            if wave.is_empty() {
                let stuck: Vec<String> = self
                    .hooks
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !emitted[*idx])
                    .map(|(_, (name, _))| name.clone())
                    .collect();
                return Err(ChainError::CyclicDependency { hooks: stuck });
            }

            for idx in wave {
                emitted[idx] = true;
                remaining -= 1;
                let (_, hook) = self.hooks.get_index(idx).expect("index in bounds");
                if !hook.is_barrier() {
                    order.push(HookId(idx));
                }
            }
        }

        tracing::debug!(hooks = total, runnable = order.len(), "compiled hookchain order");
        Ok(order)
    }

    /// Iterate hooks in first-registration order.
    pub fn iter(&self) -> impl Iterator<Item = (HookId, &Hook<A>)> {
        self.hooks
            .values()
            .enumerate()
            .map(|(idx, hook)| (HookId(idx), hook))
    }
}

impl<A> Default for ConstraintGraph<A> {
    fn default() -> Self {
        Self::new()
    }
}
