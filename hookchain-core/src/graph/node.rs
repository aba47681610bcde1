//! Hook nodes.
//!
//! This module defines the node type stored in the constraint graph: a named
//! unit of work with an optional callback and bidirectional ordering edges.
//!
//! A hook referenced only through constraints and never given a callback is a
//! **barrier**: a pure ordering gate. Barriers are a valid, permanent state —
//! they participate in readiness bookkeeping but are never invoked.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::error::{BoxError, ChainError};

/// Unique identifier for a hook within one chain instance.
///
/// Wraps the hook's insertion index in the name→hook store. Hooks are never
/// removed, so the index is stable for the life of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) usize);

impl HookId {
    /// Get the raw index value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// A unit of work attached to a hook.
///
/// The callback receives the chain instance's argument tuple by reference.
/// Arity is fixed once per chain by the choice of `A`: `()`, `(T,)`,
/// `(T, U)`, and so on. Cloning is cheap (shared `Arc`), and identity is
/// pointer identity: two clones of the same callback compare equal under
/// [`Callback::ptr_eq`], which is what makes re-registration of the same
/// callback a tolerated no-op.
pub struct Callback<A>(Arc<dyn Fn(&A) -> Result<(), BoxError> + Send + Sync>);

impl<A> Callback<A> {
    /// Create a callback from a fallible function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Create a callback from a function that cannot fail.
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self(Arc::new(move |args| {
            f(args);
            Ok(())
        }))
    }

    /// Whether two callbacks are the same underlying function object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Invoke the callback with the chain's arguments.
    pub(crate) fn invoke(&self, args: &A) -> Result<(), BoxError> {
        (self.0)(args)
    }
}

impl<A> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<A> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

/// A named hook in the constraint graph.
///
/// Edges are stored on both endpoints: `deps` is the after-set (hooks that
/// must complete before this one), `dependents` the reverse. Both sets
/// iterate in first-insertion order so traversal is deterministic for a
/// fixed registration history.
pub struct Hook<A> {
    name: String,
    callback: Option<Callback<A>>,
    /// Hooks this hook waits on (its after-set).
    deps: IndexSet<String>,
    /// Hooks waiting on this hook (reverse edges).
    dependents: IndexSet<String>,
}

impl<A> Hook<A> {
    /// Create a new barrier hook with no callback.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
            deps: IndexSet::new(),
            dependents: IndexSet::new(),
        }
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound callback, if any.
    pub fn callback(&self) -> Option<&Callback<A>> {
        self.callback.as_ref()
    }

    /// Whether this hook is a pure ordering gate with no callback.
    pub fn is_barrier(&self) -> bool {
        self.callback.is_none()
    }

    /// Attach a callback to this hook.
    ///
    /// Returns `Ok(true)` when the callback was newly bound, `Ok(false)` when
    /// the identical callback was already bound, and `DuplicateHook` when a
    /// *different* callback is already present.
    pub fn attach(&mut self, callback: Callback<A>) -> Result<bool, ChainError> {
        match &self.callback {
            None => {
                self.callback = Some(callback);
                Ok(true)
            }
            Some(existing) if existing.ptr_eq(&callback) => Ok(false),
            Some(_) => Err(ChainError::DuplicateHook {
                name: self.name.clone(),
            }),
        }
    }

    /// Hooks this hook waits on.
    pub fn deps(&self) -> &IndexSet<String> {
        &self.deps
    }

    /// Hooks waiting on this hook.
    pub fn dependents(&self) -> &IndexSet<String> {
        &self.dependents
    }

    pub(crate) fn add_dep(&mut self, name: impl Into<String>) -> bool {
        self.deps.insert(name.into())
    }

    pub(crate) fn add_dependent(&mut self, name: impl Into<String>) -> bool {
        self.dependents.insert(name.into())
    }
}

impl<A> fmt::Debug for Hook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("barrier", &self.is_barrier())
            .field("deps", &self.deps)
            .field("dependents", &self.dependents)
            .finish()
    }
}
