//! Registration records for discovery adapters.
//!
//! The chains themselves are registration-API only: they know nothing about
//! annotation scanning, metadata files, or event buses. Adapters that do
//! discover hooks produce [`HookRegistration`] records and install them
//! through any [`Hookchain`], with all context passed in explicitly — there
//! is no process-wide registry.

use crate::chain::Hookchain;
use crate::error::ChainError;
use crate::graph::{Callback, HookId};

/// One discovered hook: name, ordering constraints, optional callback.
///
/// `before`/`after` name the *other* hooks this one is constrained against:
/// `before("x")` means this hook runs before `x`, `after("y")` that it runs
/// after `y`. Constraint-only records (no callback) install barriers.
#[derive(Debug)]
pub struct HookRegistration<A> {
    name: String,
    before: Vec<String>,
    after: Vec<String>,
    callback: Option<Callback<A>>,
}

impl<A> HookRegistration<A> {
    /// Start a record for the named hook.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: Vec::new(),
            after: Vec::new(),
            callback: None,
        }
    }

    /// Bind the unit of work.
    pub fn with_callback(mut self, callback: Callback<A>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// This hook must run before `other`.
    pub fn before(mut self, other: impl Into<String>) -> Self {
        self.before.push(other.into());
        self
    }

    /// This hook must run after `other`.
    pub fn after(mut self, other: impl Into<String>) -> Self {
        self.after.push(other.into());
        self
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drive the chain's registration API with this record.
    pub fn install<C>(&self, chain: &C) -> Result<HookId, ChainError>
    where
        C: Hookchain<A> + ?Sized,
    {
        let id = match &self.callback {
            Some(callback) => chain.add_hook(&self.name, callback.clone())?,
            None => chain.add(&self.name),
        };
        for other in &self.before {
            chain.add_constraint(&self.name, other)?;
        }
        for other in &self.after {
            chain.add_constraint(other, &self.name)?;
        }
        Ok(id)
    }
}

/// Install a batch of registration records in order.
///
/// Stops at the first error; records installed before it remain in effect,
/// matching the incremental registration semantics of the chains.
pub fn install_all<A, C>(
    chain: &C,
    records: impl IntoIterator<Item = HookRegistration<A>>,
) -> Result<(), ChainError>
where
    C: Hookchain<A> + ?Sized,
{
    for record in records {
        record.install(chain)?;
    }
    Ok(())
}
