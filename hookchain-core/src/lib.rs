//! Hookchain Core
//!
//! A dependency-ordered callback scheduler. Named hooks declare partial-order
//! constraints ("run before X", "run after Y") independently and
//! incrementally; the chain derives a consistent execution order, detects
//! cycles, and either runs everything once or cascades execution reactively
//! as external completion signals arrive.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `graph`: the constraint graph — named hooks, bidirectional edges,
//!   wave-based order compilation, reachability queries
//! - `chain`: the two execution strategies over that graph, [`BatchChain`]
//!   and [`ReactiveChain`], unified behind the [`Hookchain`] registration
//!   trait, plus registration-record glue for discovery adapters
//!
//! # Example
//!
//! ```rust,ignore
//! use hookchain_core::{BatchChain, Callback, Hookchain};
//!
//! let chain: BatchChain<()> = BatchChain::new();
//! chain.add_hook("init", Callback::infallible(|_| println!("init")))?;
//! chain.add_hook("load", Callback::infallible(|_| println!("load")))?;
//! chain.add_constraint("init", "load")?;
//! chain.call(&())?;  // prints "init" then "load"
//! ```
//!
//! Hooks referenced only through constraints become **barriers**: pure
//! ordering gates that are never invoked but still gate their dependents.
//! An argument tuple type parameter fixes callback arity once per chain
//! instance: `BatchChain<()>`, `BatchChain<(Config,)>`,
//! `ReactiveChain<(ClassLoader, Config)>`, and so on.

pub mod chain;
pub mod error;
pub mod graph;

pub use chain::{install_all, BatchChain, HookRegistration, Hookchain, ReactiveChain, ROOT};
pub use error::{BoxError, ChainError};
pub use graph::{Callback, ConstraintGraph, Hook, HookId};
