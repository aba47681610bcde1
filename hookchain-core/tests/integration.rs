//! Integration tests for the hookchain scheduler.
//!
//! These tests exercise both execution strategies end to end through the
//! public API: ordering guarantees, cycle rejection, barrier gating,
//! completion memory, and the shared registration surface.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hookchain_core::{
    install_all, BatchChain, Callback, ChainError, HookRegistration, Hookchain, ReactiveChain,
    ROOT,
};

type Log = Arc<Mutex<Vec<String>>>;

fn logging(log: &Log, name: &str) -> Callback<()> {
    let log = Arc::clone(log);
    let name = name.to_string();
    Callback::infallible(move |_| log.lock().unwrap().push(name.clone()))
}

/// Every registered callback of a DAG runs exactly once, and every declared
/// edge is respected in the invocation order.
#[test]
fn batch_dag_runs_each_hook_once_in_edge_order() {
    let chain: BatchChain<()> = BatchChain::new();
    let log: Log = Arc::default();

    // A diamond with a tail: a → {b, c} → d → e.
    for name in ["e", "d", "c", "b", "a"] {
        chain.add_hook(name, logging(&log, name)).unwrap();
    }
    let edges = [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "e")];
    for (before, after) in edges {
        chain.add_constraint(before, after).unwrap();
    }

    chain.call(&()).unwrap();

    let order = log.lock().unwrap().clone();
    assert_eq!(order.len(), 5, "each hook exactly once: {:?}", order);
    let position: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    for (before, after) in edges {
        assert!(
            position[before] < position[after],
            "{} must precede {}: {:?}",
            before,
            after,
            order
        );
    }
}

/// The linear three-hook example: `a → b → c` logs exactly `["a", "b", "c"]`.
#[test]
fn batch_linear_chain_logs_in_declared_order() {
    let chain: BatchChain<()> = BatchChain::new();
    let log: Log = Arc::default();
    chain.add_hook("A", logging(&log, "A")).unwrap();
    chain.add_hook("B", logging(&log, "B")).unwrap();
    chain.add_hook("C", logging(&log, "C")).unwrap();
    chain.add_constraint("A", "B").unwrap();
    chain.add_constraint("B", "C").unwrap();

    chain.call(&()).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
}

/// Calling twice without mutation produces the identical invocation order.
#[test]
fn batch_is_idempotent_between_mutations() {
    let chain: BatchChain<()> = BatchChain::new();
    let log: Log = Arc::default();

    for name in ["gamma", "alpha", "beta"] {
        chain.add_hook(name, logging(&log, name)).unwrap();
    }
    chain.add_constraint("alpha", "gamma").unwrap();

    chain.call(&()).unwrap();
    chain.call(&()).unwrap();

    let order = log.lock().unwrap().clone();
    let (first, second) = order.split_at(3);
    assert_eq!(first, second);
}

/// Direct and indirect cycles fail with `CyclicDependency` instead of
/// looping or overflowing the stack.
#[test]
fn batch_rejects_direct_and_indirect_cycles() {
    let direct: BatchChain<()> = BatchChain::new();
    direct.add_constraint("a", "b").unwrap();
    direct.add_constraint("b", "a").unwrap();
    assert!(matches!(
        direct.call(&()),
        Err(ChainError::CyclicDependency { .. })
    ));

    let indirect: BatchChain<()> = BatchChain::new();
    for i in 0..500 {
        indirect
            .add_constraint(&format!("h{}", i), &format!("h{}", i + 1))
            .unwrap();
    }
    indirect.add_constraint("h500", "h0").unwrap();
    assert!(matches!(
        indirect.call(&()),
        Err(ChainError::CyclicDependency { .. })
    ));
}

/// The init/load example: a successful run, then a constraint that closes a
/// cycle makes the next call fail without executing anything.
#[test]
fn batch_cycle_added_after_success_fails_next_call() {
    let chain: BatchChain<()> = BatchChain::new();
    let log: Log = Arc::default();
    chain.add_hook("init", logging(&log, "init")).unwrap();
    chain.add_hook("load", logging(&log, "load")).unwrap();
    chain.add_constraint("init", "load").unwrap();

    chain.call(&()).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["init", "load"]);

    chain.add_constraint("load", "init").unwrap();
    assert!(matches!(
        chain.call(&()),
        Err(ChainError::CyclicDependency { .. })
    ));
    assert_eq!(*log.lock().unwrap(), vec!["init", "load"]);
}

/// A barrier never appears in the log but still gates its dependents, in
/// both strategies.
#[test]
fn barriers_gate_dependents_without_running() {
    let batch: BatchChain<()> = BatchChain::new();
    let log: Log = Arc::default();
    batch.add_hook("sink", logging(&log, "sink")).unwrap();
    batch.add_hook("source", logging(&log, "source")).unwrap();
    batch.add_constraint("source", "gate").unwrap();
    batch.add_constraint("gate", "sink").unwrap();
    batch.call(&()).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["source", "sink"]);

    let reactive: ReactiveChain<()> = ReactiveChain::new();
    let rlog: Log = Arc::default();
    reactive.add_hook("sink", logging(&rlog, "sink")).unwrap();
    reactive.add_constraint("gate", "sink").unwrap();
    reactive.call("gate", &()).unwrap();
    assert_eq!(*rlog.lock().unwrap(), vec!["sink"]);
}

/// A reactive dependent with two prerequisites fires exactly once, whichever
/// order the prerequisites complete in, and re-triggering changes nothing.
#[test]
fn reactive_dependent_fires_once_either_order() {
    for order in [["A", "B"], ["B", "A"]] {
        let chain: ReactiveChain<()> = ReactiveChain::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        chain
            .add_hook(
                "D",
                Callback::infallible(move |_: &()| {
                    fired_clone.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        chain.add_constraint("A", "D").unwrap();
        chain.add_constraint("B", "D").unwrap();

        chain.call(order[0], &()).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        chain.call(order[1], &()).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        chain.call(order[0], &()).unwrap();
        chain.call(order[1], &()).unwrap();
        chain.call(ROOT, &()).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

/// Duplicate names: a different callback is rejected, the identical one is
/// tolerated, on both strategies.
#[test]
fn duplicate_callback_rules_hold_for_both_strategies() {
    let cb: Callback<()> = Callback::infallible(|_| {});

    let batch: BatchChain<()> = BatchChain::new();
    batch.add_hook("x", cb.clone()).unwrap();
    batch.add_hook("x", cb.clone()).unwrap();
    assert!(matches!(
        batch.add_hook("x", Callback::infallible(|_| {})),
        Err(ChainError::DuplicateHook { .. })
    ));

    let reactive: ReactiveChain<()> = ReactiveChain::new();
    reactive.add_hook("x", cb.clone()).unwrap();
    reactive.add_hook("x", cb).unwrap();
    assert!(matches!(
        reactive.add_hook("x", Callback::infallible(|_| {})),
        Err(ChainError::DuplicateHook { .. })
    ));
}

/// Arguments flow through to every callback; arity is fixed by the chain's
/// type parameter.
#[test]
fn argument_tuples_reach_reactive_callbacks() {
    let chain: ReactiveChain<(String, u32)> = ReactiveChain::new();
    let seen: Arc<Mutex<Vec<(String, u32)>>> = Arc::default();

    let seen_clone = Arc::clone(&seen);
    chain
        .add_hook(
            "observer",
            Callback::infallible(move |(tag, n): &(String, u32)| {
                seen_clone.lock().unwrap().push((tag.clone(), *n));
            }),
        )
        .unwrap();
    chain.add_constraint("signal", "observer").unwrap();

    chain.call("signal", &("boot".to_string(), 7)).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![("boot".to_string(), 7)]);
}

/// The same registration records can drive either strategy through the
/// `Hookchain` trait.
#[test]
fn registration_records_work_against_either_strategy() {
    fn records(log: &Log) -> Vec<HookRegistration<()>> {
        let log_one = Arc::clone(log);
        let log_two = Arc::clone(log);
        vec![
            HookRegistration::new("two")
                .with_callback(Callback::infallible(move |_| {
                    log_two.lock().unwrap().push("two".to_string())
                }))
                .after("one"),
            HookRegistration::new("one").with_callback(Callback::infallible(move |_| {
                log_one.lock().unwrap().push("one".to_string())
            })),
        ]
    }

    let batch: BatchChain<()> = BatchChain::new();
    let blog: Log = Arc::default();
    install_all(&batch, records(&blog)).unwrap();
    batch.call(&()).unwrap();
    assert_eq!(*blog.lock().unwrap(), vec!["one", "two"]);

    let reactive: ReactiveChain<()> = ReactiveChain::new();
    let rlog: Log = Arc::default();
    install_all(&reactive, records(&rlog)).unwrap();
    reactive.call(ROOT, &()).unwrap();
    assert_eq!(*rlog.lock().unwrap(), vec!["one", "two"]);
}

/// Registration from multiple threads is serialized by the instance lock;
/// the resulting single call still honors every constraint.
#[test]
fn concurrent_registration_is_serialized() {
    let chain: Arc<BatchChain<()>> = Arc::new(BatchChain::new());
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let chain = Arc::clone(&chain);
            let counter = Arc::clone(&counter);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let name = format!("t{}h{}", t, i);
                    let counter = Arc::clone(&counter);
                    chain
                        .add_hook(
                            &name,
                            Callback::infallible(move |_: &()| {
                                counter.fetch_add(1, Ordering::SeqCst);
                            }),
                        )
                        .unwrap();
                    if i > 0 {
                        chain
                            .add_constraint(&format!("t{}h{}", t, i - 1), &name)
                            .unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    chain.call(&()).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 400);
    assert!(chain.is_done());
}

/// `is_done` polling: the staged-initialization gate pattern.
#[test]
fn reactive_is_done_aggregates_completion() {
    let chain: ReactiveChain<()> = ReactiveChain::new();
    chain.add("stage1");
    chain.add("stage2");
    chain.add("stage3");
    chain.add_constraint("stage1", "stage2").unwrap();
    chain.add_constraint("stage2", "stage3").unwrap();

    assert!(!chain.is_done());
    chain.call("stage1", &()).unwrap();
    // Barriers cascade: everything downstream of stage1 completed with it.
    assert!(chain.is_done());
}
