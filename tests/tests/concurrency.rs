//! Concurrent transactions on disjoint and overlapping addresses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use keel_controller::step_fn;
use keel_core::OperationError;
use keel_registry::OperationDefinition;
use keel_tests::prelude::*;
use pretty_assertions::assert_eq;
use parking_lot::Mutex;

const PAIRS: usize = 25;

#[test]
fn test_disjoint_transactions_both_commit() {
    // GIVEN
    keel_tests::logging::init();
    let harness = Harness::new().unwrap();

    // WHEN
    thread::scope(|s| {
        for prefix in ["left", "right"] {
            let harness = &harness;
            s.spawn(move || {
                for i in 0..PAIRS {
                    let name = format!("{}-{}", prefix, i);
                    harness
                        .execute(add_operation(&name, Some("v"), None))
                        .unwrap();
                }
            });
        }
    });

    // THEN
    for prefix in ["left", "right"] {
        for i in 0..PAIRS {
            let name = format!("{}-{}", prefix, i);
            assert!(harness.has_resource(&address(&name)), "{} missing", name);
            assert_eq!(harness.property(&name).as_deref(), Some("v"));
        }
    }
    assert_eq!(harness.controller().store().version(), (2 * PAIRS) as u64);
}

#[test]
fn test_readers_never_see_half_a_composite() {
    // GIVEN
    keel_tests::logging::init();
    let harness = Harness::new().unwrap();
    let done = AtomicBool::new(false);

    // WHEN: a writer commits pairs while a reader samples snapshots
    let torn = thread::scope(|s| {
        let writer = s.spawn(|| {
            for i in 0..PAIRS {
                harness
                    .composite(vec![
                        add_operation(&format!("a-{}", i), Some("1"), None),
                        add_operation(&format!("b-{}", i), Some("2"), None),
                    ])
                    .unwrap();
            }
            done.store(true, Ordering::Release);
        });

        let reader = s.spawn(|| {
            let mut torn = 0;
            while !done.load(Ordering::Acquire) {
                let snapshot = harness.controller().snapshot();
                for i in 0..PAIRS {
                    let a = snapshot.contains(&address(&format!("a-{}", i)));
                    let b = snapshot.contains(&address(&format!("b-{}", i)));
                    if a != b {
                        torn += 1;
                    }
                }
            }
            torn
        });

        writer.join().unwrap();
        reader.join().unwrap()
    });

    // THEN
    assert_eq!(torn, 0);
    assert_eq!(harness.controller().store().version(), PAIRS as u64);
}

#[test]
fn test_overlapping_transactions_serialize() {
    // GIVEN: a slow operation on subsystem=web holding its lock while it runs
    keel_tests::logging::init();
    let order = Arc::new(Mutex::new(Vec::new()));
    let slow_order = Arc::clone(&order);
    let slow = step_fn(move |_, _| {
        slow_order.lock().push("slow-start");
        thread::sleep(Duration::from_millis(50));
        slow_order.lock().push("slow-end");
        Ok(())
    });
    let fast_order = Arc::clone(&order);
    let fast = step_fn(move |_, _| {
        fast_order.lock().push("fast");
        Ok(())
    });

    let harness = Harness::builder()
        .resource(
            PathAddress::new(vec![PathElement::wildcard("subsystem")]),
            Vec::new(),
            vec![
                (OperationDefinition::new("slow"), slow),
                (OperationDefinition::new("fast"), fast),
            ],
        )
        .build()
        .unwrap();
    let web = PathAddress::new(vec![PathElement::new("subsystem", "web")]);
    harness
        .execute(Operation::new("add", web.clone()))
        .unwrap();

    // WHEN
    thread::scope(|s| {
        let slow_web = web.clone();
        let harness = &harness;
        let slow_thread = s.spawn(move || harness.execute(Operation::new("slow", slow_web)));
        while !order.lock().contains(&"slow-start") {
            thread::yield_now();
        }
        harness.execute(Operation::new("fast", web.clone())).unwrap();
        slow_thread.join().unwrap().unwrap();
    });

    // THEN
    assert_eq!(*order.lock(), vec!["slow-start", "slow-end", "fast"]);
}

#[test]
fn test_concurrent_aborts_leave_no_reload_required() {
    // GIVEN: a VERIFY step that fails once both transactions have reached it
    keel_tests::logging::init();
    let barrier = Arc::new(Barrier::new(2));
    let gate_barrier = Arc::clone(&barrier);
    let gate = step_fn(move |ctx, _| {
        let barrier = Arc::clone(&gate_barrier);
        ctx.add_step(Stage::Verify, move |_, _| {
            barrier.wait();
            Err(OperationError::failed("gate closed"))
        })
    });
    let harness = Harness::builder()
        .protected(["left", "right"])
        .resource(
            PathAddress::new(vec![PathElement::wildcard("subsystem")]),
            Vec::new(),
            vec![(OperationDefinition::new("gate"), gate)],
        )
        .build()
        .unwrap();

    for round in 0..10 {
        // WHEN: both raise reload-required, then both roll back
        let failures = thread::scope(|s| {
            let workers: Vec<_> = ["left", "right"]
                .into_iter()
                .map(|name| {
                    let harness = &harness;
                    s.spawn(move || {
                        harness.composite(vec![
                            add_operation(name, Some("v"), None),
                            Operation::new(
                                "gate",
                                PathAddress::new(vec![PathElement::new("subsystem", name)]),
                            ),
                        ])
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap().is_err())
                .filter(|failed| *failed)
                .count()
        });

        // THEN
        assert_eq!(failures, 2, "round {}", round);
        assert!(!harness.is_reload_required(), "round {}", round);
        assert!(!harness.has_resource(&address("left")));
        assert!(!harness.has_resource(&address("right")));
    }
}
