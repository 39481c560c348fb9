//! Engine behavior across the operations of one transaction.

use std::sync::Arc;

use keel_controller::{step_fn, AttachmentKey, SharedHandler};
use keel_core::{OperationError, ValueType};
use keel_registry::{AttrDef, OperationDefinition};
use keel_tests::prelude::*;
use pretty_assertions::assert_eq;
use parking_lot::Mutex;

const SEEN: AttachmentKey<Vec<String>> = AttachmentKey::new("seen");

fn subsystem(name: &str) -> PathAddress {
    PathAddress::new(vec![PathElement::new("subsystem", name)])
}

fn harness_with(operations: Vec<(OperationDefinition, SharedHandler)>) -> Harness {
    Harness::builder()
        .resource(
            PathAddress::new(vec![PathElement::wildcard("subsystem")]),
            vec![AttrDef::new("port", ValueType::Int).with_range(Some(1), Some(65535))],
            operations,
        )
        .build()
        .unwrap()
}

/// Registers a rollback logging "<address> model", and queues a RUNTIME
/// step registering one logging "<address> runtime".
fn recording(log: &Arc<Mutex<Vec<String>>>) -> SharedHandler {
    let log = Arc::clone(log);
    step_fn(move |ctx, op| {
        let label = op.address().to_string();
        let model_log = Arc::clone(&log);
        let model_label = format!("{} model", label);
        ctx.register_rollback(move |_, _| {
            model_log.lock().push(model_label);
            Ok(())
        })?;

        let runtime_log = Arc::clone(&log);
        ctx.add_step(Stage::Runtime, move |ctx, op| {
            let log = Arc::clone(&runtime_log);
            let label = format!("{} runtime", op.address());
            ctx.register_rollback(move |_, _| {
                log.lock().push(label);
                Ok(())
            })
        })
    })
}

#[test]
fn test_rollback_runs_in_reverse_across_operations() {
    // GIVEN
    keel_tests::logging::init();
    let log = Arc::new(Mutex::new(Vec::new()));
    let harness = harness_with(vec![
        (OperationDefinition::new("record"), recording(&log)),
        (
            OperationDefinition::new("fail-in-verify"),
            step_fn(|ctx, _| {
                ctx.add_step(Stage::Verify, |_, _| Err(OperationError::failed("verify failed")))
            }),
        ),
    ]);

    // WHEN
    let failure = harness
        .composite(vec![
            Operation::new("record", subsystem("a")),
            Operation::new("record", subsystem("b")),
            Operation::new("fail-in-verify", subsystem("c")),
        ])
        .unwrap_err();

    // THEN
    assert_eq!(failure.kind(), ErrorKind::Failed);
    assert_eq!(
        *log.lock(),
        vec![
            "/subsystem=b runtime",
            "/subsystem=a runtime",
            "/subsystem=b model",
            "/subsystem=a model",
        ]
    );
}

#[test]
fn test_aborted_transaction_leaves_model_identical() {
    // GIVEN
    keel_tests::logging::init();
    let harness = harness_with(Vec::new());
    harness
        .execute(Operation::new("add", subsystem("web")).with_param("port", 8080))
        .unwrap();
    let before = harness.controller().snapshot();
    let version = harness.controller().store().version();

    // WHEN: a valid add and write followed by an invalid add
    let failure = harness
        .composite(vec![
            Operation::new("add", subsystem("db")).with_param("port", 5432),
            Operation::new("write-attribute", subsystem("web"))
                .with_param("name", "port")
                .with_param("value", 9090),
            Operation::new("add", subsystem("bad")).with_param("port", 0),
        ])
        .unwrap_err();

    // THEN
    assert_eq!(failure.kind(), ErrorKind::Validation);
    assert_eq!(*harness.controller().snapshot(), *before);
    assert_eq!(harness.controller().store().version(), version);
}

#[test]
fn test_attachment_shared_between_operations() {
    // GIVEN: every "visit" appends to one attachment; "report" reads it in VERIFY
    keel_tests::logging::init();
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let harness = harness_with(vec![
        (
            OperationDefinition::new("visit"),
            step_fn(|ctx, op| {
                let name = op.address().to_string();
                ctx.attachment_or_insert_with(&SEEN, Vec::new).push(name);
                Ok(())
            }),
        ),
        (
            OperationDefinition::new("report"),
            step_fn(move |ctx, _| {
                let sink = Arc::clone(&sink);
                ctx.add_step(Stage::Verify, move |ctx, _| {
                    let seen = ctx.attachment(&SEEN).cloned().unwrap_or_default();
                    *sink.lock() = seen;
                    Ok(())
                })
            }),
        ),
    ]);

    // WHEN
    harness
        .composite(vec![
            Operation::new("report", subsystem("r")),
            Operation::new("visit", subsystem("x")),
            Operation::new("visit", subsystem("y")),
        ])
        .unwrap();

    // THEN
    assert_eq!(*reported.lock(), vec!["/subsystem=x", "/subsystem=y"]);
}

#[test]
fn test_attachments_do_not_leak_between_transactions() {
    keel_tests::logging::init();
    let harness = harness_with(vec![(
        OperationDefinition::new("count"),
        step_fn(|ctx, _| {
            let seen = ctx.attachment_or_insert_with(&SEEN, Vec::new);
            seen.push("once".to_string());
            let len = seen.len() as i64;
            ctx.set_result(len);
            Ok(())
        }),
    )]);

    for _ in 0..3 {
        let response = harness
            .execute(Operation::new("count", subsystem("x")))
            .unwrap();
        assert_eq!(response.result, Value::Int(1));
    }
}

#[test]
fn test_composite_results_in_submission_order() {
    Scenario::new("composite_results")
        .harness(|h| {
            h.resource(
                PathAddress::new(vec![PathElement::wildcard("subsystem")]),
                vec![AttrDef::new("port", ValueType::Int)],
                Vec::new(),
            )
        })
        .step(
            "add_then_read",
            vec![
                Operation::new("add", subsystem("web")).with_param("port", 80),
                Operation::new("read-attribute", subsystem("web")).with_param("name", "port"),
            ],
            |a| a.committed().result(Value::List(vec![Value::Undefined, Value::Int(80)])),
        )
        .step(
            "read_only",
            vec![Operation::new("read-attribute", subsystem("web")).with_param("name", "port")],
            |a| a.committed().result(80),
        )
        .run()
        .unwrap();
}

#[test]
fn test_rollback_only_aborts_without_error() {
    Scenario::new("rollback_only")
        .harness(|h| {
            h.resource(
                PathAddress::new(vec![PathElement::wildcard("subsystem")]),
                Vec::new(),
                vec![(
                    OperationDefinition::new("veto"),
                    step_fn(|ctx, _| {
                        ctx.set_rollback_only();
                        Ok(())
                    }),
                )],
            )
        })
        .step(
            "add_and_veto",
            vec![
                Operation::new("add", subsystem("web")),
                add_operation("foo", Some("bar"), None),
                Operation::new("veto", PathAddress::new(vec![PathElement::new("subsystem", "v")])),
            ],
            |a| {
                a.fails_with(ErrorKind::Failed)
                    .absent(subsystem("web"))
                    .absent(address("foo"))
                    .untouched("foo")
            },
        )
        .run()
        .unwrap();
}
