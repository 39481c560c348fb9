//! System property transactions: applying, deferring and rolling back live
//! values.

use keel_core::OperationError;
use keel_tests::prelude::*;

mod literal_values {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_value_is_set() {
        let harness = Scenario::new("literal")
            .step("add_foo", vec![add_operation("foo", Some("bar"), None)], |a| {
                a.committed()
                    .property("foo", "bar")
                    .present(address("foo"))
                    .attribute(address("foo"), "value", "bar")
                    .reload_required(false)
            })
            .run()
            .unwrap();

        assert_eq!(
            harness.calls_for("foo"),
            vec![PropertyCall::Set {
                name: "foo".into(),
                value: "bar".into()
            }]
        );
        assert_eq!(
            harness.updater().updates(),
            vec![("foo".to_string(), Some("bar".to_string()))]
        );
    }

    #[test]
    fn test_undefined_value_clears() {
        Scenario::new("undefined")
            .harness(|h| h.preset("foo", "old"))
            .step("add_foo", vec![add_operation("foo", None, None)], |a| {
                a.committed().no_property("foo").present(address("foo"))
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_duplicate_add_fails_and_keeps_value() {
        Scenario::new("duplicate")
            .step("add_foo", vec![add_operation("foo", Some("bar"), None)], |a| {
                a.committed()
            })
            .step("add_again", vec![add_operation("foo", Some("other"), None)], |a| {
                a.fails_with(ErrorKind::DuplicateResource).property("foo", "bar")
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_unknown_parameter_rejected_before_model() {
        let operation = add_operation("foo", Some("bar"), None).with_param("colour", "red");
        Scenario::new("unknown_parameter")
            .step("add_foo", vec![operation], |a| {
                a.fails_with(ErrorKind::Validation)
                    .error("Unknown parameter: colour")
                    .absent(address("foo"))
                    .untouched("foo")
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_boottime_attribute_defaults_true() {
        Scenario::new("boottime")
            .step("add_foo", vec![add_operation("foo", Some("bar"), None)], |a| {
                a.committed().attribute(address("foo"), "boot-time", true)
            })
            .step("add_baz", vec![add_operation("baz", Some("qux"), Some(false))], |a| {
                a.committed().attribute(address("baz"), "boot-time", false)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_boottime_unsupported_is_unknown_parameter() {
        Scenario::new("no_boottime")
            .harness(|h| h.boottime(false))
            .step("add_foo", vec![add_operation("foo", Some("bar"), Some(true))], |a| {
                a.fails_with(ErrorKind::Validation).error("boot-time")
            })
            .run()
            .unwrap();
    }
}

mod deferred_resolution {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_to_later_property_resolves() {
        // foo is queued first but needs baz, which is applied after it.
        Scenario::new("resolve_later")
            .step(
                "add_both",
                vec![
                    add_operation("foo", Some("${baz}"), None),
                    add_operation("baz", Some("qux"), None),
                ],
                |a| {
                    a.committed()
                        .property("foo", "qux")
                        .property("baz", "qux")
                        .attribute(address("foo"), "value", Value::Expression("${baz}".into()))
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_chain_of_references_resolves() {
        Scenario::new("chain")
            .step(
                "add_chain",
                vec![
                    add_operation("a", Some("${b}/a"), None),
                    add_operation("b", Some("${c}/b"), None),
                    add_operation("c", Some("root"), None),
                ],
                |a| a.committed().property("a", "root/b/a").property("b", "root/b"),
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_unresolved_reference_rolls_back() {
        let harness = Scenario::new("never_resolves")
            .step("add_foo", vec![add_operation("foo", Some("${baz}"), None)], |a| {
                a.fails_with(ErrorKind::Resolution)
                    .error("no such property: baz")
                    .absent(address("foo"))
                    .untouched("foo")
                    .no_property("foo")
            })
            .run()
            .unwrap();
        assert!(harness.store().calls().is_empty());
    }

    #[test]
    fn test_captured_failure_is_reported() {
        // GIVEN
        let harness = Harness::new().unwrap();

        // WHEN
        let failure = harness
            .composite(vec![
                add_operation("foo", Some("${baz}"), None),
                add_operation("other", Some("x"), None),
            ])
            .unwrap_err();

        // THEN
        assert_eq!(
            failure.cause(),
            &OperationError::resolution("${baz}", "no such property: baz")
        );
        assert!(!failure.rollback_incomplete());
        // other was applied, then cleared by its rollback handler
        assert_eq!(harness.property("other"), None);
        assert_eq!(
            harness.calls_for("other"),
            vec![
                PropertyCall::Set {
                    name: "other".into(),
                    value: "x".into()
                },
                PropertyCall::Clear {
                    name: "other".into()
                },
            ]
        );
        assert!(!harness.has_resource(&address("other")));
    }

    #[test]
    fn test_default_used_when_reference_missing() {
        Scenario::new("default")
            .step(
                "add_foo",
                vec![add_operation("foo", Some("${baz:fallback}"), None)],
                |a| a.committed().property("foo", "fallback"),
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_preset_property_resolves_immediately() {
        Scenario::new("preset")
            .harness(|h| h.preset("home", "/srv"))
            .step(
                "add_data",
                vec![add_operation("data", Some("${home}/data"), None)],
                |a| a.committed().property("data", "/srv/data"),
            )
            .run()
            .unwrap();
    }
}

mod boot {
    use super::*;

    #[test]
    fn test_boot_resolves_deferred() {
        Scenario::new("boot_deferred")
            .harness(|h| h.booting())
            .boot(
                "boot",
                vec![
                    add_operation("foo", Some("${baz}"), None),
                    add_operation("baz", Some("qux"), None),
                ],
                |a| a.committed().property("foo", "qux"),
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_boot_fails_on_unresolvable() {
        Scenario::new("boot_unresolvable")
            .harness(|h| h.booting())
            .boot(
                "boot",
                vec![
                    add_operation("foo", Some("${missing}"), None),
                    add_operation("baz", Some("qux"), None),
                ],
                |a| {
                    a.fails_with(ErrorKind::Resolution)
                        .no_property("baz")
                        .absent(address("foo"))
                        .absent(address("baz"))
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_protected_property_applied_only_during_boot() {
        let harness = Scenario::new("protected")
            .harness(|h| h.booting().protected(["java.home", "jboss.home"]))
            .boot("boot", vec![add_operation("java.home", Some("/opt/jdk"), None)], |a| {
                a.committed().property("java.home", "/opt/jdk").reload_required(false)
            })
            .step("after_boot", vec![add_operation("jboss.home", Some("/opt/jboss"), None)], |a| {
                a.committed()
                    .no_property("jboss.home")
                    .present(address("jboss.home"))
                    .reload_required(true)
            })
            .run()
            .unwrap();
        assert!(!harness.controller().is_booting());
    }
}

mod reload {
    use super::*;

    #[test]
    fn test_reload_flag_restored_on_abort() {
        // locked raises reload-required in RUNTIME, foo then fails in VERIFY
        Scenario::new("reload_restored")
            .harness(|h| h.protected(["locked"]))
            .step(
                "add_both",
                vec![
                    add_operation("locked", Some("v"), None),
                    add_operation("foo", Some("${missing}"), None),
                ],
                |a| {
                    a.fails_with(ErrorKind::Resolution)
                        .reload_required(false)
                        .absent(address("locked"))
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_prior_reload_flag_survives_abort() {
        Scenario::new("reload_prior")
            .harness(|h| h.protected(["first", "second"]))
            .step("raise", vec![add_operation("first", Some("v"), None)], |a| {
                a.committed().reload_required(true)
            })
            .step(
                "fail",
                vec![
                    add_operation("second", Some("v"), None),
                    add_operation("foo", Some("${missing}"), None),
                ],
                |a| a.fails_with(ErrorKind::Resolution).reload_required(true),
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_no_updater_on_server_requires_reload() {
        Scenario::new("model_only")
            .harness(|h| h.without_updater())
            .step("add_foo", vec![add_operation("foo", Some("bar"), None)], |a| {
                a.committed()
                    .untouched("foo")
                    .present(address("foo"))
                    .reload_required(true)
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_host_controller_never_requires_reload() {
        Scenario::new("host_controller")
            .harness(|h| h.without_updater().process_type(ProcessType::HostController))
            .step("add_foo", vec![add_operation("foo", Some("bar"), None)], |a| {
                a.committed().untouched("foo").reload_required(false)
            })
            .run()
            .unwrap();
    }
}

mod remove_and_write {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remove_clears_live_value() {
        let harness = Scenario::new("remove")
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step("remove", vec![remove_operation("foo")], |a| {
                a.committed().no_property("foo").absent(address("foo"))
            })
            .run()
            .unwrap();
        assert_eq!(harness.calls_for("foo").len(), 2);
    }

    #[test]
    fn test_remove_restored_on_abort() {
        Scenario::new("remove_rollback")
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step(
                "remove_and_fail",
                vec![
                    remove_operation("foo"),
                    add_operation("other", Some("${missing}"), None),
                ],
                |a| {
                    a.fails_with(ErrorKind::Resolution)
                        .property("foo", "bar")
                        .present(address("foo"))
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_write_value_reapplies() {
        Scenario::new("write")
            .harness(|h| h.preset("home", "/srv"))
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step("write", vec![write_value_operation("foo", Some("${home}/x"))], |a| {
                a.committed()
                    .property("foo", "/srv/x")
                    .attribute(address("foo"), "value", Value::Expression("${home}/x".into()))
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_write_value_restored_on_abort() {
        Scenario::new("write_rollback")
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step(
                "write_and_fail",
                vec![
                    write_value_operation("foo", Some("changed")),
                    add_operation("other", Some("${missing}"), None),
                ],
                |a| {
                    a.fails_with(ErrorKind::Resolution)
                        .property("foo", "bar")
                        .attribute(address("foo"), "value", "bar")
                },
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_write_deferred_until_reference_added() {
        Scenario::new("write_deferred")
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step(
                "write_then_add",
                vec![
                    write_value_operation("foo", Some("${baz}")),
                    add_operation("baz", Some("qux"), None),
                ],
                |a| a.committed().property("foo", "qux"),
            )
            .run()
            .unwrap();
    }

    #[test]
    fn test_remove_drops_pending_deferral() {
        // foo is deferred, then removed in the same transaction.
        Scenario::new("remove_deferred")
            .step("add", vec![add_operation("foo", Some("bar"), None)], |a| a.committed())
            .step(
                "write_then_remove",
                vec![
                    write_value_operation("foo", Some("${missing}")),
                    remove_operation("foo"),
                ],
                |a| a.committed().no_property("foo").absent(address("foo")),
            )
            .run()
            .unwrap();
    }
}
