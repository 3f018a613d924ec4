mod common;

use common::{CallLog, FakeAdapter, FakeClient, FakeFactory};
use sweepkit_core::{
    ConfigurationError, Registry, Scope, Selector, SweepError, SweepOptions, SweeperEntry,
};

fn scope() -> Scope {
    Scope::from("us-west-2")
}

fn names(registry: &Registry<FakeClient>, selector: &Selector) -> Vec<String> {
    registry
        .order(selector)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}

#[tokio::test]
async fn sweeps_every_type_and_skips_gone_resources() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "widget",
            FakeAdapter::new("widget", &log).page(&["w1", "w2"]),
        ))
        .unwrap();
    registry
        .register(
            SweeperEntry::new(
                "gadget",
                FakeAdapter::new("gadget", &log)
                    .page(&["g1"])
                    .delete_fails("g1", "NotFoundException"),
            )
            .depends_on(["widget"]),
        )
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    let widget = report.counts("widget");
    assert_eq!(widget.discovered, 2);
    assert_eq!(widget.deleted, 2);
    assert_eq!(widget.failed, 0);
    let gadget = report.counts("gadget");
    assert_eq!(gadget.deleted, 0);
    assert_eq!(gadget.skipped, 1);
    assert_eq!(gadget.failed, 0);
    assert_eq!(report.scope.as_deref(), Some("us-west-2"));
    assert!(report.into_result().is_ok());
}

#[tokio::test]
async fn skip_on_list_and_delete_never_fails() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "widget",
            FakeAdapter::new("widget", &log).failing_page("AccessDeniedException"),
        ))
        .unwrap();
    registry
        .register(SweeperEntry::new(
            "gadget",
            FakeAdapter::new("gadget", &log)
                .page(&["g1"])
                .delete_fails("g1", "ResourceNotFoundException"),
        ))
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    assert!(report.failures().is_empty());
    assert!(report.counts("widget").is_empty());
    assert!(report.type_report("widget").unwrap().discovery_skipped.is_some());
    assert_eq!(report.counts("gadget").skipped, 1);
    assert_eq!(report.counts("gadget").failed, 0);
}

#[tokio::test]
async fn discovery_error_on_second_page_keeps_first_page() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "widget",
            FakeAdapter::new("widget", &log)
                .page(&["w1"])
                .failing_page("InternalFailure"),
        ))
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    assert!(log.position("delete widget w1").is_some());
    assert_eq!(report.counts("widget").deleted, 1);

    let err = report.into_result().unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert!(err.failures[0].is_discovery());
    assert!(err.to_string().contains("error reading widget in us-west-2"));
}

#[tokio::test]
async fn skip_on_second_page_deletes_nothing() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "widget",
            FakeAdapter::new("widget", &log)
                .page(&["w1"])
                .failing_page("UnsupportedOperation"),
        ))
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    assert_eq!(log.entries(), ["list widget 0", "list widget 1"]);
    let counts = report.counts("widget");
    assert_eq!(counts.discovered, 0);
    assert_eq!(counts.deleted, 0);
    assert!(report.type_report("widget").unwrap().discovery_skipped.is_some());
    assert!(report.is_success());
}

#[tokio::test]
async fn failures_are_counted_per_unit() {
    let log = CallLog::default();
    let mut adapter = FakeAdapter::new("widget", &log).page(&["w1", "w2", "w3", "w4", "w5"]);
    for id in ["w2", "w4"] {
        adapter = adapter.delete_fails(id, "InternalFailure");
    }
    let mut registry: Registry<FakeClient> = Registry::new();
    registry.register(SweeperEntry::new("widget", adapter)).unwrap();

    let report = registry
        .run(
            &FakeFactory::default(),
            &scope(),
            &Selector::All,
            &SweepOptions::new().with_concurrency(2),
        )
        .await
        .unwrap();

    // every unit is attempted regardless of sibling failures
    assert_eq!(log.count("delete widget"), 5);
    let counts = report.counts("widget");
    assert_eq!(counts.deleted, 3);
    assert_eq!(counts.failed, 2);

    let err = report.into_result().unwrap_err();
    assert_eq!(err.failures.len(), 2);
    assert!(err.to_string().starts_with("2 errors occurred:"));
}

#[tokio::test]
async fn second_run_finds_nothing() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("widget", FakeAdapter::new("widget", &log).page(&[])))
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    assert_eq!(report.counts("widget").discovered, 0);
    assert_eq!(log.count("delete"), 0);
    assert!(report.is_success());
}

#[tokio::test]
async fn dependencies_are_swept_first() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "association",
            FakeAdapter::new("association", &log).page(&["a1", "a2", "a3"]),
        ))
        .unwrap();
    registry
        .register(
            SweeperEntry::new("domain", FakeAdapter::new("domain", &log).page(&["d1"]))
                .depends_on(["association"]),
        )
        .unwrap();

    registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    let last_association_delete = log.last_position("delete association").unwrap();
    let first_domain_list = log.position("list domain 0").unwrap();
    assert!(last_association_delete < first_domain_list);
}

#[tokio::test]
async fn failed_dependency_does_not_block_dependents() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "association",
            FakeAdapter::new("association", &log).failing_page("InternalFailure"),
        ))
        .unwrap();
    registry
        .register(
            SweeperEntry::new("domain", FakeAdapter::new("domain", &log).page(&["d1"]))
                .depends_on(["association"]),
        )
        .unwrap();

    let report = registry
        .run(&FakeFactory::default(), &scope(), &Selector::All, &SweepOptions::new())
        .await
        .unwrap();

    assert_eq!(report.counts("association").failed, 1);
    assert_eq!(report.counts("domain").deleted, 1);
}

#[test]
fn order_follows_dependencies_then_registration() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("c", FakeAdapter::new("c", &log)))
        .unwrap();
    registry
        .register(SweeperEntry::new("a", FakeAdapter::new("a", &log)))
        .unwrap();
    registry
        .register(SweeperEntry::new("b", FakeAdapter::new("b", &log)).depends_on(["c"]))
        .unwrap();

    assert_eq!(names(&registry, &Selector::All), ["c", "a", "b"]);
}

#[test]
fn selector_pulls_in_dependencies() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("association", FakeAdapter::new("association", &log)))
        .unwrap();
    registry
        .register(
            SweeperEntry::new("domain", FakeAdapter::new("domain", &log))
                .depends_on(["association"]),
        )
        .unwrap();
    registry
        .register(SweeperEntry::new("api", FakeAdapter::new("api", &log)))
        .unwrap();

    assert_eq!(
        names(&registry, &Selector::only(["domain"])),
        ["association", "domain"]
    );
    assert_eq!(
        registry.order(&Selector::only(["nope"])).unwrap_err(),
        ConfigurationError::UnknownSweeper("nope".into())
    );
}

#[test]
fn registration_rejects_bad_entries() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("a", FakeAdapter::new("a", &log)))
        .unwrap();

    assert_eq!(
        registry
            .register(SweeperEntry::new("a", FakeAdapter::new("a", &log)))
            .unwrap_err(),
        ConfigurationError::DuplicateSweeper("a".into())
    );
    assert!(matches!(
        registry
            .register(SweeperEntry::new("b", FakeAdapter::new("b", &log)).depends_on(["missing"]))
            .unwrap_err(),
        ConfigurationError::UnknownDependency { .. }
    ));
    assert!(matches!(
        registry
            .register(SweeperEntry::new("s", FakeAdapter::new("s", &log)).depends_on(["s"]))
            .unwrap_err(),
        ConfigurationError::Cycle(_)
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn batch_registration_detects_cycles() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("root", FakeAdapter::new("root", &log)))
        .unwrap();

    let err = registry
        .register_all([
            SweeperEntry::new("a", FakeAdapter::new("a", &log)).depends_on(["b"]),
            SweeperEntry::new("b", FakeAdapter::new("b", &log)).depends_on(["a", "root"]),
        ])
        .unwrap_err();

    match err {
        ConfigurationError::Cycle(path) => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"a".to_string()));
            assert!(path.contains(&"b".to_string()));
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    // nothing from the rejected batch stays registered
    assert_eq!(registry.names().collect::<Vec<_>>(), ["root"]);
    assert!(registry.validate().is_ok());
}

#[test]
fn batch_registration_allows_forward_references() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register_all([
            SweeperEntry::new("domain", FakeAdapter::new("domain", &log))
                .depends_on(["association"]),
            SweeperEntry::new("association", FakeAdapter::new("association", &log)),
        ])
        .unwrap();

    assert_eq!(names(&registry, &Selector::All), ["association", "domain"]);
}

#[tokio::test]
async fn configuration_errors_come_before_remote_calls() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("widget", FakeAdapter::new("widget", &log).page(&["w1"])))
        .unwrap();

    let err = registry
        .run(
            &FakeFactory::failing_for("us-west-2"),
            &scope(),
            &Selector::only(["gizmo"]),
            &SweepOptions::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::Configuration(_)));
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn client_failure_aborts_the_scope() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("widget", FakeAdapter::new("widget", &log).page(&["w1"])))
        .unwrap();

    let err = registry
        .run(
            &FakeFactory::failing_for("us-west-2"),
            &scope(),
            &Selector::All,
            &SweepOptions::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::ClientAcquisition { .. }));
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn scopes_are_independent() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new("widget", FakeAdapter::new("widget", &log).page(&["w1"])))
        .unwrap();

    let scopes = [Scope::from("us-west-2"), Scope::from("us-east-1")];
    let results = registry
        .run_scopes(
            &FakeFactory::failing_for("us-east-1"),
            &scopes,
            &Selector::All,
            &SweepOptions::new(),
        )
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, scopes[0]);
    assert_eq!(results[0].1.as_ref().unwrap().counts("widget").deleted, 1);
    assert!(matches!(
        results[1].1,
        Err(SweepError::ClientAcquisition { .. })
    ));
}

#[tokio::test]
async fn dry_run_lists_but_never_deletes() {
    let log = CallLog::default();
    let mut registry: Registry<FakeClient> = Registry::new();
    registry
        .register(SweeperEntry::new(
            "widget",
            FakeAdapter::new("widget", &log).page(&["w1", "w2"]),
        ))
        .unwrap();

    let report = registry
        .run(
            &FakeFactory::default(),
            &scope(),
            &Selector::All,
            &SweepOptions::new().with_dry_run(true),
        )
        .await
        .unwrap();

    assert_eq!(log.count("list widget"), 1);
    assert_eq!(log.count("delete"), 0);
    assert_eq!(report.counts("widget").skipped, 2);
}
