use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use exposure_catalog::{
    Bundle, BundleBuilder, CatalogResult, CatalogSnapshot, CatalogView, Tool,
};
use exposure_governance::{
    AuditResult, AuditSink, ExposureService, GovernanceConfig, GovernanceError, MutationAction,
    MutationEvent,
};
use exposure_primitives::{Permission, RoleName};
use exposure_store::{GrantLedger, GrantStore, MemoryGrantStore};
use futures::future::join_all;
use uuid::Uuid;

fn catalog() -> Arc<CatalogSnapshot> {
    let booking = Bundle::builder("Service Booking")
        .description("Appointment management")
        .add_tool(Tool::new("book_appointment", "Service Booking").expect("tool"))
        .and_then(|bundle| {
            bundle.add_tool(Tool::new("cancel_appointment", "Service Booking").expect("tool"))
        })
        .and_then(BundleBuilder::build)
        .expect("booking bundle");

    let analytics = Bundle::builder("Analytics")
        .description("Usage reporting")
        .add_tool(Tool::new("usage_report", "Analytics").expect("tool"))
        .and_then(BundleBuilder::build)
        .expect("analytics bundle");

    Arc::new(CatalogSnapshot::new(vec![booking, analytics]).expect("catalog"))
}

fn service_over(store: Arc<dyn GrantStore>) -> ExposureService {
    ExposureService::builder()
        .with_catalog(catalog())
        .with_store(store)
        .build()
        .expect("service")
}

fn operator() -> RoleName {
    RoleName::new("operator").expect("role")
}

#[tokio::test]
async fn bundle_grant_walkthrough() {
    let store = Arc::new(MemoryGrantStore::new());
    let service = service_over(store.clone());
    let operator = operator();

    let outcome = service
        .add_permission(&operator, "expose:bundle:Service Booking")
        .await
        .expect("grant bundle");
    assert_eq!(outcome.version(), 1);

    let preview = service.exposure_preview(&operator).await.expect("preview");
    assert_eq!(preview.total_exposed_tools(), 2);
    assert_eq!(preview.exposed_bundles(), ["Service Booking"]);
    assert!(preview.contains_tool("book_appointment"));
    assert!(preview.contains_tool("cancel_appointment"));
    assert!(!preview.contains_tool("usage_report"));

    // A member tool of a held bundle cannot be granted on top.
    let err = service
        .add_permission(&operator, "expose:tool:book_appointment")
        .await
        .expect_err("member tool is covered");
    assert!(matches!(err, GovernanceError::RedundantPermission { .. }));

    let outcome = service
        .add_permission(&operator, "expose:tool:usage_report")
        .await
        .expect("grant tool");
    assert_eq!(outcome.version(), 2);

    let preview = service.exposure_preview(&operator).await.expect("preview");
    assert_eq!(preview.total_exposed_tools(), 3);
    assert_eq!(preview.exposed_bundles(), ["Service Booking", "Analytics"]);
    assert!(
        service
            .is_tool_exposed(&operator, "usage_report")
            .await
            .expect("check")
    );

    let listed = service.list_permissions(&operator).await.expect("list");
    assert_eq!(
        listed,
        ["expose:bundle:Service Booking", "expose:tool:usage_report"]
    );

    let outcome = service
        .remove_permission(&operator, "expose:bundle:Service Booking")
        .await
        .expect("revoke bundle");
    assert_eq!(outcome.version(), 3);

    let preview = service.exposure_preview(&operator).await.expect("preview");
    assert_eq!(preview.total_exposed_tools(), 1);
    assert_eq!(preview.exposed_bundles(), ["Analytics"]);
    assert!(
        !service
            .is_tool_exposed(&operator, "book_appointment")
            .await
            .expect("check")
    );
}

#[tokio::test]
async fn full_access_walkthrough() {
    let store = Arc::new(MemoryGrantStore::new());
    let service = service_over(store);
    let admin = RoleName::new("admin").expect("role");

    service
        .add_permission(&admin, "expose:all")
        .await
        .expect("grant all");

    let preview = service.exposure_preview(&admin).await.expect("preview");
    assert_eq!(preview.total_exposed_tools(), 3);
    assert_eq!(preview.exposed_bundles(), ["Service Booking", "Analytics"]);

    let err = service
        .add_permission(&admin, "expose:bundle:Analytics")
        .await
        .expect_err("covered by full access");
    match err {
        GovernanceError::RedundantPermission { covered_by, .. } => {
            assert_eq!(covered_by, Permission::All);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = service
        .add_permission(&admin, "expose:all")
        .await
        .expect_err("already held");
    assert!(matches!(err, GovernanceError::DuplicatePermission { .. }));

    let listed = service.list_permissions(&admin).await.expect("list");
    assert_eq!(listed, ["expose:all"]);

    service
        .remove_permission(&admin, "expose:all")
        .await
        .expect("revoke all");
    let preview = service.exposure_preview(&admin).await.expect("preview");
    assert!(preview.is_empty());
}

#[tokio::test]
async fn widening_grants_shadow_and_list_in_canonical_order() {
    let store = Arc::new(MemoryGrantStore::new());
    let service = service_over(store);
    let operator = operator();

    service
        .add_permission(&operator, "expose:tool:usage_report")
        .await
        .expect("tool grant");
    service
        .add_permission(&operator, "expose:bundle:Service Booking")
        .await
        .expect("bundle grant");
    // Widening to full access is legal while narrower grants are held.
    service
        .add_permission(&operator, "expose:all")
        .await
        .expect("all grant");

    let listed = service.list_permissions(&operator).await.expect("list");
    assert_eq!(
        listed,
        [
            "expose:all",
            "expose:bundle:Service Booking",
            "expose:tool:usage_report"
        ]
    );

    // Resolution short-circuits on full access; nothing is double counted.
    let preview = service.exposure_preview(&operator).await.expect("preview");
    assert_eq!(preview.total_exposed_tools(), 3);
}

#[tokio::test]
async fn concurrent_adds_both_land() {
    let store = Arc::new(MemoryGrantStore::new());
    let service = Arc::new(service_over(store.clone()));
    let operator = operator();

    let grants = ["expose:bundle:Service Booking", "expose:bundle:Analytics"];
    let results = join_all(grants.iter().map(|permission| {
        let service = Arc::clone(&service);
        let role = operator.clone();
        async move { service.add_permission(&role, permission).await }
    }))
    .await;

    for result in results {
        result.expect("add should succeed");
    }

    let listed = service.list_permissions(&operator).await.expect("list");
    assert_eq!(
        listed,
        ["expose:bundle:Analytics", "expose:bundle:Service Booking"]
    );

    let grants = store.fetch(&operator).await.expect("fetch");
    assert_eq!(grants.version(), 2);

    let stats = store.stats().await;
    assert_eq!(stats.commits, 2);
    assert!(stats.conflicts <= 1);
}

fn temp_ledger_path() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("role-governance-{}.ndjson", Uuid::new_v4()));
    path
}

#[tokio::test]
async fn grants_survive_ledger_reopen() {
    let path = temp_ledger_path();
    let operator = operator();

    {
        let ledger = Arc::new(GrantLedger::open(&path).await.expect("open ledger"));
        let service = service_over(ledger);
        service
            .add_permission(&operator, "expose:bundle:Service Booking")
            .await
            .expect("grant bundle");
        service
            .add_permission(&operator, "expose:tool:usage_report")
            .await
            .expect("grant tool");
    }

    let reopened = Arc::new(GrantLedger::open(&path).await.expect("reopen ledger"));
    let service = service_over(reopened.clone());

    let listed = service.list_permissions(&operator).await.expect("list");
    assert_eq!(
        listed,
        ["expose:bundle:Service Booking", "expose:tool:usage_report"]
    );

    let grants = reopened.fetch(&operator).await.expect("fetch");
    assert_eq!(grants.version(), 2);

    if path.exists() {
        let _ = std::fs::remove_file(&path);
    }
}

struct RecordingAuditSink {
    events: Mutex<Vec<MutationEvent>>,
}

impl RecordingAuditSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    fn drain(&self) -> Vec<MutationEvent> {
        self.events
            .lock()
            .expect("sink poisoned")
            .drain(..)
            .collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn emit(&self, event: &MutationEvent) -> AuditResult<()> {
        self.events
            .lock()
            .expect("sink poisoned")
            .push(event.clone());
        Ok(())
    }
}

#[tokio::test]
async fn every_commit_produces_one_audit_event() {
    let sink = RecordingAuditSink::new();
    let service = ExposureService::builder()
        .with_catalog(catalog())
        .with_store(Arc::new(MemoryGrantStore::new()))
        .with_audit(sink.clone())
        .build()
        .expect("service");
    let operator = operator();

    service
        .add_permission(&operator, "expose:bundle:Analytics")
        .await
        .expect("grant");
    let err = service
        .add_permission(&operator, "expose:tool:usage_report")
        .await
        .expect_err("covered");
    assert!(matches!(err, GovernanceError::RedundantPermission { .. }));
    service
        .remove_permission(&operator, "expose:bundle:Analytics")
        .await
        .expect("revoke");

    // Rejected mutations never reach the audit trail.
    let events = sink.drain();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].action(), MutationAction::Add);
    assert_eq!(events[0].permission(), &Permission::bundle("Analytics"));
    assert_eq!(events[0].resulting_version(), 1);
    assert_eq!(events[0].role().as_str(), "operator");

    assert_eq!(events[1].action(), MutationAction::Remove);
    assert_eq!(events[1].resulting_version(), 2);
}

struct StalledCatalog;

#[async_trait]
impl CatalogView for StalledCatalog {
    async fn bundles(&self) -> CatalogResult<Vec<Bundle>> {
        std::future::pending::<CatalogResult<Vec<Bundle>>>().await
    }

    async fn tool_by_name(&self, _name: &str) -> CatalogResult<Option<Tool>> {
        std::future::pending::<CatalogResult<Option<Tool>>>().await
    }

    async fn bundle_by_name(&self, _name: &str) -> CatalogResult<Option<Bundle>> {
        std::future::pending::<CatalogResult<Option<Bundle>>>().await
    }
}

#[tokio::test]
async fn stalled_catalog_times_out_without_partial_previews() {
    let service = ExposureService::builder()
        .with_catalog(Arc::new(StalledCatalog))
        .with_store(Arc::new(MemoryGrantStore::new()))
        .with_config(GovernanceConfig::new(Duration::from_millis(20)))
        .build()
        .expect("service");
    let operator = operator();

    // Full access needs no catalog lookup to validate, so the grant lands.
    service
        .add_permission(&operator, "expose:all")
        .await
        .expect("grant all");

    let err = service
        .exposure_preview(&operator)
        .await
        .expect_err("catalog never answers");
    match err {
        GovernanceError::CollaboratorUnavailable { collaborator, .. } => {
            assert_eq!(collaborator, "catalog");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Validation that needs the catalog times out the same way.
    let viewer = RoleName::new("viewer").expect("role");
    let err = service
        .add_permission(&viewer, "expose:bundle:Service Booking")
        .await
        .expect_err("catalog never answers");
    assert!(matches!(
        err,
        GovernanceError::CollaboratorUnavailable { .. }
    ));
}
