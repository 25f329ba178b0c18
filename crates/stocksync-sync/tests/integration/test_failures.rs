//! Per-record failure isolation

use std::time::Duration;

use stocksync_core::config::SyncConfig;
use stocksync_core::domain::{
    BranchDraft, Entity, EntityId, EntityKind, ProductDraft, SaleDraft, SyncStatus, UserDraft,
    UserRole,
};
use stocksync_core::ports::RemoteError;
use stocksync_core::repository::CreateMode;
use stocksync_sync::{default_pipeline, FailureReason, SyncCoordinator};

use crate::common::Harness;

fn coordinator() -> SyncCoordinator {
    SyncCoordinator::new(&SyncConfig {
        call_timeout_secs: 5,
    })
}

async fn local_product(h: &mut Harness, name: &str) -> EntityId {
    h.workspace
        .products
        .create(
            ProductDraft::new(EntityId::from(1), name, 10.0, 5),
            CreateMode::Local,
        )
        .await
        .unwrap()
        .id()
        .clone()
}

#[tokio::test]
async fn test_one_failed_product_does_not_block_the_next() {
    let mut h = Harness::new().await;
    let a = local_product(&mut h, "Product A").await;
    let b = local_product(&mut h, "Product B").await;
    h.servers
        .products
        .fail_next(RemoteError::Network("connection reset".into()));

    let report = coordinator().run(&mut h.workspace).await;

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.kind, EntityKind::Product);
    assert_eq!(failure.local_id, a);
    assert!(matches!(
        failure.reason,
        FailureReason::Remote(RemoteError::Network(_))
    ));

    let ws = &h.workspace;
    assert_eq!(ws.products.get(&a).unwrap().sync_status(), SyncStatus::Local);
    assert_eq!(ws.products.get(&b).unwrap().id().as_str(), "55");

    let stage = report.stage(EntityKind::Product).unwrap();
    assert_eq!((stage.attempted, stage.synced, stage.failed), (2, 1, 1));
}

#[tokio::test]
async fn test_failed_record_is_retried_next_run() {
    let mut h = Harness::new().await;
    let a = local_product(&mut h, "Product A").await;
    h.servers.products.fail_next(RemoteError::Timeout);

    let first = coordinator().run(&mut h.workspace).await;
    assert!(!first.is_complete());

    let second = coordinator().run(&mut h.workspace).await;
    assert!(second.is_complete());
    assert!(!h.workspace.products.get(&a).unwrap().is_local());
}

#[tokio::test]
async fn test_user_of_unsynced_branch_is_skipped_not_sent() {
    let mut h = Harness::new().await;
    let branch = h
        .workspace
        .branches
        .create(BranchDraft::new(EntityId::from(1), "Main"), CreateMode::Local)
        .await
        .unwrap();
    let alice = h
        .workspace
        .users
        .create(
            UserDraft::new("Alice", "alice@example.com", UserRole::Seller)
                .at_branch(branch.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();
    h.servers
        .branches
        .fail_next(RemoteError::Server {
            status: 503,
            message: "unavailable".into(),
        });

    let report = coordinator().run(&mut h.workspace).await;

    assert_eq!(report.failures.len(), 2);
    let user_failure = report.failures_for(EntityKind::User).next().unwrap();
    assert_eq!(user_failure.local_id, *alice.id());
    assert_eq!(
        user_failure.reason,
        FailureReason::Unresolved {
            field: "branchId",
            reference: branch.id().clone(),
        }
    );
    assert_eq!(h.servers.users.calls(), 0);
    assert_eq!(report.stage(EntityKind::User).map(|s| s.skipped), Some(1));
}

#[tokio::test]
async fn test_sale_of_unsynced_seller_is_sent_without_seller() {
    let mut h = Harness::new().await;
    let alice = h
        .workspace
        .users
        .create(
            UserDraft::new("Alice", "alice@example.com", UserRole::Seller),
            CreateMode::Local,
        )
        .await
        .unwrap();
    let product = local_product(&mut h, "Cylinder A").await;
    h.workspace
        .record_sale(
            SaleDraft::new(product, 1, 10.0).sold_by(alice.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();
    h.servers
        .users
        .fail_next(RemoteError::Auth("token expired".into()));

    let report = coordinator().run(&mut h.workspace).await;

    assert!(report.requires_reauth());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.stage(EntityKind::Sale).map(|s| s.synced), Some(1));

    let sent = &h.servers.sales.sent()[0];
    assert_eq!(sent["productId"], serde_json::json!(55));
    assert!(sent.get("sellerId").is_none());
}

#[tokio::test]
async fn test_failed_sale_keeps_local_references_for_retry() {
    let mut h = Harness::new().await;
    let alice = h
        .workspace
        .users
        .create(
            UserDraft::new("Alice", "alice@example.com", UserRole::Seller),
            CreateMode::Local,
        )
        .await
        .unwrap();
    let product = h
        .workspace
        .products
        .create(
            ProductDraft::new(EntityId::from(1), "Cylinder A", 10.0, 10),
            CreateMode::Local,
        )
        .await
        .unwrap()
        .id()
        .clone();
    let sale = h
        .workspace
        .record_sale(
            SaleDraft::new(product.clone(), 2, 20.0).sold_by(alice.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();
    h.servers
        .users
        .fail_next(RemoteError::Network("connection reset".into()));
    h.servers
        .sales
        .fail_next(RemoteError::Network("connection reset".into()));

    let first = coordinator().run(&mut h.workspace).await;
    assert_eq!(first.failures.len(), 2);

    // Neither the resolved product nor the dropped seller was stored
    let pending = h.workspace.sales.get(sale.id()).unwrap();
    assert!(pending.is_local());
    assert_eq!(pending.seller_id(), Some(alice.id()));
    assert_eq!(pending.product_id(), &product);
    assert_eq!(h.servers.products.stored()[0].quantity(), 8);

    let mut ws = h.reload().await;
    let second = coordinator().run(&mut ws).await;
    assert!(second.is_complete(), "failures: {:?}", second.failures);

    let sent = h.servers.sales.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["sellerId"], serde_json::json!(7));
    assert_eq!(sent[0]["productId"], serde_json::json!(55));
    assert_eq!(h.servers.products.stored()[0].quantity(), 8);
    assert_eq!(ws.sales.get(sale.id()).unwrap().seller_id(), Some(&EntityId::from(7)));
}

#[tokio::test]
async fn test_sale_of_failed_product_is_skipped() {
    let mut h = Harness::new().await;
    let product = local_product(&mut h, "Cylinder A").await;
    let sale = h
        .workspace
        .record_sale(SaleDraft::new(product.clone(), 1, 10.0), CreateMode::Local)
        .await
        .unwrap();
    h.servers
        .products
        .fail_next(RemoteError::Conflict("duplicate name".into()));

    let report = coordinator().run(&mut h.workspace).await;

    let sale_failure = report.failures_for(EntityKind::Sale).next().unwrap();
    assert_eq!(sale_failure.local_id, *sale.id());
    assert!(sale_failure.reason.is_skip());
    assert_eq!(h.servers.sales.calls(), 0);
    assert!(h.workspace.sales.get(sale.id()).unwrap().is_local());
}

#[tokio::test]
async fn test_slow_call_times_out_and_stays_local() {
    let mut h = Harness::new().await;
    let branch = h
        .workspace
        .branches
        .create(BranchDraft::new(EntityId::from(1), "Main"), CreateMode::Local)
        .await
        .unwrap();
    h.servers.branches.respond_after(Duration::from_millis(500));

    let coordinator = SyncCoordinator::with_stages(default_pipeline(), Duration::from_millis(20));
    let report = coordinator.run(&mut h.workspace).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures[0].reason,
        FailureReason::Remote(RemoteError::Timeout)
    );
    assert!(h.workspace.branches.get(branch.id()).unwrap().is_local());
}
