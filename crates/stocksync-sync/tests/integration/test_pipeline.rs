//! Full runs of the default pipeline

use std::time::Duration;

use serde_json::json;

use stocksync_core::config::SyncConfig;
use stocksync_core::domain::{
    BranchDraft, Entity, EntityId, EntityKind, ProductDraft, SaleDraft, SyncStatus, UserDraft,
    UserRole,
};
use stocksync_core::repository::CreateMode;
use stocksync_sync::SyncCoordinator;

use crate::common::Harness;

fn coordinator() -> SyncCoordinator {
    SyncCoordinator::new(&SyncConfig {
        call_timeout_secs: 5,
    })
}

/// Branch "Main", user Alice at Main, product "Cylinder A" with 10 units and
/// a sale of 2 units by Alice, all created offline
async fn offline_shop(h: &mut Harness) -> (EntityId, EntityId, EntityId, EntityId) {
    let ws = &mut h.workspace;
    let branch = ws
        .branches
        .create(BranchDraft::new(EntityId::from(1), "Main"), CreateMode::Local)
        .await
        .unwrap();
    let alice = ws
        .users
        .create(
            UserDraft::new("Alice", "alice@example.com", UserRole::Seller)
                .at_branch(branch.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();
    let product = ws
        .products
        .create(
            ProductDraft::new(EntityId::from(1), "Cylinder A", 19.9, 10),
            CreateMode::Local,
        )
        .await
        .unwrap();
    let sale = ws
        .record_sale(
            SaleDraft::new(product.id().clone(), 2, 39.8).sold_by(alice.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();

    (
        branch.id().clone(),
        alice.id().clone(),
        product.id().clone(),
        sale.id().clone(),
    )
}

#[tokio::test]
async fn test_offline_shop_syncs_end_to_end() {
    let mut h = Harness::new().await;
    let (branch_id, alice_id, product_id, sale_id) = offline_shop(&mut h).await;

    let report = coordinator().run(&mut h.workspace).await;

    assert!(report.is_complete(), "failures: {:?}", report.failures);
    assert_eq!(report.synced(), 4);

    let ws = &h.workspace;
    let branch = ws.branches.get(&branch_id).unwrap();
    assert_eq!(branch.id().as_str(), "101");
    assert_eq!(branch.sync_status(), SyncStatus::Synced);

    let alice = ws.users.get(&alice_id).unwrap();
    assert_eq!(alice.branch_id(), Some(&EntityId::from(101)));

    let product = ws.products.get(&product_id).unwrap();
    assert_eq!(product.id().as_str(), "55");
    // Pushed with 10 units, then the offline sale of 2 left the server stock
    assert_eq!(product.quantity(), 8);
    assert_eq!(h.servers.products.stored()[0].quantity(), 8);

    let sale = ws.sales.get(&sale_id).unwrap();
    assert_eq!(sale.product_id(), &EntityId::from(55));
    assert_eq!(sale.seller_id(), Some(alice.id()));
    assert_eq!(alice.id().as_str(), "7");
}

#[tokio::test]
async fn test_foreign_keys_are_sent_as_server_ids() {
    let mut h = Harness::new().await;
    offline_shop(&mut h).await;

    coordinator().run(&mut h.workspace).await;

    assert_eq!(h.servers.users.sent()[0]["branchId"], json!(101));
    let sale = &h.servers.sales.sent()[0];
    assert_eq!(sale["productId"], json!(55));
    assert_eq!(sale["sellerId"], json!(7));
    assert_eq!(sale["quantity"], json!(2));
}

#[tokio::test]
async fn test_offline_sales_reduce_server_stock_once() {
    let mut h = Harness::new().await;
    let product = h
        .workspace
        .products
        .create(
            ProductDraft::new(EntityId::from(1), "Cylinder B", 12.0, 10),
            CreateMode::Local,
        )
        .await
        .unwrap();
    for quantity in [3, 4] {
        h.workspace
            .record_sale(
                SaleDraft::new(product.id().clone(), quantity, 12.0 * f64::from(quantity)),
                CreateMode::Local,
            )
            .await
            .unwrap();
    }
    assert_eq!(h.workspace.available_stock(product.id()).unwrap(), 3);

    let coordinator = coordinator();
    let first = coordinator.run(&mut h.workspace).await;
    assert!(first.is_complete(), "failures: {:?}", first.failures);
    assert_eq!(h.servers.products.stored()[0].quantity(), 3);
    assert_eq!(h.workspace.products.get(product.id()).unwrap().quantity(), 3);
    assert_eq!(h.workspace.available_stock(product.id()).unwrap(), 3);

    let product_calls = h.servers.products.calls();
    coordinator.run(&mut h.workspace).await;
    assert_eq!(h.servers.products.calls(), product_calls);
    assert_eq!(h.servers.products.stored()[0].quantity(), 3);
}

#[test]
fn test_stages_run_in_dependency_order() {
    assert_eq!(coordinator().kinds(), EntityKind::ALL.to_vec());
}

#[tokio::test]
async fn test_second_run_makes_no_remote_calls() {
    let mut h = Harness::new().await;
    offline_shop(&mut h).await;
    let coordinator = coordinator();

    let first = coordinator.run(&mut h.workspace).await;
    assert!(first.is_complete());
    let calls = h.servers.total_calls();

    let second = coordinator.run(&mut h.workspace).await;
    assert!(second.is_complete());
    assert_eq!(second.synced(), 0);
    assert!(second.stages.iter().all(|s| s.attempted == 0));
    assert_eq!(h.servers.total_calls(), calls);
}

#[tokio::test]
async fn test_synced_state_survives_reload() {
    let mut h = Harness::new().await;
    let (branch_id, _, product_id, _) = offline_shop(&mut h).await;

    coordinator().run(&mut h.workspace).await;

    let reloaded = h.reload().await;
    assert!(reloaded.status().is_clean());
    // Old local ids still find the synced records
    assert_eq!(
        reloaded.branches.get(&branch_id).map(|b| b.id().as_str()),
        Some("101")
    );
    assert_eq!(
        reloaded.products.get(&product_id).map(|p| p.id().as_str()),
        Some("55")
    );
}

#[tokio::test]
async fn test_records_referencing_earlier_runs_resolve() {
    let mut h = Harness::new().await;
    let branch = h
        .workspace
        .branches
        .create(BranchDraft::new(EntityId::from(1), "Main"), CreateMode::Local)
        .await
        .unwrap();
    coordinator().run(&mut h.workspace).await;

    // Created after the branch synced, but still pointing at its local id
    let mut ws = h.reload().await;
    let bob = ws
        .users
        .create(
            UserDraft::new("Bob", "bob@example.com", UserRole::Manager)
                .at_branch(branch.id().clone()),
            CreateMode::Local,
        )
        .await
        .unwrap();

    let report = coordinator().run(&mut ws).await;

    assert!(report.is_complete());
    assert_eq!(
        ws.users.get(bob.id()).unwrap().branch_id(),
        Some(&EntityId::from(101))
    );
}

#[tokio::test]
async fn test_sale_of_already_synced_product() {
    let mut h = Harness::new().await;
    let product = h
        .workspace
        .products
        .create(
            ProductDraft::new(EntityId::from(1), "Valve", 4.0, 3),
            CreateMode::Remote,
        )
        .await
        .unwrap();
    h.workspace
        .record_sale(SaleDraft::new(product.id().clone(), 1, 4.0), CreateMode::Local)
        .await
        .unwrap();

    let report = coordinator().run(&mut h.workspace).await;

    assert!(report.is_complete());
    assert_eq!(report.stage(EntityKind::Product).map(|s| s.attempted), Some(0));
    assert_eq!(report.stage(EntityKind::Sale).map(|s| s.synced), Some(1));
    assert!(h.servers.sales.sent()[0].get("sellerId").is_none());
}

#[tokio::test]
async fn test_run_reports_duration() {
    let mut h = Harness::new().await;
    offline_shop(&mut h).await;
    let coordinator = SyncCoordinator::new(&SyncConfig {
        call_timeout_secs: 1,
    });
    assert_eq!(coordinator.call_timeout(), Duration::from_secs(1));

    let report = coordinator.run(&mut h.workspace).await;
    assert_eq!(report.stages.len(), 4);
    assert!(report.duration_ms < 1_000);
}
