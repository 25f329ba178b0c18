//! Branch and user gateway CRUD against a mock server

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use stocksync_core::domain::{
    Branch, BranchDraft, BranchPatch, Entity, EntityId, SyncStatus, User, UserDraft, UserRole,
};
use stocksync_core::ports::IRemoteGateway;

use crate::common::{mount_json, only_request_body, setup_gateway, TOKEN};

#[tokio::test]
async fn test_create_branch_sends_bearer_and_normalizes_response() {
    let (server, gateway) = setup_gateway::<Branch>().await;

    Mock::given(method("POST"))
        .and(path("/branches"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({ "companyId": 1, "name": "Main" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "Id": 101,
            "CompanyId": 1,
            "Name": "Main",
            "CreatedAt": "2026-03-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let branch = gateway
        .create(&BranchDraft::new(EntityId::from(1), "Main"))
        .await
        .expect("create should succeed");

    assert_eq!(branch.id().as_str(), "101");
    assert_eq!(branch.sync_status(), SyncStatus::Synced);
    assert_eq!(branch.name(), "Main");
}

#[tokio::test]
async fn test_list_branches_accepts_data_envelope() {
    let (server, gateway) = setup_gateway::<Branch>().await;
    mount_json(
        &server,
        "GET",
        "/branches",
        200,
        json!({
            "data": [
                { "id": 101, "companyId": 1, "name": "Main" },
                { "_id": "102", "company_id": 1, "name": "Harbour" }
            ],
            "total": 2
        }),
    )
    .await;

    let branches = gateway.list().await.unwrap();
    let ids: Vec<&str> = branches.iter().map(|b| b.id().as_str()).collect();
    assert_eq!(ids, vec!["101", "102"]);
}

#[tokio::test]
async fn test_update_branch_never_sends_company() {
    let (server, gateway) = setup_gateway::<Branch>().await;
    mount_json(
        &server,
        "PATCH",
        "/branches/101",
        200,
        json!({ "id": 101, "companyId": 1, "name": "Downtown" }),
    )
    .await;

    let patch = BranchPatch {
        company_id: Some(EntityId::from(2)),
        name: Some("Downtown".into()),
        ..Default::default()
    };
    let branch = gateway.update(&EntityId::from(101), &patch).await.unwrap();

    assert_eq!(branch.name(), "Downtown");
    assert_eq!(branch.company_id().as_str(), "1");
    assert_eq!(only_request_body(&server).await, json!({ "name": "Downtown" }));
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let (server, gateway) = setup_gateway::<Branch>().await;
    Mock::given(method("DELETE"))
        .and(path("/branches/101"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway.delete(&EntityId::from(101)).await.unwrap();
}

#[tokio::test]
async fn test_create_user_with_branch() {
    let (server, gateway) = setup_gateway::<User>().await;
    mount_json(
        &server,
        "POST",
        "/users",
        201,
        json!({
            "data": {
                "id": 7,
                "name": "Alice",
                "email": "alice@example.com",
                "role": "seller",
                "branch": { "id": 101, "name": "Main" }
            }
        }),
    )
    .await;

    let draft = UserDraft::new("Alice", "alice@example.com", UserRole::Seller)
        .at_branch(EntityId::from(101));
    let user = gateway.create(&draft).await.unwrap();

    assert_eq!(user.id().as_str(), "7");
    assert_eq!(user.branch_id().map(|b| b.as_str()), Some("101"));
    assert_eq!(only_request_body(&server).await["branchId"], json!(101));
}

#[tokio::test]
async fn test_fetch_user() {
    let (server, gateway) = setup_gateway::<User>().await;
    mount_json(
        &server,
        "GET",
        "/users/7",
        200,
        json!({ "ID": "7", "Name": "Alice", "Email": "alice@example.com", "Role": "manager" }),
    )
    .await;

    let user = gateway.fetch(&EntityId::from(7)).await.unwrap();
    assert_eq!(user.role(), UserRole::Manager);
    assert_eq!(user.branch_id(), None);
}
