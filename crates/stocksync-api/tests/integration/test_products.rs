//! Product gateway, including the stock endpoints

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use stocksync_core::domain::{Entity, EntityId, Product, ProductDraft, ProductPatch};
use stocksync_core::ports::{IProductGateway, IRemoteGateway, RemoteError};

use crate::common::{mount_json, only_request_body, setup_gateway};

fn product_json(quantity: u32) -> serde_json::Value {
    json!({
        "id": 55,
        "companyId": 1,
        "name": "Cylinder A",
        "price": "19.90",
        "quantity": quantity,
        "createdAt": "2026-03-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_create_product() {
    let (server, gateway) = setup_gateway::<Product>().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_json(json!({
            "companyId": 1,
            "name": "Cylinder A",
            "price": 19.9,
            "quantity": 10
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json(10)))
        .expect(1)
        .mount(&server)
        .await;

    let draft = ProductDraft::new(EntityId::from(1), "Cylinder A", 19.9, 10);
    let product = gateway.create(&draft).await.unwrap();

    assert_eq!(product.id().as_str(), "55");
    assert_eq!(product.quantity(), 10);
    assert_eq!(product.price(), 19.9);
}

#[tokio::test]
async fn test_update_product_strips_company() {
    let (server, gateway) = setup_gateway::<Product>().await;
    mount_json(&server, "PATCH", "/products/55", 200, product_json(12)).await;

    let patch = ProductPatch {
        company_id: Some(EntityId::from(3)),
        quantity: Some(12),
        ..Default::default()
    };
    let product = gateway.update(&EntityId::from(55), &patch).await.unwrap();

    assert_eq!(product.quantity(), 12);
    assert_eq!(only_request_body(&server).await, json!({ "quantity": 12 }));
}

#[tokio::test]
async fn test_reduce_quantity() {
    let (server, gateway) = setup_gateway::<Product>().await;
    Mock::given(method("POST"))
        .and(path("/products/55/reduce-quantity"))
        .and(body_json(json!({ "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(8)))
        .expect(1)
        .mount(&server)
        .await;

    let product = gateway
        .reduce_quantity(&EntityId::from(55), 2)
        .await
        .unwrap();
    assert_eq!(product.quantity(), 8);
}

#[tokio::test]
async fn test_reduce_quantity_insufficient_stock_is_conflict() {
    let (server, gateway) = setup_gateway::<Product>().await;
    mount_json(
        &server,
        "POST",
        "/products/55/reduce-quantity",
        400,
        json!({ "message": "Insufficient stock", "statusCode": 400 }),
    )
    .await;

    let err = gateway
        .reduce_quantity(&EntityId::from(55), 20)
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::Conflict("Insufficient stock".into()));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_restore_quantity() {
    let (server, gateway) = setup_gateway::<Product>().await;
    mount_json(
        &server,
        "POST",
        "/products/55/restore-quantity",
        200,
        product_json(10),
    )
    .await;

    let product = gateway
        .restore_quantity(&EntityId::from(55), 2)
        .await
        .unwrap();
    assert_eq!(product.quantity(), 10);
    assert_eq!(only_request_body(&server).await, json!({ "quantity": 2 }));
}

#[tokio::test]
async fn test_list_products_items_envelope() {
    let (server, gateway) = setup_gateway::<Product>().await;
    mount_json(
        &server,
        "GET",
        "/products",
        200,
        json!({ "items": [product_json(10), {
            "ID": 56, "company": { "id": 1 }, "Name": "Valve", "unitPrice": 4, "stock": 0
        }] }),
    )
    .await;

    let products = gateway.list().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].name(), "Valve");
    assert_eq!(products[1].quantity(), 0);
}
