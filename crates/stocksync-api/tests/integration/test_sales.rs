//! Sale gateway

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use stocksync_core::domain::{Entity, EntityId, Sale, SaleDraft, SalePatch};
use stocksync_core::ports::IRemoteGateway;

use crate::common::{mount_json, only_request_body, setup_gateway};

#[tokio::test]
async fn test_create_sale_without_seller() {
    let (server, gateway) = setup_gateway::<Sale>().await;
    Mock::given(method("POST"))
        .and(path("/sales"))
        .and(body_json(json!({ "productId": 55, "quantity": 2, "totalPrice": 39.8 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 900,
            "productId": 55,
            "sellerId": 7,
            "quantity": 2,
            "totalPrice": 39.8,
            "created_at": "2026-03-01T10:05:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sale = gateway
        .create(&SaleDraft::new(EntityId::from(55), 2, 39.8))
        .await
        .unwrap();

    assert_eq!(sale.id().as_str(), "900");
    // The server attributes the sale to the caller
    assert_eq!(sale.seller_id().map(|s| s.as_str()), Some("7"));
}

#[tokio::test]
async fn test_create_sale_with_seller() {
    let (server, gateway) = setup_gateway::<Sale>().await;
    mount_json(
        &server,
        "POST",
        "/sales",
        201,
        json!({ "id": 901, "product": { "id": 55 }, "seller": { "id": 8 }, "qty": 1, "total": 19.9 }),
    )
    .await;

    let draft = SaleDraft::new(EntityId::from(55), 1, 19.9).sold_by(EntityId::from(8));
    let sale = gateway.create(&draft).await.unwrap();

    assert_eq!(sale.product_id().as_str(), "55");
    assert_eq!(only_request_body(&server).await["sellerId"], json!(8));
}

#[tokio::test]
async fn test_update_sale() {
    let (server, gateway) = setup_gateway::<Sale>().await;
    mount_json(
        &server,
        "PATCH",
        "/sales/900",
        200,
        json!({ "id": 900, "productId": 55, "quantity": 2, "totalPrice": 35.0, "customerName": "Dana" }),
    )
    .await;

    let patch = SalePatch {
        customer_name: Some("Dana".into()),
        total_price: Some(35.0),
    };
    let sale = gateway.update(&EntityId::from(900), &patch).await.unwrap();

    assert_eq!(sale.total_price(), 35.0);
    assert_eq!(
        only_request_body(&server).await,
        json!({ "customerName": "Dana", "totalPrice": 35.0 })
    );
}

#[tokio::test]
async fn test_list_sales_bare_array() {
    let (server, gateway) = setup_gateway::<Sale>().await;
    mount_json(
        &server,
        "GET",
        "/sales",
        200,
        json!([
            { "id": 900, "productId": 55, "quantity": 2, "totalPrice": 39.8 },
            { "id": 901, "productId": 55, "quantity": 1, "totalPrice": 19.9 }
        ]),
    )
    .await;

    let sales = gateway.list().await.unwrap();
    assert_eq!(sales.len(), 2);
    assert!(sales.iter().all(|s| !s.is_local()));
}
