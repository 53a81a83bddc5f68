//! Integration tests for the HTTP entity client

#![allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]

use pizza_admin_client::{ApiClient, ClientError, EntityStore, Relations, ResourceDeleter};
use pizza_admin_core::{EntityId, EntityKind, MenuItem, MenuItemDraft, OrderItem};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri())).unwrap()
}

#[tokio::test]
async fn test_list_requests_relations_and_decodes_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/order-items"))
        .and(query_param("relations", "menu_item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "oi-1",
                "quantity": 2,
                "menu_item_id": "item-1",
                "menu_item": {"id": "item-1", "name": "Margherita", "price": 9.5}
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items: Vec<OrderItem> = client.list(&Relations::list_of::<OrderItem>()).await.unwrap();

    assert_eq!(items.len(), 1);
    let first = items.first().unwrap();
    assert_eq!(first.quantity, 2);
    assert_eq!(
        first.menu_item.as_ref().map(|m| m.name.as_str()),
        Some("Margherita")
    );

    let received = server.received_requests().await.unwrap();
    let query = received.first().unwrap().url.query().unwrap_or_default().to_string();
    assert_eq!(query, "relations=menu_item&relations=order");
}

#[tokio::test]
async fn test_list_accepts_paged_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/menu-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "item-1", "name": "Margherita", "price": 9.5}],
            "totalCount": 1
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items: Vec<MenuItem> = client.list(&Relations::none()).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_get_missing_record_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/menu-items/item-9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result: Result<MenuItem, _> = client.get(&"item-9".into(), &Relations::none()).await;

    match result {
        Err(ClientError::NotFound { kind, id }) => {
            assert_eq!(kind, EntityKind::MenuItem);
            assert_eq!(id, EntityId::from("item-9"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/menu-items/item-1"))
        .and(body_json(json!({"price": 10.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "item-1", "name": "Margherita", "price": 10.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let draft = MenuItemDraft {
        price: Some(10.5),
        ..MenuItemDraft::default()
    };
    let updated: MenuItem = client.update(&"item-1".into(), &draft).await.unwrap();
    assert_eq!(updated.price, 10.5);
}

#[tokio::test]
async fn test_error_status_carries_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/menu-items"))
        .respond_with(ResponseTemplate::new(422).set_body_string("price must be positive"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = EntityStore::<MenuItem>::create(&client, &MenuItemDraft::default()).await;

    let err = result.unwrap_err();
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(422));
    assert!(err.to_string().contains("price must be positive"));
}

#[tokio::test]
async fn test_delete_resource_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/order-items/oi-1"))
        .and(header("X-API-Key", "secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_api_key("secret");
    client
        .delete_resource(EntityKind::OrderItem, &"oi-1".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_transport_failure_is_http_error() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let client = ApiClient::new(&format!("http://127.0.0.1:{port}/api")).unwrap();

    let result: Result<Vec<MenuItem>, _> = client.list(&Relations::none()).await;
    assert!(matches!(result, Err(ClientError::Http(_))));
}
