//! End-to-end tests driving the router over an in-memory database.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use beanhouse_server::config::ServerConfig;
use beanhouse_server::state::AppState;
use beanhouse_server::{app, db};

async fn test_app() -> Router {
    // A single connection keeps every request on the same in-memory
    // database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::MIGRATOR.run(&pool).await.unwrap();

    let config = ServerConfig {
        database_url: "sqlite::memory:".to_owned(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
    };
    app(AppState::new(config, pool))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(mut request: Request<Body>, key: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {key}").parse().unwrap(),
    );
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_product(app: &Router, name: &str, price: i64) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            &json!({
                "productName": name,
                "productPrice": price,
                "productOrigin": "Colombia",
                "productStock": 100,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn join_member(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/members/join",
            &json!({
                "email": email,
                "password": "1234",
                "nickname": "tester",
                "address": "Seoul",
                "postalCode": "04524",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["apiKey"]
        .as_str()
        .unwrap()
        .to_owned()
}

fn order_body(email: &str, product_id: i64, quantity: i64) -> Value {
    json!({
        "email": email,
        "address": "Seoul",
        "postalCode": "04524",
        "items": [{"productId": product_id, "quantity": quantity}],
    })
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app().await;
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_crud_over_http() {
    let app = test_app().await;
    let id = create_product(&app, "Colombia Narino", 5000).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/products/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let product = body_json(response).await;
    assert_eq!(product["productName"], "Colombia Narino");
    assert_eq!(product["productPrice"], 5000);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/products/{id}"),
            &json!({"productName": "Colombia Narino", "productPrice": 5500}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["productPrice"], 5500);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/products/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/products/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_product_name_conflicts() {
    let app = test_app().await;
    create_product(&app, "Ethiopia Sidamo", 7000).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/products",
            &json!({"productName": "Ethiopia Sidamo", "productPrice": 8000}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn join_login_me_flow() {
    let app = test_app().await;
    let key = join_member(&app, "a@b.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/members/login",
            &json!({"email": "a@b.com", "password": "1234"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["apiKey"], key.as_str());

    let response = app
        .clone()
        .oneshot(with_bearer(get("/members/me"), &key))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["email"], "a@b.com");
    assert!(profile.get("password").is_none());

    let response = app
        .oneshot(json_request(
            "POST",
            "/members/login",
            &json!({"email": "a@b.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_join_conflicts() {
    let app = test_app().await;
    join_member(&app, "a@b.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/members/join",
            &json!({
                "email": "a@b.com",
                "password": "other",
                "nickname": "again",
                "address": "Busan",
                "postalCode": "04524",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn profile_update_via_bearer_key() {
    let app = test_app().await;
    let key = join_member(&app, "a@b.com").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            json_request("PUT", "/members/me", &json!({"address": "Busan"})),
            &key,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["address"], "Busan");
    assert_eq!(profile["nickname"], "tester");

    let response = app
        .oneshot(json_request("PUT", "/members/me", &json!({"address": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guest_orders_merge_within_a_window() {
    let app = test_app().await;
    let coffee = create_product(&app, "Colombia Narino", 5000).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            &order_body("guest@b.com", coffee, 2),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["status"], "preparing");
    assert_eq!(first["items"][0]["quantity"], 2);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            &order_body("guest@b.com", coffee, 1),
        ))
        .await
        .unwrap();
    let second = body_json(response).await;
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["items"][0]["quantity"], 3);

    let response = app
        .oneshot(get("/orders?email=guest@b.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn member_orders_via_bearer_key() {
    let app = test_app().await;
    let coffee = create_product(&app, "Colombia Narino", 5000).await;
    let key = join_member(&app, "a@b.com").await;

    let response = app
        .clone()
        .oneshot(with_bearer(
            json_request("POST", "/orders", &order_body("a@b.com", coffee, 1)),
            &key,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(with_bearer(get("/orders"), &key))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["items"][0]["productName"], "Colombia Narino");

    // A key whose member email differs from the order email is refused.
    let response = app
        .oneshot(with_bearer(
            json_request("POST", "/orders", &order_body("other@b.com", coffee, 1)),
            &key,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn all_orders_lists_members_and_guests() {
    let app = test_app().await;
    let coffee = create_product(&app, "Colombia Narino", 5000).await;
    join_member(&app, "a@b.com").await;

    for email in ["a@b.com", "guest@b.com"] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/orders", &order_body(email, coffee, 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/orders/all")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders = body_json(response).await;
    let emails: Vec<&str> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails.len(), 2);
    assert!(emails.contains(&"a@b.com"));
    assert!(emails.contains(&"guest@b.com"));
}

#[tokio::test]
async fn order_validation_failures() {
    let app = test_app().await;
    let coffee = create_product(&app, "Colombia Narino", 5000).await;

    // Malformed postal code.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            &json!({
                "email": "g@b.com",
                "address": "Seoul",
                "postalCode": "12",
                "items": [{"productId": coffee, "quantity": 1}],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty item list.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            &json!({
                "email": "g@b.com",
                "address": "Seoul",
                "postalCode": "04524",
                "items": [],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown product.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            &order_body("g@b.com", 9999, 1),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Listing needs a key or an email.
    let response = app.oneshot(get("/orders")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
