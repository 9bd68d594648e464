mod common;

use agroconnect_api::{
    entity::sea_orm_active_enums::Role,
    middleware::auth::encode_token,
    routes::{create_api_router, health::health_check},
};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{TEST_SECRET, create_user, setup_state};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert!(response.0.success);
    assert_eq!(response.0.message.as_deref(), Some("AgroConnect API is running"));

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let app = create_api_router().with_state(state);

    let response = app
        .oneshot(Request::builder().uri("/cart").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
    assert!(json.get("data").is_none());

    Ok(())
}

#[tokio::test]
async fn wrong_role_is_forbidden_and_right_role_gets_a_cart() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let farmer = create_user(&state, Role::Farmer).await?;
    let buyer = create_user(&state, Role::Buyer).await?;
    let ttl = chrono::Duration::hours(1);
    let farmer_token = encode_token(TEST_SECRET, farmer.user_id, Role::Farmer, ttl)?;
    let buyer_token = encode_token(TEST_SECRET, buyer.user_id, Role::Buyer, ttl)?;
    let app = create_api_router().with_state(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header(header::AUTHORIZATION, format!("Bearer {farmer_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cart")
                .header(header::AUTHORIZATION, format!("Bearer {buyer_token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["user"], buyer.user_id.to_string());
    assert_eq!(json["data"]["totalItems"], 0);

    Ok(())
}

async fn envelope(response: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn malformed_input_is_a_bad_request_envelope() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = create_user(&state, Role::Admin).await?;
    let token = encode_token(TEST_SECRET, admin.user_id, Role::Admin, chrono::Duration::hours(1))?;
    let app = create_api_router().with_state(state);

    let unknown_status = Request::builder()
        .method("PUT")
        .uri(format!("/orders/{}/status", uuid::Uuid::new_v4()))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"orderStatus":"teleported"}"#))?;
    let bad_id = Request::builder()
        .uri("/orders/not-a-uuid")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let bad_price = Request::builder()
        .uri("/products?minPrice=cheap")
        .body(Body::empty())?;
    let bad_json = Request::builder()
        .method("POST")
        .uri("/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;

    for request in [unknown_status, bad_id, bad_price, bad_json] {
        let uri = request.uri().clone();
        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = envelope(response).await?;
        assert_eq!(json["success"], false, "{uri}");
        assert!(json["message"].is_string(), "{uri}");
    }

    Ok(())
}

#[tokio::test]
async fn huge_page_number_lists_nothing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let app = create_api_router().with_state(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/products?page=18446744073709551615&limit=100")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let json = envelope(response).await?;
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 0);

    Ok(())
}
