//! # Integration Tests
//!
//! Register, login and lookup flows across handlers.

use super::*;
use crate::chat::ConnectionHandle;
use crate::test_support::TEST_JWT_SECRET;
use lib_auth::decode_jwt;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_register_then_login() {
    // Arrange
    let state = default_state().await;

    let register_response = post_json(
        test_app(state.clone()),
        "/register",
        &register_req("Alice", "555-1", "TestPassword123!"),
    )
    .await;
    assert_eq!(register_response.status(), StatusCode::CREATED);

    // Act
    let login_response = post_json(
        test_app(state),
        "/login",
        &LoginRequest {
            phone: "555-1".to_string(),
            password: "TestPassword123!".to_string(),
        },
    )
    .await;

    // Assert
    assert_eq!(login_response.status(), StatusCode::OK);
    let auth_response: AuthResponse = read_json(login_response).await;
    assert_eq!(auth_response.user.phone, "555-1");
}

#[tokio::test]
async fn test_jwt_token_carries_user_id() {
    let app = test_app(default_state().await);

    let response = post_json(app, "/register", &register_req("Alice", "555-1", "TestPassword123!")).await;
    let auth_response: AuthResponse = read_json(response).await;

    let claims = decode_jwt(&auth_response.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.user_id().unwrap(), auth_response.user.id);
    assert_eq!(claims.name, "Alice");
}

#[tokio::test]
async fn test_find_by_phone_reports_presence() {
    // Arrange
    let state = default_state().await;
    let bob = UserRepository::create(&state.db, "Bob", "555-2", "hash").await.unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();
    state.chat.presence.register(bob.id, ConnectionHandle::new(tx)).await;

    // Act
    let response = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/find-by-phone/555-2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let summary: UserSummary = read_json(response).await;
    assert_eq!(summary.id, bob.id);
    assert!(summary.online);
}

#[tokio::test]
async fn test_find_by_phone_not_found() {
    let response = test_app(default_state().await)
        .oneshot(
            Request::builder()
                .uri("/find-by-phone/555-9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
