//! # Login Tests
//!
//! Tests for phone/password login.

use super::*;

async fn state_with_alice(password: &str) -> AppState {
    let state = default_state().await;
    let password_hash = hash_password(password).expect("Password hashing should succeed in test");
    UserRepository::create(&state.db, "Alice", "555-1", &password_hash)
        .await
        .expect("User creation should succeed in test");
    state
}

fn login_req(phone: &str, password: &str) -> LoginRequest {
    LoginRequest {
        phone: phone.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_success() {
    // Arrange
    let app = test_app(state_with_alice("TestPassword123!").await);

    // Act
    let response = post_json(app, "/login", &login_req("555-1", "TestPassword123!")).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let auth_response: AuthResponse = read_json(response).await;
    assert_eq!(auth_response.user.name, "Alice");
    assert_eq!(auth_response.message, "Login successful");
    assert!(!auth_response.token.is_empty());
}

#[tokio::test]
async fn test_login_user_not_found() {
    let app = test_app(default_state().await);

    let response = post_json(app, "/login", &login_req("555-9", "TestPassword123!")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error_response: ErrorResponse = read_json(response).await;
    assert_eq!(error_response.error, "Invalid credentials");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = test_app(state_with_alice("CorrectPassword123!").await);

    let response = post_json(app, "/login", &login_req("555-1", "WrongPassword123!")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error_response: ErrorResponse = read_json(response).await;
    assert_eq!(error_response.error, "Invalid credentials");
}
