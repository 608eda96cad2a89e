//! # Auth Handler Tests
//!
//! Test suite for the identity handlers (register, login, phone lookup).

mod login;
mod integration;

use super::*;
use crate::server::AppState;
use crate::test_support::{test_config, test_state};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

/// Create test app with routes
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/find-by-phone/{phone}", get(find_by_phone))
        .with_state(state)
}

pub async fn post_json<T: serde::Serialize>(app: Router, uri: &str, body: &T) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn register_req(name: &str, phone: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        phone: phone.to_string(),
        password: password.to_string(),
    }
}

pub async fn default_state() -> AppState {
    test_state(test_config()).await
}
