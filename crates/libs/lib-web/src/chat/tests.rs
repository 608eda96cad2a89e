//! # Chat Tests
//!
//! End-to-end tests that drive the full router over real sockets, plus the REST
//! fallback through `oneshot`.

use crate::server::{create_router, AppState};
use crate::test_support::{test_config, test_state, TEST_JWT_SECRET};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use lib_auth::encode_jwt;
use lib_core::dto::{MarkSeenResponse, MessagePayload, ServerEvent, UserSummary};
use lib_core::model::store::models::{MessageForCreate, User};
use lib_core::model::store::{MessageRepository, UserRepository};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    state: AppState,
    alice: User,
    bob: User,
}

async fn spawn_server() -> TestServer {
    spawn_server_with(test_config()).await
}

async fn spawn_server_with(config: lib_core::Config) -> TestServer {
    let state = test_state(config).await;
    let alice = UserRepository::create(&state.db, "Alice", "555-1", "hash").await.unwrap();
    let bob = UserRepository::create(&state.db, "Bob", "555-2", "hash").await.unwrap();

    let app = create_router(state.clone(), Vec::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, state, alice, bob }
}

fn token_for(user: &User) -> String {
    encode_jwt(user.id, user.name.clone(), TEST_JWT_SECRET, 1).unwrap()
}

/// Open a live connection and wait until presence has registered it.
async fn connect(server: &TestServer, user: &User) -> WsClient {
    let url = format!("ws://{}/api/ws/chat?token={}", server.addr, token_for(user));
    let (ws, _) = connect_async(url).await.unwrap();

    for _ in 0..100 {
        if server.state.chat.presence.is_online(user.id).await {
            return ws;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("user {} never came online", user.id);
}

async fn send_intent(ws: &mut WsClient, frame: Value) {
    ws.send(tungstenite::Message::text(frame.to_string())).await.unwrap();
}

async fn next_event(ws: &mut WsClient) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed")
            .unwrap();

        if let tungstenite::Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert nothing arrives within a short window.
async fn assert_quiet(ws: &mut WsClient) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {:?}", next);
}

async fn get_json<T: serde::de::DeserializeOwned>(state: &AppState, uri: &str) -> (StatusCode, T) {
    let response = create_router(state.clone(), Vec::new())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn store_message(state: &AppState, from: &User, to: &User, text: &str) -> i64 {
    MessageRepository::create(
        &state.db,
        MessageForCreate {
            sender_id: from.id,
            receiver_id: to.id,
            text: text.to_string(),
            delivered: false,
        },
    )
    .await
    .unwrap()
    .id
}

// ========== Gateway Tests ==========

#[tokio::test]
async fn test_upgrade_without_valid_token_is_unauthorized() {
    let state = test_state(test_config()).await;

    for uri in ["/api/ws/chat", "/api/ws/chat?token=not-a-jwt"] {
        let response = create_router(state.clone(), Vec::new())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_message_flow_between_two_live_users() {
    // Arrange
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;
    let mut bob = connect(&server, &server.bob).await;

    // Act: Alice sends
    send_intent(
        &mut alice,
        json!({"event": "sendMessage", "data": {"receiverPhone": "555-2", "text": "hi bob"}}),
    )
    .await;

    // Assert: Bob receives it, Alice gets the echo and a delivery notice
    let ServerEvent::ReceiveMessage(received) = next_event(&mut bob).await else {
        panic!("expected receiveMessage");
    };
    assert_eq!(received.text, "hi bob");
    assert_eq!(received.sender_id, server.alice.id);
    assert!(received.delivered);
    assert!(!received.seen);

    assert_eq!(next_event(&mut alice).await, ServerEvent::ReceiveMessage(received.clone()));
    assert_eq!(next_event(&mut alice).await, ServerEvent::delivered(received.id));

    // Act: Bob reads the conversation
    send_intent(
        &mut bob,
        json!({"event": "markSeen", "data": {"otherUserId": server.alice.id}}),
    )
    .await;

    // Assert
    assert_eq!(next_event(&mut alice).await, ServerEvent::seen(vec![received.id]));
}

#[tokio::test]
async fn test_typing_is_relayed() {
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;
    let mut bob = connect(&server, &server.bob).await;

    send_intent(&mut alice, json!({"event": "typing", "data": {"receiverId": server.bob.id}})).await;
    send_intent(&mut alice, json!({"event": "stopTyping", "data": {"receiverId": server.bob.id}})).await;

    assert_eq!(
        serde_json::to_value(next_event(&mut bob).await).unwrap(),
        json!({"event": "typing", "data": {"senderId": server.alice.id}})
    );
    assert_eq!(
        serde_json::to_value(next_event(&mut bob).await).unwrap(),
        json!({"event": "stopTyping", "data": {"senderId": server.alice.id}})
    );
}

#[tokio::test]
async fn test_bad_frames_keep_connection_open() {
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;

    alice.send(tungstenite::Message::text("not json".to_string())).await.unwrap();
    send_intent(&mut alice, json!({"event": "editMessage", "data": {"messageId": 1}})).await;
    send_intent(&mut alice, json!({"event": "sendMessage", "data": {"text": "no receiver"}})).await;
    assert_quiet(&mut alice).await;

    // Still serving intents on the same connection
    send_intent(
        &mut alice,
        json!({"event": "sendMessage", "data": {"receiverPhone": "555-9", "text": "anyone?"}}),
    )
    .await;

    let ServerEvent::IntentFailed(failure) = next_event(&mut alice).await else {
        panic!("expected intentFailed");
    };
    assert_eq!(failure.intent, "sendMessage");
    assert_eq!(failure.code, "NotFound");
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;

    send_intent(
        &mut alice,
        json!({"event": "sendMessage", "data": {"receiverPhone": "555-2", "text": "  "}}),
    )
    .await;

    let ServerEvent::IntentFailed(failure) = next_event(&mut alice).await else {
        panic!("expected intentFailed");
    };
    assert_eq!(failure.code, "InvalidInput");
    assert!(MessageRepository::conversation(&server.state.db, server.alice.id, server.bob.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_backlog_is_flushed_on_connect() {
    // Arrange: Bob is offline when Alice writes
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;
    send_intent(
        &mut alice,
        json!({"event": "sendMessage", "data": {"receiverPhone": "555-2", "text": "while you were out"}}),
    )
    .await;
    let ServerEvent::ReceiveMessage(echo) = next_event(&mut alice).await else {
        panic!("expected echo");
    };
    assert!(!echo.delivered);

    // Act
    let mut bob = connect(&server, &server.bob).await;

    // Assert
    let ServerEvent::ReceiveMessage(flushed) = next_event(&mut bob).await else {
        panic!("expected flushed message");
    };
    assert_eq!(flushed.id, echo.id);
    assert!(flushed.delivered);
    assert_eq!(next_event(&mut alice).await, ServerEvent::delivered(echo.id));
}

#[tokio::test]
async fn test_backlog_stays_put_when_flush_disabled() {
    let config = lib_core::Config {
        flush_backlog_on_connect: false,
        ..test_config()
    };
    let server = spawn_server_with(config).await;
    let id = store_message(&server.state, &server.alice, &server.bob, "later").await;

    let mut bob = connect(&server, &server.bob).await;

    assert_quiet(&mut bob).await;
    let stored = MessageRepository::find_by_id(&server.state.db, id).await.unwrap().unwrap();
    assert!(!stored.delivered);
}

#[tokio::test]
async fn test_delete_reaches_both_parties() {
    let server = spawn_server().await;
    let id = store_message(&server.state, &server.alice, &server.bob, "oops").await;
    let mut alice = connect(&server, &server.alice).await;
    let mut bob = connect(&server, &server.bob).await;
    // Flushed on connect
    assert!(matches!(next_event(&mut bob).await, ServerEvent::ReceiveMessage(_)));

    send_intent(&mut alice, json!({"event": "deleteMessage", "data": {"messageId": id}})).await;

    assert_eq!(next_event(&mut bob).await, ServerEvent::deleted(id));
    // Alice saw the delivery notice from Bob's flush first
    assert_eq!(next_event(&mut alice).await, ServerEvent::delivered(id));
    assert_eq!(next_event(&mut alice).await, ServerEvent::deleted(id));
    assert!(MessageRepository::find_by_id(&server.state.db, id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_disconnect_clears_presence() {
    let server = spawn_server().await;
    let mut alice = connect(&server, &server.alice).await;

    let stored = UserRepository::find_by_id(&server.state.db, server.alice.id).await.unwrap().unwrap();
    assert!(stored.live_connection.is_some());

    alice.close(None).await.unwrap();

    let mut offline = false;
    for _ in 0..100 {
        if !server.state.chat.presence.is_online(server.alice.id).await {
            offline = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(offline);
}

#[tokio::test]
async fn test_reconnect_replaces_previous_connection() {
    let server = spawn_server().await;
    let mut first = connect(&server, &server.bob).await;
    let first_id = server.state.chat.presence.lookup(server.bob.id).await.unwrap().id;

    let mut second = connect(&server, &server.bob).await;
    for _ in 0..100 {
        if server.state.chat.presence.lookup(server.bob.id).await.map(|h| h.id) != Some(first_id) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    server
        .state
        .chat
        .engine
        .send(server.alice.id, "555-2", "which tab?")
        .await
        .unwrap();

    assert!(matches!(next_event(&mut second).await, ServerEvent::ReceiveMessage(_)));
    assert_quiet(&mut first).await;

    // Closing the displaced connection leaves the newer one in place
    first.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(server.state.chat.presence.is_online(server.bob.id).await);
    let stored = UserRepository::find_by_id(&server.state.db, server.bob.id).await.unwrap().unwrap();
    let current = server.state.chat.presence.lookup(server.bob.id).await.unwrap().id;
    assert_eq!(stored.live_connection, Some(current.to_string()));
}

// ========== REST Fallback Tests ==========

#[tokio::test]
async fn test_history_is_ordered() {
    let server = spawn_server().await;
    let first = store_message(&server.state, &server.alice, &server.bob, "one").await;
    let second = store_message(&server.state, &server.bob, &server.alice, "two").await;

    let uri = format!("/api/messages/{}?currentUserId={}", server.bob.id, server.alice.id);
    let (status, history): (_, Vec<MessagePayload>) = get_json(&server.state, &uri).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = history.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[tokio::test]
async fn test_history_with_malformed_ids_is_empty() {
    let state = test_state(test_config()).await;

    for uri in [
        "/api/messages/abc?currentUserId=1",
        "/api/messages/2",
        "/api/messages/2?currentUserId=-4",
    ] {
        let (status, history): (_, Vec<MessagePayload>) = get_json(&state, uri).await;
        assert_eq!(status, StatusCode::OK, "uri: {}", uri);
        assert!(history.is_empty(), "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_chat_partners_with_presence() {
    let server = spawn_server().await;
    store_message(&server.state, &server.alice, &server.bob, "hello").await;
    let _bob = connect(&server, &server.bob).await;

    let uri = format!("/api/chats/{}", server.alice.id);
    let (status, partners): (_, Vec<UserSummary>) = get_json(&server.state, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0].id, server.bob.id);
    assert!(partners[0].online);

    let (_, malformed): (_, Vec<UserSummary>) = get_json(&server.state, "/api/chats/nope").await;
    assert!(malformed.is_empty());
}

#[tokio::test]
async fn test_mark_seen_over_http_notifies_sender() {
    // Arrange
    let server = spawn_server().await;
    let id = store_message(&server.state, &server.alice, &server.bob, "read me").await;
    let mut alice = connect(&server, &server.alice).await;

    // Act
    let response = create_router(server.state.clone(), Vec::new())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/messages/mark-seen")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"userId": server.bob.id, "otherId": server.alice.id}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let result: MarkSeenResponse = serde_json::from_slice(&body).unwrap();
    assert!(result.success);
    assert_eq!(next_event(&mut alice).await, ServerEvent::seen(vec![id]));

    let stored = MessageRepository::find_by_id(&server.state.db, id).await.unwrap().unwrap();
    assert!(stored.seen && stored.delivered);
}

#[tokio::test]
async fn test_mark_seen_with_malformed_body_reports_failure() {
    let state = test_state(test_config()).await;

    for (content_type, body) in [
        ("application/json", r#"{"userId":"abc","otherId":1}"#),
        ("application/json", "not json"),
        ("text/plain", r#"{"userId":2,"otherId":1}"#),
    ] {
        let response = create_router(state.clone(), Vec::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/messages/mark-seen")
                    .header("content-type", content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "body: {}", body);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: MarkSeenResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!result.success, "body: {}", body);
    }
}

#[tokio::test]
async fn test_health() {
    let state = test_state(test_config()).await;

    let response = create_router(state, Vec::new())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
