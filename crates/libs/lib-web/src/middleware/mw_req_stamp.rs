//! # Request Stamping Middleware
//!
//! Adds request metadata (ID, arrival time) to requests for tracing.
//!
//! This middleware generates a unique request ID and adds it to request extensions
//! and response headers, enabling request tracing across the application.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use lib_web::middleware::mw_req_stamp::stamp_req;
//! # use axum::routing::get;
//! # async fn handler() {}
//!
//! let app: Router = Router::new()
//!     .route("/api/endpoint", get(handler))
//!     .layer(axum::middleware::from_fn(stamp_req));
//! ```
//!
//! Request ID is available in handlers via `Extension<RequestStamp>`:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use lib_web::middleware::mw_req_stamp::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::SystemTime;
use uuid::Uuid;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// When the request entered the stack
    pub received_at: SystemTime,
}

impl RequestStamp {
    /// Create a new request stamp with generated ID.
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            received_at: SystemTime::now(),
        }
    }
}

/// Request stamping middleware.
///
/// Generates a unique request ID and adds it to:
/// - Request extensions (for handler access)
/// - Response headers (`X-Request-ID`)
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use lib_web::middleware::mw_req_stamp::stamp_req;
///
/// let app: Router = Router::new()
///     .layer(axum::middleware::from_fn(stamp_req));
/// ```
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::new();
    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert("X-Request-ID", header_value);
    }

    res
}
