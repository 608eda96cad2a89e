//! # Mark Seen Handler
//!
//! `POST /api/messages/mark-seen`

use crate::chat::state::ChatAppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use lib_core::dto::{MarkSeenRequest, MarkSeenResponse};
use std::sync::Arc;
use tracing::{error, warn};

/// HTTP counterpart of the `markSeen` intent, including the seen notice to the sender.
///
/// Always answers `{success}`; an undecodable body is `success: false`.
pub async fn mark_seen(
    State(app_state): State<Arc<ChatAppState>>,
    payload: Result<Json<MarkSeenRequest>, JsonRejection>,
) -> Json<MarkSeenResponse> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "[REST] mark-seen with malformed body");
            return Json(MarkSeenResponse { success: false });
        }
    };

    match app_state.engine.mark_seen(req.user_id, req.other_id).await {
        Ok(_) => Json(MarkSeenResponse { success: true }),
        Err(e) => {
            error!(user_id = req.user_id, other_id = req.other_id, error = %e, "[REST] mark-seen failed");
            Json(MarkSeenResponse { success: false })
        }
    }
}
