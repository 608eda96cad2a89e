//! # Conversation History Handler
//!
//! `GET /api/messages/{otherUserId}?currentUserId=`

use super::utils::parse_user_id;
use crate::chat::state::ChatAppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use lib_core::dto::{HistoryQuery, MessagePayload};
use lib_core::model::store::MessageRepository;
use std::sync::Arc;
use tracing::{debug, error};

/// Ordered history between two users.
///
/// Always answers with a JSON array; malformed ids and store failures yield `[]`.
pub async fn get_history(
    Path(other_user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(app_state): State<Arc<ChatAppState>>,
) -> Json<Vec<MessagePayload>> {
    let ids = parse_user_id(&other_user_id)
        .zip(query.current_user_id.as_deref().and_then(parse_user_id));

    let Some((other_id, current_id)) = ids else {
        debug!(other_user_id = %other_user_id, "[REST] history with malformed ids");
        return Json(Vec::new());
    };

    match MessageRepository::conversation(&app_state.db, current_id, other_id).await {
        Ok(messages) => Json(messages.iter().map(MessagePayload::from).collect()),
        Err(e) => {
            error!(current_id, other_id, error = %e, "[REST] history query failed");
            Json(Vec::new())
        }
    }
}
