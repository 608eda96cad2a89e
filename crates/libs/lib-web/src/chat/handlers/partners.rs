//! # Chat Partners Handler
//!
//! `GET /api/chats/{userId}`

use super::utils::parse_user_id;
use crate::chat::state::ChatAppState;
use axum::{
    extract::{Path, State},
    Json,
};
use lib_core::dto::UserSummary;
use lib_core::model::store::models::User;
use lib_core::model::store::UserRepository;
use std::sync::Arc;
use tracing::{debug, error};

/// Everyone the user has exchanged messages with, most recent first.
///
/// A user with no conversations gets a bounded sample of other users instead.
/// Always answers with a JSON array.
pub async fn get_chat_partners(
    Path(user_id): Path<String>,
    State(app_state): State<Arc<ChatAppState>>,
) -> Json<Vec<UserSummary>> {
    let Some(user_id) = parse_user_id(&user_id) else {
        debug!(user_id = %user_id, "[REST] chat partners with malformed id");
        return Json(Vec::new());
    };

    let partners = match load_partners(&app_state, user_id).await {
        Ok(partners) => partners,
        Err(e) => {
            error!(user_id, error = %e, "[REST] chat partners query failed");
            return Json(Vec::new());
        }
    };

    let mut summaries = Vec::with_capacity(partners.len());
    for user in &partners {
        let online = app_state.presence.is_online(user.id).await;
        summaries.push(UserSummary::from_user(user, online));
    }

    Json(summaries)
}

async fn load_partners(app_state: &ChatAppState, user_id: i64) -> Result<Vec<User>, sqlx::Error> {
    let partners = UserRepository::find_chat_partners(&app_state.db, user_id).await?;
    if !partners.is_empty() || app_state.config.discovery_limit == 0 {
        return Ok(partners);
    }

    UserRepository::sample_others(&app_state.db, user_id, app_state.config.discovery_limit).await
}
