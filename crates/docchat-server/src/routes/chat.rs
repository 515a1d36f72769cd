use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use docchat::models::chat::Chat;
use docchat::models::content::Content;
use docchat::models::role::Role;
use docchat::models::turn::Turn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pagination::PaginationParams;
use crate::error::ServerError;
use crate::state::AppState;
use crate::store::{ChatStore, Page};

#[derive(Debug, Deserialize)]
struct ChatCreate {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MessageCreate {
    message: String,
}

/// A turn as the API exposes it; prompt and accounting metadata stay internal
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRead {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: Role,
    pub content: Vec<Content>,
    pub created_at: DateTime<Utc>,
}

impl From<Turn> for MessageRead {
    fn from(turn: Turn) -> Self {
        Self {
            id: turn.id,
            chat_id: turn.chat_id,
            role: turn.role,
            content: turn.content,
            created_at: turn.created_at,
        }
    }
}

async fn find_chat(state: &AppState, chat_id: Uuid) -> Result<Chat, ServerError> {
    state
        .store
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Chat {} not found.", chat_id)))
}

async fn list_chats(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<Chat>>, ServerError> {
    let chats = state.store.list_chats(params.into_page()?).await?;
    Ok(Json(chats))
}

async fn create_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatCreate>,
) -> Result<Json<Chat>, ServerError> {
    if !Chat::is_valid_name(&body.name) {
        return Err(ServerError::BadRequest(
            "chat name must be non-empty and at most 255 characters".to_string(),
        ));
    }
    let chat = state.store.create_chat(Chat::new(body.name)).await?;
    tracing::info!(chat_id = %chat.id, "chat created");
    Ok(Json(chat))
}

async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<Chat>, ServerError> {
    Ok(Json(find_chat(&state, chat_id).await?))
}

async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if !state.store.delete_chat(chat_id).await? {
        return Err(ServerError::NotFound(format!("Chat {} not found.", chat_id)));
    }
    tracing::info!(%chat_id, "chat deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<MessageRead>>, ServerError> {
    let turns = state.store.list_turns(chat_id, params.into_page()?).await?;
    Ok(Json(turns.into_iter().map(MessageRead::from).collect()))
}

async fn create_message(
    State(state): State<AppState>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<MessageCreate>,
) -> Result<Json<Vec<MessageRead>>, ServerError> {
    find_chat(&state, chat_id).await?;

    let turns = state.store.list_turns(chat_id, Page::default()).await?;
    let history = state.translator.turns_to_messages(&turns);
    let new_messages = state
        .agent
        .run(&body.message, &state.deps, &history)
        .await?;

    // nothing is written unless every new message translates
    let new_turns = state.translator.messages_to_turns(chat_id, &new_messages)?;
    let stored = state.store.create_turns(&new_turns).await?;
    tracing::info!(%chat_id, turns = stored.len(), "messages stored");

    Ok(Json(stored.into_iter().map(MessageRead::from).collect()))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", get(list_chats).post(create_chat))
        .route("/chat/:chat_id", get(get_chat).delete(delete_chat))
        .route(
            "/chat/:chat_id/messages",
            get(list_messages).post(create_message),
        )
        .with_state(state)
}
