//! Persistence boundary for chats and their turns.
//!
//! [`ChatStore`] is what the routes talk to; [`sqlite::SqliteStore`] is the
//! implementation the server runs with. Turns are stored one row each, with
//! their content list kept as a JSON array in the persisted content format.

pub mod sqlite;

use docchat::errors::TranslationError;
use docchat::models::chat::Chat;
use docchat::models::turn::Turn;
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored row that does not map back onto the model
    #[error("corrupt row {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

/// Page window applied to list queries; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub trait ChatStore: Send + Sync + 'static {
    /// Insert a chat. Returns it as stored.
    fn create_chat(&self, chat: Chat) -> impl Future<Output = Result<Chat, StoreError>> + Send;

    fn get_chat(&self, id: Uuid) -> impl Future<Output = Result<Option<Chat>, StoreError>> + Send;

    /// Chats ordered by creation time.
    fn list_chats(&self, page: Page) -> impl Future<Output = Result<Vec<Chat>, StoreError>> + Send;

    /// Delete a chat together with its turns. Returns whether the chat existed.
    fn delete_chat(&self, id: Uuid) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn count_chats(&self) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Turns of a chat ordered by creation time, ties broken by insertion order.
    fn list_turns(
        &self,
        chat_id: Uuid,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    /// Insert all turns or none of them. Returns the turns as stored.
    fn create_turns(
        &self,
        turns: &[Turn],
    ) -> impl Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    fn get_turn(&self, id: Uuid) -> impl Future<Output = Result<Option<Turn>, StoreError>> + Send;

    fn count_turns(&self, chat_id: Uuid) -> impl Future<Output = Result<i64, StoreError>> + Send;
}
