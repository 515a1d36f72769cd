//! SQLite implementation of [`ChatStore`].
//!
//! Migrations under `./migrations` are embedded at compile time and run on
//! [`SqliteStore::connect`]. Ids and timestamps are stored as text; timestamps
//! use a fixed-width RFC 3339 form so that ordering by the column is
//! chronological.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use docchat::models::chat::Chat;
use docchat::models::content::Content;
use docchat::models::role::Role;
use docchat::models::turn::{Turn, Usage};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::{ChatStore, Page, StoreError};

type TurnRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

const TURN_COLUMNS: &str = "id, chat_id, role, content, created_at, system, usage, model";

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` is a sqlx SQLite URL such as `"sqlite://docchat.db"`, or
    /// `"sqlite::memory:"` for tests (use a single connection there, every
    /// connection gets its own in-memory database).
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(url, "database ready");
        Ok(Self { pool })
    }
}

fn format_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Timestamp as it reads back from the database
fn stored_time(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

fn parse_time(id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| corrupt(id, format!("bad timestamp '{}': {}", raw, e)))
}

fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|e| corrupt(id, e.to_string()))
}

fn corrupt(id: &str, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        id: id.to_string(),
        reason: reason.into(),
    }
}

fn chat_from_row((id, name, created_at): (String, String, String)) -> Result<Chat, StoreError> {
    Ok(Chat {
        id: parse_id(&id)?,
        created_at: parse_time(&id, &created_at)?,
        name,
    })
}

fn turn_from_row(row: TurnRow) -> Result<Turn, StoreError> {
    let (id, chat_id, role, content, created_at, system, usage, model) = row;
    let usage = usage
        .map(|raw| serde_json::from_str::<Usage>(&raw))
        .transpose()
        .map_err(|e| corrupt(&id, format!("bad usage: {}", e)))?;
    Ok(Turn {
        id: parse_id(&id)?,
        chat_id: parse_id(&chat_id)?,
        role: Role::from_str(&role).map_err(|_| corrupt(&id, format!("bad role '{}'", role)))?,
        content: Content::decode_list(&content)?,
        created_at: parse_time(&id, &created_at)?,
        system,
        usage,
        model,
    })
}

fn page_bounds(page: Page) -> (i64, i64) {
    // LIMIT -1 is unbounded in SQLite
    (page.limit.unwrap_or(-1), page.offset.unwrap_or(0))
}

impl ChatStore for SqliteStore {
    async fn create_chat(&self, chat: Chat) -> Result<Chat, StoreError> {
        let chat = Chat {
            created_at: stored_time(chat.created_at),
            ..chat
        };
        sqlx::query("INSERT INTO chats (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(chat.id.to_string())
            .bind(&chat.name)
            .bind(format_time(&chat.created_at))
            .execute(&self.pool)
            .await?;
        Ok(chat)
    }

    async fn get_chat(&self, id: Uuid) -> Result<Option<Chat>, StoreError> {
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT id, name, created_at FROM chats WHERE id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(chat_from_row).transpose()
    }

    async fn list_chats(&self, page: Page) -> Result<Vec<Chat>, StoreError> {
        let (limit, offset) = page_bounds(page);
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT id, name, created_at FROM chats \
             ORDER BY created_at ASC, rowid ASC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(chat_from_row).collect()
    }

    async fn delete_chat(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_chats(&self) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chats")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_turns(&self, chat_id: Uuid, page: Page) -> Result<Vec<Turn>, StoreError> {
        let (limit, offset) = page_bounds(page);
        let rows: Vec<TurnRow> = sqlx::query_as(&format!(
            "SELECT {} FROM turns WHERE chat_id = ?1 \
             ORDER BY created_at ASC, rowid ASC LIMIT ?2 OFFSET ?3",
            TURN_COLUMNS
        ))
        .bind(chat_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(turn_from_row).collect()
    }

    async fn create_turns(&self, turns: &[Turn]) -> Result<Vec<Turn>, StoreError> {
        let mut stored = Vec::with_capacity(turns.len());
        for turn in turns {
            turn.validate()?;
            let mut turn = turn.clone();
            turn.created_at = stored_time(turn.created_at);
            stored.push(turn);
        }

        let mut tx = self.pool.begin().await?;
        for turn in &stored {
            let usage = turn
                .usage
                .map(|usage| serde_json::to_string(&usage))
                .transpose()
                .map_err(|e| corrupt(&turn.id.to_string(), e.to_string()))?;
            sqlx::query(&format!(
                "INSERT INTO turns ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                TURN_COLUMNS
            ))
            .bind(turn.id.to_string())
            .bind(turn.chat_id.to_string())
            .bind(turn.role.as_ref())
            .bind(Content::encode_list(&turn.content)?)
            .bind(format_time(&turn.created_at))
            .bind(&turn.system)
            .bind(usage)
            .bind(&turn.model)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::debug!(count = stored.len(), "turns stored");
        Ok(stored)
    }

    async fn get_turn(&self, id: Uuid) -> Result<Option<Turn>, StoreError> {
        let row: Option<TurnRow> =
            sqlx::query_as(&format!("SELECT {} FROM turns WHERE id = ?1", TURN_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(turn_from_row).transpose()
    }

    async fn count_turns(&self, chat_id: Uuid) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM turns WHERE chat_id = ?1")
            .bind(chat_id.to_string())
            .fetch_one(&self.pool)
            .await?)
    }
}
