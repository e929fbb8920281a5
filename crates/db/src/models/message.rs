//! Direct message model.

use capstone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A message joined with both parties' display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageDetail {
    pub id: DbId,
    pub sender_id: DbId,
    pub sender_name: String,
    pub receiver_id: DbId,
    pub receiver_name: String,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub receiver_id: DbId,
    pub content: String,
}

/// Filters for a user's mailbox. `None` fields do not filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MessageFilter {
    /// Only the conversation with this user.
    pub with_user: Option<DbId>,
    /// Only unread messages received by the caller.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
