//! Repository for the `messages` table.

use capstone_core::types::DbId;
use sqlx::PgPool;

use super::{clamp_limit, clamp_offset};
use crate::models::message::{Message, MessageDetail, MessageFilter};

const COLUMNS: &str = "id, sender_id, receiver_id, content, is_read, read_at, created_at";

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

pub struct MessageRepo;

impl MessageRepo {
    pub async fn insert(
        tx: &mut Tx<'_>,
        sender_id: DbId,
        receiver_id: DbId,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (sender_id, receiver_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(content)
            .fetch_one(&mut **tx)
            .await
    }

    /// Messages the user sent or received, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageDetail>, sqlx::Error> {
        sqlx::query_as::<_, MessageDetail>(
            "SELECT m.id, m.sender_id, s.full_name AS sender_name,
                    m.receiver_id, r.full_name AS receiver_name,
                    m.content, m.is_read, m.read_at, m.created_at
             FROM messages m
             JOIN users s ON s.id = m.sender_id
             JOIN users r ON r.id = m.receiver_id
             WHERE (m.sender_id = $1 OR m.receiver_id = $1)
               AND ($2::BIGINT IS NULL OR m.sender_id = $2 OR m.receiver_id = $2)
               AND (NOT $3 OR (m.receiver_id = $1 AND m.is_read = false))
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT $4 OFFSET $5",
        )
        .bind(user_id)
        .bind(filter.with_user)
        .bind(filter.unread_only.unwrap_or(false))
        .bind(clamp_limit(filter.limit))
        .bind(clamp_offset(filter.offset))
        .fetch_all(pool)
        .await
    }

    /// Mark a received message as read.
    ///
    /// Returns `true` if the message was addressed to `receiver_id` and was
    /// unread.
    pub async fn mark_read(
        pool: &PgPool,
        message_id: DbId,
        receiver_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = true, read_at = NOW()
             WHERE id = $1 AND receiver_id = $2 AND is_read = false",
        )
        .bind(message_id)
        .bind(receiver_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn unread_count(pool: &PgPool, receiver_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = false")
            .bind(receiver_id)
            .fetch_one(pool)
            .await
    }
}
