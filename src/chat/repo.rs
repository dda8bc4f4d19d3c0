use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ChatMessage, ChatMessageRow};

/// Newest first; `id` breaks `created_at` ties so the page boundary is stable.
const LIST_MESSAGES_SQL: &str = r#"
    SELECT m.id, m.project_id, m.user_id, m.content, m.created_at,
           u.name AS author_name, u.avatar AS author_avatar
      FROM chat_messages m
      JOIN users u ON u.id = m.user_id
     WHERE m.project_id = $1
     ORDER BY m.created_at DESC, m.id DESC
     LIMIT $2
"#;

/// Chat persistence used by the chat service.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn is_member(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;

    async fn create_message(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<ChatMessage>;

    /// The most recent `limit` messages of a project, oldest first.
    async fn list_messages(&self, project_id: Uuid, limit: i64) -> anyhow::Result<Vec<ChatMessage>>;
}

#[derive(Clone)]
pub struct PgChatStore {
    db: PgPool,
}

impl PgChatStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn is_member(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM project_members
                 WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("check project membership")?;
        Ok(found)
    }

    async fn create_message(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<ChatMessage> {
        let row = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            WITH inserted AS (
                INSERT INTO chat_messages (project_id, user_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, project_id, user_id, content, created_at
            )
            SELECT i.id, i.project_id, i.user_id, i.content, i.created_at,
                   u.name AS author_name, u.avatar AS author_avatar
              FROM inserted i
              JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.db)
        .await
        .context("insert chat message")?;
        Ok(row.into())
    }

    async fn list_messages(&self, project_id: Uuid, limit: i64) -> anyhow::Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(LIST_MESSAGES_SQL)
            .bind(project_id)
            .bind(limit)
            .fetch_all(&self.db)
            .await
            .context("list chat messages")?;

        Ok(rows.into_iter().rev().map(ChatMessage::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_order_has_a_unique_tie_breaker() {
        let order_by = LIST_MESSAGES_SQL
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("ORDER BY"))
            .expect("history query is ordered");
        assert_eq!(order_by, "ORDER BY m.created_at DESC, m.id DESC");
    }
}
