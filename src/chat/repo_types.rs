use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row shape of `chat_messages` joined with the author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAuthor {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Immutable chat message as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: ChatAuthor,
}

impl From<ChatMessageRow> for ChatMessage {
    fn from(r: ChatMessageRow) -> Self {
        Self {
            id: r.id,
            content: r.content,
            user_id: r.user_id,
            project_id: r.project_id,
            created_at: r.created_at,
            user: ChatAuthor {
                id: r.user_id,
                name: r.author_name,
                avatar: r.author_avatar,
            },
        }
    }
}
