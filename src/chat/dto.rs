use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::ChatMessage;
use crate::error::{AppError, AppResult};
use crate::extract::{require, require_text, require_uuid};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 200;

const SEND_REQUIRED: &str = "Content, user ID, and project ID are required";

/// Body of `POST /chat` and of the `send_message` socket frame.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

/// A send request that passed boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessage {
    pub content: String,
    pub user_id: Uuid,
    pub project_id: Uuid,
}

impl SendMessageRequest {
    pub fn validate(self) -> AppResult<SendMessage> {
        Ok(SendMessage {
            content: require_text(self.content, SEND_REQUIRED)?,
            user_id: require(self.user_id, SEND_REQUIRED)?,
            project_id: require(self.project_id, SEND_REQUIRED)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub project_id: Option<String>,
    pub limit: Option<String>,
}

impl HistoryQuery {
    /// Project id plus a limit defaulted to 50 and clamped to `1..=200`.
    pub fn validate(&self) -> AppResult<(Uuid, i64)> {
        let project_id = require_uuid(self.project_id.as_deref(), "Project ID is required")?;
        let limit = match self.limit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => DEFAULT_HISTORY_LIMIT,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::validation("limit must be an integer"))?,
        };
        Ok((project_id, limit.clamp(1, MAX_HISTORY_LIMIT)))
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: String,
    pub chat_message: ChatMessage,
}
