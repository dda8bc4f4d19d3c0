//! Frames exchanged over the chat WebSocket.
//!
//! Every frame is a JSON object whose `type` field names the frame kind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{dto::SendMessageRequest, repo_types::ChatMessage};

/// Client to server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinProject {
        #[serde(rename = "projectId")]
        project_id: Uuid,
    },
    SendMessage(SendMessageRequest),
}

/// Server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined {
        #[serde(rename = "projectId")]
        project_id: Uuid,
    },
    NewMessage {
        message: ChatMessage,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::repo_types::ChatAuthor;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn parses_join_project() {
        let project_id = Uuid::new_v4();
        let frame = json!({ "type": "join_project", "projectId": project_id }).to_string();
        match serde_json::from_str::<ClientMessage>(&frame).unwrap() {
            ClientMessage::JoinProject { project_id: parsed } => assert_eq!(parsed, project_id),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn parses_send_message_with_missing_fields() {
        let frame = json!({ "type": "send_message", "content": "hello" }).to_string();
        match serde_json::from_str::<ClientMessage>(&frame).unwrap() {
            ClientMessage::SendMessage(req) => {
                assert_eq!(req.content.as_deref(), Some("hello"));
                assert!(req.project_id.is_none());
                assert!(req.user_id.is_none());
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_frame_type() {
        let frame = json!({ "type": "leave_project", "projectId": Uuid::new_v4() }).to_string();
        assert!(serde_json::from_str::<ClientMessage>(&frame).is_err());
    }

    #[test]
    fn new_message_wire_shape() {
        let project_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let frame = ServerMessage::NewMessage {
            message: ChatMessage {
                id: Uuid::new_v4(),
                content: "ship it".into(),
                user_id,
                project_id,
                created_at: datetime!(2024-03-01 12:00 UTC),
                user: ChatAuthor {
                    id: user_id,
                    name: Some("Ada".into()),
                    avatar: None,
                },
            },
        };

        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["type"], "new_message");
        assert_eq!(value["message"]["projectId"], json!(project_id));
        assert_eq!(value["message"]["userId"], json!(user_id));
        assert_eq!(value["message"]["createdAt"], "2024-03-01T12:00:00Z");
        assert_eq!(value["message"]["user"]["name"], "Ada");

        let back: ServerMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn joined_and_error_wire_shape() {
        let project_id = Uuid::new_v4();
        let joined = serde_json::to_value(ServerMessage::Joined { project_id }).unwrap();
        assert_eq!(joined, json!({ "type": "joined", "projectId": project_id }));

        let error = serde_json::to_value(ServerMessage::error("nope")).unwrap();
        assert_eq!(error, json!({ "type": "error", "message": "nope" }));
    }
}
