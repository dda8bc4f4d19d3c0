use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{dto::SendMessage, repo_types::ChatMessage};
use crate::{
    error::{AppError, AppResult},
    relay::ServerMessage,
    state::AppState,
};

/// Persist a chat message, then fan it out to the project's room.
///
/// The message is stored before the broadcast; delivery problems are isolated
/// per subscriber inside the relay and never undo the write.
#[instrument(skip(state, cmd), fields(project_id = %cmd.project_id, user_id = %cmd.user_id))]
pub async fn send_message(state: &AppState, cmd: SendMessage) -> AppResult<ChatMessage> {
    if !state.chat.is_member(cmd.project_id, cmd.user_id).await? {
        warn!("chat post by non-member");
        return Err(AppError::Forbidden(
            "User is not a member of this project".into(),
        ));
    }

    let message = state
        .chat
        .create_message(cmd.project_id, cmd.user_id, &cmd.content)
        .await?;
    info!(message_id = %message.id, "chat message stored");

    let report = state.relay.broadcast(
        cmd.project_id,
        ServerMessage::NewMessage {
            message: message.clone(),
        },
    );
    debug!(delivered = report.delivered, dropped = report.dropped, "chat message broadcast");

    Ok(message)
}

pub async fn history(state: &AppState, project_id: Uuid, limit: i64) -> AppResult<Vec<ChatMessage>> {
    Ok(state.chat.list_messages(project_id, limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryChatStore, MemoryMatchStore};
    use std::sync::Arc;

    fn command(project_id: Uuid, user_id: Uuid, content: &str) -> SendMessage {
        SendMessage {
            content: content.into(),
            user_id,
            project_id,
        }
    }

    #[tokio::test]
    async fn member_message_is_stored_then_broadcast() {
        let chat = Arc::new(MemoryChatStore::default());
        let state = AppState::fake_with(Arc::new(MemoryMatchStore::default()), chat.clone());
        let (project, user) = (Uuid::new_v4(), Uuid::new_v4());
        chat.add_member(project, user);

        let (listener, mut rx) = state.relay.connect();
        state.relay.subscribe(listener, project).unwrap();

        let stored = send_message(&state, command(project, user, "hello")).await.unwrap();
        assert_eq!(chat.stored().len(), 1);

        let frame = rx.try_recv().expect("broadcast frame");
        assert_eq!(*frame, ServerMessage::NewMessage { message: stored });
    }

    #[tokio::test]
    async fn non_member_is_forbidden_and_nothing_is_stored() {
        let chat = Arc::new(MemoryChatStore::default());
        let state = AppState::fake_with(Arc::new(MemoryMatchStore::default()), chat.clone());
        let project = Uuid::new_v4();
        let (listener, mut rx) = state.relay.connect();
        state.relay.subscribe(listener, project).unwrap();

        let err = send_message(&state, command(project, Uuid::new_v4(), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(chat.stored().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn store_failure_propagates_without_broadcast() {
        let chat = Arc::new(MemoryChatStore::default());
        let state = AppState::fake_with(Arc::new(MemoryMatchStore::default()), chat.clone());
        let (project, user) = (Uuid::new_v4(), Uuid::new_v4());
        chat.add_member(project, user);
        chat.fail_writes();
        let (listener, mut rx) = state.relay.connect();
        state.relay.subscribe(listener, project).unwrap();

        let err = send_message(&state, command(project, user, "hi")).await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_delivery_keeps_the_stored_message() {
        let chat = Arc::new(MemoryChatStore::default());
        let state = AppState::fake_with(Arc::new(MemoryMatchStore::default()), chat.clone());
        let (project, user) = (Uuid::new_v4(), Uuid::new_v4());
        chat.add_member(project, user);
        let (gone, rx) = state.relay.connect();
        state.relay.subscribe(gone, project).unwrap();
        drop(rx);

        send_message(&state, command(project, user, "still saved")).await.unwrap();
        assert_eq!(chat.stored().len(), 1);
        assert_eq!(state.relay.room_size(project), 0);
    }

    #[tokio::test]
    async fn history_is_newest_last_and_limited() {
        let chat = Arc::new(MemoryChatStore::default());
        let state = AppState::fake_with(Arc::new(MemoryMatchStore::default()), chat.clone());
        let (project, user) = (Uuid::new_v4(), Uuid::new_v4());
        chat.add_member(project, user);
        for n in 0..5 {
            send_message(&state, command(project, user, &format!("m{n}"))).await.unwrap();
        }

        let messages = history(&state, project, 3).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }
}
