use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{HistoryQuery, HistoryResponse, SendMessageRequest, SendMessageResponse},
    services,
};
use crate::{error::AppResult, extract::ApiJson, state::AppState};

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", get(list_messages).post(post_message))
}

#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let (project_id, limit) = query.validate()?;
    let messages = services::history(&state, project_id, limit).await?;
    Ok(Json(HistoryResponse { messages }))
}

#[instrument(skip(state, payload))]
pub async fn post_message(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendMessageRequest>,
) -> AppResult<Json<SendMessageResponse>> {
    let command = payload.validate()?;
    let chat_message = services::send_message(&state, command).await?;
    Ok(Json(SendMessageResponse {
        message: "Message sent successfully".into(),
        chat_message,
    }))
}
