use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{MatchmakingQuery, MatchmakingResponse, UserSkillView},
    services::{recommend, RecommendOutcome},
};
use crate::{
    error::{AppError, AppResult},
    extract::require_uuid,
    state::AppState,
};

pub fn matchmaking_routes() -> Router<AppState> {
    Router::new().route("/matchmaking", get(get_recommendations))
}

/// GET /matchmaking?userId=
#[instrument(skip(state))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<MatchmakingQuery>,
) -> AppResult<Json<MatchmakingResponse>> {
    let user_id = require_uuid(query.user_id.as_deref(), "User ID is required")?;

    if !state.matches.user_exists(user_id).await? {
        warn!(%user_id, "matchmaking for unknown user");
        return Err(AppError::not_found("User not found"));
    }

    let response = match recommend(state.matches.as_ref(), user_id).await? {
        RecommendOutcome::NoSkills => MatchmakingResponse::no_skills(),
        RecommendOutcome::Ranked {
            recommendations,
            user_skills,
        } => {
            info!(%user_id, count = recommendations.len(), "recommendations computed");
            MatchmakingResponse::Ranked {
                recommendations,
                user_skills: user_skills.into_iter().map(UserSkillView::from).collect(),
            }
        }
    };
    Ok(Json(response))
}
