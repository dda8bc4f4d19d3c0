use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ProfileQuery, ProfileResponse, UpdateProfileRequest, UpdateProfileResponse},
    services,
};
use crate::{
    error::AppResult,
    extract::{require_uuid, ApiJson},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// GET /profile?userId=
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<ProfileResponse>> {
    let user_id = require_uuid(query.user_id.as_deref(), "User ID is required")?;
    let user = services::load_profile(&state, user_id).await?;
    Ok(Json(ProfileResponse { user }))
}

/// PUT /profile
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<UpdateProfileResponse>> {
    let update = payload.validate()?;
    let user = services::update_profile(&state, update).await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully",
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn get_requires_a_valid_user_id() {
        let err = get_profile(
            State(AppState::fake()),
            Query(ProfileQuery {
                user_id: Some("not-a-uuid".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_rejects_bad_proficiency_before_the_store() {
        let payload: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "userId": uuid::Uuid::new_v4(),
            "skills": [{ "name": "Rust", "proficiency": 7 }]
        }))
        .unwrap();
        let err = update_profile(State(AppState::fake()), ApiJson(payload))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Proficiency must be between 1 and 5");
    }
}
