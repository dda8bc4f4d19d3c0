use anyhow::Context;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::ProfileUpdate,
    repo::{clear_user_skills_tx, find_user, insert_user_skill_tx, profile_skills, update_user_tx},
    repo_types::Profile,
};
use crate::{
    error::{AppError, AppResult},
    skills::upsert_skill_tx,
    state::AppState,
};

pub async fn load_profile(state: &AppState, user_id: Uuid) -> AppResult<Profile> {
    let user = find_user(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let skills = profile_skills(&state.db, user_id).await?;
    Ok(Profile::from_parts(user, skills))
}

/// Apply a profile update. A present skill list replaces the user's skills
/// wholesale inside the same transaction.
#[instrument(skip(state, update), fields(user_id = %update.user_id))]
pub async fn update_profile(state: &AppState, update: ProfileUpdate) -> AppResult<Profile> {
    let mut tx = state.db.begin().await.context("begin update profile")?;

    let user = update_user_tx(
        &mut tx,
        update.user_id,
        update.name.as_deref(),
        update.bio.as_deref(),
        update.avatar.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    if let Some(skills) = update.skills {
        clear_user_skills_tx(&mut tx, user.id).await?;
        for skill in &skills {
            let skill_id = upsert_skill_tx(&mut tx, &skill.name, &skill.category).await?;
            insert_user_skill_tx(&mut tx, user.id, skill_id, skill.proficiency).await?;
        }
        info!(count = skills.len(), "profile skills replaced");
    }

    tx.commit().await.context("commit update profile")?;

    // Re-read so existing skills report their catalogue category.
    let skills = profile_skills(&state.db, user.id).await?;
    info!("profile updated");
    Ok(Profile::from_parts(user, skills))
}
