use anyhow::Context;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{JoinProject, NewProject},
    repo::{
        insert_member_tx, insert_project_tx, insert_requirement_tx, is_member_tx,
        lock_join_target_tx, set_status_tx, user_exists_tx,
    },
    repo_types::{
        JoinTarget, Project, ProjectDetails, ProjectFilter, ProjectMember, ProjectSkillView,
        ProjectStatus, TeamMember,
    },
};
use crate::{
    error::{AppError, AppResult},
    skills::upsert_skill_tx,
    state::AppState,
};

pub const OWNER_ROLE: &str = "owner";
pub const MEMBER_ROLE: &str = "member";

/// Create a project, its owner membership and its skill requirements in one
/// transaction.
#[instrument(skip(state, cmd), fields(owner_id = %cmd.owner_id))]
pub async fn create_project(state: &AppState, cmd: NewProject) -> AppResult<Project> {
    let mut tx = state.db.begin().await.context("begin create project")?;

    if !user_exists_tx(&mut tx, cmd.owner_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    let row = insert_project_tx(&mut tx, &cmd.title, &cmd.description, cmd.team_size).await?;
    let owner = insert_member_tx(&mut tx, row.id, cmd.owner_id, OWNER_ROLE).await?;

    let mut required_skills = Vec::with_capacity(cmd.required_skills.len());
    for requirement in cmd.required_skills {
        let skill_id = upsert_skill_tx(&mut tx, &requirement.name, &requirement.category).await?;
        insert_requirement_tx(&mut tx, row.id, skill_id, requirement.level).await?;
        required_skills.push(ProjectSkillView {
            skill: requirement.name,
            category: requirement.category,
            level: requirement.level,
            required: true,
        });
    }

    tx.commit().await.context("commit create project")?;
    info!(project_id = %row.id, skills = required_skills.len(), "project created");

    Ok(Project {
        id: row.id,
        title: row.title,
        description: row.description,
        team_size: row.team_size,
        status: row.status.parse()?,
        created_at: row.created_at,
        required_skills,
        members: vec![owner],
    })
}

/// Decide whether a user may join `target`. Returns `true` when the new
/// member fills the last seat.
pub fn admit(target: &JoinTarget, already_member: bool) -> AppResult<bool> {
    if target.status != ProjectStatus::Open {
        return Err(AppError::Rejected(
            "Project is not accepting new members".into(),
        ));
    }
    if already_member {
        return Err(AppError::Rejected(
            "User is already a member of this project".into(),
        ));
    }
    let team_size = i64::from(target.team_size);
    if target.member_count >= team_size {
        return Err(AppError::Rejected(
            "Project has reached its team size limit".into(),
        ));
    }
    Ok(target.member_count + 1 >= team_size)
}

/// Add a member under a row lock so concurrent joins cannot overfill the team.
/// A join that fills the last seat moves the project to `in_progress`.
#[instrument(skip(state), fields(project_id = %cmd.project_id, user_id = %cmd.user_id))]
pub async fn join_project(state: &AppState, cmd: JoinProject) -> AppResult<ProjectMember> {
    let mut tx = state.db.begin().await.context("begin join project")?;

    let Some(target) = lock_join_target_tx(&mut tx, cmd.project_id).await? else {
        return Err(AppError::not_found("Project not found"));
    };
    if !user_exists_tx(&mut tx, cmd.user_id).await? {
        return Err(AppError::not_found("User not found"));
    }

    let already_member = is_member_tx(&mut tx, cmd.project_id, cmd.user_id).await?;
    let fills_team = admit(&target, already_member).inspect_err(|e| {
        warn!(error = %e, "join rejected");
    })?;

    let member = insert_member_tx(&mut tx, cmd.project_id, cmd.user_id, MEMBER_ROLE).await?;
    if fills_team {
        set_status_tx(&mut tx, cmd.project_id, ProjectStatus::InProgress).await?;
        info!("team is full, project moved to in_progress");
    }

    tx.commit().await.context("commit join project")?;
    info!("member joined project");
    Ok(member)
}

#[instrument(skip(state))]
pub async fn list_projects(state: &AppState, filter: ProjectFilter) -> AppResult<Vec<ProjectDetails>> {
    let projects = state.projects.list_projects(&filter).await?;
    debug!(count = projects.len(), "projects listed");
    Ok(projects)
}

pub async fn project_details(state: &AppState, project_id: Uuid) -> AppResult<ProjectDetails> {
    state
        .projects
        .find_project(project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))
}

pub async fn team_members(state: &AppState, project_id: Uuid) -> AppResult<Vec<TeamMember>> {
    state
        .projects
        .list_members(project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))
}
