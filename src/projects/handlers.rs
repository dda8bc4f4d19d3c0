use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        CreateProjectRequest, CreateProjectResponse, JoinProjectRequest, JoinProjectResponse,
        MembersResponse, ProjectListQuery, ProjectListResponse, ProjectResponse,
    },
    services,
};
use crate::{
    error::AppResult,
    extract::{require_uuid, ApiJson},
    state::AppState,
};

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/join", post(join_project))
        .route("/projects/:id", get(get_project))
        .route("/projects/:id/members", get(list_members))
}

/// GET /projects?status=&skill=&search=
#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<ProjectListResponse>> {
    let filter = query.validate()?;
    let projects = services::list_projects(&state, filter).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /projects/:id
#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProjectResponse>> {
    let project_id = require_uuid(Some(id.as_str()), "Project ID is required")?;
    let project = services::project_details(&state, project_id).await?;
    Ok(Json(ProjectResponse { project }))
}

/// GET /projects/:id/members
#[instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MembersResponse>> {
    let project_id = require_uuid(Some(id.as_str()), "Project ID is required")?;
    let members = services::team_members(&state, project_id).await?;
    Ok(Json(MembersResponse { members }))
}

/// POST /projects
#[instrument(skip(state, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<CreateProjectResponse>)> {
    let cmd = payload.validate()?;
    let project = services::create_project(&state, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            message: "Project created successfully",
            project,
        }),
    ))
}

/// POST /projects/join
#[instrument(skip(state, payload))]
pub async fn join_project(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<JoinProjectRequest>,
) -> AppResult<Json<JoinProjectResponse>> {
    let cmd = payload.validate()?;
    let member = services::join_project(&state, cmd).await?;
    Ok(Json(JoinProjectResponse {
        message: "Successfully joined the project",
        member,
    }))
}
