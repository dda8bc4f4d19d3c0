use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{
    Project, ProjectDetails, ProjectFilter, ProjectMember, ProjectStatus, TeamMember,
};
use crate::error::{AppError, AppResult};
use crate::extract::{require, require_text};
use crate::skills::{category_or_default, dedupe_by_name, validate_level, DEFAULT_REQUIRED_LEVEL};

const CREATE_REQUIRED: &str = "Title, description, team size, and user ID are required";
const JOIN_REQUIRED: &str = "Project ID and user ID are required";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequiredSkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub team_size: Option<i32>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub required_skills: Vec<RequiredSkillInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRequirement {
    pub name: String,
    pub category: String,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub team_size: i32,
    pub owner_id: Uuid,
    pub required_skills: Vec<NewRequirement>,
}

impl CreateProjectRequest {
    pub fn validate(self) -> AppResult<NewProject> {
        let title = require_text(self.title, CREATE_REQUIRED)?;
        let description = require_text(self.description, CREATE_REQUIRED)?;
        let team_size = require(self.team_size, CREATE_REQUIRED)?;
        let owner_id = require(self.user_id, CREATE_REQUIRED)?;
        if team_size < 1 {
            return Err(AppError::validation("Team size must be at least 1"));
        }

        let required_skills = self
            .required_skills
            .into_iter()
            .map(|input| {
                Ok(NewRequirement {
                    name: require_text(input.name, "Skill name is required")?,
                    category: category_or_default(input.category),
                    level: validate_level(input.level.unwrap_or(DEFAULT_REQUIRED_LEVEL), "Skill level")?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(NewProject {
            title,
            description,
            team_size,
            owner_id,
            required_skills: dedupe_by_name(required_skills, |r| r.name.as_str()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinProjectRequest {
    pub project_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinProject {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

impl JoinProjectRequest {
    pub fn validate(self) -> AppResult<JoinProject> {
        Ok(JoinProject {
            project_id: require(self.project_id, JOIN_REQUIRED)?,
            user_id: require(self.user_id, JOIN_REQUIRED)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub message: &'static str,
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct JoinProjectResponse {
    pub message: &'static str,
    pub member: ProjectMember,
}

/// `GET /projects?status=&skill=&search=`. `all` or a blank value disables a
/// filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub skill: Option<String>,
    pub search: Option<String>,
}

fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ProjectListQuery {
    pub fn validate(self) -> AppResult<ProjectFilter> {
        let status = filter_value(self.status)
            .map(|raw| {
                raw.parse::<ProjectStatus>()
                    .map_err(|_| AppError::validation(format!("Unknown project status: {raw}")))
            })
            .transpose()?;
        let search = self
            .search
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(ProjectFilter {
            status,
            skill: filter_value(self.skill),
            search,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectDetails>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: ProjectDetails,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<TeamMember>,
}
