use std::{fmt, str::FromStr};

use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Project lifecycle: `open → in_progress → completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectStatus::Open),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            other => anyhow::bail!("unknown project status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub team_size: i32,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Locked project state read at the start of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTarget {
    pub id: Uuid,
    pub status: ProjectStatus,
    pub team_size: i32,
    pub member_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSkillView {
    pub skill: String,
    pub category: String,
    pub level: i32,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub team_size: i32,
    pub status: ProjectStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub required_skills: Vec<ProjectSkillView>,
    pub members: Vec<ProjectMember>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProjectSkillRow {
    pub project_id: Uuid,
    pub name: String,
    pub category: String,
    pub level: i32,
    pub required: bool,
}

impl From<ProjectSkillRow> for ProjectSkillView {
    fn from(r: ProjectSkillRow) -> Self {
        Self {
            skill: r.name,
            category: r.category,
            level: r.level,
            required: r.required,
        }
    }
}

/// Member row joined with the user's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberRow {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: OffsetDateTime,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    pub user: MemberProfile,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(r: TeamMemberRow) -> Self {
        Self {
            project_id: r.project_id,
            user_id: r.user_id,
            role: r.role,
            joined_at: r.joined_at,
            user: MemberProfile {
                id: r.user_id,
                name: r.name,
                email: r.email,
                avatar: r.avatar,
            },
        }
    }
}

/// A stored project with its requirements and team, as read back by clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub team_size: i32,
    pub status: ProjectStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub member_count: usize,
    pub required_skills: Vec<ProjectSkillView>,
    pub members: Vec<TeamMember>,
}

impl ProjectDetails {
    pub fn from_row(
        row: ProjectRow,
        required_skills: Vec<ProjectSkillView>,
        members: Vec<TeamMember>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            status: row.status.parse()?,
            title: row.title,
            description: row.description,
            team_size: row.team_size,
            created_at: row.created_at,
            member_count: members.len(),
            required_skills,
            members,
        })
    }
}

/// Listing filters. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Exact skill name, compared case-insensitively.
    pub skill: Option<String>,
    /// Substring of the title or description, case-insensitive.
    pub search: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &ProjectDetails) -> bool {
        if self.status.is_some_and(|status| status != project.status) {
            return false;
        }
        if let Some(skill) = &self.skill {
            let wanted = skill.to_lowercase();
            if !project
                .required_skills
                .iter()
                .any(|s| s.skill.to_lowercase() == wanted)
            {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !project.title.to_lowercase().contains(&needle)
                && !project.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}
