use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// One entry of a user's skill profile.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserSkill {
    pub skill_id: Uuid,
    pub name: String,
    pub proficiency: i32,
}

/// Open project row before its requirements are attached.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub team_size: i32,
    pub member_count: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct RequirementRow {
    pub project_id: Uuid,
    pub skill_id: Uuid,
    pub name: String,
    pub level: i32,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredSkill {
    #[serde(skip)]
    pub skill_id: Uuid,
    #[serde(rename = "skill")]
    pub name: String,
    pub level: i32,
    pub required: bool,
}

impl From<RequirementRow> for RequiredSkill {
    fn from(r: RequirementRow) -> Self {
        Self {
            skill_id: r.skill_id,
            name: r.name,
            level: r.level,
            required: r.required,
        }
    }
}

/// A project the user could join, with everything the scorer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProject {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub team_size: i32,
    pub member_count: i64,
    pub required_skills: Vec<RequiredSkill>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CandidateProject {
    pub fn from_row(r: CandidateRow, required_skills: Vec<RequiredSkill>) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            status: r.status,
            team_size: r.team_size,
            member_count: r.member_count,
            required_skills,
            created_at: r.created_at,
        }
    }
}
