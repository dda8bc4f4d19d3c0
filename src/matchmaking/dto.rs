use serde::{Deserialize, Serialize};

use super::{repo_types::UserSkill, services::Recommendation};

pub const NO_SKILLS_MESSAGE: &str =
    "No skills found for user. Please add skills to get recommendations.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSkillView {
    pub skill: String,
    pub proficiency: i32,
}

impl From<UserSkill> for UserSkillView {
    fn from(s: UserSkill) -> Self {
        Self {
            skill: s.name,
            proficiency: s.proficiency,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MatchmakingResponse {
    NoSkills {
        reason: &'static str,
        message: &'static str,
        recommendations: Vec<Recommendation>,
    },
    Ranked {
        recommendations: Vec<Recommendation>,
        #[serde(rename = "userSkills")]
        user_skills: Vec<UserSkillView>,
    },
}

impl MatchmakingResponse {
    pub fn no_skills() -> Self {
        Self::NoSkills {
            reason: "no_skills",
            message: NO_SKILLS_MESSAGE,
            recommendations: Vec::new(),
        }
    }
}
