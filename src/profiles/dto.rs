use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Profile;
use crate::error::AppResult;
use crate::extract::{require, require_text};
use crate::skills::{category_or_default, dedupe_by_name, validate_level};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Option<Uuid>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub skills: Option<Vec<SkillInput>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserSkill {
    pub name: String,
    pub category: String,
    pub proficiency: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    /// `None` leaves the skill set untouched; `Some(vec![])` clears it.
    pub skills: Option<Vec<NewUserSkill>>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> AppResult<ProfileUpdate> {
        let user_id = require(self.user_id, "User ID is required")?;
        let skills = self
            .skills
            .map(|items| {
                items
                    .into_iter()
                    .map(|input| {
                        Ok(NewUserSkill {
                            name: require_text(input.name, "Skill name is required")?,
                            category: category_or_default(input.category),
                            proficiency: validate_level(
                                require(input.proficiency, "Proficiency is required")?,
                                "Proficiency",
                            )?,
                        })
                    })
                    .collect::<AppResult<Vec<_>>>()
                    .map(|skills| dedupe_by_name(skills, |s| s.name.as_str()))
            })
            .transpose()?;

        Ok(ProfileUpdate {
            user_id,
            name: self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            bio: self.bio,
            avatar: self.avatar,
            skills,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: &'static str,
    pub user: Profile,
}
