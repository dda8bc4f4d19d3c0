use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ProfileSkill {
    #[sqlx(rename = "name")]
    pub skill: String,
    pub category: String,
    pub proficiency: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub skills: Vec<ProfileSkill>,
}

impl Profile {
    pub fn from_parts(user: UserRow, skills: Vec<ProfileSkill>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            bio: user.bio,
            avatar: user.avatar,
            skills,
        }
    }
}
