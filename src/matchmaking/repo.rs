use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{CandidateProject, CandidateRow, RequiredSkill, RequirementRow, UserSkill};

/// Read side the scorer depends on.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn user_exists(&self, user_id: Uuid) -> anyhow::Result<bool>;

    async fn user_skills(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSkill>>;

    /// Every `open` project the user is not a member of, in retrieval order.
    async fn open_projects_excluding_member(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<CandidateProject>>;
}

#[derive(Clone)]
pub struct PgMatchStore {
    db: PgPool,
}

impl PgMatchStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn user_exists(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)"#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("check user exists")?;
        Ok(found)
    }

    async fn user_skills(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSkill>> {
        let rows = sqlx::query_as::<_, UserSkill>(
            r#"
            SELECT us.skill_id, s.name, us.proficiency
              FROM user_skills us
              JOIN skills s ON s.id = us.skill_id
             WHERE us.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("load user skills")?;
        Ok(rows)
    }

    async fn open_projects_excluding_member(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<CandidateProject>> {
        // No ORDER BY: ties in the ranking keep whatever order Postgres returns.
        let projects = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT p.id, p.title, p.description, p.status, p.team_size,
                   (SELECT COUNT(*) FROM project_members pm WHERE pm.project_id = p.id) AS member_count,
                   p.created_at
              FROM projects p
             WHERE p.status = 'open'
               AND NOT EXISTS (
                   SELECT 1 FROM project_members pm
                    WHERE pm.project_id = p.id AND pm.user_id = $1
               )
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("load open projects")?;

        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let requirements = sqlx::query_as::<_, RequirementRow>(
            r#"
            SELECT ps.project_id, ps.skill_id, s.name, ps.level, ps.required
              FROM project_skills ps
              JOIN skills s ON s.id = ps.skill_id
             WHERE ps.project_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("load project skill requirements")?;

        Ok(attach_requirements(projects, requirements))
    }
}

/// Group requirement rows under their projects, keeping project order.
pub fn attach_requirements(
    projects: Vec<CandidateRow>,
    requirements: Vec<RequirementRow>,
) -> Vec<CandidateProject> {
    let mut by_project: HashMap<Uuid, Vec<RequiredSkill>> = HashMap::new();
    for req in requirements {
        by_project
            .entry(req.project_id)
            .or_default()
            .push(RequiredSkill::from(req));
    }
    projects
        .into_iter()
        .map(|row| {
            let skills = by_project.remove(&row.id).unwrap_or_default();
            CandidateProject::from_row(row, skills)
        })
        .collect()
}
