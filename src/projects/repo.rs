use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{
    JoinTarget, ProjectDetails, ProjectFilter, ProjectMember, ProjectRow, ProjectSkillRow,
    ProjectSkillView, ProjectStatus, TeamMember, TeamMemberRow,
};

/// Read side of projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Projects matching `filter`, newest first.
    async fn list_projects(&self, filter: &ProjectFilter) -> anyhow::Result<Vec<ProjectDetails>>;

    async fn find_project(&self, project_id: Uuid) -> anyhow::Result<Option<ProjectDetails>>;

    /// Members in join order, or `None` when the project does not exist.
    async fn list_members(&self, project_id: Uuid) -> anyhow::Result<Option<Vec<TeamMember>>>;
}

#[derive(Clone)]
pub struct PgProjectStore {
    db: PgPool,
}

impl PgProjectStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn details_for(&self, rows: Vec<ProjectRow>) -> anyhow::Result<Vec<ProjectDetails>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let skills = sqlx::query_as::<_, ProjectSkillRow>(
            r#"
            SELECT ps.project_id, s.name, s.category, ps.level, ps.required
              FROM project_skills ps
              JOIN skills s ON s.id = ps.skill_id
             WHERE ps.project_id = ANY($1)
             ORDER BY s.name
            "#,
        )
        .bind(ids.clone())
        .fetch_all(&self.db)
        .await
        .context("load project skills")?;

        let members = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "{MEMBERS_SELECT} WHERE pm.project_id = ANY($1) {MEMBERS_ORDER}"
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("load project members")?;

        assemble_projects(rows, skills, members)
    }
}

const PROJECT_COLUMNS: &str = "p.id, p.title, p.description, p.team_size, p.status, p.created_at";

const MEMBERS_SELECT: &str = r#"
    SELECT pm.project_id, pm.user_id, pm.role, pm.joined_at, u.name, u.email, u.avatar
      FROM project_members pm
      JOIN users u ON u.id = pm.user_id
"#;

const MEMBERS_ORDER: &str = "ORDER BY pm.joined_at ASC, pm.user_id ASC";

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> anyhow::Result<Vec<ProjectDetails>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
              FROM projects p
             WHERE ($1::text IS NULL OR p.status = $1)
               AND ($2::text IS NULL OR p.title ILIKE $2 OR p.description ILIKE $2)
               AND ($3::text IS NULL OR EXISTS (
                     SELECT 1 FROM project_skills ps
                       JOIN skills s ON s.id = ps.skill_id
                      WHERE ps.project_id = p.id AND lower(s.name) = lower($3)
                   ))
             ORDER BY p.created_at DESC, p.id DESC
            "#
        ))
        .bind(filter.status.map(ProjectStatus::as_str))
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(filter.skill.as_deref())
        .fetch_all(&self.db)
        .await
        .context("list projects")?;

        self.details_for(rows).await
    }

    async fn find_project(&self, project_id: Uuid) -> anyhow::Result<Option<ProjectDetails>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = $1"
        ))
        .bind(project_id)
        .fetch_optional(&self.db)
        .await
        .context("load project")?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.details_for(vec![row]).await?.pop())
    }

    async fn list_members(&self, project_id: Uuid) -> anyhow::Result<Option<Vec<TeamMember>>> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)"#,
        )
        .bind(project_id)
        .fetch_one(&self.db)
        .await
        .context("check project exists")?;
        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "{MEMBERS_SELECT} WHERE pm.project_id = $1 {MEMBERS_ORDER}"
        ))
        .bind(project_id)
        .fetch_all(&self.db)
        .await
        .context("list project members")?;
        Ok(Some(rows.into_iter().map(TeamMember::from).collect()))
    }
}

/// `%term%` for ILIKE, with the pattern metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Attach skills and members to their projects, keeping project order.
pub fn assemble_projects(
    rows: Vec<ProjectRow>,
    skills: Vec<ProjectSkillRow>,
    members: Vec<TeamMemberRow>,
) -> anyhow::Result<Vec<ProjectDetails>> {
    let mut skills_by: HashMap<Uuid, Vec<ProjectSkillView>> = HashMap::new();
    for skill in skills {
        skills_by
            .entry(skill.project_id)
            .or_default()
            .push(ProjectSkillView::from(skill));
    }
    let mut members_by: HashMap<Uuid, Vec<TeamMember>> = HashMap::new();
    for member in members {
        members_by
            .entry(member.project_id)
            .or_default()
            .push(TeamMember::from(member));
    }

    rows.into_iter()
        .map(|row| {
            let skills = skills_by.remove(&row.id).unwrap_or_default();
            let members = members_by.remove(&row.id).unwrap_or_default();
            ProjectDetails::from_row(row, skills, members)
        })
        .collect()
}

pub async fn user_exists_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<bool> {
    let found = sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)"#)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
        .context("check user exists")?;
    Ok(found)
}

pub async fn insert_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    title: &str,
    description: &str,
    team_size: i32,
) -> anyhow::Result<ProjectRow> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects (title, description, team_size, status)
        VALUES ($1, $2, $3, 'open')
        RETURNING id, title, description, team_size, status, created_at
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(team_size)
    .fetch_one(&mut **tx)
    .await
    .context("insert project")?;
    Ok(row)
}

pub async fn insert_requirement_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    skill_id: Uuid,
    level: i32,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO project_skills (project_id, skill_id, level, required)
        VALUES ($1, $2, $3, TRUE)
        "#,
    )
    .bind(project_id)
    .bind(skill_id)
    .bind(level)
    .execute(&mut **tx)
    .await
    .context("insert project skill")?;
    Ok(())
}

pub async fn insert_member_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    user_id: Uuid,
    role: &str,
) -> anyhow::Result<ProjectMember> {
    let member = sqlx::query_as::<_, ProjectMember>(
        r#"
        INSERT INTO project_members (project_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING project_id, user_id, role, joined_at
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .context("insert project member")?;
    Ok(member)
}

/// Lock the project row for the rest of the transaction and count members.
pub async fn lock_join_target_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> anyhow::Result<Option<JoinTarget>> {
    let row = sqlx::query_as::<_, (Uuid, String, i32)>(
        r#"SELECT id, status, team_size FROM projects WHERE id = $1 FOR UPDATE"#,
    )
    .bind(project_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock project")?;

    let Some((id, status, team_size)) = row else {
        return Ok(None);
    };

    let member_count = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM project_members WHERE project_id = $1"#,
    )
    .bind(project_id)
    .fetch_one(&mut **tx)
    .await
    .context("count project members")?;

    Ok(Some(JoinTarget {
        id,
        status: status.parse()?,
        team_size,
        member_count,
    }))
}

pub async fn is_member_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<bool> {
    let found = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM project_members
             WHERE project_id = $1 AND user_id = $2
        )
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
    .context("check project membership")?;
    Ok(found)
}

pub async fn set_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    status: ProjectStatus,
) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE projects SET status = $2 WHERE id = $1"#)
        .bind(project_id)
        .bind(status.as_str())
        .execute(&mut **tx)
        .await
        .context("update project status")?;
    Ok(())
}
