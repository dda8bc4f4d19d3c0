use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{ProfileSkill, UserRow};

pub async fn find_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"SELECT id, email, name, bio, avatar FROM users WHERE id = $1"#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load user")?;
    Ok(row)
}

pub async fn profile_skills(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ProfileSkill>> {
    let rows = sqlx::query_as::<_, ProfileSkill>(
        r#"
        SELECT s.name, s.category, us.proficiency
          FROM user_skills us
          JOIN skills s ON s.id = us.skill_id
         WHERE us.user_id = $1
         ORDER BY s.name
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("load profile skills")?;
    Ok(rows)
}

/// Update only the provided columns. Returns `None` when the user is unknown.
pub async fn update_user_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    name: Option<&str>,
    bio: Option<&str>,
    avatar: Option<&str>,
) -> anyhow::Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
           SET name = COALESCE($2, name),
               bio = COALESCE($3, bio),
               avatar = COALESCE($4, avatar)
         WHERE id = $1
        RETURNING id, email, name, bio, avatar
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(bio)
    .bind(avatar)
    .fetch_optional(&mut **tx)
    .await
    .context("update user")?;
    Ok(row)
}

pub async fn clear_user_skills_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM user_skills WHERE user_id = $1"#)
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("clear user skills")?;
    Ok(())
}

pub async fn insert_user_skill_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    skill_id: Uuid,
    proficiency: i32,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_skills (user_id, skill_id, proficiency)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(skill_id)
    .bind(proficiency)
    .execute(&mut **tx)
    .await
    .context("insert user skill")?;
    Ok(())
}
