//! Skill catalogue helpers shared by profiles and projects.

use std::collections::HashSet;

use anyhow::Context;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_REQUIRED_LEVEL: i32 = 3;
pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 5;

/// Check a proficiency or required level against `1..=5`.
pub fn validate_level(value: i32, field: &str) -> AppResult<i32> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::validation(format!(
            "{field} must be between {MIN_LEVEL} and {MAX_LEVEL}"
        )))
    }
}

pub fn category_or_default(category: Option<String>) -> String {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Drop repeated skill names, keeping the first occurrence.
pub fn dedupe_by_name<T>(items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(name(item).to_string()))
        .collect()
}

/// Find or create a skill by name. An existing skill keeps its category.
pub async fn upsert_skill_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    category: &str,
) -> anyhow::Result<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO skills (name, category)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(category)
    .fetch_one(&mut **tx)
    .await
    .with_context(|| format!("upsert skill {name}"))?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_outside_one_to_five_are_rejected() {
        assert_eq!(validate_level(1, "Level").unwrap(), 1);
        assert_eq!(validate_level(5, "Level").unwrap(), 5);
        for bad in [0, 6, -1] {
            let err = validate_level(bad, "Proficiency").unwrap_err();
            assert_eq!(err.to_string(), "Proficiency must be between 1 and 5");
        }
    }

    #[test]
    fn blank_category_defaults_to_general() {
        assert_eq!(category_or_default(None), "General");
        assert_eq!(category_or_default(Some("  ".into())), "General");
        assert_eq!(category_or_default(Some(" Frontend ".into())), "Frontend");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let items = vec![("React", 3), ("Go", 2), ("React", 5)];
        let out = dedupe_by_name(items, |item| item.0);
        assert_eq!(out, vec![("React", 3), ("Go", 2)]);
    }
}
