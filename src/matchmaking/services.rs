//! Skill-based project matchmaking.
//!
//! A project's score is the mean per-skill contribution across all of its
//! required skills (missing skills count as zero) plus an urgency bonus of ten
//! points per open seat. Ranking uses the unrounded score; the rounded value
//! is only for display.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    repo::MatchStore,
    repo_types::{CandidateProject, UserSkill},
};
use crate::error::AppResult;

pub const MAX_RECOMMENDATIONS: usize = 10;
pub const URGENCY_POINTS_PER_SEAT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub skill: String,
    pub user_proficiency: i32,
    pub required_level: i32,
    pub match_percentage: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub project: CandidateProject,
    pub match_score: i64,
    pub matched_skills: Vec<SkillMatch>,
    pub urgency_score: i64,
    #[serde(skip)]
    pub score: f64,
}

#[derive(Debug, Clone)]
pub enum RecommendOutcome {
    /// The user has not declared any skills; distinct from an empty ranking.
    NoSkills,
    Ranked {
        recommendations: Vec<Recommendation>,
        user_skills: Vec<UserSkill>,
    },
}

/// `min(P, L) / L * 100`; never above 100.
pub fn skill_contribution(proficiency: i32, required_level: i32) -> f64 {
    let level = required_level.max(1);
    let capped = proficiency.clamp(0, level);
    f64::from(capped) / f64::from(level) * 100.0
}

/// `max(0, (team_size - member_count) * 10)`, uncapped.
pub fn urgency_bonus(team_size: i32, member_count: i64) -> f64 {
    let open_seats = i64::from(team_size) - member_count;
    (open_seats as f64 * URGENCY_POINTS_PER_SEAT).max(0.0)
}

/// Score one project against a skill profile keyed by skill id.
pub fn score_project(
    skills: &HashMap<Uuid, &UserSkill>,
    project: CandidateProject,
) -> Recommendation {
    let mut total = 0.0;
    let mut matched_skills = Vec::new();

    for required in &project.required_skills {
        let Some(user_skill) = skills.get(&required.skill_id) else {
            continue;
        };
        let contribution = skill_contribution(user_skill.proficiency, required.level);
        total += contribution;
        matched_skills.push(SkillMatch {
            skill: required.name.clone(),
            user_proficiency: user_skill.proficiency,
            required_level: required.level,
            match_percentage: contribution.round() as i64,
        });
    }

    let raw = if project.required_skills.is_empty() {
        0.0
    } else {
        total / project.required_skills.len() as f64
    };
    let score = raw + urgency_bonus(project.team_size, project.member_count);

    Recommendation {
        match_score: score.round() as i64,
        urgency_score: i64::from(project.team_size) - project.member_count,
        matched_skills,
        score,
        project,
    }
}

/// Score every candidate, sort by descending score and keep the top ten.
///
/// `sort_by` is stable, so equal scores keep the candidates' retrieval order.
pub fn rank(user_skills: &[UserSkill], candidates: Vec<CandidateProject>) -> Vec<Recommendation> {
    let by_id: HashMap<Uuid, &UserSkill> = user_skills.iter().map(|s| (s.skill_id, s)).collect();
    let mut scored: Vec<Recommendation> = candidates
        .into_iter()
        .map(|project| score_project(&by_id, project))
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(MAX_RECOMMENDATIONS);
    scored
}

/// Recommend open projects for a user. Pure read; nothing is written.
#[instrument(skip(store))]
pub async fn recommend(store: &dyn MatchStore, user_id: Uuid) -> AppResult<RecommendOutcome> {
    let user_skills = store.user_skills(user_id).await?;
    if user_skills.is_empty() {
        debug!("user has no skills");
        return Ok(RecommendOutcome::NoSkills);
    }

    let candidates = store.open_projects_excluding_member(user_id).await?;
    let candidate_count = candidates.len();
    let recommendations = rank(&user_skills, candidates);
    debug!(candidate_count, returned = recommendations.len(), "ranked projects");

    Ok(RecommendOutcome::Ranked {
        recommendations,
        user_skills,
    })
}
