//! In-memory store doubles for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::chat::repo::ChatStore;
use crate::chat::repo_types::{ChatAuthor, ChatMessage};
use crate::matchmaking::repo::MatchStore;
use crate::matchmaking::repo_types::{CandidateProject, UserSkill};
use crate::projects::repo::ProjectStore;
use crate::projects::repo_types::{ProjectDetails, ProjectFilter, TeamMember};

#[derive(Default)]
pub struct MemoryMatchStore {
    users: Mutex<HashMap<Uuid, Vec<UserSkill>>>,
    projects: Mutex<Vec<(CandidateProject, Vec<Uuid>)>>,
    failing: AtomicBool,
}

impl MemoryMatchStore {
    pub fn add_user(&self, user_id: Uuid, skills: Vec<UserSkill>) {
        self.users.lock().unwrap().insert(user_id, skills);
    }

    /// Projects are returned in the order they were added.
    pub fn add_project(&self, project: CandidateProject, members: Vec<Uuid>) {
        self.projects.lock().unwrap().push((project, members));
    }

    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("match store offline");
        }
        Ok(())
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn user_exists(&self, user_id: Uuid) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self.users.lock().unwrap().contains_key(&user_id))
    }

    async fn user_skills(&self, user_id: Uuid) -> anyhow::Result<Vec<UserSkill>> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn open_projects_excluding_member(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<CandidateProject>> {
        self.check()?;
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|(project, members)| project.status == "open" && !members.contains(&user_id))
            .map(|(project, _)| project.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryChatStore {
    members: Mutex<HashSet<(Uuid, Uuid)>>,
    messages: Mutex<Vec<ChatMessage>>,
    failing: AtomicBool,
}

impl MemoryChatStore {
    pub fn add_member(&self, project_id: Uuid, user_id: Uuid) {
        self.members.lock().unwrap().insert((project_id, user_id));
    }

    pub fn stored(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn is_member(&self, project_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.members.lock().unwrap().contains(&(project_id, user_id)))
    }

    async fn create_message(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<ChatMessage> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("chat store offline");
        }
        let message = ChatMessage {
            id: Uuid::new_v4(),
            content: content.to_string(),
            user_id,
            project_id,
            created_at: OffsetDateTime::now_utc(),
            user: ChatAuthor {
                id: user_id,
                name: Some("Test User".into()),
                avatar: None,
            },
        };
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, project_id: Uuid, limit: i64) -> anyhow::Result<Vec<ChatMessage>> {
        let messages = self.messages.lock().unwrap();
        let in_project: Vec<_> = messages
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        let skip = in_project.len().saturating_sub(limit.max(0) as usize);
        Ok(in_project.into_iter().skip(skip).collect())
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<Vec<ProjectDetails>>,
}

impl MemoryProjectStore {
    pub fn add_project(&self, project: ProjectDetails) {
        self.projects.lock().unwrap().push(project);
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> anyhow::Result<Vec<ProjectDetails>> {
        let mut out: Vec<_> = self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_project(&self, project_id: Uuid) -> anyhow::Result<Option<ProjectDetails>> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned())
    }

    async fn list_members(&self, project_id: Uuid) -> anyhow::Result<Option<Vec<TeamMember>>> {
        Ok(self.find_project(project_id).await?.map(|p| {
            let mut members = p.members;
            members.sort_by_key(|m| m.joined_at);
            members
        }))
    }
}
