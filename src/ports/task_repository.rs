use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::{
    FieldErrors, Page, ProjectId, ProjectPreview, Skill, Task, TaskFile, TaskId, TaskMember,
    TaskMemberId, TaskPreview, TaskSearch, UserPreview,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimit(u64),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Records behind the `tasks` and `tasks/previews` endpoints.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_task(&self, id: &TaskId) -> RepositoryResult<Task>;
    async fn search_tasks(&self, query: &TaskSearch) -> RepositoryResult<Page<TaskPreview>>;
    async fn list_project_tasks(&self, project: &ProjectId) -> RepositoryResult<Vec<Task>>;
    async fn create_task(&self, task: &Task) -> RepositoryResult<Task>;
    async fn update_task(&self, id: &TaskId, task: &Task) -> RepositoryResult<Task>;
}

/// Records behind `tasks/members`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskMemberRepository: Send + Sync {
    async fn list_members(&self, task: &TaskId) -> RepositoryResult<Vec<TaskMember>>;
    async fn create_member(&self, member: &TaskMember) -> RepositoryResult<TaskMember>;
    async fn update_member(
        &self,
        id: &TaskMemberId,
        member: &TaskMember,
    ) -> RepositoryResult<TaskMember>;
}

/// Records behind `tasks/files`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TaskFileRepository: Send + Sync {
    async fn list_files(&self, task: &TaskId) -> RepositoryResult<Vec<TaskFile>>;
    async fn upload_file(&self, file: &TaskFile) -> RepositoryResult<TaskFile>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<ProjectPreview>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_current_user(&self) -> RepositoryResult<UserPreview>;
}
