use super::{
    AppError, AppResult, ProjectOwnership, ProjectTaskDetail, ProjectTaskList, Repositories,
    TaskFileController, TaskFormController, TaskMemberController, TaskSearchController,
    TaskService,
};
use crate::adapters::cache::MokaCacheAdapter;
use crate::domain::*;
use crate::ports::{Cache, ConfigStore, RepositoryError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CachedList<T> {
    pub items: Vec<T>,
    pub fetched_at: DateTime<Utc>,
}

/// Session state shared by the CLI and the TUI: who is logged in, which
/// project is selected, and the cached project task lists. Also hands out
/// controllers wired to the right repositories.
pub struct StateManager {
    task_service: Arc<TaskService>,
    repositories: Repositories,
    config_store: Arc<dyn ConfigStore>,

    project_task_cache: DashMap<ProjectId, CachedList<Task>>,
    project_cache: Arc<dyn Cache<ProjectId, ProjectPreview>>,

    current_user: tokio::sync::RwLock<Option<UserPreview>>,
    current_project: tokio::sync::RwLock<Option<ProjectId>>,
}

impl StateManager {
    pub fn new(
        task_service: Arc<TaskService>,
        repositories: Repositories,
        config_store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            task_service,
            repositories,
            config_store,
            project_task_cache: DashMap::new(),
            project_cache: Arc::new(MokaCacheAdapter::<ProjectId, ProjectPreview>::with_default_settings()),
            current_user: tokio::sync::RwLock::new(None),
            current_project: tokio::sync::RwLock::new(None),
        }
    }

    pub async fn initialize(&self) -> AppResult<()> {
        let config = self.config_store.load_config().await?;

        // Load current user first to verify authentication
        match self.repositories.users.get_current_user().await {
            Ok(user) => {
                tracing::info!("Logged in as {}", user.username);
                *self.current_user.write().await = Some(user);
            }
            Err(RepositoryError::Authentication(reason)) => {
                tracing::warn!("Authentication failed: {}", reason);
                return Err(AppError::AuthenticationRequired);
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(project) = config.default_project {
            tracing::info!("Using project {}", project);
            *self.current_project.write().await = Some(project);
        }

        Ok(())
    }

    pub async fn get_current_user(&self) -> Option<UserPreview> {
        self.current_user.read().await.clone()
    }

    pub async fn get_current_project(&self) -> Option<ProjectId> {
        self.current_project.read().await.clone()
    }

    pub async fn set_current_project(&self, project: ProjectId) -> AppResult<()> {
        *self.current_project.write().await = Some(project.clone());

        let mut config = self.config_store.load_config().await?;
        config.default_project = Some(project);
        self.config_store.save_config(&config).await?;

        Ok(())
    }

    pub async fn get_project(&self, id: &ProjectId, use_cache: bool) -> AppResult<ProjectPreview> {
        if use_cache {
            if let Some(project) = self.project_cache.get(id).await {
                return Ok(project);
            }
        }

        let project = self.repositories.projects.get_project(id).await?;
        self.project_cache.insert(id.clone(), project.clone()).await;
        Ok(project)
    }

    pub async fn get_project_tasks(
        &self,
        project_id: &ProjectId,
        use_cache: bool,
    ) -> AppResult<ProjectTaskList> {
        let project = self.get_project(project_id, use_cache).await?;
        let current_user = self.get_current_user().await;

        if use_cache {
            if let Some(cached) = self.project_task_cache.get(project_id) {
                let age = Utc::now() - cached.fetched_at;
                if age < chrono::Duration::minutes(5) {
                    return Ok(ProjectTaskList::new(project, cached.items.clone(), current_user));
                }
            }
        }

        let tasks = self.task_service.list_project_tasks(project_id).await?;
        self.project_task_cache.insert(
            project_id.clone(),
            CachedList {
                items: tasks.clone(),
                fetched_at: Utc::now(),
            },
        );

        Ok(ProjectTaskList::new(project, tasks, current_user))
    }

    /// Writes a locally modified list back so the next visit sees it.
    pub async fn store_project_tasks(&self, list: &ProjectTaskList) {
        for task in list.tasks() {
            self.task_service.remember_task(task).await;
        }
        self.project_task_cache.insert(
            list.project().id.clone(),
            CachedList {
                items: list.tasks().to_vec(),
                fetched_at: Utc::now(),
            },
        );
    }

    pub async fn get_task(&self, id: &TaskId) -> AppResult<Task> {
        self.task_service.get_task(id, true).await
    }

    pub async fn get_task_detail(&self, id: &TaskId) -> AppResult<ProjectTaskDetail> {
        let task = self.task_service.get_task(id, false).await?;
        let project_id = task
            .project
            .clone()
            .ok_or_else(|| DomainError::MissingField("project".to_string()))?;

        let (project, members, files) = tokio::join!(
            self.get_project(&project_id, true),
            self.task_service.get_task_members(id),
            self.task_service.get_task_files(id),
        );

        Ok(ProjectTaskDetail {
            task,
            project: project?,
            members: members?,
            files: files?,
            current_user: self.get_current_user().await,
        })
    }

    pub async fn get_task_members(&self, id: &TaskId) -> AppResult<Vec<TaskMember>> {
        self.task_service.get_task_members(id).await
    }

    pub async fn get_task_files(&self, id: &TaskId) -> AppResult<Vec<TaskFile>> {
        self.task_service.get_task_files(id).await
    }

    pub async fn list_skills(&self, use_cache: bool) -> AppResult<Vec<Skill>> {
        self.task_service.list_skills(use_cache).await
    }

    pub async fn search_tasks(&self, query: TaskSearch) -> AppResult<TaskSearchController> {
        TaskSearchController::with_query(self.repositories.tasks.clone(), query).await
    }

    /// A new-task form for `project`, or for the selected project.
    pub async fn new_task_form(&self, project: Option<ProjectId>) -> AppResult<TaskFormController> {
        let project = match project {
            Some(project) => project,
            None => self
                .get_current_project()
                .await
                .ok_or(AppError::ProjectNotSelected)?,
        };
        Ok(TaskFormController::new_task(self.repositories.tasks.clone(), project))
    }

    pub async fn edit_task_form(&self, id: &TaskId) -> AppResult<TaskFormController> {
        let task = self.task_service.get_task(id, false).await?;
        TaskFormController::edit(self.repositories.tasks.clone(), task)
    }

    pub fn member_application(&self, task: TaskId) -> TaskMemberController {
        TaskMemberController::apply_for(self.repositories.members.clone(), task)
    }

    pub fn member_editor(&self, member: TaskMember) -> TaskMemberController {
        TaskMemberController::edit(self.repositories.members.clone(), member)
    }

    pub fn file_upload(&self, task: TaskId) -> TaskFileController {
        TaskFileController::new(self.repositories.files.clone(), task)
    }

    pub async fn refresh_all_caches(&self) {
        self.project_task_cache.clear();
        self.project_cache.clear().await;
        self.task_service.clear_caches().await;
    }
}
