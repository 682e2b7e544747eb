use std::sync::Arc;

use crate::domain::{DomainError, FieldErrors, ProjectId, Record, Task};
use crate::ports::TaskRepository;

use super::mutation::submission_failed;
use super::{AppResult, MutationState, ProjectTaskList, Route};

/// Backs the new-task and edit-task forms of a project.
pub struct TaskFormController {
    repository: Arc<dyn TaskRepository>,
    project: ProjectId,
    task: Record<Task>,
    state: MutationState,
}

impl TaskFormController {
    pub fn new_task(repository: Arc<dyn TaskRepository>, project: ProjectId) -> Self {
        Self {
            repository,
            task: Record::new(Task::new_for_project(project.clone())),
            project,
            state: MutationState::Idle,
        }
    }

    pub fn edit(repository: Arc<dyn TaskRepository>, task: Task) -> AppResult<Self> {
        let project = task
            .project
            .clone()
            .ok_or_else(|| DomainError::MissingField("project".to_string()))?;
        Ok(Self {
            repository,
            project,
            task: Record::loaded(task),
            state: MutationState::Idle,
        })
    }

    pub fn task(&self) -> &Task {
        self.task.get()
    }

    pub fn task_mut(&mut self) -> &mut Task {
        self.task.get_mut()
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn is_new(&self) -> bool {
        self.task.is_new()
    }

    pub fn is_dirty(&self) -> bool {
        self.task.is_dirty()
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.state.errors()
    }

    /// Creates the task in the current project and goes to the project's
    /// task list.
    pub async fn add_task(&mut self) -> AppResult<&MutationState> {
        self.task.get_mut().project = Some(self.project.clone());
        self.state = MutationState::Submitting;
        tracing::info!("Creating task '{}' in {}", self.task.title, self.project);

        let result = self.repository.create_task(self.task.get()).await;
        match result {
            Ok(created) => {
                self.task.mark_saved(created);
                self.state = MutationState::Navigated(Route::ProjectTaskList(self.project.clone()));
            }
            Err(e) => submission_failed(&mut self.state, e)?,
        }
        Ok(&self.state)
    }

    /// Saves local edits and goes to the task's detail view. Without edits the
    /// server is not contacted.
    pub async fn update_task(&mut self, list: &mut ProjectTaskList) -> AppResult<&MutationState> {
        let id = self
            .task
            .id
            .clone()
            .ok_or_else(|| DomainError::MissingField("id".to_string()))?;

        if !self.task.is_dirty() {
            tracing::debug!("Task {} has no changes, skipping update", id);
            self.state = MutationState::Navigated(Route::ProjectTask(id));
            return Ok(&self.state);
        }

        self.state = MutationState::Submitting;
        tracing::info!("Updating task {}", id);

        let result = self.repository.update_task(&id, self.task.get()).await;
        match result {
            Ok(updated) => {
                self.task.mark_saved(updated.clone());
                list.unshift(updated);
                self.state = MutationState::Navigated(Route::ProjectTask(id));
            }
            Err(e) => submission_failed(&mut self.state, e)?,
        }
        Ok(&self.state)
    }

    /// Drops local edits without saving.
    pub fn cancel_changes_to_task(&mut self) -> &MutationState {
        self.task.rollback();
        let route = match &self.task.id {
            Some(id) => Route::ProjectTask(id.clone()),
            None => Route::ProjectTaskList(self.project.clone()),
        };
        self.state = MutationState::Navigated(route);
        &self.state
    }
}
