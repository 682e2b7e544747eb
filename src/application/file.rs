use std::sync::Arc;

use crate::domain::{DomainError, FileAttachment, TaskFile, TaskId};
use crate::ports::TaskFileRepository;

use super::mutation::submission_failed;
use super::{AppResult, MutationState, Route};

/// Backs the "add a file to this task" form.
pub struct TaskFileController {
    repository: Arc<dyn TaskFileRepository>,
    file: TaskFile,
    state: MutationState,
}

impl TaskFileController {
    pub fn new(repository: Arc<dyn TaskFileRepository>, task: TaskId) -> Self {
        Self {
            repository,
            file: TaskFile::new_for_task(task),
            state: MutationState::Idle,
        }
    }

    pub fn file(&self) -> &TaskFile {
        &self.file
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    /// Attaches the picked file to the pending record.
    pub fn add_file(&mut self, attachment: FileAttachment) {
        if self.file.title.is_empty() {
            self.file.title = attachment.name.clone();
        }
        self.file.file = Some(attachment);
    }

    pub async fn upload_task_file(&mut self) -> AppResult<&MutationState> {
        if self.file.file.is_none() {
            return Err(DomainError::MissingField("file".to_string()).into());
        }

        self.state = MutationState::Submitting;
        tracing::info!("Uploading '{}' to task {}", self.file.title, self.file.task);

        let result = self.repository.upload_file(&self.file).await;
        match result {
            Ok(uploaded) => {
                let route = Route::ProjectTask(uploaded.task.clone());
                self.file = uploaded;
                self.state = MutationState::Navigated(route);
            }
            Err(e) => submission_failed(&mut self.state, e)?,
        }
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskFileId;
    use crate::ports::MockTaskFileRepository;

    #[tokio::test]
    async fn upload_requires_a_file() {
        let mut mock = MockTaskFileRepository::new();
        mock.expect_upload_file().never();

        let mut controller = TaskFileController::new(Arc::new(mock), TaskId::from("8"));
        assert!(controller.upload_task_file().await.is_err());
    }

    #[tokio::test]
    async fn added_file_is_uploaded() {
        let mut mock = MockTaskFileRepository::new();
        mock.expect_upload_file()
            .withf(|f| f.title == "budget.xlsx" && f.file.is_some())
            .times(1)
            .returning(|f| {
                let mut saved = f.clone();
                saved.id = Some(TaskFileId::from("3"));
                Ok(saved)
            });

        let mut controller = TaskFileController::new(Arc::new(mock), TaskId::from("8"));
        controller.add_file(FileAttachment::local("/home/ann/budget.xlsx"));
        controller.upload_task_file().await.unwrap();

        assert_eq!(controller.file().id, Some(TaskFileId::from("3")));
        assert_eq!(
            controller.state().route(),
            Some(&Route::ProjectTask(TaskId::from("8")))
        );
    }
}
