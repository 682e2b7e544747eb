use std::sync::Arc;

use crate::domain::{FieldErrors, MemberStatus, Record, TaskId, TaskMember};
use crate::ports::TaskMemberRepository;

use super::mutation::submission_failed;
use super::{AppResult, MutationState, Route};

/// Applying for a task and editing a membership.
pub struct TaskMemberController {
    repository: Arc<dyn TaskMemberRepository>,
    member: Record<TaskMember>,
    state: MutationState,
}

impl TaskMemberController {
    pub fn apply_for(repository: Arc<dyn TaskMemberRepository>, task: TaskId) -> Self {
        Self {
            repository,
            member: Record::new(TaskMember::apply_for(task, "")),
            state: MutationState::Idle,
        }
    }

    pub fn edit(repository: Arc<dyn TaskMemberRepository>, member: TaskMember) -> Self {
        Self {
            repository,
            member: Record::loaded(member),
            state: MutationState::Idle,
        }
    }

    pub fn member(&self) -> &TaskMember {
        self.member.get()
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.state.errors()
    }

    pub fn is_applied(&self) -> bool {
        self.member.is_applied()
    }

    pub fn is_accepted(&self) -> bool {
        self.member.is_accepted()
    }

    pub fn is_rejected(&self) -> bool {
        self.member.is_rejected()
    }

    pub fn is_realized(&self) -> bool {
        self.member.is_realized()
    }

    pub fn set_motivation(&mut self, motivation: impl Into<String>) {
        self.member.get_mut().motivation = motivation.into();
    }

    pub fn set_status(&mut self, status: MemberStatus) {
        self.member.get_mut().set_status(status);
    }

    /// Submits the application and returns to the task.
    pub async fn apply(&mut self) -> AppResult<&MutationState> {
        self.state = MutationState::Submitting;
        tracing::info!("Applying for task {}", self.member.task);

        let result = self.repository.create_member(self.member.get()).await;
        match result {
            Ok(created) => {
                let route = Route::ProjectTask(created.task.clone());
                self.member.mark_saved(created);
                self.state = MutationState::Navigated(route);
            }
            Err(e) => submission_failed(&mut self.state, e)?,
        }
        Ok(&self.state)
    }

    /// Saves a changed membership; an unchanged one goes straight back to
    /// the task.
    pub async fn update_task_member(&mut self) -> AppResult<&MutationState> {
        let route = Route::ProjectTask(self.member.task.clone());
        let Some(id) = self.member.id.clone() else {
            return self.apply().await;
        };

        if !self.member.is_dirty() {
            self.state = MutationState::Navigated(route);
            return Ok(&self.state);
        }

        self.state = MutationState::Submitting;
        tracing::info!("Updating membership {} to {}", id, self.member.status);

        let result = self.repository.update_member(&id, self.member.get()).await;
        match result {
            Ok(updated) => {
                self.member.mark_saved(updated);
                self.state = MutationState::Navigated(route);
            }
            Err(e) => submission_failed(&mut self.state, e)?,
        }
        Ok(&self.state)
    }

    pub fn cancel(&mut self) -> &MutationState {
        self.member.rollback();
        self.state = MutationState::Navigated(Route::ProjectTask(self.member.task.clone()));
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskMemberId;
    use crate::ports::{MockTaskMemberRepository, RepositoryError};

    fn accepted_member() -> TaskMember {
        let mut member = TaskMember::apply_for(TaskId::from("5"), "I like gardening");
        member.id = Some(TaskMemberId::from("40"));
        member.status = MemberStatus::Accepted;
        member
    }

    #[tokio::test]
    async fn apply_creates_membership_in_applied_state() {
        let mut mock = MockTaskMemberRepository::new();
        mock.expect_create_member()
            .withf(|m| m.status == MemberStatus::Applied && m.motivation == "Weekends free")
            .times(1)
            .returning(|m| {
                let mut created = m.clone();
                created.id = Some(TaskMemberId::from("41"));
                Ok(created)
            });

        let mut controller = TaskMemberController::apply_for(Arc::new(mock), TaskId::from("5"));
        controller.set_motivation("Weekends free");
        controller.apply().await.unwrap();

        assert!(controller.is_applied());
        assert_eq!(
            controller.state().route(),
            Some(&Route::ProjectTask(TaskId::from("5")))
        );
    }

    #[tokio::test]
    async fn status_change_is_saved_without_checks() {
        let mut mock = MockTaskMemberRepository::new();
        mock.expect_update_member()
            .withf(|id, m| id == &TaskMemberId::from("40") && m.status == MemberStatus::Applied)
            .times(1)
            .returning(|_, m| Ok(m.clone()));

        let mut controller = TaskMemberController::edit(Arc::new(mock), accepted_member());
        assert!(controller.is_accepted());

        controller.set_status(MemberStatus::Applied);
        controller.update_task_member().await.unwrap();

        assert!(controller.is_applied());
        assert!(controller.state().route().is_some());
    }

    #[tokio::test]
    async fn unchanged_membership_is_not_sent() {
        let mut mock = MockTaskMemberRepository::new();
        mock.expect_update_member().never();

        let mut controller = TaskMemberController::edit(Arc::new(mock), accepted_member());
        controller.update_task_member().await.unwrap();

        assert!(controller.state().route().is_some());
    }

    #[tokio::test]
    async fn rejected_update_shows_errors() {
        let mut mock = MockTaskMemberRepository::new();
        mock.expect_update_member().times(1).returning(|_, _| {
            let mut errors = FieldErrors::new();
            errors.add("status", "Only the project owner can change this.");
            Err(RepositoryError::Validation(errors))
        });

        let mut controller = TaskMemberController::edit(Arc::new(mock), accepted_member());
        controller.set_status(MemberStatus::Realized);
        controller.update_task_member().await.unwrap();

        assert!(controller.errors().unwrap().get("status").is_some());
        assert!(controller.is_realized());

        controller.cancel();
        assert!(controller.is_accepted());
    }
}
