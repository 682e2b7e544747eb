use crate::domain::{FieldErrors, ProjectId, TaskId};
use crate::ports::RepositoryError;

use super::AppResult;

/// Views a controller can send the user to after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ProjectTaskList(ProjectId),
    ProjectTask(TaskId),
}

/// Progress of one create/update attempt.
///
/// `Idle -> Submitting -> Navigated | ErrorsShown`; a form showing errors may
/// be submitted again. Failures other than validation leave the state `Idle`
/// and are returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
    Navigated(Route),
    ErrorsShown(FieldErrors),
}

impl MutationState {
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            MutationState::ErrorsShown(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            MutationState::Navigated(route) => Some(route),
            _ => None,
        }
    }
}

/// Validation failures become displayable errors; anything else propagates.
pub(crate) fn submission_failed(state: &mut MutationState, error: RepositoryError) -> AppResult<()> {
    match error {
        RepositoryError::Validation(errors) => {
            tracing::info!("Submission rejected: {}", errors);
            *state = MutationState::ErrorsShown(errors);
            Ok(())
        }
        other => {
            tracing::warn!("Submission failed: {}", other);
            *state = MutationState::Idle;
            Err(other.into())
        }
    }
}
