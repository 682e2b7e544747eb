use crate::domain::DomainError;
use crate::ports::{ConfigError, RepositoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid record: {0}")]
    Domain(#[from] DomainError),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("No project selected")]
    ProjectNotSelected,
}

pub type AppResult<T> = Result<T, AppError>;
