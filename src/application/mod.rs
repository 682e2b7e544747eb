pub mod error;
pub mod file;
pub mod member;
pub mod mutation;
pub mod ownership;
pub mod search;
pub mod state_manager;
pub mod task_form;
pub mod task_service;

pub use error::*;
pub use file::*;
pub use member::*;
pub use mutation::{MutationState, Route};
pub use ownership::*;
pub use search::*;
pub use state_manager::*;
pub use task_form::*;
pub use task_service::*;
