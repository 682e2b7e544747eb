pub mod client;
pub mod dto;
pub mod task_repo;

pub use client::*;
pub use dto::*;
pub use task_repo::*;
