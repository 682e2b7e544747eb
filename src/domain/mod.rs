/// Declares a string-backed identifier newtype with the conversions every
/// record id needs.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

pub mod error;
pub mod file;
pub mod member;
pub mod page;
pub mod project;
pub mod record;
pub mod search;
pub mod skill;
pub mod task;
pub mod user;

pub use error::*;
pub use file::*;
pub use member::*;
pub use page::*;
pub use project::*;
pub use record::*;
pub use search::*;
pub use skill::*;
pub use task::*;
pub use user::*;
