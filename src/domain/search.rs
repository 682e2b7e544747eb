use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, SkillId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOrdering {
    #[default]
    Newest,
    Deadline,
}

impl TaskOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOrdering::Newest => "newest",
            TaskOrdering::Deadline => "deadline",
        }
    }
}

impl fmt::Display for TaskOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskOrdering {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(TaskOrdering::Newest),
            "deadline" => Ok(TaskOrdering::Deadline),
            other => Err(DomainError::InvalidOrdering(other.to_string())),
        }
    }
}

/// The query record behind the task search form. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSearch {
    pub text: String,
    pub skill: Option<SkillId>,
    pub ordering: TaskOrdering,
    pub status: Option<TaskStatus>,
    pub page: u32,
}

impl Default for TaskSearch {
    fn default() -> Self {
        Self {
            text: String::new(),
            skill: None,
            ordering: TaskOrdering::Newest,
            status: Some(TaskStatus::Open),
            page: 1,
        }
    }
}

/// Which field of the query record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Text,
    Skill,
    Status,
    Ordering,
    Page,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_search_form() {
        let search = TaskSearch::default();
        assert_eq!(search.text, "");
        assert_eq!(search.ordering, TaskOrdering::Newest);
        assert_eq!(search.status, Some(TaskStatus::Open));
        assert_eq!(search.page, 1);
        assert!(search.skill.is_none());
    }

    #[test]
    fn ordering_round_trips_through_str() {
        assert_eq!("deadline".parse::<TaskOrdering>(), Ok(TaskOrdering::Deadline));
        assert_eq!(TaskOrdering::Newest.to_string(), "newest");
        assert!("oldest".parse::<TaskOrdering>().is_err());
    }
}
