use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, ProjectId, ProjectPreview, SkillId, TaskFileId, TaskMemberId, UserPreview};

string_id!(TaskId);
string_id!(WallPostId);
string_id!(
    /// Tags are identified by their name.
    Tag
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "realized")]
    Realized,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Closed,
        TaskStatus::Realized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Closed => "closed",
            TaskStatus::Realized => "realized",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::InvalidTaskStatus(s.to_string()))
    }
}

/// An entry of the status filter shown on the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub value: TaskStatus,
    pub title: &'static str,
}

pub const STATUS_FILTER_PROMPT: &str = "any status";

/// Closed tasks are not offered as a filter.
pub const STATUS_FILTER_OPTIONS: [StatusOption; 3] = [
    StatusOption {
        value: TaskStatus::Open,
        title: "open",
    },
    StatusOption {
        value: TaskStatus::InProgress,
        title: "in progress",
    },
    StatusOption {
        value: TaskStatus::Realized,
        title: "realised",
    },
];

/// Labels for the usual `time_needed` values, in hours.
pub const TIME_NEEDED_LABELS: [(f64, &str); 8] = [
    (0.25, "15 minutes"),
    (0.5, "half an hour"),
    (1.0, "up to one hour"),
    (4.0, "half a day"),
    (8.0, "up to one day"),
    (24.0, "up to three days"),
    (40.0, "up to one week"),
    (60.0, "more than one week"),
];

pub fn time_needed_label(hours: f64) -> String {
    TIME_NEEDED_LABELS
        .iter()
        .find(|(value, _)| (*value - hours).abs() < f64::EPSILON)
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| format!("{hours} hours"))
}

fn deadline_display(deadline: Option<DateTime<Utc>>) -> String {
    match deadline {
        None => "No deadline".to_string(),
        Some(deadline) => {
            let days_diff = (deadline.date_naive() - Utc::now().date_naive()).num_days();

            match days_diff {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                -1 => "Yesterday".to_string(),
                d if d < 0 => format!("{} days ago", -d),
                d if d <= 7 => format!("In {d} days"),
                _ => deadline.format("%Y-%m-%d").to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<TaskId>,
    pub author: Option<UserPreview>,
    pub title: String,
    pub description: String,
    pub end_goal: String,
    pub created: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub project: Option<ProjectId>,
    pub members: Vec<TaskMemberId>,
    pub files: Vec<TaskFileId>,
    pub skill: Option<SkillId>,
    pub location: String,
    pub time_needed: Option<f64>,
    pub status: TaskStatus,
    pub tags: Vec<Tag>,
    pub wallposts: Vec<WallPostId>,
}

impl Default for Task {
    fn default() -> Self {
        Self {
            id: None,
            author: None,
            title: String::new(),
            description: String::new(),
            end_goal: String::new(),
            created: None,
            deadline: None,
            project: None,
            members: Vec::new(),
            files: Vec::new(),
            skill: None,
            location: String::new(),
            time_needed: None,
            status: TaskStatus::Open,
            tags: Vec::new(),
            wallposts: Vec::new(),
        }
    }
}

impl Task {
    /// A blank task for the given project, as the new-task form starts it.
    pub fn new_for_project(project: ProjectId) -> Self {
        Self {
            project: Some(project),
            ..Default::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TaskStatus::InProgress
    }

    pub fn is_closed(&self) -> bool {
        self.status == TaskStatus::Closed
    }

    pub fn is_realized(&self) -> bool {
        self.status == TaskStatus::Realized
    }

    pub fn time_needed_display(&self) -> String {
        match self.time_needed {
            Some(hours) => time_needed_label(hours),
            None => "Unknown".to_string(),
        }
    }

    pub fn deadline_display(&self) -> String {
        deadline_display(self.deadline)
    }
}

/// The list projection served by `tasks/previews`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPreview {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub author: Option<UserPreview>,
    pub project: Option<ProjectPreview>,
    pub skill: Option<SkillId>,
    pub location: String,
    pub deadline: Option<DateTime<Utc>>,
    pub time_needed: Option<f64>,
    pub status: TaskStatus,
    pub member_count: usize,
}

impl TaskPreview {
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == TaskStatus::InProgress
    }

    pub fn is_closed(&self) -> bool {
        self.status == TaskStatus::Closed
    }

    pub fn is_realized(&self) -> bool {
        self.status == TaskStatus::Realized
    }

    pub fn time_needed_display(&self) -> String {
        match self.time_needed {
            Some(hours) => time_needed_label(hours),
            None => "Unknown".to_string(),
        }
    }

    pub fn deadline_display(&self) -> String {
        deadline_display(self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(task: &Task) -> [bool; 4] {
        [
            task.is_open(),
            task.is_in_progress(),
            task.is_closed(),
            task.is_realized(),
        ]
    }

    #[test]
    fn exactly_one_status_flag_matches() {
        let mut task = Task::default();
        for (index, status) in TaskStatus::ALL.into_iter().enumerate() {
            task.status = status;
            let flags = flags(&task);
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            assert!(flags[index], "flag for {status} should be set");
        }
    }

    #[test]
    fn flags_follow_reassignment() {
        let mut task = Task::default();
        assert!(task.is_open());

        task.status = TaskStatus::Realized;
        assert!(!task.is_open());
        assert!(task.is_realized());
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new_for_project(ProjectId::from("clean-water"));
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.location, "");
        assert_eq!(task.project, Some(ProjectId::from("clean-water")));
        assert!(task.id.is_none());
    }

    #[test]
    fn status_parses_from_wire_names() {
        assert_eq!("in progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("realized".parse::<TaskStatus>(), Ok(TaskStatus::Realized));
        assert!("accepted".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_spaces() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in progress\"");
    }

    #[test]
    fn time_needed_uses_known_labels() {
        assert_eq!(time_needed_label(0.5), "half an hour");
        assert_eq!(time_needed_label(40.0), "up to one week");
        assert_eq!(time_needed_label(3.0), "3 hours");
    }

    #[test]
    fn status_filter_offers_no_closed_option() {
        assert!(STATUS_FILTER_OPTIONS
            .iter()
            .all(|option| option.value != TaskStatus::Closed));
        assert_eq!(STATUS_FILTER_OPTIONS[2].title, "realised");
    }

    #[test]
    fn missing_deadline_display() {
        let task = Task::default();
        assert_eq!(task.deadline_display(), "No deadline");
    }
}
