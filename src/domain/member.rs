use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, TaskId, UserPreview};

string_id!(TaskMemberId);

/// Membership states, distinct from `TaskStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Applied,
    Accepted,
    Rejected,
    Realized,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Applied,
        MemberStatus::Accepted,
        MemberStatus::Rejected,
        MemberStatus::Realized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Applied => "applied",
            MemberStatus::Accepted => "accepted",
            MemberStatus::Rejected => "rejected",
            MemberStatus::Realized => "realized",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::InvalidMemberStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMember {
    pub id: Option<TaskMemberId>,
    pub member: Option<UserPreview>,
    pub created: Option<DateTime<Utc>>,
    pub status: MemberStatus,
    pub motivation: String,
    pub task: TaskId,
}

impl TaskMember {
    /// A fresh application for `task`.
    pub fn apply_for(task: TaskId, motivation: impl Into<String>) -> Self {
        Self {
            id: None,
            member: None,
            created: None,
            status: MemberStatus::Applied,
            motivation: motivation.into(),
            task,
        }
    }

    /// Any transition is accepted here; the server decides what is allowed.
    pub fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }

    pub fn is_applied(&self) -> bool {
        self.status == MemberStatus::Applied
    }

    pub fn is_accepted(&self) -> bool {
        self.status == MemberStatus::Accepted
    }

    pub fn is_rejected(&self) -> bool {
        self.status == MemberStatus::Rejected
    }

    pub fn is_realized(&self) -> bool {
        self.status == MemberStatus::Realized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_member_flag_matches() {
        let mut member = TaskMember::apply_for(TaskId::from("1"), "");
        for (index, status) in MemberStatus::ALL.into_iter().enumerate() {
            member.set_status(status);
            let flags = [
                member.is_applied(),
                member.is_accepted(),
                member.is_rejected(),
                member.is_realized(),
            ];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1);
            assert!(flags[index]);
        }
    }

    #[test]
    fn application_starts_as_applied() {
        let member = TaskMember::apply_for(TaskId::from("3"), "I can help");
        assert!(member.is_applied());
        assert_eq!(member.motivation, "I can help");
    }

    #[test]
    fn any_transition_is_allowed() {
        let mut member = TaskMember::apply_for(TaskId::from("3"), "");
        member.set_status(MemberStatus::Realized);
        member.set_status(MemberStatus::Applied);
        assert!(member.is_applied());
    }

    #[test]
    fn task_statuses_are_not_member_statuses() {
        assert!("in progress".parse::<MemberStatus>().is_err());
        assert!("open".parse::<MemberStatus>().is_err());
        assert_eq!("rejected".parse::<MemberStatus>(), Ok(MemberStatus::Rejected));
    }
}
