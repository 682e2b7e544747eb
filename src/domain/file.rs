use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{TaskId, UserId};

string_id!(TaskFileId);

/// Reference to a binary attachment. Files on the server carry a url; files
/// picked for upload carry the local path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub name: String,
    pub url: Option<String>,
    #[serde(skip)]
    pub local_path: Option<PathBuf>,
}

impl FileAttachment {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            url: None,
            local_path: Some(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    pub id: Option<TaskFileId>,
    pub author: Option<UserId>,
    pub title: String,
    pub created: Option<DateTime<Utc>>,
    pub file: Option<FileAttachment>,
    pub task: TaskId,
}

impl TaskFile {
    pub fn new_for_task(task: TaskId) -> Self {
        Self {
            id: None,
            author: None,
            title: String::new(),
            created: None,
            file: None,
            task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_attachment_takes_file_name() {
        let attachment = FileAttachment::local("/tmp/reports/plan.pdf");
        assert_eq!(attachment.name, "plan.pdf");
        assert!(attachment.url.is_none());
    }
}
