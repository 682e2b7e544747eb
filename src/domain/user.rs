use serde::{Deserialize, Serialize};

string_id!(UserId);

/// The reduced user projection attached to tasks and memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreview {
    pub id: UserId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
}

impl UserPreview {
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}
