use serde::{Deserialize, Serialize};

string_id!(
    /// Projects are addressed by slug.
    ProjectId
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPreview {
    pub id: ProjectId,
    pub title: String,
    pub owner: Option<super::UserPreview>,
}
