use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::*;

/// Paged collection envelope: `count` is the total number of matches and
/// `next` the absolute url of the following page, if any.
#[derive(Debug, Deserialize)]
pub struct PageDto<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// Ids arrive as numbers for most resources and as slugs for projects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn ids<T: From<String>>(raw: Vec<RawId>) -> Vec<T> {
    raw.into_iter().map(|id| T::from(String::from(id))).collect()
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (taken as UTC
/// midnight).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.as_deref().and_then(parse_timestamp)
}

#[derive(Debug, Deserialize)]
pub struct UserPreviewDto {
    pub id: RawId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPreviewDto {
    pub id: RawId,
    pub title: String,
    pub owner: Option<UserPreviewDto>,
}

#[derive(Debug, Deserialize)]
pub struct SkillDto {
    pub id: RawId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskDto {
    pub id: RawId,
    pub author: Option<UserPreviewDto>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_goal: Option<String>,
    pub created: Option<String>,
    pub deadline: Option<String>,
    pub project: Option<RawId>,
    #[serde(default)]
    pub members: Vec<RawId>,
    #[serde(default)]
    pub files: Vec<RawId>,
    pub skill: Option<RawId>,
    #[serde(default)]
    pub location: Option<String>,
    pub time_needed: Option<f64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<RawId>,
    #[serde(default)]
    pub wallposts: Vec<RawId>,
}

#[derive(Debug, Deserialize)]
pub struct TaskPreviewDto {
    pub id: RawId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: Option<UserPreviewDto>,
    pub project: Option<ProjectPreviewDto>,
    pub skill: Option<RawId>,
    #[serde(default)]
    pub location: Option<String>,
    pub deadline: Option<String>,
    pub time_needed: Option<f64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub members: Vec<RawId>,
}

#[derive(Debug, Deserialize)]
pub struct TaskMemberDto {
    pub id: RawId,
    pub member: Option<UserPreviewDto>,
    pub created: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub motivation: Option<String>,
    pub task: RawId,
}

#[derive(Debug, Deserialize)]
pub struct TaskFileDto {
    pub id: RawId,
    pub author: Option<RawId>,
    #[serde(default)]
    pub title: String,
    pub created: Option<String>,
    /// Download url of the stored file.
    pub file: Option<String>,
    pub task: RawId,
}

// Request DTOs
#[derive(Debug, Serialize)]
pub struct TaskWriteDto {
    pub title: String,
    pub description: String,
    pub end_goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_needed: Option<f64>,
    pub status: TaskStatus,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskMemberWriteDto {
    pub task: String,
    pub status: MemberStatus,
    pub motivation: String,
}

// Conversion implementations
impl From<UserPreviewDto> for UserPreview {
    fn from(dto: UserPreviewDto) -> Self {
        Self {
            id: UserId(dto.id.into()),
            username: dto.username,
            full_name: dto.full_name,
            avatar: dto.avatar,
        }
    }
}

impl From<ProjectPreviewDto> for ProjectPreview {
    fn from(dto: ProjectPreviewDto) -> Self {
        Self {
            id: ProjectId(dto.id.into()),
            title: dto.title,
            owner: dto.owner.map(Into::into),
        }
    }
}

impl From<SkillDto> for Skill {
    fn from(dto: SkillDto) -> Self {
        Self {
            id: SkillId(dto.id.into()),
            name: dto.name,
        }
    }
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Self {
            id: Some(TaskId(dto.id.into())),
            author: dto.author.map(Into::into),
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            end_goal: dto.end_goal.unwrap_or_default(),
            created: timestamp(dto.created),
            deadline: timestamp(dto.deadline),
            project: dto.project.map(|p| ProjectId(p.into())),
            members: ids(dto.members),
            files: ids(dto.files),
            skill: dto.skill.map(|s| SkillId(s.into())),
            location: dto.location.unwrap_or_default(),
            time_needed: dto.time_needed,
            status: dto.status,
            tags: ids(dto.tags),
            wallposts: ids(dto.wallposts),
        }
    }
}

impl From<TaskPreviewDto> for TaskPreview {
    fn from(dto: TaskPreviewDto) -> Self {
        Self {
            id: TaskId(dto.id.into()),
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            author: dto.author.map(Into::into),
            project: dto.project.map(Into::into),
            skill: dto.skill.map(|s| SkillId(s.into())),
            location: dto.location.unwrap_or_default(),
            deadline: timestamp(dto.deadline),
            time_needed: dto.time_needed,
            status: dto.status,
            member_count: dto.members.len(),
        }
    }
}

impl From<TaskMemberDto> for TaskMember {
    fn from(dto: TaskMemberDto) -> Self {
        Self {
            id: Some(TaskMemberId(dto.id.into())),
            member: dto.member.map(Into::into),
            created: timestamp(dto.created),
            status: dto.status,
            motivation: dto.motivation.unwrap_or_default(),
            task: TaskId(dto.task.into()),
        }
    }
}

impl From<TaskFileDto> for TaskFile {
    fn from(dto: TaskFileDto) -> Self {
        let file = dto.file.map(|url| FileAttachment {
            name: url
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
            url: Some(url),
            local_path: None,
        });

        Self {
            id: Some(TaskFileId(dto.id.into())),
            author: dto.author.map(|a| UserId(a.into())),
            title: dto.title,
            created: timestamp(dto.created),
            file,
            task: TaskId(dto.task.into()),
        }
    }
}

impl From<&Task> for TaskWriteDto {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            end_goal: task.end_goal.clone(),
            deadline: task.deadline.map(|d| d.to_rfc3339()),
            project: task.project.as_ref().map(|p| p.0.clone()),
            skill: task.skill.as_ref().map(|s| s.0.clone()),
            location: task.location.clone(),
            time_needed: task.time_needed,
            status: task.status,
            tags: task.tags.iter().map(|t| t.0.clone()).collect(),
        }
    }
}

impl From<&TaskMember> for TaskMemberWriteDto {
    fn from(member: &TaskMember) -> Self {
        Self {
            task: member.task.0.clone(),
            status: member.status,
            motivation: member.motivation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_with_numeric_ids_and_slug_project() {
        let json = r#"{
            "id": 12,
            "author": {"id": 3, "username": "ann", "full_name": "Ann Smit", "avatar": null},
            "title": "Build a website",
            "description": "<p>We need a site</p>",
            "end_goal": "A live site",
            "created": "2013-05-01T10:00:00Z",
            "deadline": "2013-06-01",
            "project": "school-in-ghana",
            "members": [4, 5],
            "files": [],
            "skill": 2,
            "location": "",
            "time_needed": 8,
            "status": "in progress",
            "tags": ["web"],
            "wallposts": []
        }"#;

        let task: Task = serde_json::from_str::<TaskDto>(json).unwrap().into();

        assert_eq!(task.id, Some(TaskId::from("12")));
        assert_eq!(task.project, Some(ProjectId::from("school-in-ghana")));
        assert_eq!(task.members, vec![TaskMemberId::from("4"), TaskMemberId::from("5")]);
        assert_eq!(task.skill, Some(SkillId::from("2")));
        assert!(task.is_in_progress());
        assert_eq!(task.time_needed_display(), "up to one day");
        assert_eq!(task.deadline.unwrap().format("%Y-%m-%d").to_string(), "2013-06-01");
        assert_eq!(task.author.unwrap().display_name(), "Ann Smit");
    }

    #[test]
    fn missing_status_defaults_to_open() {
        let json = r#"{"id": 1, "author": null, "title": "t", "created": null,
                       "deadline": null, "project": null, "skill": null, "time_needed": null}"#;
        let task: Task = serde_json::from_str::<TaskDto>(json).unwrap().into();
        assert!(task.is_open());
        assert_eq!(task.location, "");
    }

    #[test]
    fn paged_previews() {
        let json = r#"{"count": 25, "next": null, "previous": null, "results": [
            {"id": 1, "title": "Translate", "author": null,
             "project": {"id": "wells", "title": "Wells", "owner": null},
             "skill": null, "deadline": null, "time_needed": 0.5,
             "status": "realized", "members": [1, 2, 3]}
        ]}"#;

        let page: PageDto<TaskPreviewDto> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 25);

        let preview: TaskPreview = page.results.into_iter().next().unwrap().into();
        assert!(preview.is_realized());
        assert_eq!(preview.member_count, 3);
        assert_eq!(preview.project.unwrap().id, ProjectId::from("wells"));
    }

    #[test]
    fn member_status_is_its_own_enumeration() {
        let json = r#"{"id": 9, "member": null, "created": null,
                       "status": "accepted", "motivation": "Happy to help", "task": 12}"#;
        let member: TaskMember = serde_json::from_str::<TaskMemberDto>(json).unwrap().into();
        assert!(member.is_accepted());
        assert_eq!(member.task, TaskId::from("12"));

        let bad = r#"{"id": 9, "member": null, "created": null, "status": "open", "task": 12}"#;
        assert!(serde_json::from_str::<TaskMemberDto>(bad).is_err());
    }

    #[test]
    fn file_name_comes_from_url() {
        let json = r#"{"id": 2, "author": 3, "title": "Plan", "created": null,
                       "file": "https://example.org/media/tasks/plan.pdf", "task": 12}"#;
        let file: TaskFile = serde_json::from_str::<TaskFileDto>(json).unwrap().into();
        assert_eq!(file.file.unwrap().name, "plan.pdf");
    }

    #[test]
    fn write_dto_carries_status_and_project() {
        let task = Task {
            title: "Paint".to_string(),
            project: Some(ProjectId::from("wells")),
            status: TaskStatus::Closed,
            ..Default::default()
        };
        let value = serde_json::to_value(TaskWriteDto::from(&task)).unwrap();

        assert_eq!(value["status"], "closed");
        assert_eq!(value["project"], "wells");
        assert!(value.get("deadline").is_none());
    }
}
