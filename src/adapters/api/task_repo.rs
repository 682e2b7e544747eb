use super::client::endpoints;
use super::{
    BluebottleClient, ProjectPreviewDto, SkillDto, TaskDto, TaskFileDto, TaskMemberDto,
    TaskMemberWriteDto, TaskPreviewDto, TaskWriteDto, UserPreviewDto,
};
use crate::domain::{
    FieldErrors, Page, ProjectId, ProjectPreview, Skill, Task, TaskFile, TaskId, TaskMember,
    TaskMemberId, TaskPreview, TaskSearch, UserPreview,
};
use crate::ports::{
    ProjectRepository, RepositoryError, RepositoryResult, SkillRepository, TaskFileRepository,
    TaskMemberRepository, TaskRepository, UserRepository,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

/// The persistence client for every task resource.
#[derive(Clone)]
pub struct BluebottleRepository {
    client: BluebottleClient,
}

impl BluebottleRepository {
    pub fn new(client: BluebottleClient) -> Self {
        Self { client }
    }

    /// Query parameters of a task search. Unset filters are sent empty.
    pub fn build_search_params(query: &TaskSearch) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), query.page.to_string()),
            ("ordering".to_string(), query.ordering.as_str().to_string()),
            (
                "status".to_string(),
                query
                    .status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
            ),
            ("text".to_string(), query.text.clone()),
            (
                "skill".to_string(),
                query.skill.as_ref().map(|s| s.0.clone()).unwrap_or_default(),
            ),
        ]
    }

    pub fn build_query_string(params: &[(String, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }

    fn filtered(path: &str, key: &str, value: &str) -> String {
        format!(
            "{}{}",
            path,
            Self::build_query_string(&[(key.to_string(), value.to_string())])
        )
    }
}

#[async_trait]
impl TaskRepository for BluebottleRepository {
    async fn get_task(&self, id: &TaskId) -> RepositoryResult<Task> {
        let path = format!("{}{}/", endpoints::TASKS, id.0);
        let task_dto: TaskDto = self.client.get(&path).await?;
        Ok(task_dto.into())
    }

    async fn search_tasks(&self, query: &TaskSearch) -> RepositoryResult<Page<TaskPreview>> {
        let params = Self::build_search_params(query);
        let path = format!(
            "{}{}",
            endpoints::TASK_PREVIEWS,
            Self::build_query_string(&params)
        );

        let page: Page<TaskPreviewDto> = self.client.get_page(&path).await?;
        tracing::debug!("Search matched {} tasks", page.total);
        Ok(Page {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
        })
    }

    async fn list_project_tasks(&self, project: &ProjectId) -> RepositoryResult<Vec<Task>> {
        let path = Self::filtered(endpoints::TASKS, "project", &project.0);
        let task_dtos: Vec<TaskDto> = self.client.get_list(&path).await?;
        Ok(task_dtos.into_iter().map(Into::into).collect())
    }

    async fn create_task(&self, task: &Task) -> RepositoryResult<Task> {
        let body = TaskWriteDto::from(task);
        let task_dto: TaskDto = self.client.post(endpoints::TASKS, &body).await?;
        Ok(task_dto.into())
    }

    async fn update_task(&self, id: &TaskId, task: &Task) -> RepositoryResult<Task> {
        let path = format!("{}{}/", endpoints::TASKS, id.0);
        let body = TaskWriteDto::from(task);
        let task_dto: TaskDto = self.client.put(&path, &body).await?;
        Ok(task_dto.into())
    }
}

#[async_trait]
impl TaskMemberRepository for BluebottleRepository {
    async fn list_members(&self, task: &TaskId) -> RepositoryResult<Vec<TaskMember>> {
        let path = Self::filtered(endpoints::TASK_MEMBERS, "task", &task.0);
        let member_dtos: Vec<TaskMemberDto> = self.client.get_list(&path).await?;
        Ok(member_dtos.into_iter().map(Into::into).collect())
    }

    async fn create_member(&self, member: &TaskMember) -> RepositoryResult<TaskMember> {
        let body = TaskMemberWriteDto::from(member);
        let member_dto: TaskMemberDto = self.client.post(endpoints::TASK_MEMBERS, &body).await?;
        Ok(member_dto.into())
    }

    async fn update_member(
        &self,
        id: &TaskMemberId,
        member: &TaskMember,
    ) -> RepositoryResult<TaskMember> {
        let path = format!("{}{}/", endpoints::TASK_MEMBERS, id.0);
        let body = TaskMemberWriteDto::from(member);
        let member_dto: TaskMemberDto = self.client.put(&path, &body).await?;
        Ok(member_dto.into())
    }
}

#[async_trait]
impl TaskFileRepository for BluebottleRepository {
    async fn list_files(&self, task: &TaskId) -> RepositoryResult<Vec<TaskFile>> {
        let path = Self::filtered(endpoints::TASK_FILES, "task", &task.0);
        let file_dtos: Vec<TaskFileDto> = self.client.get_list(&path).await?;
        Ok(file_dtos.into_iter().map(Into::into).collect())
    }

    async fn upload_file(&self, file: &TaskFile) -> RepositoryResult<TaskFile> {
        let Some((name, path)) = file
            .file
            .as_ref()
            .and_then(|a| a.local_path.as_ref().map(|p| (a.name.clone(), p.clone())))
        else {
            let mut errors = FieldErrors::new();
            errors.add("file", "No file was submitted.");
            return Err(RepositoryError::Validation(errors));
        };

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            RepositoryError::Api(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let form = Form::new()
            .text("title", file.title.clone())
            .text("task", file.task.0.clone())
            .part("file", Part::bytes(bytes).file_name(name));

        let file_dto: TaskFileDto = self
            .client
            .post_multipart(endpoints::TASK_FILES, form)
            .await?;
        Ok(file_dto.into())
    }
}

#[async_trait]
impl SkillRepository for BluebottleRepository {
    async fn list_skills(&self) -> RepositoryResult<Vec<Skill>> {
        let skill_dtos: Vec<SkillDto> = self.client.get_list(endpoints::TASK_SKILLS).await?;
        Ok(skill_dtos.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ProjectRepository for BluebottleRepository {
    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<ProjectPreview> {
        let path = format!("{}{}/", endpoints::PROJECTS, id.0);
        let project_dto: ProjectPreviewDto = self.client.get(&path).await?;
        Ok(project_dto.into())
    }
}

#[async_trait]
impl UserRepository for BluebottleRepository {
    async fn get_current_user(&self) -> RepositoryResult<UserPreview> {
        let user_dto: UserPreviewDto = self.client.get(endpoints::CURRENT_USER).await?;
        Ok(user_dto.into())
    }
}
