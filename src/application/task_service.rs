use super::AppResult;
use crate::domain::*;
use crate::ports::{
    Cache, ProjectRepository, SkillRepository, TaskFileRepository, TaskMemberRepository,
    TaskRepository, UserRepository,
};
use std::sync::Arc;

const SKILLS_KEY: &str = "skills";

/// The persistence client, one handle per resource endpoint.
#[derive(Clone)]
pub struct Repositories {
    pub tasks: Arc<dyn TaskRepository>,
    pub members: Arc<dyn TaskMemberRepository>,
    pub files: Arc<dyn TaskFileRepository>,
    pub skills: Arc<dyn SkillRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// All endpoints served by one client.
    pub fn from_shared<R>(repository: Arc<R>) -> Self
    where
        R: TaskRepository
            + TaskMemberRepository
            + TaskFileRepository
            + SkillRepository
            + ProjectRepository
            + UserRepository
            + 'static,
    {
        Self {
            tasks: repository.clone(),
            members: repository.clone(),
            files: repository.clone(),
            skills: repository.clone(),
            projects: repository.clone(),
            users: repository,
        }
    }
}

pub struct TaskService {
    repositories: Repositories,
    cache: Arc<dyn Cache<TaskId, Task>>,
    skill_cache: Arc<dyn Cache<String, Vec<Skill>>>,
}

impl TaskService {
    pub fn new(
        repositories: Repositories,
        cache: Arc<dyn Cache<TaskId, Task>>,
        skill_cache: Arc<dyn Cache<String, Vec<Skill>>>,
    ) -> Self {
        Self {
            repositories,
            cache,
            skill_cache,
        }
    }

    pub async fn get_task(&self, id: &TaskId, use_cache: bool) -> AppResult<Task> {
        if use_cache {
            if let Some(task) = self.cache.get(id).await {
                return Ok(task);
            }
        }

        let task = self.repositories.tasks.get_task(id).await?;
        self.cache.insert(id.clone(), task.clone()).await;
        Ok(task)
    }

    /// Refreshes the cached copy after the task was saved elsewhere.
    pub async fn remember_task(&self, task: &Task) {
        if let Some(id) = &task.id {
            self.cache.insert(id.clone(), task.clone()).await;
        }
    }

    pub async fn list_project_tasks(&self, project: &ProjectId) -> AppResult<Vec<Task>> {
        let tasks = self.repositories.tasks.list_project_tasks(project).await?;

        // Cache individual tasks for future single-task lookups
        for task in &tasks {
            self.remember_task(task).await;
        }

        Ok(tasks)
    }

    pub async fn get_task_members(&self, task_id: &TaskId) -> AppResult<Vec<TaskMember>> {
        Ok(self.repositories.members.list_members(task_id).await?)
    }

    pub async fn get_task_files(&self, task_id: &TaskId) -> AppResult<Vec<TaskFile>> {
        Ok(self.repositories.files.list_files(task_id).await?)
    }

    pub async fn list_skills(&self, use_cache: bool) -> AppResult<Vec<Skill>> {
        let key = SKILLS_KEY.to_string();
        if use_cache {
            if let Some(skills) = self.skill_cache.get(&key).await {
                return Ok(skills);
            }
        }

        let mut skills = self.repositories.skills.list_skills().await?;
        skills.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.skill_cache.insert(key, skills.clone()).await;
        Ok(skills)
    }

    pub async fn clear_caches(&self) {
        self.cache.clear().await;
        self.skill_cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheAdapter;
    use crate::ports::{
        MockProjectRepository, MockSkillRepository, MockTaskFileRepository,
        MockTaskMemberRepository, MockTaskRepository, MockUserRepository,
    };

    fn service(tasks: MockTaskRepository, skills: MockSkillRepository) -> TaskService {
        let repositories = Repositories {
            tasks: Arc::new(tasks),
            members: Arc::new(MockTaskMemberRepository::new()),
            files: Arc::new(MockTaskFileRepository::new()),
            skills: Arc::new(skills),
            projects: Arc::new(MockProjectRepository::new()),
            users: Arc::new(MockUserRepository::new()),
        };
        TaskService::new(
            repositories,
            Arc::new(MokaCacheAdapter::<TaskId, Task>::with_default_settings()),
            Arc::new(MokaCacheAdapter::<String, Vec<Skill>>::with_default_settings()),
        )
    }

    #[tokio::test]
    async fn cached_task_is_served_without_fetch() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_get_task().times(1).returning(|id| {
            Ok(Task {
                id: Some(id.clone()),
                title: "Translate flyer".to_string(),
                ..Default::default()
            })
        });
        let service = service(tasks, MockSkillRepository::new());
        let id = TaskId::from("4");

        service.get_task(&id, true).await.unwrap();
        let task = service.get_task(&id, true).await.unwrap();

        assert_eq!(task.title, "Translate flyer");
    }

    #[tokio::test]
    async fn skills_are_sorted_and_cached() {
        let mut skills = MockSkillRepository::new();
        skills.expect_list_skills().times(1).returning(|| {
            Ok(vec![
                Skill {
                    id: SkillId::from("2"),
                    name: "writing".to_string(),
                },
                Skill {
                    id: SkillId::from("1"),
                    name: "Design".to_string(),
                },
            ])
        });
        let service = service(MockTaskRepository::new(), skills);

        let first = service.list_skills(true).await.unwrap();
        let second = service.list_skills(true).await.unwrap();

        assert_eq!(first[0].name, "Design");
        assert_eq!(first, second);
    }
}
