use crate::domain::{ProjectPreview, Task, TaskMember, TaskStatus, UserPreview};

/// Shared "is the current user the project owner" check for views scoped to
/// a project.
pub trait ProjectOwnership {
    fn current_user(&self) -> Option<&UserPreview>;
    fn project(&self) -> &ProjectPreview;

    fn is_project_owner(&self) -> bool {
        match (self.current_user(), self.project().owner.as_ref()) {
            (Some(user), Some(owner)) if !user.username.is_empty() => {
                user.username == owner.username
            }
            _ => false,
        }
    }
}

pub fn is_author(task: &Task, user: Option<&UserPreview>) -> bool {
    match (user, task.author.as_ref()) {
        (Some(user), Some(author)) => user.username == author.username,
        _ => false,
    }
}

pub fn is_member(members: &[TaskMember], user: Option<&UserPreview>) -> bool {
    let Some(user) = user else {
        return false;
    };
    members.iter().any(|member| {
        member
            .member
            .as_ref()
            .is_some_and(|m| m.username == user.username)
    })
}

/// The task list of one project, kept in memory between visits.
#[derive(Debug, Clone)]
pub struct ProjectTaskList {
    project: ProjectPreview,
    tasks: Vec<Task>,
    current_user: Option<UserPreview>,
}

impl ProjectTaskList {
    pub fn new(project: ProjectPreview, tasks: Vec<Task>, current_user: Option<UserPreview>) -> Self {
        Self {
            project,
            tasks,
            current_user,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Puts `task` at the front of the list. Unlike a plain prepend, the
    /// stale copy with the same id is removed, so a task appears once.
    pub fn unshift(&mut self, task: Task) {
        if task.id.is_some() {
            self.tasks.retain(|existing| existing.id != task.id);
        }
        self.tasks.insert(0, task);
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

impl ProjectOwnership for ProjectTaskList {
    fn current_user(&self) -> Option<&UserPreview> {
        self.current_user.as_ref()
    }

    fn project(&self) -> &ProjectPreview {
        &self.project
    }
}

/// Everything the task detail view shows.
#[derive(Debug, Clone)]
pub struct ProjectTaskDetail {
    pub task: Task,
    pub project: ProjectPreview,
    pub members: Vec<TaskMember>,
    pub files: Vec<crate::domain::TaskFile>,
    pub current_user: Option<UserPreview>,
}

impl ProjectTaskDetail {
    pub fn is_member(&self) -> bool {
        is_member(&self.members, self.current_user.as_ref())
    }

    pub fn is_author(&self) -> bool {
        is_author(&self.task, self.current_user.as_ref())
    }
}

impl ProjectOwnership for ProjectTaskDetail {
    fn current_user(&self) -> Option<&UserPreview> {
        self.current_user.as_ref()
    }

    fn project(&self) -> &ProjectPreview {
        &self.project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberStatus, ProjectId, TaskId, UserId};

    fn user(name: &str) -> UserPreview {
        UserPreview {
            id: UserId::from(name),
            username: name.to_string(),
            full_name: None,
            avatar: None,
        }
    }

    fn project(owner: &str) -> ProjectPreview {
        ProjectPreview {
            id: ProjectId::from("wells"),
            title: "Wells".to_string(),
            owner: Some(user(owner)),
        }
    }

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: Some(TaskId::from(id)),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn owner_check_compares_usernames() {
        let list = ProjectTaskList::new(project("ann"), vec![], Some(user("ann")));
        assert!(list.is_project_owner());

        let list = ProjectTaskList::new(project("ann"), vec![], Some(user("bob")));
        assert!(!list.is_project_owner());
    }

    #[test]
    fn anonymous_user_owns_nothing() {
        let list = ProjectTaskList::new(project("ann"), vec![], None);
        assert!(!list.is_project_owner());
    }

    #[test]
    fn unshift_prepends_and_replaces_stale_copy() {
        let mut list = ProjectTaskList::new(
            project("ann"),
            vec![task("1", "Dig"), task("2", "Pump")],
            None,
        );

        list.unshift(task("2", "Pump (updated)"));

        assert_eq!(list.len(), 2);
        assert_eq!(list.tasks()[0].title, "Pump (updated)");
        assert_eq!(list.tasks()[1].title, "Dig");
    }

    #[test]
    fn membership_is_found_by_username() {
        let mut member = TaskMember::apply_for(TaskId::from("1"), "");
        member.member = Some(user("bob"));
        member.status = MemberStatus::Accepted;

        assert!(is_member(&[member.clone()], Some(&user("bob"))));
        assert!(!is_member(&[member], Some(&user("carl"))));
        assert!(!is_member(&[], None));
    }

    #[test]
    fn author_check() {
        let mut t = task("1", "Dig");
        t.author = Some(user("ann"));
        assert!(is_author(&t, Some(&user("ann"))));
        assert!(!is_author(&t, None));
    }
}
