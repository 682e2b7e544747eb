use std::sync::Arc;

use crate::domain::{
    Page, Record, SearchField, SkillId, TaskOrdering, TaskPreview, TaskSearch, TaskStatus,
};
use crate::ports::TaskRepository;

use super::AppResult;

/// Number of previews the server returns per page.
pub const PAGE_SIZE: u32 = 8;

/// Drives the task search form and the result list bound to it.
///
/// Every setter returns whether it caused a fetch. Changing any filter jumps
/// back to page 1; a fetch only happens while the query differs from the one
/// last sent, so writing a field with its current value is a no-op.
pub struct TaskSearchController {
    repository: Arc<dyn TaskRepository>,
    form: Record<TaskSearch>,
    results: Page<TaskPreview>,
}

impl TaskSearchController {
    /// Creates a fresh query and runs the first search.
    pub async fn new(repository: Arc<dyn TaskRepository>) -> AppResult<Self> {
        Self::with_query(repository, TaskSearch::default()).await
    }

    /// Like `new`, starting from a prepared query (used by the CLI).
    pub async fn with_query(
        repository: Arc<dyn TaskRepository>,
        query: TaskSearch,
    ) -> AppResult<Self> {
        let mut controller = Self {
            repository,
            form: Record::new(query),
            results: Page::empty(),
        };
        controller.update_search(SearchField::Page).await?;
        Ok(controller)
    }

    pub fn query(&self) -> &TaskSearch {
        self.form.get()
    }

    pub fn results(&self) -> &Page<TaskPreview> {
        &self.results
    }

    pub fn text(&self) -> &str {
        &self.form.text
    }

    pub fn skill(&self) -> Option<&SkillId> {
        self.form.skill.as_ref()
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.form.status
    }

    pub fn ordering(&self) -> TaskOrdering {
        self.form.ordering
    }

    pub fn page(&self) -> u32 {
        self.form.page
    }

    pub fn ordered_by_newest(&self) -> bool {
        self.form.ordering == TaskOrdering::Newest
    }

    pub fn ordered_by_deadline(&self) -> bool {
        self.form.ordering == TaskOrdering::Deadline
    }

    /// One-based index of the first result on this page.
    pub fn range_start(&self) -> i64 {
        i64::from(self.page()) * i64::from(PAGE_SIZE) - i64::from(PAGE_SIZE - 1)
    }

    /// One-based index of the last result on this page.
    pub fn range_end(&self) -> i64 {
        i64::from(self.page()) * i64::from(PAGE_SIZE) - i64::from(PAGE_SIZE)
            + self.results.len() as i64
    }

    pub fn has_next_page(&self) -> bool {
        self.range_start() < self.results.total as i64
    }

    pub fn has_previous_page(&self) -> bool {
        self.page() > 1
    }

    pub async fn set_text(&mut self, text: impl Into<String>) -> AppResult<bool> {
        let text = text.into();
        if self.form.text == text {
            return Ok(false);
        }
        self.form.get_mut().text = text;
        self.update_search(SearchField::Text).await
    }

    pub async fn set_skill(&mut self, skill: Option<SkillId>) -> AppResult<bool> {
        if self.form.skill == skill {
            return Ok(false);
        }
        self.form.get_mut().skill = skill;
        self.update_search(SearchField::Skill).await
    }

    pub async fn set_status(&mut self, status: Option<TaskStatus>) -> AppResult<bool> {
        if self.form.status == status {
            return Ok(false);
        }
        self.form.get_mut().status = status;
        self.update_search(SearchField::Status).await
    }

    pub async fn sort_order(&mut self, ordering: TaskOrdering) -> AppResult<bool> {
        if self.form.ordering == ordering {
            return Ok(false);
        }
        self.form.get_mut().ordering = ordering;
        self.update_search(SearchField::Ordering).await
    }

    pub async fn set_page(&mut self, page: u32) -> AppResult<bool> {
        if self.form.page == page {
            return Ok(false);
        }
        self.form.get_mut().page = page;
        self.update_search(SearchField::Page).await
    }

    pub async fn next_page(&mut self) -> AppResult<bool> {
        let page = self.page().saturating_add(1);
        self.set_page(page).await
    }

    /// Does not stop at page 1; check `has_previous_page` first. From page 1
    /// it moves to page 0, and `saturating_sub` keeps it at 0 rather than
    /// going negative.
    pub async fn previous_page(&mut self) -> AppResult<bool> {
        let page = self.page().saturating_sub(1);
        self.set_page(page).await
    }

    /// Empties text, skill and status in one step, then searches once.
    pub async fn clear_form(&mut self) -> AppResult<bool> {
        let form = self.form.get_mut();
        let changed = !form.text.is_empty() || form.skill.is_some() || form.status.is_some();
        form.text.clear();
        form.skill = None;
        form.status = None;

        if !changed {
            return Ok(false);
        }
        self.update_search(SearchField::Text).await
    }

    /// Reacts to a change of `changed`: filters other than the page reset the
    /// page, then the results are replaced if the query moved since the last
    /// fetch.
    pub async fn update_search(&mut self, changed: SearchField) -> AppResult<bool> {
        if changed != SearchField::Page {
            self.form.get_mut().page = 1;
        }

        if !self.form.is_dirty() {
            tracing::debug!("Search query unchanged, skipping fetch");
            return Ok(false);
        }

        let query = self.form.get().clone();
        tracing::debug!(
            page = query.page,
            ordering = %query.ordering,
            text = %query.text,
            "Searching tasks"
        );

        self.results = self.repository.search_tasks(&query).await?;
        self.form.mark_clean();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use crate::ports::{MockTaskRepository, RepositoryError};
    use std::sync::Mutex;

    fn preview(n: usize) -> TaskPreview {
        TaskPreview {
            id: TaskId(n.to_string()),
            title: format!("Task {n}"),
            description: String::new(),
            author: None,
            project: None,
            skill: None,
            location: String::new(),
            deadline: None,
            time_needed: None,
            status: TaskStatus::Open,
            member_count: 0,
        }
    }

    /// A repository answering every search with `count` items out of `total`,
    /// recording the queries it receives.
    fn recording_repo(
        count: usize,
        total: u64,
    ) -> (Arc<dyn TaskRepository>, Arc<Mutex<Vec<TaskSearch>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut mock = MockTaskRepository::new();
        mock.expect_search_tasks().returning(move |query| {
            log.lock().unwrap().push(query.clone());
            Ok(Page {
                items: (0..count).map(preview).collect(),
                total,
            })
        });
        (Arc::new(mock), seen)
    }

    #[tokio::test]
    async fn construction_runs_first_search() {
        let (repo, seen) = recording_repo(5, 5);
        let controller = TaskSearchController::new(repo).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], TaskSearch::default());
        assert_eq!(controller.results().len(), 5);
    }

    #[tokio::test]
    async fn range_on_first_page() {
        let (repo, _) = recording_repo(5, 5);
        let controller = TaskSearchController::new(repo).await.unwrap();

        assert_eq!(controller.range_start(), 1);
        assert_eq!(controller.range_end(), 5);
        assert!(!controller.has_previous_page());
    }

    #[tokio::test]
    async fn range_on_third_page() {
        let (repo, _) = recording_repo(8, 40);
        let mut controller = TaskSearchController::new(repo).await.unwrap();
        controller.set_page(3).await.unwrap();

        assert_eq!(controller.range_start(), 17);
        assert_eq!(controller.range_end(), 24);
    }

    #[tokio::test]
    async fn next_page_availability() {
        let (repo, _) = recording_repo(8, 25);
        let mut controller = TaskSearchController::new(repo).await.unwrap();

        controller.set_page(2).await.unwrap();
        assert!(controller.has_next_page());
        assert!(controller.has_previous_page());

        controller.set_page(4).await.unwrap();
        assert!(!controller.has_next_page());
    }

    #[tokio::test]
    async fn previous_page_stops_at_zero() {
        let (repo, seen) = recording_repo(5, 5);
        let mut controller = TaskSearchController::new(repo).await.unwrap();

        assert!(controller.previous_page().await.unwrap());
        assert_eq!(controller.page(), 0);
        assert!(!controller.has_previous_page());

        // Already at zero: same query, no fetch.
        let fetches = seen.lock().unwrap().len();
        assert!(!controller.previous_page().await.unwrap());
        assert_eq!(controller.page(), 0);
        assert_eq!(seen.lock().unwrap().len(), fetches);
    }

    #[tokio::test]
    async fn filter_change_resets_page_before_fetch() {
        let (repo, seen) = recording_repo(8, 100);
        let mut controller = TaskSearchController::new(repo).await.unwrap();
        controller.set_page(3).await.unwrap();

        assert!(controller.set_text("foo").await.unwrap());

        let seen = seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.text, "foo");
        assert_eq!(last.page, 1);
        assert_eq!(controller.page(), 1);
    }

    #[tokio::test]
    async fn page_change_keeps_page() {
        let (repo, seen) = recording_repo(8, 100);
        let mut controller = TaskSearchController::new(repo).await.unwrap();

        controller.next_page().await.unwrap();

        assert_eq!(controller.page(), 2);
        assert_eq!(seen.lock().unwrap().last().unwrap().page, 2);
    }

    #[tokio::test]
    async fn clear_form_fetches_once() {
        let (repo, seen) = recording_repo(3, 3);
        let mut controller = TaskSearchController::new(repo).await.unwrap();
        controller.set_text("garden").await.unwrap();
        controller
            .set_skill(Some(SkillId::from("4")))
            .await
            .unwrap();
        let before = seen.lock().unwrap().len();

        assert!(controller.clear_form().await.unwrap());

        assert_eq!(seen.lock().unwrap().len(), before + 1);
        assert_eq!(controller.text(), "");
        assert!(controller.skill().is_none());
        assert!(controller.status().is_none());
        assert_eq!(controller.ordering(), TaskOrdering::Newest);
    }

    #[tokio::test]
    async fn rewriting_same_value_does_not_fetch() {
        let (repo, seen) = recording_repo(1, 1);
        let mut controller = TaskSearchController::new(repo).await.unwrap();

        assert!(!controller.set_text("").await.unwrap());
        assert!(!controller.set_status(Some(TaskStatus::Open)).await.unwrap());
        assert!(!controller.sort_order(TaskOrdering::Newest).await.unwrap());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unchanged_query_skips_fetch() {
        let (repo, seen) = recording_repo(1, 1);
        let mut controller = TaskSearchController::new(repo).await.unwrap();

        assert!(!controller.update_search(SearchField::Page).await.unwrap());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ordering_flags_follow_sort_order() {
        let (repo, seen) = recording_repo(2, 2);
        let mut controller = TaskSearchController::new(repo).await.unwrap();
        assert!(controller.ordered_by_newest());

        controller.sort_order(TaskOrdering::Deadline).await.unwrap();
        assert!(controller.ordered_by_deadline());
        assert!(!controller.ordered_by_newest());
        assert_eq!(
            seen.lock().unwrap().last().unwrap().ordering,
            TaskOrdering::Deadline
        );
    }

    #[tokio::test]
    async fn results_are_replaced_not_appended() {
        let (repo, _) = recording_repo(8, 30);
        let mut controller = TaskSearchController::new(repo).await.unwrap();
        controller.next_page().await.unwrap();
        assert_eq!(controller.results().len(), 8);
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_on_next_change() {
        let mut mock = MockTaskRepository::new();
        let mut calls = 0;
        mock.expect_search_tasks().times(3).returning(move |_| {
            calls += 1;
            if calls == 2 {
                Err(RepositoryError::Network("timeout".into()))
            } else {
                Ok(Page::empty())
            }
        });
        let mut controller = TaskSearchController::new(Arc::new(mock)).await.unwrap();

        assert!(controller.set_text("a").await.is_err());
        assert!(controller.set_status(None).await.unwrap());
    }
}
