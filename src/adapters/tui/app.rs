use color_eyre::Result;
use std::sync::Arc;

use super::{
    event::{AppEvent, EventHandler},
    md,
    widgets::{TaskFormView, TextInput},
};
use crate::application::{
    AppResult, MutationState, ProjectOwnership, ProjectTaskDetail, ProjectTaskList, Route,
    StateManager, TaskFileController, TaskFormController, TaskMemberController,
    TaskSearchController,
};
use crate::domain::{
    FieldErrors, FileAttachment, MemberStatus, ProjectId, Skill, SkillId, Task, TaskOrdering,
    TaskPreview, TaskStatus, STATUS_FILTER_OPTIONS, STATUS_FILTER_PROMPT,
};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Search,
    TaskDetail,
    ProjectTasks,
    TaskForm,
    Prompt,
}

enum PromptAction {
    Apply(TaskMemberController),
    Upload(TaskFileController),
}

/// One-line dialog on top of the task detail.
struct Prompt {
    action: PromptAction,
    input: TextInput,
}

struct TaskForm {
    controller: TaskFormController,
    view: TaskFormView,
    // Values the form could not parse, before anything is sent.
    local_errors: Option<FieldErrors>,
}

pub struct App {
    state_manager: Arc<StateManager>,

    screen: Screen,
    back_to: Screen,
    show_help: bool,

    // Search
    search: TaskSearchController,
    search_input: TextInput,
    skills: Vec<Skill>,
    result_state: TableState,

    // Task detail
    detail: Option<ProjectTaskDetail>,
    member_state: TableState,

    // Project task list
    project_tasks: Option<ProjectTaskList>,
    project_task_state: TableState,

    task_form: Option<TaskForm>,
    prompt: Option<Prompt>,

    status_message: Option<String>,
    error_message: Option<String>,
}

impl App {
    pub fn new(state_manager: Arc<StateManager>, search: TaskSearchController) -> Self {
        let mut result_state = TableState::default();
        reset_selection(&mut result_state, search.results().len());
        let search_input =
            TextInput::new("Search", "Press / to search tasks").with_value(search.text());

        Self {
            state_manager,
            screen: Screen::Search,
            back_to: Screen::Search,
            show_help: false,
            search,
            search_input,
            skills: Vec::new(),
            result_state,
            detail: None,
            member_state: TableState::default(),
            project_tasks: None,
            project_task_state: TableState::default(),
            task_form: None,
            prompt: None,
            status_message: None,
            error_message: None,
        }
    }

    pub async fn initialize(&mut self) -> Result<()> {
        match self.state_manager.list_skills(true).await {
            Ok(skills) => self.skills = skills,
            Err(e) => {
                tracing::warn!("Could not load skills: {}", e);
                self.error_message = Some(format!("Could not load skills: {e}"));
            }
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        if event == AppEvent::Quit {
            return Ok(true);
        }
        if self.show_help {
            self.show_help = false;
            return Ok(false);
        }

        self.error_message = None;
        self.status_message = None;

        let outcome = match self.screen {
            Screen::Search => self.handle_search_event(event).await,
            Screen::TaskDetail => self.handle_detail_event(event).await,
            Screen::ProjectTasks => self.handle_project_tasks_event(event).await,
            Screen::TaskForm => self.handle_task_form_event(event).await,
            Screen::Prompt => self.handle_prompt_event(event).await,
        };

        match outcome {
            Ok(quit) => Ok(quit),
            Err(e) => {
                tracing::error!("Action failed: {}", e);
                self.error_message = Some(e.to_string());
                Ok(false)
            }
        }
    }

    async fn handle_search_event(&mut self, event: AppEvent) -> AppResult<bool> {
        if self.search_input.is_focused() {
            match event {
                AppEvent::Character(c) => self.search_input.insert_char(c),
                AppEvent::Backspace => self.search_input.delete_char(),
                AppEvent::Enter => {
                    self.search_input.set_focused(false);
                    let text = self.search_input.value().trim().to_string();
                    let changed = self.search.set_text(text).await?;
                    self.search_updated(changed);
                }
                AppEvent::Escape => {
                    self.search_input.set_value(self.search.text());
                    self.search_input.set_focused(false);
                }
                _ => {}
            }
            return Ok(false);
        }

        let results = self.search.results().len();
        match event {
            AppEvent::Character('q') => return Ok(true),
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Character('/') => self.search_input.set_focused(true),
            AppEvent::Character('j') | AppEvent::Down => {
                select_next(&mut self.result_state, results)
            }
            AppEvent::Character('k') | AppEvent::Up => {
                select_previous(&mut self.result_state, results)
            }
            AppEvent::Character('s') => {
                let options: Vec<TaskStatus> =
                    STATUS_FILTER_OPTIONS.iter().map(|o| o.value).collect();
                let status = cycle_option(&options, self.search.status().as_ref());
                let changed = self.search.set_status(status).await?;
                self.search_updated(changed);
            }
            AppEvent::Character('f') => {
                let ids: Vec<SkillId> = self.skills.iter().map(|s| s.id.clone()).collect();
                let skill = cycle_option(&ids, self.search.skill());
                let changed = self.search.set_skill(skill).await?;
                self.search_updated(changed);
            }
            AppEvent::Character('o') => {
                let ordering = match self.search.ordering() {
                    TaskOrdering::Newest => TaskOrdering::Deadline,
                    TaskOrdering::Deadline => TaskOrdering::Newest,
                };
                let changed = self.search.sort_order(ordering).await?;
                self.search_updated(changed);
            }
            AppEvent::Character('x') => {
                self.search_input.clear();
                let changed = self.search.clear_form().await?;
                self.search_updated(changed);
            }
            AppEvent::Character(']') | AppEvent::Right => {
                if self.search.has_next_page() {
                    let changed = self.search.next_page().await?;
                    self.search_updated(changed);
                }
            }
            AppEvent::Character('[') | AppEvent::Left => {
                if self.search.has_previous_page() {
                    let changed = self.search.previous_page().await?;
                    self.search_updated(changed);
                }
            }
            AppEvent::Character('n') => self.open_new_task_form(None).await?,
            AppEvent::Character('r') => {
                self.state_manager.refresh_all_caches().await;
                self.skills = self.state_manager.list_skills(false).await?;
                self.status_message = Some("Caches cleared".into());
            }
            AppEvent::Enter => {
                let selected = self
                    .result_state
                    .selected()
                    .and_then(|i| self.search.results().items.get(i))
                    .map(|preview| preview.id.clone());
                if let Some(id) = selected {
                    self.back_to = Screen::Search;
                    self.navigate(Route::ProjectTask(id)).await?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn search_updated(&mut self, fetched: bool) {
        if fetched {
            reset_selection(&mut self.result_state, self.search.results().len());
        }
    }

    async fn handle_detail_event(&mut self, event: AppEvent) -> AppResult<bool> {
        let Some(detail) = self.detail.as_ref() else {
            self.screen = Screen::Search;
            return Ok(false);
        };
        let members = detail.members.len();
        let is_member = detail.is_member();
        let open_for_members = accepts_applications(&detail.task);
        let project = detail.project.id.clone();
        let task_id = detail.task.id.clone();

        match event {
            AppEvent::Character('q') => return Ok(true),
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Escape | AppEvent::Character('b') => self.screen = self.back_to,
            AppEvent::Character('j') | AppEvent::Down => {
                select_next(&mut self.member_state, members)
            }
            AppEvent::Character('k') | AppEvent::Up => {
                select_previous(&mut self.member_state, members)
            }
            AppEvent::Left => self.change_member_status(false).await?,
            AppEvent::Right => self.change_member_status(true).await?,
            AppEvent::Character('e') => {
                if let Some(id) = task_id {
                    let controller = self.state_manager.edit_task_form(&id).await?;
                    self.open_task_form(controller);
                }
            }
            AppEvent::Character('n') => self.open_new_task_form(Some(project)).await?,
            AppEvent::Character('l') => {
                self.navigate(Route::ProjectTaskList(project)).await?;
            }
            AppEvent::Character('a') => {
                if is_member {
                    self.status_message = Some("You are already a member of this task".into());
                } else if !open_for_members {
                    self.status_message = Some("This task no longer takes applications".into());
                } else if let Some(id) = task_id {
                    let controller = self.state_manager.member_application(id);
                    self.open_prompt(
                        PromptAction::Apply(controller),
                        TextInput::new("Motivation", "Why do you want to help?"),
                    );
                }
            }
            AppEvent::Character('u') => {
                if let Some(id) = task_id {
                    let controller = self.state_manager.file_upload(id);
                    self.open_prompt(
                        PromptAction::Upload(controller),
                        TextInput::new("Upload file", "Path of the file to attach"),
                    );
                }
            }
            _ => {}
        }
        Ok(false)
    }

    /// Moves the selected member to the next or previous status. Only the
    /// project owner may do this.
    async fn change_member_status(&mut self, forward: bool) -> AppResult<()> {
        let Some(detail) = self.detail.as_ref() else {
            return Ok(());
        };
        if !detail.is_project_owner() {
            self.status_message = Some("Only the project owner can change members".into());
            return Ok(());
        }
        let Some(member) = self
            .member_state
            .selected()
            .and_then(|i| detail.members.get(i))
            .cloned()
        else {
            return Ok(());
        };

        let status = cycle_member_status(member.status, forward);
        let selected = self.member_state.selected();
        let mut controller = self.state_manager.member_editor(member);
        controller.set_status(status);
        let state = controller.update_task_member().await?.clone();
        let saved = matches!(state, MutationState::Navigated(_));
        self.finish_mutation(state).await?;
        if saved {
            self.status_message = Some(member_change_message(&controller));
        }
        self.member_state.select(selected);
        Ok(())
    }

    async fn handle_project_tasks_event(&mut self, event: AppEvent) -> AppResult<bool> {
        let Some(list) = self.project_tasks.as_ref() else {
            self.screen = Screen::Search;
            return Ok(false);
        };
        let len = list.len();
        let project = list.project().id.clone();

        match event {
            AppEvent::Character('q') => return Ok(true),
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Escape | AppEvent::Character('b') => self.screen = Screen::Search,
            AppEvent::Character('j') | AppEvent::Down => {
                select_next(&mut self.project_task_state, len)
            }
            AppEvent::Character('k') | AppEvent::Up => {
                select_previous(&mut self.project_task_state, len)
            }
            AppEvent::Character('n') => self.open_new_task_form(Some(project)).await?,
            AppEvent::Enter => {
                let selected = self
                    .project_task_state
                    .selected()
                    .and_then(|i| list.tasks().get(i))
                    .and_then(|task| task.id.clone());
                if let Some(id) = selected {
                    self.back_to = Screen::ProjectTasks;
                    self.navigate(Route::ProjectTask(id)).await?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    async fn open_new_task_form(&mut self, project: Option<ProjectId>) -> AppResult<()> {
        let controller = self.state_manager.new_task_form(project).await?;
        self.open_task_form(controller);
        Ok(())
    }

    fn open_task_form(&mut self, controller: TaskFormController) {
        let view = TaskFormView::from_task(controller.task());
        self.task_form = Some(TaskForm {
            controller,
            view,
            local_errors: None,
        });
        self.screen = Screen::TaskForm;
    }

    async fn handle_task_form_event(&mut self, event: AppEvent) -> AppResult<bool> {
        let Some(form) = self.task_form.as_mut() else {
            self.screen = Screen::Search;
            return Ok(false);
        };

        match event {
            AppEvent::Tab | AppEvent::Down => form.view.focus_next(),
            AppEvent::BackTab | AppEvent::Up => form.view.focus_previous(),
            AppEvent::Character(c) => form.view.insert_char(c),
            AppEvent::Backspace => form.view.delete_char(),
            AppEvent::Escape => {
                let state = form.controller.cancel_changes_to_task().clone();
                self.task_form = None;
                self.finish_mutation(state).await?;
            }
            AppEvent::Enter => self.submit_task_form().await?,
            _ => {}
        }
        Ok(false)
    }

    async fn submit_task_form(&mut self) -> AppResult<()> {
        let Some(form) = self.task_form.as_mut() else {
            return Ok(());
        };

        if let Err(errors) = form.view.apply_to(form.controller.task_mut()) {
            form.local_errors = Some(errors);
            return Ok(());
        }
        form.local_errors = None;

        let project = form.controller.project().clone();
        let mut list = self.state_manager.get_project_tasks(&project, true).await?;

        let state = if form.controller.is_new() {
            let state = form.controller.add_task().await?.clone();
            if state.route().is_some() {
                list.unshift(form.controller.task().clone());
            }
            state
        } else {
            form.controller.update_task(&mut list).await?.clone()
        };

        if state.route().is_some() {
            self.state_manager.store_project_tasks(&list).await;
            self.task_form = None;
            self.status_message = Some("Task saved".into());
        }
        self.finish_mutation(state).await
    }

    fn open_prompt(&mut self, action: PromptAction, mut input: TextInput) {
        input.set_focused(true);
        self.prompt = Some(Prompt { action, input });
        self.screen = Screen::Prompt;
    }

    async fn handle_prompt_event(&mut self, event: AppEvent) -> AppResult<bool> {
        let Some(prompt) = self.prompt.as_mut() else {
            self.screen = Screen::TaskDetail;
            return Ok(false);
        };

        match event {
            AppEvent::Character(c) => prompt.input.insert_char(c),
            AppEvent::Backspace => prompt.input.delete_char(),
            AppEvent::Escape => {
                if let Some(Prompt {
                    action: PromptAction::Apply(mut controller),
                    ..
                }) = self.prompt.take()
                {
                    controller.cancel();
                }
                self.screen = Screen::TaskDetail;
            }
            AppEvent::Enter => {
                let value = prompt.input.value().trim().to_string();
                let state = match &mut prompt.action {
                    PromptAction::Apply(controller) => {
                        controller.set_motivation(value);
                        controller.apply().await?.clone()
                    }
                    PromptAction::Upload(controller) => {
                        if !value.is_empty() {
                            controller.add_file(FileAttachment::local(value));
                        }
                        controller.upload_task_file().await?.clone()
                    }
                };

                if state.route().is_some() {
                    self.prompt = None;
                }
                self.finish_mutation(state).await?;
            }
            _ => {}
        }
        Ok(false)
    }

    async fn finish_mutation(&mut self, state: MutationState) -> AppResult<()> {
        match state {
            MutationState::Navigated(route) => self.navigate(route).await,
            MutationState::ErrorsShown(errors) => {
                self.error_message = Some(errors.to_string());
                Ok(())
            }
            MutationState::Idle | MutationState::Submitting => Ok(()),
        }
    }

    async fn navigate(&mut self, route: Route) -> AppResult<()> {
        tracing::debug!("Navigating to {:?}", route);
        match route {
            Route::ProjectTaskList(project) => {
                self.state_manager.set_current_project(project.clone()).await?;
                let list = self.state_manager.get_project_tasks(&project, true).await?;
                reset_selection(&mut self.project_task_state, list.len());
                self.project_tasks = Some(list);
                self.screen = Screen::ProjectTasks;
            }
            Route::ProjectTask(id) => {
                let detail = self.state_manager.get_task_detail(&id).await?;
                reset_selection(&mut self.member_state, detail.members.len());
                self.detail = Some(detail);
                self.screen = Screen::TaskDetail;
            }
        }
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        match self.screen {
            Screen::Search => self.render_search(frame, chunks[0]),
            Screen::TaskDetail => self.render_detail(frame, chunks[0]),
            Screen::ProjectTasks => self.render_project_tasks(frame, chunks[0]),
            Screen::TaskForm => self.render_task_form(frame, chunks[0]),
            Screen::Prompt => {
                self.render_detail(frame, chunks[0]);
                self.render_prompt(frame);
            }
        }

        self.render_status_bar(frame, chunks[1]);

        if self.show_help {
            self.render_help(frame);
        }
    }

    fn skill_name(&self, id: Option<&SkillId>) -> Option<&str> {
        let id = id?;
        self.skills
            .iter()
            .find(|skill| &skill.id == id)
            .map(|skill| skill.name.as_str())
    }

    fn render_search(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.search_input.render(frame, chunks[0]);

        let status = STATUS_FILTER_OPTIONS
            .iter()
            .find(|o| Some(o.value) == self.search.status())
            .map(|o| o.title)
            .or_else(|| self.search.status().map(|s| s.as_str()))
            .unwrap_or(STATUS_FILTER_PROMPT);
        let skill = self
            .skill_name(self.search.skill())
            .unwrap_or("any skill")
            .to_string();
        let active = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let inactive = Style::default().fg(Color::DarkGray);
        let filters = Line::from(vec![
            Span::raw(" Skill: "),
            Span::styled(skill, active),
            Span::raw(" | Status: "),
            Span::styled(status, active),
            Span::raw(" | Order: "),
            Span::styled(
                "newest",
                if self.search.ordered_by_newest() { active } else { inactive },
            ),
            Span::raw(" "),
            Span::styled(
                "deadline",
                if self.search.ordered_by_deadline() { active } else { inactive },
            ),
        ]);
        frame.render_widget(Paragraph::new(filters), chunks[1]);

        let block = Block::default()
            .title("Tasks")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));

        if self.search.results().is_empty() {
            let paragraph = Paragraph::new("No tasks match your search")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, chunks[2]);
        } else {
            let rows: Vec<Row> = self
                .search
                .results()
                .items
                .iter()
                .map(|task| {
                    Row::new(vec![
                        Cell::from(task.title.clone()).style(preview_title_style(task)),
                        Cell::from(status_span(task.status)),
                        Cell::from(self.skill_name(task.skill.as_ref()).unwrap_or("").to_string()),
                        Cell::from(task.time_needed_display()),
                        Cell::from(task.deadline_display())
                            .style(Style::default().fg(Color::DarkGray)),
                        Cell::from(task.member_count.to_string()),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                &[
                    Constraint::Min(20),
                    Constraint::Length(12),
                    Constraint::Length(16),
                    Constraint::Length(18),
                    Constraint::Length(12),
                    Constraint::Length(4),
                ],
            )
            .header(
                Row::new(vec!["Title", "Status", "Skill", "Time", "Deadline", "Mbr"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(block)
            .row_highlight_style(Style::default().bg(Color::DarkGray));

            frame.render_stateful_widget(table, chunks[2], &mut self.result_state);
        }

        let range = if self.search.results().is_empty() {
            " No results".to_string()
        } else {
            format!(
                " Showing {}-{} of {} | page {}",
                self.search.range_start(),
                self.search.range_end(),
                self.search.results().total,
                self.search.page()
            )
        };
        frame.render_widget(
            Paragraph::new(range).style(Style::default().fg(Color::Gray)),
            chunks[3],
        );
    }

    fn render_detail(&mut self, frame: &mut Frame, area: Rect) {
        let Some(detail) = self.detail.as_ref() else {
            return;
        };
        let task = &detail.task;

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let mut badges = Vec::new();
        if detail.is_project_owner() {
            badges.push("owner");
        }
        if detail.is_author() {
            badges.push("author");
        }
        if detail.is_member() {
            badges.push("member");
        }
        if let Some(badge) = finished_badge(task) {
            badges.push(badge);
        }
        let title = if badges.is_empty() {
            task.title.clone()
        } else {
            format!("{} [{}]", task.title, badges.join(", "))
        };

        let label = Style::default().fg(Color::Gray);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Project:  ", label),
                Span::raw(detail.project.title.clone()),
            ]),
            Line::from(vec![Span::styled("Status:   ", label), status_span(task.status)]),
            Line::from(vec![
                Span::styled("Author:   ", label),
                Span::raw(
                    task.author
                        .as_ref()
                        .map(|a| a.display_name().to_string())
                        .unwrap_or_default(),
                ),
            ]),
            Line::from(vec![
                Span::styled("Skill:    ", label),
                Span::raw(self.skill_name(task.skill.as_ref()).unwrap_or("").to_string()),
            ]),
            Line::from(vec![
                Span::styled("Location: ", label),
                Span::raw(task.location.clone()),
            ]),
            Line::from(vec![
                Span::styled("Time:     ", label),
                Span::raw(task.time_needed_display()),
            ]),
            Line::from(vec![
                Span::styled("Deadline: ", label),
                Span::raw(task.deadline_display()),
            ]),
        ];
        if !task.end_goal.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("End goal: ", label),
                Span::raw(task.end_goal.clone()),
            ]));
        }
        lines.push(Line::from(""));
        lines.extend(md::to_lines(&md::html_to_markdown(&task.description)));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, chunks[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let member_rows: Vec<Row> = detail
            .members
            .iter()
            .map(|member| {
                let name = member
                    .member
                    .as_ref()
                    .map(|m| m.display_name().to_string())
                    .unwrap_or_default();
                Row::new(vec![
                    Cell::from(name),
                    Cell::from(Span::styled(
                        member.status.to_string(),
                        member_status_style(member.status),
                    )),
                ])
            })
            .collect();
        let members = Table::new(member_rows, &[Constraint::Min(12), Constraint::Length(10)])
            .block(
                Block::default()
                    .title(format!("Members ({})", detail.members.len()))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .row_highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(members, side[0], &mut self.member_state);

        let files: Vec<Line> = detail
            .files
            .iter()
            .map(|file| Line::from(format!("- {}", file.title)))
            .collect();
        let files = Paragraph::new(files).block(
            Block::default()
                .title(format!("Files ({})", detail.files.len()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(files, side[1]);
    }

    fn render_project_tasks(&mut self, frame: &mut Frame, area: Rect) {
        let Some(list) = self.project_tasks.as_ref() else {
            return;
        };

        let title = format!(
            "{} ({}) | open {} | in progress {} | realised {}",
            list.project().title,
            list.len(),
            list.count_with_status(TaskStatus::Open),
            list.count_with_status(TaskStatus::InProgress),
            list.count_with_status(TaskStatus::Realized),
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));

        let rows: Vec<Row> = list
            .tasks()
            .iter()
            .map(|task| {
                Row::new(vec![
                    Cell::from(task.title.clone()),
                    Cell::from(status_span(task.status)),
                    Cell::from(task.deadline_display())
                        .style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            &[
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray));

        frame.render_stateful_widget(table, area, &mut self.project_task_state);
    }

    fn render_task_form(&self, frame: &mut Frame, area: Rect) {
        let Some(form) = self.task_form.as_ref() else {
            return;
        };
        let title = match &form.controller.task().id {
            Some(id) => format!("Edit task {id}"),
            None => format!("New task in {}", form.controller.project()),
        };
        let errors = form.local_errors.as_ref().or(form.controller.errors());
        form.view.render(frame, area, &title, errors);
    }

    fn render_prompt(&self, frame: &mut Frame) {
        let Some(prompt) = self.prompt.as_ref() else {
            return;
        };
        let popup = Self::centered_rect(60, 20, frame.area());
        let area = Rect {
            height: popup.height.min(3),
            ..popup
        };
        frame.render_widget(Clear, area);
        prompt.input.render(frame, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(error) = &self.error_message {
            let paragraph = Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red));
            frame.render_widget(paragraph, area);
            return;
        }
        if let Some(message) = &self.status_message {
            let paragraph =
                Paragraph::new(message.as_str()).style(Style::default().fg(Color::Green));
            frame.render_widget(paragraph, area);
            return;
        }

        let help_text = match self.screen {
            Screen::Search if self.search_input.is_focused() => "Enter: search | Esc: cancel",
            Screen::Search => "j/k: navigate | Enter: open | /: text | s: status | f: skill | o: order | x: clear | [ ]: page | r: refresh | ?: help",
            Screen::TaskDetail => "Esc: back | e: edit | a: apply | u: upload | l: project tasks | Left/Right: member status | ?: help",
            Screen::ProjectTasks => "j/k: navigate | Enter: open | n: new task | Esc: back | ?: help",
            Screen::TaskForm => "Tab: next field | Enter: save | Esc: cancel",
            Screen::Prompt => "Enter: submit | Esc: cancel",
        };

        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            "Task board help",
            "",
            "Search:",
            "  j/k or Up/Down - Move through results",
            "  Enter          - Open task",
            "  /              - Edit search text",
            "  s              - Cycle status filter",
            "  f              - Cycle skill filter",
            "  o              - Toggle newest / deadline ordering",
            "  x              - Clear text, skill and status",
            "  [ / ]          - Previous / next page",
            "  n              - New task in the selected project",
            "  r              - Clear caches and reload skills",
            "",
            "Task detail:",
            "  e              - Edit task",
            "  a              - Apply for task",
            "  u              - Upload a file",
            "  l              - Project task list",
            "  n              - New task in this project",
            "  j/k            - Select member",
            "  Left/Right     - Change member status (project owner)",
            "  Esc            - Back",
            "",
            "General:",
            "  ?              - Show this help",
            "  q              - Quit",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().title("Help").borders(Borders::ALL))
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

fn status_span(status: TaskStatus) -> Span<'static> {
    let color = match status {
        TaskStatus::Open => Color::Green,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Closed => Color::DarkGray,
        TaskStatus::Realized => Color::Blue,
    };
    Span::styled(status.as_str(), Style::default().fg(color))
}

fn member_status_style(status: MemberStatus) -> Style {
    match status {
        MemberStatus::Applied => Style::default().fg(Color::Yellow),
        MemberStatus::Accepted => Style::default().fg(Color::Green),
        MemberStatus::Rejected => Style::default().fg(Color::Red),
        MemberStatus::Realized => Style::default().fg(Color::Blue),
    }
}

/// Open tasks stand out in the result list; finished ones fade.
fn preview_title_style(task: &TaskPreview) -> Style {
    if task.is_open() {
        Style::default().add_modifier(Modifier::BOLD)
    } else if task.is_closed() || task.is_realized() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn accepts_applications(task: &Task) -> bool {
    task.is_open() || task.is_in_progress()
}

fn finished_badge(task: &Task) -> Option<&'static str> {
    if task.is_closed() {
        Some("closed")
    } else if task.is_realized() {
        Some("realised")
    } else {
        None
    }
}

fn member_change_message(controller: &TaskMemberController) -> String {
    let name = controller
        .member()
        .member
        .as_ref()
        .map(|user| user.display_name().to_string())
        .unwrap_or_else(|| "Member".to_string());
    let outcome = if controller.is_accepted() {
        "was accepted"
    } else if controller.is_rejected() {
        "was rejected"
    } else if controller.is_realized() {
        "completed the task"
    } else if controller.is_applied() {
        "is back to applied"
    } else {
        "was updated"
    };
    format!("{name} {outcome}")
}

/// Steps through `options` and then back to no selection.
fn cycle_option<T: PartialEq + Clone>(options: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(current) => options
            .iter()
            .position(|option| option == current)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}

fn cycle_member_status(status: MemberStatus, forward: bool) -> MemberStatus {
    let all = MemberStatus::ALL;
    let index = all.iter().position(|s| *s == status).unwrap_or(0);
    let next = if forward {
        (index + 1) % all.len()
    } else {
        (index + all.len() - 1) % all.len()
    };
    all[next]
}

fn reset_selection(state: &mut TableState, len: usize) {
    state.select(if len == 0 { None } else { Some(0) });
}

fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = state.selected().map_or(0, |i| (i + 1).min(len - 1));
    state.select(Some(i));
}

fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = state.selected().map_or(0, |i| i.saturating_sub(1));
    state.select(Some(i));
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize().await?;

    let mut event_handler = EventHandler::new();

    let result = async {
        loop {
            terminal.draw(|frame| app.render(frame))?;

            if let Some(event) = event_handler.next_event().await? {
                if app.handle_event(event).await? {
                    break;
                }
            }

            if event_handler.should_quit() {
                break;
            }
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;

    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskMember, UserId, UserPreview};
    use crate::ports::MockTaskMemberRepository;

    #[test]
    fn status_filter_cycles_back_to_any() {
        let options: Vec<TaskStatus> = STATUS_FILTER_OPTIONS.iter().map(|o| o.value).collect();

        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = cycle_option(&options, current.as_ref());
            seen.push(current);
        }

        assert_eq!(
            seen,
            vec![
                Some(TaskStatus::Open),
                Some(TaskStatus::InProgress),
                Some(TaskStatus::Realized),
                None,
            ]
        );
    }

    #[test]
    fn unknown_current_value_resets() {
        let options = vec![SkillId::from("1"), SkillId::from("2")];
        assert_eq!(cycle_option(&options, Some(&SkillId::from("9"))), None);
        assert_eq!(cycle_option::<SkillId>(&[], None), None);
    }

    #[test]
    fn member_status_wraps() {
        assert_eq!(
            cycle_member_status(MemberStatus::Realized, true),
            MemberStatus::Applied
        );
        assert_eq!(
            cycle_member_status(MemberStatus::Applied, false),
            MemberStatus::Realized
        );
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut state = TableState::default();
        select_next(&mut state, 2);
        select_next(&mut state, 2);
        select_next(&mut state, 2);
        assert_eq!(state.selected(), Some(1));

        select_previous(&mut state, 2);
        select_previous(&mut state, 2);
        assert_eq!(state.selected(), Some(0));

        select_next(&mut state, 0);
        assert_eq!(state.selected(), None);
    }

    fn preview(status: TaskStatus) -> TaskPreview {
        TaskPreview {
            id: TaskId::from("7"),
            title: "Paint the fence".to_string(),
            description: String::new(),
            author: None,
            project: None,
            skill: None,
            location: String::new(),
            deadline: None,
            time_needed: None,
            status,
            member_count: 0,
        }
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            status,
            ..Default::default()
        }
    }

    #[test]
    fn result_titles_follow_task_status() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let faded = Style::default().fg(Color::DarkGray);

        assert_eq!(preview_title_style(&preview(TaskStatus::Open)), bold);
        assert_eq!(preview_title_style(&preview(TaskStatus::InProgress)), Style::default());
        assert_eq!(preview_title_style(&preview(TaskStatus::Closed)), faded);
        assert_eq!(preview_title_style(&preview(TaskStatus::Realized)), faded);
    }

    #[test]
    fn only_running_tasks_take_applications() {
        assert!(accepts_applications(&task(TaskStatus::Open)));
        assert!(accepts_applications(&task(TaskStatus::InProgress)));
        assert!(!accepts_applications(&task(TaskStatus::Closed)));
        assert!(!accepts_applications(&task(TaskStatus::Realized)));

        assert_eq!(finished_badge(&task(TaskStatus::Open)), None);
        assert_eq!(finished_badge(&task(TaskStatus::Closed)), Some("closed"));
        assert_eq!(finished_badge(&task(TaskStatus::Realized)), Some("realised"));
    }

    #[test]
    fn member_change_names_the_member_and_outcome() {
        let mut member = TaskMember::apply_for(TaskId::from("7"), "");
        member.member = Some(UserPreview {
            id: UserId::from("3"),
            username: "ann".to_string(),
            full_name: None,
            avatar: None,
        });

        let repository = Arc::new(MockTaskMemberRepository::new());
        let mut controller = TaskMemberController::edit(repository, member.clone());
        controller.set_status(MemberStatus::Accepted);
        assert_eq!(member_change_message(&controller), "ann was accepted");

        controller.set_status(MemberStatus::Rejected);
        assert!(member_change_message(&controller).ends_with("was rejected"));
        controller.set_status(MemberStatus::Realized);
        assert!(member_change_message(&controller).ends_with("completed the task"));

        member.member = None;
        let controller =
            TaskMemberController::edit(Arc::new(MockTaskMemberRepository::new()), member);
        assert_eq!(member_change_message(&controller), "Member is back to applied");
    }
}
