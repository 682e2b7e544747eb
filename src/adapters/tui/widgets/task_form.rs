use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::domain::{FieldErrors, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    EndGoal,
    Location,
    TimeNeeded,
    Deadline,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Description,
        FormField::EndGoal,
        FormField::Location,
        FormField::TimeNeeded,
        FormField::Deadline,
        FormField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::EndGoal => "End goal",
            FormField::Location => "Location",
            FormField::TimeNeeded => "Time needed (hours)",
            FormField::Deadline => "Deadline (YYYY-MM-DD)",
            FormField::Status => "Status",
        }
    }

    /// Name of the field in server validation messages.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::EndGoal => "end_goal",
            FormField::Location => "location",
            FormField::TimeNeeded => "time_needed",
            FormField::Deadline => "deadline",
            FormField::Status => "status",
        }
    }
}

fn field_value(task: &Task, field: FormField) -> String {
    match field {
        FormField::Title => task.title.clone(),
        FormField::Description => task.description.clone(),
        FormField::EndGoal => task.end_goal.clone(),
        FormField::Location => task.location.clone(),
        FormField::TimeNeeded => task.time_needed.map(|h| h.to_string()).unwrap_or_default(),
        FormField::Deadline => task
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        FormField::Status => task.status.to_string(),
    }
}

/// Text buffers for the task form. Only buffers the user touched are written
/// back, so an untouched form leaves the record clean.
pub struct TaskFormView {
    values: Vec<String>,
    initial: Vec<String>,
    focused: usize,
}

impl TaskFormView {
    pub fn from_task(task: &Task) -> Self {
        let values: Vec<String> = FormField::ALL
            .iter()
            .map(|field| field_value(task, *field))
            .collect();
        Self {
            initial: values.clone(),
            values,
            focused: 0,
        }
    }

    pub fn focused_field(&self) -> FormField {
        FormField::ALL[self.focused]
    }

    pub fn value(&self, field: FormField) -> &str {
        let index = FormField::ALL.iter().position(|f| *f == field).unwrap_or(0);
        &self.values[index]
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % FormField::ALL.len();
    }

    pub fn focus_previous(&mut self) {
        self.focused = (self.focused + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.values[self.focused].push(c);
    }

    pub fn delete_char(&mut self) {
        self.values[self.focused].pop();
    }

    /// Copies edited buffers into `task`. Values that cannot be parsed are
    /// reported per field and leave the task untouched.
    pub fn apply_to(&self, task: &mut Task) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut edited = task.clone();

        for (index, field) in FormField::ALL.iter().enumerate() {
            let value = &self.values[index];
            if *value == self.initial[index] {
                continue;
            }
            let value = value.trim();

            match field {
                FormField::Title => edited.title = value.to_string(),
                FormField::Description => edited.description = value.to_string(),
                FormField::EndGoal => edited.end_goal = value.to_string(),
                FormField::Location => edited.location = value.to_string(),
                FormField::TimeNeeded if value.is_empty() => edited.time_needed = None,
                FormField::TimeNeeded => match value.parse::<f64>() {
                    Ok(hours) if hours >= 0.0 => edited.time_needed = Some(hours),
                    _ => errors.add(field.key(), "Enter a number of hours."),
                },
                FormField::Deadline if value.is_empty() => edited.deadline = None,
                FormField::Deadline => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                    Ok(date) => {
                        edited.deadline = Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
                    }
                    Err(_) => errors.add(field.key(), "Use the format YYYY-MM-DD."),
                },
                FormField::Status => match value.parse::<TaskStatus>() {
                    Ok(status) => edited.status = status,
                    Err(e) => errors.add(field.key(), e.to_string()),
                },
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        *task = edited;
        Ok(())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, errors: Option<&FieldErrors>) {
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = Vec::new();
        for (index, field) in FormField::ALL.iter().enumerate() {
            let focused = index == self.focused;
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if focused { "> " } else { "  " };

            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{}: ", field.label()), label_style),
                Span::raw(self.values[index].clone()),
            ]));

            if let Some(messages) = errors.and_then(|e| e.get(field.key())) {
                for message in messages {
                    lines.push(Line::from(Span::styled(
                        format!("    {message}"),
                        Style::default().fg(Color::Red),
                    )));
                }
            }
        }

        if let Some(messages) = errors.and_then(|e| e.get("non_field_errors")) {
            lines.push(Line::from(""));
            for message in messages {
                lines.push(Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab/Up/Down: field | Enter: save | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;

    fn task() -> Task {
        Task {
            id: Some(TaskId::from("3")),
            title: "Fix the roof".to_string(),
            time_needed: Some(4.0),
            ..Default::default()
        }
    }

    fn type_into(view: &mut TaskFormView, field: FormField, text: &str) {
        while view.focused_field() != field {
            view.focus_next();
        }
        while !view.value(field).is_empty() {
            view.delete_char();
        }
        for c in text.chars() {
            view.insert_char(c);
        }
    }

    #[test]
    fn untouched_form_keeps_task_unchanged() {
        let original = task();
        let mut edited = original.clone();
        TaskFormView::from_task(&original)
            .apply_to(&mut edited)
            .unwrap();
        assert_eq!(edited, original);
    }

    #[test]
    fn edited_fields_are_parsed() {
        let mut view = TaskFormView::from_task(&task());
        type_into(&mut view, FormField::TimeNeeded, "8");
        type_into(&mut view, FormField::Deadline, "2030-05-01");
        type_into(&mut view, FormField::Status, "in progress");

        let mut edited = task();
        view.apply_to(&mut edited).unwrap();

        assert_eq!(edited.time_needed, Some(8.0));
        assert_eq!(
            edited.deadline.unwrap().format("%Y-%m-%d").to_string(),
            "2030-05-01"
        );
        assert!(edited.is_in_progress());
        assert_eq!(edited.title, "Fix the roof");
    }

    #[test]
    fn bad_values_are_reported_per_field() {
        let mut view = TaskFormView::from_task(&task());
        type_into(&mut view, FormField::Title, "Fix the whole roof");
        type_into(&mut view, FormField::TimeNeeded, "a while");
        type_into(&mut view, FormField::Deadline, "soon");

        let mut edited = task();
        let errors = view.apply_to(&mut edited).unwrap_err();

        assert!(errors.get("time_needed").is_some());
        assert!(errors.get("deadline").is_some());
        assert_eq!(edited, task());
    }

    #[test]
    fn focus_wraps_around() {
        let mut view = TaskFormView::from_task(&task());
        view.focus_previous();
        assert_eq!(view.focused_field(), FormField::Status);
        view.focus_next();
        assert_eq!(view.focused_field(), FormField::Title);
    }
}
