use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Single-line input used for the search text, motivations and file paths.
/// The cursor always sits at the end of the value.
pub struct TextInput {
    title: String,
    placeholder: String,
    value: String,
    is_focused: bool,
}

impl TextInput {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            placeholder: placeholder.into(),
            value: String::new(),
            is_focused: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn delete_char(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, text_style) = if self.value.is_empty() {
            (
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (self.value.as_str(), Style::default())
        };

        frame.render_widget(Paragraph::new(text).block(block).style(text_style), area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.value.chars().count() as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_handles_multibyte_characters() {
        let mut input = TextInput::new("Search", "");
        for c in "café".chars() {
            input.insert_char(c);
        }
        input.delete_char();
        assert_eq!(input.value(), "caf");

        input.clear();
        input.delete_char();
        assert_eq!(input.value(), "");
    }
}
