use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

/// Key presses, already stripped of terminal details. The app decides what
/// they mean for the current screen.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    Character(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
}

pub struct EventHandler {
    should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<Option<AppEvent>> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key_event) = event::read()? {
                return Ok(self.handle_key_event(key_event));
            }
        }
        Ok(None)
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<AppEvent> {
        let event = match key_event {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }
            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c),
            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => AppEvent::Enter,
            KeyEvent {
                code: KeyCode::Esc, ..
            } => AppEvent::Escape,
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => AppEvent::Backspace,
            KeyEvent {
                code: KeyCode::Tab, ..
            } => AppEvent::Tab,
            KeyEvent {
                code: KeyCode::BackTab,
                ..
            } => AppEvent::BackTab,
            KeyEvent {
                code: KeyCode::Up, ..
            } => AppEvent::Up,
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => AppEvent::Down,
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => AppEvent::Left,
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => AppEvent::Right,
            _ => return None,
        };
        Some(event)
    }
}
