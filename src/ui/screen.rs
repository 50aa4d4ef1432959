use ratatui::Frame;

use crate::app::{App, AppState};
use crate::ui::quiz_list::QuizList;

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Quiz overview
pub struct ListScreen;

impl Screen for ListScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(QuizList(app), f.area());
    }
}

/// Running quiz, including its dialogs
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::List => Box::new(ListScreen),
        AppState::Taking => Box::new(SessionScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
