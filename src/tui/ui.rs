use crate::core::state::App;
use crate::core::view::View;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    ChatView, RemindersView, SIDEBAR_WIDTH, Sidebar, SnippetsView, TitleBar,
};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin};

/// Draws the whole screen: title bar on top, sidebar on the left, the
/// mounted view in the remaining space.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [title_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());
    let [sidebar_area, main_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(body_area);
    let main_area = main_area.inner(Margin::new(1, 0));

    TitleBar::new(&app.provider_name, &app.model_name, &app.status_message)
        .render(frame, title_area);
    Sidebar::new(app.view).render(frame, sidebar_area);

    match app.view {
        View::Chat => {
            ChatView::new(&mut tui.chat, &app.chat, spinner_frame).render(frame, main_area)
        }
        View::Code => SnippetsView::new(&mut tui.snippets, &app.snippets).render(frame, main_area),
        View::Reminders => {
            RemindersView::new(&mut tui.reminders, &app.reminders).render(frame, main_area)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::core::chat::GREETING;
    use crate::tui::components::reminders_view::EMPTY_TEXT;
    use crate::tui::components::snippets_view::EMPTY_EDITOR_TEXT;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_ui_chat_screen() {
        let app = test_app();
        let mut tui = TuiState::new();
        let screen = draw(&app, &mut tui);
        assert!(screen.contains("scripted · test-model"));
        assert!(screen.contains("Welcome to devdeck!"));
        assert!(screen.contains("F1 Chat"));
        assert!(screen.contains(&GREETING[..20]));
    }

    #[test]
    fn test_draw_ui_follows_navigation() {
        let mut app = test_app();
        let mut tui = TuiState::new();

        update(&mut app, Action::Navigate(View::Code));
        assert!(draw(&app, &mut tui).contains(EMPTY_EDITOR_TEXT));

        update(&mut app, Action::Navigate(View::Reminders));
        let screen = draw(&app, &mut tui);
        assert!(screen.contains(EMPTY_TEXT));
        assert!(!screen.contains(&GREETING[..20]));
    }

    #[test]
    fn test_status_shows_thinking_while_pending() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        update(&mut app, Action::Submit("@ hi".to_string()));
        let screen = draw(&app, &mut tui);
        assert!(screen.contains("| Thinking..."));
    }
}
