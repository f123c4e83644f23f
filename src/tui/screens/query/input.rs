//! Keyboard handling for the query screen

use super::state::{AppState, Tab};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Run the typed query.
    Submit,
    /// Reload the log group list.
    RefreshGroups,
    /// Expand or collapse the selected entry.
    ToggleEntry,
    ToggleRaw,
    SwitchTab,
    Exit,
}

pub fn handle_input(state: &mut AppState, event: Event) -> Action {
    // One query at a time: while loading only exit keys are honored.
    if state.loading {
        if let Event::Key(key) = event {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
                return Action::Exit;
            }
        }
        return Action::None;
    }

    match event {
        Event::Key(key) => handle_key(state, key),
        _ => Action::None,
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        return Action::Exit;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.input.clear();
        state.cursor_pos = 0;
        return Action::None;
    }
    if key.code == KeyCode::Tab {
        return Action::SwitchTab;
    }

    match state.tab {
        Tab::Query => handle_query_key(state, key),
        Tab::Groups => handle_groups_key(state, key),
    }
}

fn handle_query_key(state: &mut AppState, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => {
            if state.input.is_empty() {
                Action::ToggleEntry
            } else {
                Action::Submit
            }
        }
        KeyCode::Esc => {
            state.input.clear();
            state.cursor_pos = 0;
            Action::None
        }
        KeyCode::Backspace => {
            state.delete_char();
            Action::None
        }
        KeyCode::Left => {
            state.move_cursor_left();
            Action::None
        }
        KeyCode::Right => {
            state.move_cursor_right();
            Action::None
        }
        KeyCode::Home => {
            state.move_cursor_home();
            Action::None
        }
        KeyCode::End => {
            state.move_cursor_end();
            Action::None
        }
        KeyCode::Up => {
            state.results.select_prev();
            Action::None
        }
        KeyCode::Down => {
            state.results.select_next();
            Action::None
        }
        KeyCode::PageUp => {
            state.results.scroll_up();
            Action::None
        }
        KeyCode::PageDown => {
            state.results.scroll_down();
            Action::None
        }
        KeyCode::Char('q') if state.input.is_empty() => Action::Exit,
        KeyCode::Char('r') if state.input.is_empty() => Action::ToggleRaw,
        KeyCode::Char(' ') if state.input.is_empty() => Action::ToggleEntry,
        KeyCode::Char(c) => {
            state.insert_char(c);
            Action::None
        }
        _ => Action::None,
    }
}

fn handle_groups_key(state: &mut AppState, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Exit,
        KeyCode::Char('r') => Action::RefreshGroups,
        KeyCode::Enter | KeyCode::Char(' ') => Action::ToggleEntry,
        KeyCode::Up | KeyCode::Char('k') => {
            state.groups.select_prev();
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.groups.select_next();
            Action::None
        }
        KeyCode::PageUp => {
            state.groups.scroll_up();
            Action::None
        }
        KeyCode::PageDown => {
            state.groups.scroll_down();
            Action::None
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_fills_the_input_buffer() {
        let mut state = AppState::new();
        for c in "find errors".chars() {
            assert_eq!(handle_input(&mut state, press(KeyCode::Char(c))), Action::None);
        }
        assert_eq!(state.input, "find errors");
    }

    #[test]
    fn enter_submits_only_with_input() {
        let mut state = AppState::new();
        assert_eq!(handle_input(&mut state, press(KeyCode::Enter)), Action::ToggleEntry);
        state.insert_char('x');
        assert_eq!(handle_input(&mut state, press(KeyCode::Enter)), Action::Submit);
    }

    #[test]
    fn input_is_swallowed_while_loading() {
        let mut state = AppState::new();
        state.loading = true;
        assert_eq!(handle_input(&mut state, press(KeyCode::Char('x'))), Action::None);
        assert!(state.input.is_empty());
        assert_eq!(handle_input(&mut state, press(KeyCode::Enter)), Action::None);
    }

    #[test]
    fn refresh_only_works_on_groups_tab() {
        let mut state = AppState::new();
        assert_eq!(handle_input(&mut state, press(KeyCode::Char('r'))), Action::ToggleRaw);
        state.switch_tab();
        assert_eq!(handle_input(&mut state, press(KeyCode::Char('r'))), Action::RefreshGroups);
    }

    #[test]
    fn q_exits_when_buffer_empty_but_types_otherwise() {
        let mut state = AppState::new();
        state.insert_char('l');
        assert_eq!(handle_input(&mut state, press(KeyCode::Char('q'))), Action::None);
        assert_eq!(state.input, "lq");
        state.take_input();
        assert_eq!(handle_input(&mut state, press(KeyCode::Char('q'))), Action::Exit);
    }
}
