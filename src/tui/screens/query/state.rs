//! Screen state for the query and groups tabs

use crate::render::{Entry, Section};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Query,
    Groups,
}

/// Navigable view over a section tree: tracks which collapsible entries
/// are expanded and which one the cursor is on.
#[derive(Default)]
pub struct ResultsView {
    pub sections: Vec<Section>,
    pub expanded: HashSet<usize>,
    pub selected: usize,
    pub scroll_offset: u16,
}

impl ResultsView {
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        self.expanded.clear();
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.set_sections(Vec::new());
    }

    /// Number of collapsible entries across all sections.
    pub fn collapsible_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|section| &section.entries)
            .filter(|entry| matches!(entry, Entry::Collapsible { .. }))
            .count()
    }

    pub fn toggle_selected(&mut self) {
        if self.collapsible_count() == 0 {
            return;
        }
        if !self.expanded.remove(&self.selected) {
            self.expanded.insert(self.selected);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        let count = self.collapsible_count();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }
}

pub struct AppState {
    pub tab: Tab,
    /// Query input buffer and cursor.
    pub input: String,
    pub cursor_pos: usize,
    /// True while a query or refresh is in flight; input is swallowed.
    pub loading: bool,
    pub loading_frame: usize,
    pub status_message: Option<String>,
    /// Shown when a query yielded no renderable answer.
    pub notice: Option<String>,
    pub results: ResultsView,
    /// Raw fallback view of the last result, toggled by the user.
    pub raw_view: Option<String>,
    pub show_raw: bool,
    pub groups: ResultsView,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tab: Tab::Query,
            input: String::new(),
            cursor_pos: 0,
            loading: false,
            loading_frame: 0,
            status_message: None,
            notice: None,
            results: ResultsView::default(),
            raw_view: None,
            show_raw: false,
            groups: ResultsView::default(),
        }
    }

    pub fn active_view_mut(&mut self) -> &mut ResultsView {
        match self.tab {
            Tab::Query => &mut self.results,
            Tab::Groups => &mut self.groups,
        }
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Query => Tab::Groups,
            Tab::Groups => Tab::Query,
        };
    }

    pub fn take_input(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    pub fn insert_char(&mut self, c: char) {
        if self.cursor_pos >= self.input.len() {
            self.input.push(c);
        } else {
            self.input.insert(self.cursor_pos, c);
        }
        self.cursor_pos += c.len_utf8();
    }

    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 && !self.input.is_empty() {
            let prev = floor_char_boundary(&self.input, self.cursor_pos - 1);
            self.input.remove(prev);
            self.cursor_pos = prev;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos = floor_char_boundary(&self.input, self.cursor_pos - 1);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.input.len() {
            let mut next = self.cursor_pos + 1;
            while next < self.input.len() && !self.input.is_char_boundary(next) {
                next += 1;
            }
            self.cursor_pos = next;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input.len();
    }

    pub fn tick_loading(&mut self) {
        if self.loading {
            self.loading_frame = (self.loading_frame + 1) % 4;
        }
    }

    pub fn toggle_raw(&mut self) {
        if self.raw_view.is_some() {
            self.show_raw = !self.show_raw;
        }
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Entry;

    fn view_with_two_collapsibles() -> ResultsView {
        let mut view = ResultsView::default();
        view.set_sections(vec![Section {
            title: Some("Log Groups".into()),
            entries: vec![
                Entry::Collapsible {
                    title: "g1".into(),
                    lines: vec!["{}".into()],
                },
                Entry::Collapsible {
                    title: "g2".into(),
                    lines: vec!["{}".into()],
                },
            ],
        }]);
        view
    }

    #[test]
    fn toggle_expands_and_collapses() {
        let mut view = view_with_two_collapsibles();
        assert!(view.expanded.is_empty());
        view.toggle_selected();
        assert!(view.expanded.contains(&0));
        view.toggle_selected();
        assert!(view.expanded.is_empty());
    }

    #[test]
    fn selection_is_clamped_to_collapsible_count() {
        let mut view = view_with_two_collapsibles();
        view.select_next();
        view.select_next();
        view.select_next();
        assert_eq!(view.selected, 1);
        view.select_prev();
        view.select_prev();
        view.select_prev();
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn set_sections_resets_navigation() {
        let mut view = view_with_two_collapsibles();
        view.toggle_selected();
        view.select_next();
        view.set_sections(Vec::new());
        assert!(view.expanded.is_empty());
        assert_eq!(view.selected, 0);
        assert_eq!(view.collapsible_count(), 0);
    }

    #[test]
    fn cursor_moves_respect_char_boundaries() {
        let mut state = AppState::new();
        state.insert_char('é');
        state.insert_char('x');
        assert_eq!(state.input, "éx");
        state.move_cursor_left();
        state.move_cursor_left();
        assert_eq!(state.cursor_pos, 0);
        state.move_cursor_right();
        assert_eq!(state.cursor_pos, 'é'.len_utf8());
    }

    #[test]
    fn take_input_clears_buffer_and_cursor() {
        let mut state = AppState::new();
        for c in "errors today?".chars() {
            state.insert_char(c);
        }
        let taken = state.take_input();
        assert_eq!(taken, "errors today?");
        assert!(state.input.is_empty());
        assert_eq!(state.cursor_pos, 0);
    }
}
