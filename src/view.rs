//! User-controlled view state.
//!
//! Everything here changes synchronously in response to a key press and is
//! never persisted. Scroll bounds depend on how many rows the current mode
//! shows and how many fit on screen, so callers pass both in.

use crate::data::SortKey;

/// Which table is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One row per guest.
    #[default]
    Instances,
    /// One row per host.
    Hosts,
}

/// Mode, filter, sort and scroll position of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub mode: ViewMode,
    /// Only show running guests.
    pub active_only: bool,
    pub sort_key: SortKey,
    /// Busiest first when set.
    pub reverse: bool,
    /// Index of the first visible row.
    pub scroll: usize,
    pub show_help: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: ViewMode::Instances,
            active_only: true,
            sort_key: SortKey::Cpu,
            reverse: true,
            scroll: 0,
            show_help: false,
        }
    }
}

/// Largest valid scroll offset.
pub fn max_scroll(visible_rows: usize, content_height: usize) -> usize {
    visible_rows.saturating_sub(content_height)
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self, visible_rows: usize, content_height: usize) {
        self.scroll = (self.scroll + 1).min(max_scroll(visible_rows, content_height));
    }

    pub fn page_up(&mut self, content_height: usize) {
        self.scroll = self.scroll.saturating_sub(content_height.max(1));
    }

    pub fn page_down(&mut self, visible_rows: usize, content_height: usize) {
        let target = self.scroll.saturating_add(content_height.max(1));
        self.scroll = target.min(max_scroll(visible_rows, content_height));
    }

    pub fn scroll_home(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_end(&mut self, visible_rows: usize, content_height: usize) {
        self.scroll = max_scroll(visible_rows, content_height);
    }

    /// Sort by `key`. Selecting the current key again still jumps to the top.
    pub fn select_sort(&mut self, key: SortKey) {
        self.sort_key = key;
        self.scroll = 0;
    }

    pub fn toggle_reverse(&mut self) {
        self.reverse = !self.reverse;
        self.scroll = 0;
    }

    pub fn toggle_active_only(&mut self) {
        self.active_only = !self.active_only;
        self.scroll = 0;
    }

    /// Switch between the guest and host tables.
    ///
    /// Does nothing while no hosts are known. Returns whether the mode changed.
    pub fn toggle_mode(&mut self, host_count: usize) -> bool {
        if host_count == 0 {
            return false;
        }
        self.mode = match self.mode {
            ViewMode::Instances => ViewMode::Hosts,
            ViewMode::Hosts => ViewMode::Instances,
        };
        self.scroll = 0;
        true
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Pull the scroll offset back into range after the row count or the
    /// terminal height changed.
    pub fn clamp(&mut self, visible_rows: usize, content_height: usize) {
        self.scroll = self.scroll.min(max_scroll(visible_rows, content_height));
    }
}
