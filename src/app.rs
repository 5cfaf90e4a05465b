//! Application state and the reducer that drives it.
//!
//! [`App`] owns everything the loop mutates: the snapshot store, the view
//! state, fetch bookkeeping, the last error and the terminal size.
//! [`App::update`] applies one [`AppEvent`] and returns the side effect the
//! loop must carry out, if any. Nothing in here touches the terminal or the
//! network.

use std::time::{Duration, Instant};

use crate::data::{Snapshot, SnapshotStore};
use crate::events::{key_action, Action, AppEvent};
use crate::source::SourceError;
use crate::view::{ViewMode, ViewState};

/// Rows taken by the title bar, the column headers and the footer.
pub const CHROME_ROWS: u16 = 3;

/// Side effect requested by [`App::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a fetch tagged with `seq`.
    Fetch { seq: u64 },
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub store: SnapshotStore,
    pub view: ViewState,
    /// Message of the last failed fetch. Replaces the table while set.
    pub error: Option<String>,
    pub width: u16,
    pub height: u16,

    source_description: String,
    refresh: Duration,
    next_seq: u64,
    last_applied_seq: Option<u64>,
}

impl App {
    pub fn new(source_description: impl Into<String>, refresh: Duration) -> Self {
        Self {
            running: true,
            store: SnapshotStore::new(),
            view: ViewState::default(),
            error: None,
            width: 0,
            height: 0,
            source_description: source_description.into(),
            refresh,
            next_seq: 0,
            last_applied_seq: None,
        }
    }

    /// Returns a description of the inventory source.
    pub fn source_description(&self) -> &str {
        &self.source_description
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_scroll();
    }

    /// Rows available for table entries.
    pub fn content_height(&self) -> usize {
        usize::from(self.height.saturating_sub(CHROME_ROWS)).max(1)
    }

    /// Number of rows the current mode would show without scrolling.
    pub fn visible_rows(&self) -> usize {
        let Some(snapshot) = self.store.current() else {
            return 0;
        };
        match self.view.mode {
            ViewMode::Hosts => snapshot.hosts.len(),
            ViewMode::Instances if self.view.active_only => snapshot.running_count(),
            ViewMode::Instances => snapshot.instances.len(),
        }
    }

    /// Apply one event, stamping fetch completions with the current time.
    pub fn update(&mut self, event: AppEvent) -> Option<Command> {
        self.update_at(event, Instant::now())
    }

    /// Apply one event. `now` is the receive time recorded for a snapshot.
    pub fn update_at(&mut self, event: AppEvent, now: Instant) -> Option<Command> {
        match event {
            AppEvent::Tick => {
                let seq = self.next_seq;
                self.next_seq += 1;
                return Some(Command::Fetch { seq });
            }
            AppEvent::FetchCompleted { seq, result } => self.apply_fetch(seq, result, now),
            AppEvent::Key(key) => {
                if let Some(action) = key_action(key) {
                    self.handle_action(action);
                } else if self.view.show_help {
                    self.view.show_help = false;
                }
            }
            AppEvent::Resize(width, height) => self.set_size(width, height),
        }
        None
    }

    fn apply_fetch(&mut self, seq: u64, result: Result<Snapshot, SourceError>, now: Instant) {
        if self.last_applied_seq.is_some_and(|last| seq <= last) {
            tracing::debug!(seq, last = ?self.last_applied_seq, "discarding superseded fetch");
            return;
        }
        self.last_applied_seq = Some(seq);

        match result {
            Ok(snapshot) => {
                tracing::debug!(
                    seq,
                    hosts = snapshot.hosts.len(),
                    instances = snapshot.instances.len(),
                    "snapshot applied"
                );
                self.store.push(snapshot, now);
                self.error = None;
                self.clamp_scroll();
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
    }

    /// Apply a key action. While an error is shown only quitting works; while
    /// the help overlay is open any other key closes it.
    pub fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.quit();
            return;
        }
        if self.error.is_some() {
            return;
        }
        if self.view.show_help {
            self.view.show_help = false;
            return;
        }

        let rows = self.visible_rows();
        let height = self.content_height();
        match action {
            Action::Quit => {}
            Action::ScrollUp => self.view.scroll_up(),
            Action::ScrollDown => self.view.scroll_down(rows, height),
            Action::PageUp => self.view.page_up(height),
            Action::PageDown => self.view.page_down(rows, height),
            Action::Home => self.view.scroll_home(),
            Action::End => self.view.scroll_end(rows, height),
            Action::Sort(key) => self.view.select_sort(key),
            Action::Reverse => self.view.toggle_reverse(),
            Action::ToggleActiveOnly => self.view.toggle_active_only(),
            Action::ToggleMode => {
                self.view.toggle_mode(self.store.host_count());
            }
            Action::ToggleHelp => self.view.toggle_help(),
        }
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let rows = self.visible_rows();
        let height = self.content_height();
        self.view.clamp(rows, height);
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
