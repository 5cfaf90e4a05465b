//! Events consumed by the main loop and the key bindings.
//!
//! Every state change goes through one ordered queue of [`AppEvent`]s:
//!
//! ```text
//! RefreshScheduler ──Tick──────────────┐
//! fetch task ───────FetchCompleted─────┼──▶ mpsc ──▶ App::update()
//! input thread ─────Key / Resize───────┘
//! ```

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use crate::data::{Snapshot, SortKey};
use crate::source::SourceError;

/// Something the main loop has to react to.
#[derive(Debug)]
pub enum AppEvent {
    /// Refresh period elapsed.
    Tick,
    /// A fetch issued with sequence number `seq` finished.
    FetchCompleted {
        seq: u64,
        result: Result<Snapshot, SourceError>,
    },
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resized to (width, height).
    Resize(u16, u16),
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Home,
    End,
    Sort(SortKey),
    Reverse,
    ToggleActiveOnly,
    ToggleMode,
    ToggleHelp,
}

/// Key bindings as shown in the help overlay.
pub const KEY_HELP: &[(&str, &str)] = &[
    ("↑/k ↓/j", "Scroll"),
    ("PgUp/PgDn", "Scroll one page"),
    ("Home/End", "Jump to top/bottom"),
    ("v", "Sort by VMID"),
    ("N", "Sort by name"),
    ("s", "Sort by status"),
    ("c", "Sort by CPU"),
    ("m", "Sort by memory"),
    ("d", "Sort by disk I/O"),
    ("i", "Sort by net I/O"),
    ("r", "Reverse sort"),
    ("a", "Toggle all/active"),
    ("n", "Toggle nodes/guests"),
    ("?", "Toggle help"),
    ("q", "Quit"),
];

/// Map a key press to an action.
pub fn key_action(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,

        KeyCode::Up | KeyCode::Char('k') => Action::ScrollUp,
        KeyCode::Down | KeyCode::Char('j') => Action::ScrollDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,

        KeyCode::Char('v') => Action::Sort(SortKey::Id),
        KeyCode::Char('N') => Action::Sort(SortKey::Name),
        KeyCode::Char('s') => Action::Sort(SortKey::Status),
        KeyCode::Char('c') => Action::Sort(SortKey::Cpu),
        KeyCode::Char('m') => Action::Sort(SortKey::Memory),
        KeyCode::Char('d') => Action::Sort(SortKey::DiskRate),
        KeyCode::Char('i') => Action::Sort(SortKey::NetRate),
        KeyCode::Char('r') => Action::Reverse,

        KeyCode::Char('a') => Action::ToggleActiveOnly,
        KeyCode::Char('n') => Action::ToggleMode,
        KeyCode::Char('?') => Action::ToggleHelp,

        _ => return None,
    };
    Some(action)
}

/// Forward terminal input into the event queue from a dedicated thread.
///
/// The thread exits once the receiving side of `tx` is dropped.
pub fn spawn_input_thread(tx: UnboundedSender<AppEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(Duration::from_millis(250)) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::error!(error = %e, "terminal input poll failed");
                break;
            }
        }

        let forwarded = match event::read() {
            Ok(Event::Key(key)) => AppEvent::Key(key),
            Ok(Event::Resize(width, height)) => AppEvent::Resize(width, height),
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(error = %e, "terminal input read failed");
                break;
            }
        };
        if tx.send(forwarded).is_err() {
            break;
        }
    })
}
