//! Pure table rendering.
//!
//! [`render`] turns the application state into a [`Screen`]: plain strings
//! tagged with color cues. It never touches the terminal and never fails, so
//! everything about what the table shows is testable without a backend.
//! [`draw`](super::draw) paints the result.

use std::time::Duration;

use crate::app::App;
use crate::data::units::{format_gib_pair, format_kib_rate, format_percent, truncate};
use crate::data::{
    sort_instances, ColumnSpec, Host, Instance, InstanceKind, RateEstimator, Snapshot,
};
use crate::view::{max_scroll, ViewMode};

use super::columns::{host_planner, instance_planner, Align, HostColumn, InstanceColumn};

/// Smallest terminal the table is drawn on.
pub const MIN_WIDTH: u16 = 35;
pub const MIN_HEIGHT: u16 = 10;

const WIDTH_LARGE: u16 = 80;
const WIDTH_MEDIUM: u16 = 60;
const WIDTH_SMALL: u16 = 50;
const WIDTH_TINY: u16 = 40;

/// Color hint attached to a field. The theme decides the actual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Plain,
    /// Non-running entity.
    Dim,
    Good,
    Warn,
    Bad,
    Vm,
    Container,
    /// Header of the column the table is sorted by.
    Sorted,
}

/// One fixed-width field of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub cue: Cue,
}

impl Field {
    fn new(text: String, cue: Cue) -> Self {
        Self { text, cue }
    }
}

/// The table as text: title bar, column headers, body rows and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGrid {
    pub title: String,
    pub header: Vec<Field>,
    pub rows: Vec<Vec<Field>>,
    pub footer: String,
}

impl TextGrid {
    /// Every line of the grid, fields joined by single spaces.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        lines.push(self.title.clone());
        lines.push(join(&self.header));
        lines.extend(self.rows.iter().map(|row| join(row)));
        lines.push(self.footer.clone());
        lines
    }
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// What the terminal should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    TooSmall { width: u16, height: u16 },
    /// A fetch failed; only quitting works.
    Error(String),
    /// No snapshot has arrived yet.
    Loading(String),
    Table(TextGrid),
}

/// Build the screen for the current state.
pub fn render(app: &App) -> Screen {
    if app.width < MIN_WIDTH || app.height < MIN_HEIGHT {
        return Screen::TooSmall {
            width: app.width,
            height: app.height,
        };
    }
    if let Some(ref err) = app.error {
        return Screen::Error(err.clone());
    }
    let Some(snapshot) = app.store.current() else {
        return Screen::Loading(format!(
            " pvetop - connecting to {} ... ",
            app.source_description()
        ));
    };

    let rates = RateEstimator::new(&app.store);
    match app.view.mode {
        ViewMode::Hosts if !snapshot.hosts.is_empty() => {
            Screen::Table(host_table(app, snapshot, &rates))
        }
        _ => Screen::Table(instance_table(app, snapshot, &rates)),
    }
}

fn instance_table(app: &App, snapshot: &Snapshot, rates: &RateEstimator<'_>) -> TextGrid {
    let view = &app.view;

    let mut guests: Vec<&Instance> = snapshot
        .instances
        .iter()
        .filter(|i| !view.active_only || i.is_running())
        .collect();
    sort_instances(&mut guests, view.sort_key, view.reverse, rates);

    let columns = instance_planner().plan(usize::from(app.width));
    let arrow = if view.reverse { "▼" } else { "▲" };

    let header = columns
        .iter()
        .map(|spec| {
            let col = spec.column;
            if col.sort_key() == Some(view.sort_key) {
                let title = format!("{}{}", col.title(), arrow);
                Field::new(fit(&title, spec, col.align()), Cue::Sorted)
            } else {
                Field::new(fit(col.title(), spec, col.align()), Cue::Plain)
            }
        })
        .collect();

    let height = app.content_height();
    let scroll = view.scroll.min(max_scroll(guests.len(), height));
    let rows = guests
        .iter()
        .skip(scroll)
        .take(height)
        .map(|guest| {
            columns
                .iter()
                .map(|spec| instance_field(guest, spec, rates))
                .collect()
        })
        .collect();

    let running = snapshot.running_count();
    let total = snapshot.instances.len();
    let sort = format!("{}{}", view.sort_key.label(), arrow);
    let title = if app.width >= WIDTH_LARGE {
        format!(
            " pvetop - {} ({}/{} running guests) - sort: {} - refresh: {} ",
            app.source_description(),
            running,
            total,
            sort,
            refresh_label(app.refresh())
        )
    } else if app.width >= WIDTH_SMALL {
        format!(" pvetop ({}/{} running) sort: {} ", running, total, sort)
    } else {
        format!(" pvetop ({}/{}) ", running, total)
    };

    let has_hosts = !snapshot.hosts.is_empty();
    let footer = if app.width >= WIDTH_LARGE {
        let mut text = "q:quit | ↑↓/jk:scroll | c/m/d/i:sort | r:reverse | a:toggle-all".to_string();
        if has_hosts {
            text.push_str(" | n:nodes");
        }
        with_help_hint(text, app.width)
    } else if app.width >= WIDTH_MEDIUM {
        let mut text = "q:quit | ↑↓:scroll | c/m:sort | r:reverse | a:all".to_string();
        if has_hosts {
            text.push_str(" | n:nodes");
        }
        text
    } else if app.width >= WIDTH_TINY {
        "q:quit | ↑↓:scroll | c/m:sort".to_string()
    } else {
        "q:quit".to_string()
    };

    TextGrid {
        title,
        header,
        rows,
        footer,
    }
}

fn instance_field(
    guest: &Instance,
    spec: &ColumnSpec<InstanceColumn>,
    rates: &RateEstimator<'_>,
) -> Field {
    let col = spec.column;
    let align = col.align();
    let running = guest.is_running();
    let dim_or = |cue: Cue| if running { cue } else { Cue::Dim };

    match col {
        InstanceColumn::Id => Field::new(fit(&guest.id.to_string(), spec, align), dim_or(Cue::Plain)),
        InstanceColumn::Name => Field::new(fit(&guest.name, spec, align), dim_or(Cue::Plain)),
        InstanceColumn::Kind => {
            let cue = match guest.kind {
                InstanceKind::Vm => Cue::Vm,
                InstanceKind::Container => Cue::Container,
            };
            Field::new(fit(guest.kind.label(), spec, align), dim_or(cue))
        }
        InstanceColumn::Status => {
            Field::new(fit(guest.status.as_str(), spec, align), dim_or(Cue::Good))
        }
        InstanceColumn::Node => Field::new(fit(&guest.host, spec, align), dim_or(Cue::Plain)),
        _ if !running => Field::new(fit("-", spec, align), Cue::Dim),
        InstanceColumn::Cpu => usage_field(guest.cpu * 100.0, spec),
        InstanceColumn::Mem => usage_field(guest.mem_percent(), spec),
        InstanceColumn::MemGib => Field::new(
            fit(&format_gib_pair(guest.mem, guest.max_mem), spec, align),
            Cue::Plain,
        ),
        InstanceColumn::Disk => Field::new(
            fit(&format_kib_rate(rates.disk_rate(guest)), spec, align),
            Cue::Plain,
        ),
        InstanceColumn::Net => Field::new(
            fit(&format_kib_rate(rates.net_rate(guest)), spec, align),
            Cue::Plain,
        ),
    }
}

fn host_table(app: &App, snapshot: &Snapshot, rates: &RateEstimator<'_>) -> TextGrid {
    let columns = host_planner().plan(usize::from(app.width));

    let header = columns
        .iter()
        .map(|spec| Field::new(fit(spec.column.title(), spec, spec.column.align()), Cue::Plain))
        .collect();

    let height = app.content_height();
    let scroll = app.view.scroll.min(max_scroll(snapshot.hosts.len(), height));
    let rows = snapshot
        .hosts
        .iter()
        .skip(scroll)
        .take(height)
        .map(|host| {
            columns
                .iter()
                .map(|spec| host_field(host, snapshot, spec, rates))
                .collect()
        })
        .collect();

    let online = snapshot.online_count();
    let total = snapshot.hosts.len();
    let title = if app.width >= WIDTH_LARGE {
        let what = if total == 1 { "node" } else { "cluster nodes" };
        format!(
            " pvetop - {} ({}/{} online) - refresh: {} ",
            what,
            online,
            total,
            refresh_label(app.refresh())
        )
    } else if app.width >= WIDTH_SMALL {
        format!(" pvetop nodes ({}/{} online) ", online, total)
    } else {
        format!(" pvetop ({}/{}) ", online, total)
    };

    let footer = if app.width >= WIDTH_LARGE {
        with_help_hint(
            "q:quit | n:switch-to-guests | ↑↓/jk:scroll".to_string(),
            app.width,
        )
    } else if app.width >= WIDTH_MEDIUM {
        "q:quit | n:guests | ↑↓:scroll".to_string()
    } else if app.width >= WIDTH_TINY {
        "q:quit | n:guests".to_string()
    } else {
        "q:quit".to_string()
    };

    TextGrid {
        title,
        header,
        rows,
        footer,
    }
}

fn host_field(
    host: &Host,
    snapshot: &Snapshot,
    spec: &ColumnSpec<HostColumn>,
    rates: &RateEstimator<'_>,
) -> Field {
    let col = spec.column;
    let align = col.align();
    let online = host.is_online();

    match col {
        HostColumn::Node => Field::new(fit(&host.id, spec, align), Cue::Plain),
        HostColumn::Status => {
            let cue = if online { Cue::Good } else { Cue::Bad };
            Field::new(fit(host.status.as_str(), spec, align), cue)
        }
        HostColumn::Vms | HostColumn::Cts => {
            let (vms, cts) = snapshot.kinds_on_host(&host.id);
            let count = if col == HostColumn::Vms { vms } else { cts };
            Field::new(fit(&count.to_string(), spec, align), Cue::Plain)
        }
        _ if !online => Field::new(fit("-", spec, align), Cue::Dim),
        HostColumn::Cpu => usage_field(host.cpu * 100.0, spec),
        HostColumn::Mem => usage_field(host.mem_percent(), spec),
        HostColumn::MemGib => Field::new(
            fit(&format_gib_pair(host.mem, host.max_mem), spec, align),
            Cue::Plain,
        ),
        HostColumn::Disk => Field::new(
            fit(&format_kib_rate(rates.host_disk_rate(&host.id)), spec, align),
            Cue::Plain,
        ),
        HostColumn::Net => Field::new(
            fit(&format_kib_rate(rates.host_net_rate(&host.id)), spec, align),
            Cue::Plain,
        ),
    }
}

fn usage_field<C>(percent: f64, spec: &ColumnSpec<C>) -> Field {
    let cue = if percent > 80.0 {
        Cue::Bad
    } else if percent > 50.0 {
        Cue::Warn
    } else {
        Cue::Good
    };
    Field::new(fit(&format_percent(percent), spec, Align::Right), cue)
}

/// Cut or pad `text` to exactly the column's field width.
fn fit<C>(text: &str, spec: &ColumnSpec<C>, align: Align) -> String {
    let width = spec.field_width();
    let text = truncate(text, width);
    match align {
        Align::Left => format!("{:<width$}", text),
        Align::Right => format!("{:>width$}", text),
    }
}

fn with_help_hint(mut text: String, width: u16) -> String {
    const HINT: &str = " | ?:help";
    if text.chars().count() + HINT.len() <= usize::from(width) {
        text.push_str(HINT);
    }
    text
}

fn refresh_label(refresh: Duration) -> String {
    if refresh.subsec_millis() == 0 {
        format!("{}s", refresh.as_secs())
    } else {
        format!("{}ms", refresh.as_millis())
    }
}
