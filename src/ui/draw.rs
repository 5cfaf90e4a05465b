//! Paint a [`Screen`] onto a ratatui frame.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::events::KEY_HELP;

use super::render::{render, Field, Screen, TextGrid, MIN_HEIGHT, MIN_WIDTH};
use super::theme::Theme;

/// Draw the whole UI for the current state.
pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = frame.area();

    match render(app) {
        Screen::TooSmall { width, height } => draw_too_small(frame, area, width, height, theme),
        Screen::Error(message) => draw_error(frame, area, &message, theme),
        Screen::Loading(title) => {
            frame.render_widget(Paragraph::new(title).style(theme.title), area);
        }
        Screen::Table(grid) => {
            draw_table(frame, area, &grid, theme);
            if app.view.show_help {
                draw_help(frame, area, theme);
            }
        }
    }
}

fn draw_too_small(frame: &mut Frame, area: Rect, width: u16, height: u16, theme: &Theme) {
    let msg = format!(
        "Terminal too small\nMinimum: {}x{}\nCurrent: {}x{}",
        MIN_WIDTH, MIN_HEIGHT, width, height
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.warning));
    let y = area.y + area.height.saturating_sub(3) / 2;
    let centered = Rect::new(area.x, y, area.width, 3.min(area.height));
    frame.render_widget(paragraph, centered);
}

fn draw_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = format!("Error: {}\n\nPress 'q' to quit.", message);
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(theme.critical))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_table(frame: &mut Frame, area: Rect, grid: &TextGrid, theme: &Theme) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Column headers
        Constraint::Min(0),    // Rows
        Constraint::Length(1), // Footer
    ])
    .split(area);

    frame.render_widget(Paragraph::new(grid.title.as_str()).style(theme.title), chunks[0]);
    frame.render_widget(
        Paragraph::new(styled_line(&grid.header, theme)).style(theme.header),
        chunks[1],
    );

    let rows: Vec<Line> = grid.rows.iter().map(|row| styled_line(row, theme)).collect();
    frame.render_widget(Paragraph::new(rows), chunks[2]);

    frame.render_widget(Paragraph::new(grid.footer.as_str()).style(theme.footer), chunks[3]);
}

fn styled_line<'a>(fields: &'a [Field], theme: &Theme) -> Line<'a> {
    let mut spans = Vec::with_capacity(fields.len() * 2);
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(field.text.as_str(), theme.cue_style(field.cue)));
    }
    Line::from(spans)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the table.
fn draw_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(
        KEY_HELP
            .iter()
            .map(|(keys, what)| Line::from(format!("  {:<11} {}", keys, what))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.highlight));

    let help_width = 40u16.min(area.width.saturating_sub(2));
    let help_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(help_width) / 2;
    let y = area.y + area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(lines).block(block), help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{instance, snapshot};
    use crate::events::AppEvent;
    use crate::source::SourceError;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn screen_text(app: &App) -> Vec<String> {
        let backend = TestBackend::new(app.width, app.height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| draw(frame, app, &Theme::dark()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn app(width: u16, height: u16) -> App {
        let mut app = App::new("file: demo.json", Duration::from_secs(2));
        app.set_size(width, height);
        app
    }

    #[test]
    fn test_draws_table_rows() {
        let mut app = app(100, 12);
        app.update(AppEvent::FetchCompleted {
            seq: 0,
            result: Ok(snapshot(vec![instance(100, true), instance(101, false)])),
        });

        let lines = screen_text(&app);
        assert!(lines[0].contains("pvetop - file: demo.json (1/2 running guests)"));
        assert!(lines[1].contains("NAME"));
        assert!(lines[1].contains("CPU%▼"));
        assert!(lines[2].starts_with("100    guest-100"));
        assert!(lines[11].starts_with("q:quit"));
        // the stopped guest is hidden by default
        assert!(!lines.iter().any(|l| l.contains("guest-101")));
    }

    #[test]
    fn test_draws_too_small_notice() {
        let lines = screen_text(&app(30, 12));
        assert!(lines.iter().any(|l| l.contains("Terminal too small")));
        assert!(lines.iter().any(|l| l.contains("Current: 30x12")));
    }

    #[test]
    fn test_draws_error() {
        let mut app = app(60, 12);
        app.update(AppEvent::FetchCompleted {
            seq: 0,
            result: Err(SourceError::Timeout),
        });

        let lines = screen_text(&app);
        assert!(lines[0].starts_with("Error: "));
        assert!(lines.iter().any(|l| l.contains("Press 'q' to quit.")));
    }

    #[test]
    fn test_draws_help_overlay() {
        let mut app = app(80, 30);
        app.update(AppEvent::FetchCompleted {
            seq: 0,
            result: Ok(snapshot(vec![instance(100, true)])),
        });
        app.view.toggle_help();

        let lines = screen_text(&app);
        assert!(lines.iter().any(|l| l.contains("Keyboard Shortcuts")));
        assert!(lines.iter().any(|l| l.contains("Toggle nodes/guests")));
    }
}
