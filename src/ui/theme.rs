//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use super::render::Cue;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for the sorted column and the help border.
    pub highlight: Color,
    /// Usage above 50%.
    pub warning: Color,
    /// Usage above 80%, offline hosts, errors.
    pub critical: Color,
    /// Running guests, online hosts, low usage.
    pub healthy: Color,
    /// Stopped guests and offline values.
    pub muted: Color,
    pub vm: Color,
    pub container: Color,
    /// Style for the title bar.
    pub title: Style,
    /// Style for the column header row.
    pub header: Style,
    /// Style for the footer help line.
    pub footer: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            muted: Color::DarkGray,
            vm: Color::Blue,
            container: Color::LightRed,
            title: Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            header: Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::Gray).bg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            muted: Color::Gray,
            vm: Color::Blue,
            container: Color::Magenta,
            title: Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            header: Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::DarkGray).bg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a field cue
    pub fn cue_style(&self, cue: Cue) -> Style {
        match cue {
            Cue::Plain => Style::default(),
            Cue::Dim => Style::default().fg(self.muted),
            Cue::Good => Style::default().fg(self.healthy),
            Cue::Warn => Style::default().fg(self.warning),
            Cue::Bad => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
            Cue::Vm => Style::default().fg(self.vm),
            Cue::Container => Style::default().fg(self.container),
            Cue::Sorted => Style::default()
                .fg(self.highlight)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        }
    }
}
