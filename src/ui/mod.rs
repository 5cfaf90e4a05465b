//! Terminal UI rendering.
//!
//! Rendering is split in two:
//!
//! - [`render`]: pure; state in, [`Screen`] of fixed-width text fields out
//! - [`draw`]: paints a [`Screen`] with ratatui, styling fields by their cue
//!
//! ## Submodules
//!
//! - [`columns`]: column sets and sacrifice orders of the guest and host tables
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Title bar                            │
//! ├──────────────────────────────────────┤
//! │ Column headers                       │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Rows (scrolled)                      │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Footer key hints                     │
//! └──────────────────────────────────────┘
//!         ↑
//!    Help overlay drawn on top
//! ```

pub mod columns;
pub mod draw;
pub mod render;
pub mod theme;

pub use draw::draw;
pub use render::{render, Cue, Field, Screen, TextGrid};
pub use theme::Theme;
