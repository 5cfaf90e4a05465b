//! # pvetop
//!
//! A live terminal dashboard for Proxmox VE clusters.
//!
//! pvetop samples the cluster inventory (nodes and guests) on a fixed period,
//! derives disk and network throughput from successive samples, and renders a
//! sortable table that adapts its columns to the terminal width.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Event loop                           │
//! │  ┌───────────┐   Tick    ┌─────────┐   draw   ┌──────────┐  │
//! │  │ scheduler │──────────▶│   app   │─────────▶│    ui    │  │
//! │  └───────────┘           │(reducer)│          │ render + │  │
//! │  ┌───────────┐   Key     │         │          │   draw   │  │
//! │  │  events   │──────────▶│         │          └──────────┘  │
//! │  └───────────┘           └────┬────┘                        │
//! │        FetchCompleted ▲       │ Command::Fetch              │
//! │                       │       ▼                             │
//! │                  ┌────┴────────────┐                        │
//! │                  │     source      │◀── ProxmoxSource |     │
//! │                  │ (InventorySource)    FileSource          │
//! │                  └─────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: the state value and the reducer applying one event at a time
//! - **[`data`]**: inventory model, snapshot store, rates, sorting and column layout
//! - **[`source`]**: the [`InventorySource`] trait with HTTP and file implementations
//! - **[`scheduler`]**: fixed-period ticks and background fetches
//! - **[`events`]**: key bindings and the terminal input thread
//! - **[`view`]**: mode, filter, sort and scroll state
//! - **[`ui`]**: pure rendering to a text grid, painted with ratatui
//! - **[`config`]** / **[`credentials`]**: layered settings and the encrypted credential file
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Connect with an API token
//! pvetop --host pve.lan --token 'root@pam!pvetop=...'
//!
//! # Remember the connection for next time
//! pvetop --host pve.lan --token 'root@pam!pvetop=...' --save-credentials
//!
//! # Replay an inventory dump
//! pvetop --file inventory.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use pvetop::{InventorySource, ProxmoxSource};
//!
//! # tokio_test::block_on(async {
//! let source = ProxmoxSource::builder()
//!     .host("pve.lan", 8006)
//!     .token("root@pam!pvetop=secret")
//!     .build()?;
//! let snapshot = source.fetch_snapshot().await?;
//! println!("{} running guests", snapshot.running_count());
//! # Ok::<(), pvetop::SourceError>(())
//! # });
//! ```

pub mod app;
pub mod config;
pub mod credentials;
pub mod data;
pub mod events;
pub mod scheduler;
pub mod source;
pub mod ui;
pub mod view;

// Re-export main types for convenience
pub use app::{App, Command};
pub use config::Settings;
pub use credentials::{CredentialError, CredentialStore, Credentials, EncryptedFileStore};
pub use data::{Host, Instance, Snapshot, SnapshotStore, SortKey};
pub use source::{FileSource, InventorySource, ProxmoxSource, SourceError};
pub use view::{ViewMode, ViewState};
