use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pvetop::app::{App, Command};
use pvetop::config::{Overrides, Settings};
use pvetop::credentials::{CredentialStore, EncryptedFileStore};
use pvetop::events::spawn_input_thread;
use pvetop::scheduler::{spawn_fetch, RefreshScheduler};
use pvetop::source::{FileSource, InventorySource, ProxmoxSource};
use pvetop::ui::{self, Theme};

#[derive(Parser, Debug)]
#[command(name = "pvetop")]
#[command(about = "Live terminal dashboard for Proxmox VE hosts and guests")]
struct Args {
    /// Settings file [default: ~/.config/pvetop/pvetop.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read inventory from a JSON file instead of the Proxmox API
    #[arg(short, long, conflicts_with_all = ["save_credentials"])]
    file: Option<PathBuf>,

    /// Save the resolved connection credentials (encrypted) before starting
    #[arg(long)]
    save_credentials: bool,

    /// Delete saved credentials and exit
    #[arg(long, conflicts_with_all = ["file", "save_credentials"])]
    forget: bool,

    #[command(flatten)]
    overrides: Overrides,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    args.overrides.apply(&mut settings);

    if let Some(ref path) = settings.log_file {
        init_logging(path)?;
    }

    if args.forget {
        let store = EncryptedFileStore::default_location()?;
        store.delete()?;
        println!("Removed saved credentials ({})", store.path().display());
        return Ok(());
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let source: Arc<dyn InventorySource> = match args.file {
        Some(ref path) => Arc::new(FileSource::new(path)),
        None => Arc::new(connect(&settings, args.save_credentials)?),
    };

    // Fail before touching the terminal if the source is unreachable
    rt.block_on(source.get_hosts()).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to {}: {}\n\nCheck the host, port and API token (--host, --port, --token), \
             or pass --verify-tls only for hosts with a trusted certificate.",
            source.description(),
            e
        )
    })?;

    let scheduler = RefreshScheduler::new(settings.refresh());
    rt.block_on(run_tui(source, scheduler))
}

/// Route logs to `path`. Stdout belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pvetop=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// Build the Proxmox source from settings and saved credentials.
fn connect(settings: &Settings, save: bool) -> Result<ProxmoxSource> {
    let store = EncryptedFileStore::default_location()?;
    let credentials = settings
        .resolve_credentials(&store)
        .context("No usable Proxmox credentials")?;

    if save {
        store.save(&credentials)?;
        println!("Saved credentials to {}", store.path().display());
    }

    tracing::info!(host = %credentials.host, port = credentials.port, "connecting");
    let source = ProxmoxSource::builder()
        .host(&credentials.host, credentials.port)
        .token(credentials.token)
        .verify_tls(settings.verify_tls)
        .build()?;
    Ok(source)
}

/// Run the TUI against `source` until the user quits.
async fn run_tui(source: Arc<dyn InventorySource>, scheduler: RefreshScheduler) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source.description(), scheduler.period());
    let size = terminal.size()?;
    app.set_size(size.width, size.height);

    let result = run_app(&mut terminal, &mut app, source, scheduler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    source: Arc<dyn InventorySource>,
    scheduler: RefreshScheduler,
) -> Result<()> {
    let theme = Theme::auto_detect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let ticker = scheduler.spawn(tx.clone());
    let _input = spawn_input_thread(tx.clone());

    terminal.draw(|frame| ui::draw(frame, app, &theme))?;

    while app.running {
        let Some(event) = rx.recv().await else {
            break;
        };
        if let Some(Command::Fetch { seq }) = app.update(event) {
            spawn_fetch(Arc::clone(&source), seq, tx.clone());
        }
        terminal.draw(|frame| ui::draw(frame, app, &theme))?;
    }

    ticker.abort();
    // closing the queue stops the input thread at its next poll
    drop(rx);
    Ok(())
}
