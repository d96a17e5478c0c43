//! sacco-admin binary entry point.
//!
//! Resolves settings, opens the log file, starts the background runtime,
//! then runs the TUI event loop and restores the terminal on exit.
use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use sacco_admin::api::ApiClient;
use sacco_admin::api::http::HttpTransport;
use sacco_admin::app::dispatch::Dispatcher;
use sacco_admin::app::keymap::Keymap;
use sacco_admin::app::pages::SettingsInfo;
use sacco_admin::app::theme::Theme;
use sacco_admin::app::{self, AppOptions, AppState};
use sacco_admin::config::{self, Cli};
use sacco_admin::error::Result;
use sacco_admin::routes::Route;
use sacco_admin::session::SessionStore;

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let resolved = config::load(&cli)?;
    let settings = &resolved.settings;
    std::fs::create_dir_all(&resolved.config_dir)
        .with_context(|| format!("create config dir {}", resolved.config_dir.display()))?;
    let log_path = resolved.log_path();
    init_tracing(&log_path, &settings.log_level)?;
    tracing::info!(base_url = %settings.base_url, config_dir = %resolved.config_dir.display(), "starting");

    let runtime = tokio::runtime::Runtime::new().context("start async runtime")?;
    let session = SessionStore::load(resolved.session_path())?;
    let transport = HttpTransport::new(settings.base_url.clone(), settings.timeout())?;
    let client = ApiClient::new(Arc::new(transport), session);
    let (dispatcher, outcomes) = Dispatcher::new(runtime.handle().clone(), client);

    let options = AppOptions {
        initial_route: cli.route.as_deref().map(Route::parse).unwrap_or(Route::Home),
        theme: Theme::by_name(&settings.theme),
        keymap: Keymap::load_or_init(&resolved.keybinds_path()),
        page_size: settings.page_size,
        settings: SettingsInfo {
            base_url: settings.base_url.clone(),
            config_dir: resolved.config_dir.display().to_string(),
            log_file: log_path.display().to_string(),
        },
    };
    let mut app = AppState::new(dispatcher, outcomes, options);

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = &res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    runtime.shutdown_timeout(std::time::Duration::from_secs(1));
    res
}
