//! Command-line arguments and layered settings.
//!
//! Precedence, lowest first: built-in defaults, `sacco-admin.toml` in the
//! config directory, `SACCO_ADMIN_*` environment variables, then CLI flags.
use anyhow::{Context, bail};
use clap::Parser;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "sacco-admin.toml";
pub const SESSION_FILE: &str = "session.conf";
pub const KEYBINDS_FILE: &str = "keybinds.conf";
pub const LOG_FILE: &str = "sacco-admin.log";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sacco-admin", version, about = "Back-office console for a SACCO REST API")]
pub struct Cli {
    /// REST API base URL.
    #[arg(long, env = "SACCO_API_URL")]
    pub base_url: Option<String>,
    /// Directory holding sacco-admin.toml, keybinds.conf and session.conf.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// Initial route, e.g. /admin/members. The sign-in guard still applies.
    #[arg(long)]
    pub route: Option<String>,
    /// Rows per table page.
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Color theme: mocha or dark.
    #[arg(long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// tracing filter directive, e.g. info or sacco_admin=debug.
    #[arg(long)]
    pub log_level: Option<String>,
    /// HTTP request timeout.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub page_size: usize,
    pub theme: String,
    pub log_level: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Settings plus the directory they were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub settings: Settings,
    pub config_dir: PathBuf,
}

impl Resolved {
    pub fn session_path(&self) -> PathBuf {
        self.config_dir.join(SESSION_FILE)
    }

    pub fn keybinds_path(&self) -> PathBuf {
        self.config_dir.join(KEYBINDS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.settings
            .log_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(LOG_FILE))
    }
}

/// Platform config directory, or `.sacco-admin` when none can be determined.
pub fn default_config_dir() -> PathBuf {
    ProjectDirs::from("org", "sacco", "sacco-admin")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".sacco-admin"))
}

pub fn load(cli: &Cli) -> crate::error::Result<Resolved> {
    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    let settings = load_from(&config_dir, cli)?;
    Ok(Resolved { settings, config_dir })
}

fn load_from(config_dir: &Path, cli: &Cli) -> crate::error::Result<Settings> {
    let file = config_dir.join(CONFIG_FILE);
    let built = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("page_size", 10i64)?
        .set_default("theme", "mocha")?
        .set_default("log_level", "info")?
        .set_default("timeout_secs", 30i64)?
        .add_source(File::from(file.clone()).required(false))
        .add_source(
            Environment::with_prefix("SACCO_ADMIN")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("base_url", cli.base_url.clone())?
        .set_override_option("page_size", cli.page_size.map(|n| n as i64))?
        .set_override_option("theme", cli.theme.clone())?
        .set_override_option("log_level", cli.log_level.clone())?
        .set_override_option("timeout_secs", cli.timeout_secs.map(|n| n as i64))?
        .set_override_option(
            "log_file",
            cli.log_file.as_ref().map(|p| p.to_string_lossy().into_owned()),
        )?
        .build()
        .with_context(|| format!("load settings from {}", file.display()))?;
    let settings: Settings = built.try_deserialize().context("invalid settings")?;

    if settings.page_size == 0 {
        bail!("page_size must be at least 1");
    }
    if settings.base_url.trim().is_empty() {
        bail!("base_url must not be empty");
    }
    tracing::debug!(?settings, "settings resolved");
    Ok(settings)
}
