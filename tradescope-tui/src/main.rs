//! Tradescope TUI: four-panel terminal interface with vim-style navigation.
//!
//! Panels:
//! 1. Browse: categories → series → tickers drill-down
//! 2. Trades: filtered, sorted trade table with CSV export
//! 3. Analysis: statistics, metrics and charts for the loaded trades
//! 4. Help: keyboard shortcuts

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tradescope_core::catalogue::{CatalogueService, FixtureCatalogue};
use tradescope_core::{ExplorerConfig, Intent};

use crate::app::AppState;
use crate::worker::WorkerCommand;

const LOCAL_CONFIG: &str = "tradescope.toml";

#[derive(Parser, Debug)]
#[command(name = "tradescope-tui", about = "Browse prediction-market trades in the terminal")]
struct Args {
    /// Config file (defaults to ./tradescope.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Use the built-in demo catalogue instead of the backend
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let state_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradescope");
    let state_path = state_dir.join("state.json");

    init_logging(&state_dir)?;

    let config = load_config(args.config.as_deref(), args.api_url)?;
    let service: Box<dyn CatalogueService> = if args.demo {
        Box::new(FixtureCatalogue::demo())
    } else {
        Box::new(
            config
                .connect()
                .with_context(|| format!("connecting to {}", config.api.base_url))?,
        )
    };
    info!(service = service.name(), url = %config.api.base_url, "starting");

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(service, cmd_rx, resp_tx)?;

    // Build app state
    let mut app = AppState::new(config, cmd_tx.clone(), resp_rx);
    persistence::apply(&mut app, persisted);
    app.submit(Intent::RefreshCategories);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %e, "could not save UI state");
    }

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("tradescope.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>, api_url: Option<String>) -> Result<ExplorerConfig> {
    let config = match path {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if Path::new(LOCAL_CONFIG).exists() => ExplorerConfig::load(Path::new(LOCAL_CONFIG))
            .with_context(|| format!("loading config {LOCAL_CONFIG}"))?,
        None => ExplorerConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn explicit_config_and_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tui.toml");
        std::fs::write(&path, "[fetch]\nlimit = 25\n").unwrap();
        let config = load_config(Some(&path), Some("http://example.test/api".into())).unwrap();
        assert_eq!(config.fetch.limit, 25);
        assert_eq!(config.api.base_url, "http://example.test/api");
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml")), None).is_err());
    }
}
