//! usertable binary entry point.
//!
//! Parses the command line, sets up logging, settings and the async runtime,
//! then either runs a headless export or the TUI event loop, restoring the
//! terminal state on exit.
//!
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;

use usertable::app::{self, AppState, settings::Settings};
use usertable::cli::{self, Cli, Command};
use usertable::error::{Context, Result};
use usertable::logging;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI (or an export) and report any top-level error to stderr.
fn main() -> Result<()> {
    let opts = Cli::parse();

    let config_dir = app::config_dir(opts.config_dir.as_deref());
    std::fs::create_dir_all(&config_dir)
        .with_ctx(|| format!("create config directory {}", config_dir.display()))?;

    let log_path = opts
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("usertable.log"));
    if let Err(err) = logging::init_logging(&log_path) {
        eprintln!("logging disabled: {err}");
    }

    let mut settings = Settings::load_or_init(&config_dir.join("settings.conf"));
    opts.apply_to(&mut settings);
    tracing::info!(
        endpoint = %settings.endpoint,
        export_dir = %settings.export_dir.display(),
        config_dir = %config_dir.display(),
        "starting usertable"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .with_ctx(|| "start async runtime".to_string())?;

    if let Some(Command::Export(args)) = &opts.command {
        let path = runtime.block_on(cli::execute_export(&settings, args))?;
        println!("{}", path.display());
        return Ok(());
    }

    let mut app = AppState::load(&config_dir, settings);
    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;

    let res = app::run(&mut terminal, runtime.handle(), &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    drop(app);
    runtime.shutdown_timeout(Duration::from_millis(250));

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
