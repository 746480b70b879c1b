use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use seasonax_core::refresh::SystemClock;
use seasonax_core::{DashboardConfig, HttpSeasonalityApi, SeasonalityApi};
use seasonax_tui::app::AppState;
use seasonax_tui::worker::{self, WorkerCommand};
use seasonax_tui::{input, persistence, ui};

#[derive(Parser, Debug)]
#[command(name = "seasonax-tui", about = "Seasonax terminal dashboard")]
struct Args {
    /// Path to a TOML config file. Defaults to <config dir>/seasonax/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seasonax")
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let file = File::create(dir.join("seasonax-tui.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seasonax=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = data_dir();
    init_logging(&data_dir)?;

    let config = DashboardConfig::resolve(args.config.as_deref()).context("loading configuration")?;
    tracing::info!(base_url = %config.api.base_url, "starting dashboard");

    let api: Arc<dyn SeasonalityApi> =
        Arc::new(HttpSeasonalityApi::from_config(&config.api).context("building HTTP client")?);

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = persistence::default_path();
    let persisted = persistence::load(&state_path);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle =
        worker::spawn_worker(api, cmd_rx, resp_tx).context("spawning worker thread")?;

    let mut app = AppState::new(
        &config,
        Arc::new(SystemClock::new()),
        cmd_tx.clone(),
        resp_rx,
        data_dir.join("exports"),
    );
    persistence::apply(&mut app, persisted);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "failed to save session state");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Hand changed views and due retries to the worker
        app.dispatch_refresh();

        // 2. Render
        let frame = terminal.draw(|f| ui::draw(f, app))?;
        app.frame_area = frame.area;

        // 3. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 4. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn config_flag_forms() {
        let args = Args::try_parse_from(["seasonax-tui"]).unwrap();
        assert!(args.config.is_none());

        let args = Args::try_parse_from(["seasonax-tui", "--config", "a.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("a.toml")));

        let args = Args::try_parse_from(["seasonax-tui", "--config=b.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn bad_invocations_are_rejected() {
        assert!(Args::try_parse_from(["seasonax-tui", "--config"]).is_err());
        assert!(Args::try_parse_from(["seasonax-tui", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["seasonax-tui", "extra"]).is_err());
    }
}
