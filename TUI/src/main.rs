mod action;
mod app;
mod backend;
mod config;
mod input;
mod picker;
mod theme;
mod ui;
mod ui_state;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;

use action::{Action, Effect};
use app::App;
use backend::{BookService, HttpBackend};
use config::{Config, API_URL_ENV};
use theme::ThemeMode;
use ui::{draw, ScreenLayout};
use ui_state::SelectedFile;

/// Chat with a PDF book through the LiberLens service.
#[derive(Parser, Debug)]
#[command(name = "liberlens", version)]
struct Cli {
    /// Base URL of the book service
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Preselect a PDF to upload
    #[arg(long)]
    file: Option<PathBuf>,

    /// Colour scheme (defaults to the terminal's)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("liberlens.log"));
    let file = File::create(&path).with_context(|| format!("cannot create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(cli.log_file)?;

    let config = Config::with_api_url(cli.api_url.as_deref())?;
    tracing::info!(api = %config.api_base_url, log = %log_path.display(), "starting liberlens");

    let service: Arc<dyn BookService> = Arc::new(HttpBackend::new(&config)?);
    let runtime = Runtime::new().context("cannot start async runtime")?;

    // Create app state
    let theme_mode = cli.theme.unwrap_or_else(ThemeMode::detect);
    let mut app = App::new(config, theme_mode);
    if let Some(path) = cli.file {
        if let Some(dir) = path.parent().filter(|d| d.is_dir()) {
            app = app.with_start_dir(dir);
        }
        app.update(Action::SelectFile(SelectedFile::new(path)));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app, &runtime, service);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal loop failed");
    }
    tracing::info!("liberlens stopped");
    result.map_err(Into::into)
}

/// Hand an effect to the runtime; its settling action comes back on `tx`.
fn spawn_effect(runtime: &Runtime, service: &Arc<dyn BookService>, effect: Effect, tx: &UnboundedSender<Action>) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    runtime.spawn(async move {
        let action = backend::perform(service.as_ref(), effect).await;
        // The receiver only goes away when the UI is shutting down
        let _ = tx.send(action);
    });
}

fn dispatch(
    app: &mut App,
    actions: Vec<Action>,
    runtime: &Runtime,
    service: &Arc<dyn BookService>,
    tx: &UnboundedSender<Action>,
) {
    for action in actions {
        if let Some(effect) = app.update(action) {
            spawn_effect(runtime, service, effect, tx);
        }
    }
}

fn drain_settled(app: &mut App, rx: &mut UnboundedReceiver<Action>) {
    while let Ok(action) = rx.try_recv() {
        // Settling actions never request further network work
        let _ = app.update(action);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runtime: &Runtime,
    service: Arc<dyn BookService>,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let tick = Duration::from_millis(app.config.tick_rate_ms);

    let size = terminal.size()?;
    app.update(Action::Resize { width: size.width });

    loop {
        app.tick();
        drain_settled(app, &mut rx);

        terminal.draw(|frame| draw(frame, app))?;

        if app.should_quit {
            return Ok(());
        }

        if !event::poll(tick)? {
            continue;
        }

        let actions = match event::read()? {
            Event::Key(key) => input::map_key(app, key),
            Event::Paste(text) => input::map_paste(app, text),
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let layout = ScreenLayout::compute(Rect::new(0, 0, size.width, size.height), app);
                input::map_mouse(app, &layout, mouse)
            }
            Event::Resize(width, _) => vec![Action::Resize { width }],
            _ => vec![],
        };
        dispatch(app, actions, runtime, &service, &tx);
    }
}
