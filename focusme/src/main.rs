use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use focusme_core::{SystemClock, Ticker, Tracker};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod notify;
mod persistence;
mod ui;

use app::App;
use persistence::Persistence;

const INPUT_POLL: Duration = Duration::from_millis(250);

enum AppEvent {
    Input(KeyEvent),
    Resize,
    Tick(u64),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let config = config::load_config()?;
    let store = Persistence::open_store()?;
    let tracker = Tracker::open(
        store,
        SystemClock,
        notify::sinks(&config.timer),
        config.timer.durations(),
    );
    info!(rollover = ?tracker.rollover(), "focusme started");
    let app = App::new(tracker, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("focusme exited with error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let log_file = Persistence::log_file()?;
    let filter = EnvFilter::try_from_env("FOCUSME_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

/// Forward terminal input to the event loop until the receiver goes away.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => {
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Input(key))
                    }
                    Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                    Ok(_) => Ok(()),
                    Err(e) => {
                        error!("failed to read terminal event: {}", e);
                        return;
                    }
                };
                if forwarded.is_err() {
                    return;
                }
            }
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(e) => {
                error!("failed to poll terminal events: {}", e);
                return;
            }
        }
    });
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let (tx, mut rx): (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) =
        mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    let mut ticker = Ticker::new(tx, AppEvent::Tick);

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let Some(event) = rx.recv().await else {
            return Ok(());
        };
        match event {
            AppEvent::Input(key) => app.handle_key(key),
            AppEvent::Resize => {}
            // Ticks queued before a pause or reset belong to an old run.
            AppEvent::Tick(generation) if ticker.is_current(generation) => app.on_tick(),
            AppEvent::Tick(_) => {}
        }

        if app.should_quit {
            ticker.stop();
            return Ok(());
        }
        ticker.sync(app.is_running());
    }
}
