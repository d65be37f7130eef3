use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use focusme_core::sink::{AutoConfirm, LogNotifier, StdinPrompt, TerminalBell};
use focusme_core::{
    default_data_dir, ConfirmPrompt, Durations, FileStore, KeyValueStore, Sinks, SystemClock, Tick,
    Ticker, TimerState, Tracker, Window,
};
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "focusmectl")]
#[command(about = "Manage Focus Me tasks and statistics from the command line", long_about = None)]
struct Cli {
    /// Data directory (defaults to FOCUSME_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's statistics
    Status,
    /// Manage tasks
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Show the history chart data for a window
    History {
        /// week, month or year
        #[arg(short, long, default_value = "week")]
        window: Window,
    },
    /// List the most recent archived days
    Recent {
        #[arg(short = 'n', long, default_value_t = 7)]
        limit: usize,
    },
    /// Run a focus session in this terminal
    Run {
        /// Focus minutes
        #[arg(long = "focus", default_value = "25")]
        focus: String,
        /// Break minutes
        #[arg(long = "break", default_value = "5")]
        break_minutes: String,
        /// Start the break without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace history with a sample week for previewing the chart
    #[command(hide = true)]
    Seed,
}

#[derive(Subcommand)]
enum TodoAction {
    /// Add a task
    Add { text: Vec<String> },
    /// List tasks
    List,
    /// Toggle a task's completion
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir().context("Could not determine data directory")?,
    };
    let store = FileStore::open(&dir)
        .with_context(|| format!("Failed to open store in {}", dir.display()))?;
    debug!(dir = %dir.display(), "using data directory");

    match cli.command {
        Commands::Status => {
            let tracker = open(store, Durations::default());
            let today = tracker.today();
            let open_tasks = tracker.todos().iter().filter(|t| !t.completed).count();
            println!("Pomodoros: {}", today.pomodoros_completed);
            println!("Tasks:     {}", today.tasks_completed);
            println!("Minutes:   {}", today.focus_minutes);
            println!("Open:      {} of {}", open_tasks, tracker.todos().len());
        }
        Commands::Todo { action } => {
            let mut tracker = open(store, Durations::default());
            run_todo(&mut tracker, action);
        }
        Commands::History { window } => {
            let tracker = open(store, Durations::default());
            let series = tracker.series(window);
            if series.buckets.is_empty() {
                println!("No history for this {}", window);
                return Ok(());
            }
            for bucket in &series.buckets {
                println!(
                    "{:<10} {:>3} pomodoros │ {:>3} tasks │ {:>4} min",
                    bucket.label, bucket.pomodoros, bucket.tasks, bucket.minutes
                );
            }
            let summary = &series.summary;
            println!(
                "total {} pomodoros, {} tasks, {} min │ avg {} pomodoros, {} min",
                summary.total_pomodoros,
                summary.total_tasks,
                summary.total_minutes,
                summary.avg_pomodoros,
                summary.avg_minutes
            );
        }
        Commands::Recent { limit } => {
            let tracker = open(store, Durations::default());
            let rows = tracker.recent(limit);
            if rows.is_empty() {
                println!("No history yet");
            }
            for (label, stats) in rows {
                println!(
                    "{:<7} {} pomodoros │ {} tasks │ {} min",
                    label, stats.pomodoros_completed, stats.tasks_completed, stats.focus_minutes
                );
            }
        }
        Commands::Run {
            focus,
            break_minutes,
            yes,
        } => {
            let mut tracker = open(store, Durations::parse(&focus, &break_minutes));
            let mut prompt: Box<dyn ConfirmPrompt> = if yes {
                Box::new(AutoConfirm(true))
            } else {
                Box::new(StdinPrompt)
            };
            let ctrl_c = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            match run_session(&mut tracker, prompt.as_mut(), ctrl_c).await {
                SessionEnd::Interrupted => {
                    println!("\nStopped at {}", tracker.session().clock())
                }
                SessionEnd::BreakSkipped => {}
                SessionEnd::Completed => println!("\nBreak complete!"),
            }
        }
        Commands::Seed => {
            let mut tracker = open(store, Durations::default());
            tracker.load_sample_week();
            println!("Loaded a sample week into {}", dir.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FOCUSME_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

fn open(store: FileStore, durations: Durations) -> Tracker<FileStore> {
    Tracker::open(
        store,
        SystemClock,
        Sinks::new(LogNotifier, TerminalBell),
        durations,
    )
}

fn run_todo(tracker: &mut Tracker<FileStore>, action: TodoAction) {
    match action {
        TodoAction::Add { text } => match tracker.add_todo(&text.join(" ")) {
            Some(id) => println!("Added {}", id),
            None => eprintln!("Task text is empty"),
        },
        TodoAction::List => {
            if tracker.todos().is_empty() {
                println!("No tasks yet");
            }
            for todo in tracker.todos() {
                let check = if todo.completed { "✓" } else { " " };
                println!("[{}] {}: {}", check, todo.id, todo.text);
            }
        }
        TodoAction::Toggle { id } => match tracker.toggle_todo(id) {
            Some(true) => println!("Completed {}", id),
            Some(false) => println!("Reopened {}", id),
            None => eprintln!("No task with id {}", id),
        },
        TodoAction::Delete { id } => match tracker.delete_todo(id) {
            Some(todo) => println!("Deleted {}: {}", todo.id, todo.text),
            None => eprintln!("No task with id {}", id),
        },
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Stopped early; the timer is left paused.
    Interrupted,
    BreakSkipped,
    Completed,
}

/// Count down one focus interval and, if accepted, its break.
async fn run_session<S: KeyValueStore>(
    tracker: &mut Tracker<S>,
    prompt: &mut dyn ConfirmPrompt,
    interrupt: impl Future<Output = ()>,
) -> SessionEnd {
    let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
    let mut ticker = Ticker::new(tx, |generation| generation);
    tokio::pin!(interrupt);

    tracker.start();
    ticker.start();
    print_progress(tracker);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                ticker.stop();
                tracker.pause();
                return SessionEnd::Interrupted;
            }
            Some(generation) = rx.recv() => {
                if !ticker.is_current(generation) {
                    continue;
                }
                match tracker.tick() {
                    Tick::Counting { .. } => print_progress(tracker),
                    Tick::FocusCompleted => {
                        ticker.stop();
                        println!("\nFocus complete! {} pomodoros today.", tracker.today().pomodoros_completed);
                        if !tracker.resolve_break(prompt) {
                            return SessionEnd::BreakSkipped;
                        }
                        ticker.start();
                        print_progress(tracker);
                    }
                    Tick::BreakCompleted => {
                        ticker.stop();
                        return SessionEnd::Completed;
                    }
                    Tick::Ignored => {}
                }
            }
        }
    }
}

fn print_progress<S: KeyValueStore>(tracker: &Tracker<S>) {
    let label = match tracker.timer_state() {
        TimerState::OnBreak => "Break",
        _ => "Focus",
    };
    print!("\r{} {}  ", label, tracker.session().clock());
    let _ = io::stdout().flush();
}
