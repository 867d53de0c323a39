//! Terminal to-do list entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the task database.
//! - Perform the one-time initial load, then run the event loop.
//!
//! # Invariants
//! - Any startup failure aborts with a diagnostic before the UI starts.
//! - The connection outlives the event loop and is closed on exit.
//! - Raw mode and the alternate screen are left on every exit path,
//!   panics included.

mod app;
mod config;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::App;
use clap::Parser;
use config::Cli;
use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, stdout, Stdout, Write};
use std::time::Duration;
use todo_core::db::open_db;
use todo_core::{core_version, init_logging, SqliteTaskStore, TaskList, TaskStore};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

fn main() -> Result<()> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let config = Cli::parse().resolve(&cwd);

    init_logging(&config.log_level, &config.log_dir).map_err(|err| anyhow!(err))?;
    install_terminal_panic_hook();

    let conn = open_db(&config.db_path).with_context(|| {
        format!(
            "failed to open task database `{}`",
            config.db_path.display()
        )
    })?;
    let store = SqliteTaskStore::try_new(&conn).context("task database is not ready")?;
    let list = TaskList::load(store).context("failed to load tasks")?;

    let mut app = App::new(list);
    let result = run(&mut app);

    info!("{}", exit_event(result.is_ok(), app.list().len()));
    result
}

fn exit_event(ok: bool, task_count: usize) -> String {
    format!(
        "event=app_exit module=tui status={} task_count={} core_version={}",
        if ok { "ok" } else { "error" },
        task_count,
        core_version()
    )
}

fn run<S: TaskStore>(app: &mut App<S>) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let result = event_loop(app, &mut terminal);
    drop(guard);
    result
}

fn event_loop<S: TaskStore>(
    app: &mut App<S>,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| ui::draw(frame, app))?;
        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

/// Holds raw mode and the alternate screen; dropping it restores both.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // From here on, an early return still drops the guard.
        let guard = Self;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = restore_screen(&mut stdout());
    }
}

fn restore_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, LeaveAlternateScreen, Show)
}

/// Leaves the alternate screen before the panic message is printed.
fn install_terminal_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = restore_screen(&mut stdout());
        previous_hook(panic_info);
    }));
}
