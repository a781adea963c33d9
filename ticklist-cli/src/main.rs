use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use ticklist_core::{
    parse_date_input, parse_time_input, App, Command as TaskCommand, FileStore, Filter, NewTask,
    Outcome, TaskId,
};
use tracing_subscriber::EnvFilter;

mod config;
mod listing;
mod notify;
mod state;
mod tui;

#[derive(Parser, Debug)]
#[command(
    name = "ticklist",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TICKLIST_BUILD_SHA"), ")"),
    about = "Local task list with due dates and reminders"
)]
struct Cli {
    /// State directory (default: ~/.ticklist)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task
    Add {
        text: String,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// Due time, HH:MM (needs --date; defaults to 00:00)
        #[arg(long)]
        time: Option<String>,

        /// Notify when the task is due
        #[arg(long, default_value_t = false)]
        remind: bool,
    },

    /// Show tasks
    List {
        /// all, active or completed
        #[arg(long, default_value = "all")]
        filter: Filter,

        /// Print the view as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mark a task done (or not done)
    Toggle { id: TaskId },

    /// Replace a task's text
    Edit { id: TaskId, text: String },

    /// Delete a task
    Delete { id: TaskId },

    /// Delete every completed task
    ClearCompleted,

    /// Check reminders on an interval and print the ones that fire
    Watch {
        /// Run a single pass and exit
        #[arg(long, default_value_t = false)]
        once: bool,
    },

    /// Interactive full-screen task list
    Tui,

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.ticklist/config.toml with defaults
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = state::ensure_ticklist_home(cli.home.as_deref())?;

    let log_file = matches!(cli.command, Command::Tui).then(|| state::log_path(&home));
    init_logging(log_file.as_deref())?;

    run(cli.command, &home).await
}

async fn run(command: Command, home: &Path) -> Result<()> {
    match command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(home)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(home)?;
                println!("# {}", config::config_path(home).display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Add {
            text,
            date,
            time,
            remind,
        } => {
            let input = NewTask {
                text,
                due_date: parse_date_input(date.as_deref().unwrap_or(""))?,
                due_time: parse_time_input(time.as_deref().unwrap_or(""))?,
                reminder: remind,
            };
            if input.due_time.is_some() && input.due_date.is_none() {
                tracing::warn!("--time without --date is ignored");
            }
            let (_, mut app) = open(home)?;
            if let Outcome::Added(task) = app.dispatch(TaskCommand::Add(input))? {
                println!("Added {}: {}", task.id, task.text);
            }
        }

        Command::List { filter, json } => {
            let (_, mut app) = open(home)?;
            app.dispatch(TaskCommand::SetFilter(filter))?;
            let view = app.view(Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", listing::render_plain(&view));
            }
        }

        Command::Toggle { id } => {
            let (_, mut app) = open(home)?;
            match app.dispatch(TaskCommand::Toggle(id))? {
                Outcome::Toggled { completed: true, .. } => println!("Completed {id}"),
                Outcome::Toggled { completed: false, .. } => println!("Reopened {id}"),
                _ => tracing::info!(id, "no such task"),
            }
        }

        Command::Edit { id, text } => {
            let (_, mut app) = open(home)?;
            if let Outcome::Edited(id) = app.dispatch(TaskCommand::Edit { id, text })? {
                println!("Edited {id}");
            }
        }

        Command::Delete { id } => {
            let (_, mut app) = open(home)?;
            if let Outcome::Deleted(id) = app.dispatch(TaskCommand::Delete(id))? {
                println!("Deleted {id}");
            }
        }

        Command::ClearCompleted => {
            let (_, mut app) = open(home)?;
            if let Outcome::Cleared(n) = app.dispatch(TaskCommand::ClearCompleted)? {
                println!("Cleared {n} completed task{}", if n == 1 { "" } else { "s" });
            }
        }

        Command::Watch { once } => {
            let (cfg, mut app) = open(home)?;
            if !cfg.reminders.enabled {
                bail!("reminders are disabled ([reminders].enabled = false in config)");
            }
            watch(&mut app, once).await?;
        }

        Command::Tui => {
            let (cfg, mut app) = open(home)?;
            tui::run_tui(&mut app, cfg.reminders.enabled)?;
        }
    }

    Ok(())
}

/// Config plus the app built from it. Config subcommands never get here, so a
/// broken config can still be shown or replaced.
fn open(home: &Path) -> Result<(config::Config, App<FileStore>)> {
    let cfg = config::load_config(home)?;
    let app = state::open_app(home, &cfg)?;
    Ok((cfg, app))
}

async fn watch(app: &mut App<FileStore>, once: bool) -> Result<()> {
    let zone = app.store().zone();
    let mut notifier = notify::LineNotifier::new(std::io::stdout(), zone, true);

    if once {
        app.reload();
        let fired = app.run_reminders(Utc::now(), &mut notifier)?;
        tracing::info!(fired = fired.len(), "reminder pass");
        return Ok(());
    }

    let period = app.reminders().interval();
    println!(
        "Watching reminders every {}s (Ctrl-C to stop)",
        period.as_secs()
    );
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Other ticklist commands write the same file between passes.
                app.reload();
                let fired = app.run_reminders(Utc::now(), &mut notifier)?;
                if !fired.is_empty() {
                    tracing::info!(fired = fired.len(), "reminder pass");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                return Ok(());
            }
        }
    }
}

/// stderr by default; a log file in TUI mode so logs do not tear the screen.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
