use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use desk_core::{DeskContext, SimulatedDesk};
use desk_shared::{
    domain::{cm_to_mm, ShortcutId, StepDirection, DEFAULT_SHORTCUT_HEIGHT_CM},
    validation::ShortcutDraft,
};
use desk_storage::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

/// Grace period for pushed desk events to reach the log before rendering or exit.
const EVENT_SETTLE: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "desk", about = "Drive a standing desk and manage height shortcuts")]
struct Cli {
    /// Overrides the configured data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Runs the interactive shell when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
#[command(name = "desk", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show connection status and height
    Status,
    /// Re-read connection status and height from the desk
    Refresh,
    /// Raise the desk by one step
    Up,
    /// Lower the desk by one step
    Down,
    /// Move to a height in centimeters
    Move { height_cm: f64 },
    #[command(subcommand)]
    Shortcuts(ShortcutCommand),
    #[command(subcommand)]
    Logs(LogCommand),
    /// Read commands from stdin until EOF or `quit`
    Shell,
}

#[derive(Subcommand, Debug)]
enum ShortcutCommand {
    List,
    /// Height defaults to the current desk height
    Add {
        name: String,
        height_cm: Option<String>,
    },
    Edit {
        id: String,
        name: String,
        height_cm: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Move the desk to a stored shortcut
    Go {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum LogCommand {
    Show {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    let store = FileStore::open(&settings.data_dir).with_context(|| {
        format!(
            "failed to open data directory '{}'",
            settings.data_dir.display()
        )
    })?;
    info!(data_dir = %settings.data_dir.display(), "desk data directory ready");

    let desk = SimulatedDesk::new(settings.simulated_start_height_mm);
    let context = DeskContext::start(desk.clone(), Arc::new(store), settings.controller_options());
    desk.auto_connect().await;
    settle().await;

    let result = match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell(&context).await,
        command => run(&context, command).await,
    };

    settle().await;
    context.shutdown();
    result
}

async fn settle() {
    tokio::time::sleep(EVENT_SETTLE).await;
}

async fn shell(context: &DeskContext) -> Result<()> {
    println!("desk shell: `help` lists commands, `quit` leaves");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_shell_line(&line) {
            Ok(ShellInput::Blank) => continue,
            Ok(ShellInput::Quit) => break,
            Ok(ShellInput::Command(Command::Shell)) => println!("already in the shell"),
            Ok(ShellInput::Command(command)) => {
                if let Err(err) = run(context, command).await {
                    println!("error: {err:#}");
                }
            }
            Err(err) => match err.downcast_ref::<clap::Error>() {
                Some(usage) => {
                    if let Err(io_err) = usage.print() {
                        warn!(error = %io_err, "failed to print shell usage");
                    }
                }
                None => println!("error: {err:#}"),
            },
        }
    }

    Ok(())
}

#[derive(Debug)]
enum ShellInput {
    Blank,
    Quit,
    Command(Command),
}

fn parse_shell_line(line: &str) -> Result<ShellInput> {
    let words = shell_words::split(line).context("unbalanced quotes")?;
    match words.as_slice() {
        [] => return Ok(ShellInput::Blank),
        [word] if word == "quit" || word == "exit" => return Ok(ShellInput::Quit),
        _ => {}
    }
    let parsed = ShellLine::try_parse_from(words)?;
    Ok(ShellInput::Command(parsed.command))
}

async fn run(context: &DeskContext, command: Command) -> Result<()> {
    match command {
        Command::Status => print_status(context).await,
        Command::Refresh => {
            context.refresh().await;
            settle().await;
            print_status(context).await;
        }
        Command::Up => step(context, StepDirection::Up).await,
        Command::Down => step(context, StepDirection::Down).await,
        Command::Move { height_cm } => {
            let outcome = context.move_to_height(cm_to_mm(height_cm), None).await;
            println!("{}", render::outcome_text(&outcome));
        }
        Command::Shortcuts(action) => run_shortcut(context, action).await?,
        Command::Logs(LogCommand::Show { limit }) => {
            let logs = context.logs();
            if logs.is_empty() {
                println!("no log entries");
            }
            for entry in logs.iter().take(limit) {
                println!("{}", render::log_line(entry));
            }
        }
        Command::Logs(LogCommand::Clear) => {
            context.clear_logs();
            println!("log cleared");
        }
        Command::Shell => println!("already in the shell"),
    }
    Ok(())
}

async fn print_status(context: &DeskContext) {
    println!("{}", render::status_block(&context.snapshot().await));
}

async fn step(context: &DeskContext, direction: StepDirection) {
    let outcome = context.move_step(direction).await;
    println!("{}", render::outcome_text(&outcome));
    settle().await;
    print_status(context).await;
}

async fn run_shortcut(context: &DeskContext, action: ShortcutCommand) -> Result<()> {
    match action {
        ShortcutCommand::List => {
            for shortcut in context.shortcuts() {
                println!("{}", render::shortcut_line(&shortcut));
            }
        }
        ShortcutCommand::Add { name, height_cm } => {
            let height_cm = match height_cm {
                Some(text) => text,
                None => {
                    let current = context.snapshot().await.height_cm;
                    format!("{:.1}", current.unwrap_or(DEFAULT_SHORTCUT_HEIGHT_CM))
                }
            };
            let valid = ShortcutDraft::new(name, height_cm).validate()?;
            let shortcut = context.add_shortcut(&valid.name, valid.height_mm);
            println!("{}", render::shortcut_line(&shortcut));
        }
        ShortcutCommand::Edit {
            id,
            name,
            height_cm,
        } => {
            let id = ShortcutId(id);
            let existing = context
                .shortcut(&id)
                .with_context(|| format!("no shortcut with id '{id}'"))?;
            let height_cm = height_cm.unwrap_or_else(|| format!("{:.1}", existing.height_cm()));
            let valid = ShortcutDraft::new(name, height_cm).validate()?;
            let updated = context
                .update_shortcut(&id, &valid.name, valid.height_mm)
                .with_context(|| format!("no shortcut with id '{id}'"))?;
            println!("{}", render::shortcut_line(&updated));
        }
        ShortcutCommand::Delete { id } => {
            let id = ShortcutId(id);
            let removed = context
                .delete_shortcut(&id)
                .with_context(|| format!("no shortcut with id '{id}'"))?;
            println!("deleted \"{}\"", removed.name);
        }
        ShortcutCommand::Go { id } => {
            let id = ShortcutId(id);
            let outcome = context
                .activate_shortcut(&id)
                .await
                .with_context(|| format!("no shortcut with id '{id}'"))?;
            println!("{}", render::outcome_text(&outcome));
            settle().await;
            print_status(context).await;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
