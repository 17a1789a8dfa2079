mod cli;
mod completions;
mod tui;

use cli::{Cli, Commands};
use rstodo_core::commands::*;
use rstodo_core::config::Config;
use rstodo_core::constants::*;
use rstodo_core::model::{TaskId, TitleId};
use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::process;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// CLI commands log to stderr
fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

/// The TUI owns the terminal, so it logs to a file under the home directory
fn init_file_logging(conf: &Config) {
    if fs::create_dir_all(&conf.home).is_err() {
        return;
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&conf.log_file)
    {
        Ok(f) => f,
        Err(_) => return,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

fn title_id(s: &str) -> TitleId {
    TitleId::from(s)
}

fn task_ids(ids: &[String]) -> Vec<TaskId> {
    ids.iter().map(|s| TaskId::from(s.as_str())).collect()
}

fn title_ids(ids: &[String]) -> Vec<TitleId> {
    ids.iter().map(|s| TitleId::from(s.as_str())).collect()
}

fn main() {
    let command = Cli::parse_command();
    let conf = Config::new();

    // Handle TUI command early - it takes over the terminal
    if let Commands::Tui = command {
        init_file_logging(&conf);
        if let Err(e) = tui::run_tui(conf) {
            eprintln!("TUI error: {}", e);
            process::exit(1);
        }
        return;
    }

    init_stderr_logging();

    let result = match &command {
        Commands::Login { username, password } => cmd_login(&conf, username, password.clone()),
        Commands::Show => cmd_show(&conf),
        Commands::Titles => cmd_titles(&conf),
        Commands::Lists { title_id: id } => cmd_lists(&conf, &title_id(id)),
        Commands::Add { title, tasks } => cmd_add(&conf, title, tasks),
        Commands::Done { title_id: id, task_ids: ids } => {
            cmd_done(&conf, &title_id(id), &task_ids(ids))
        }
        Commands::Undone { title_id: id, task_ids: ids } => {
            cmd_undone(&conf, &title_id(id), &task_ids(ids))
        }
        Commands::DoneAll { title_id: id } => cmd_done_all(&conf, &title_id(id)),
        Commands::RenameTitle { title_id: id, title } => {
            cmd_rename_title(&conf, &title_id(id), title)
        }
        Commands::EditTask {
            title_id: id,
            task_id,
            description,
        } => cmd_edit_task(
            &conf,
            &title_id(id),
            &TaskId::from(task_id.as_str()),
            description,
        ),
        Commands::RmTask { task_ids: ids } => cmd_remove_tasks(&conf, &task_ids(ids)),
        Commands::RmTitle { title_ids: ids } => cmd_remove_titles(&conf, &title_ids(ids)),
        Commands::Completions { shell } => {
            completions::generate_completions(*shell, &mut std::io::stdout());
            Ok(())
        }
        Commands::Tui => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
