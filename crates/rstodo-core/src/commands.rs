use crate::{
    add_form::{AddForm, SaveOutcome},
    api::{HttpApi, TodoApi},
    board::{Board, CompletionChange},
    config::Config,
    constants::*,
    display::{display_board, display_report, display_tasks, display_titles},
    error::{Result, RstodoError},
    login::LoginForm,
    model::{TaskId, TitleId},
    session::Session,
    util::{pluralise, prompt_line},
};

/// Loads the title list, then one title's tasks so its tasks are known locally
fn load_title<A: TodoApi + ?Sized>(api: &A, title_id: &TitleId) -> Result<Board> {
    let mut board = Board::new();
    board.load_titles(api)?;
    if board.store().title(title_id).is_none() {
        return Err(RstodoError::TitleNotFound(title_id.to_string()));
    }
    board.open_title(api, title_id)?;
    Ok(board)
}

/// Checks the credentials and remembers the username for later commands
pub fn cmd_login(conf: &Config, username: &str, password: Option<String>) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let password = match password {
        Some(p) => p,
        None => prompt_line("Password")?,
    };

    let mut form = LoginForm::with_username(username);
    form.password = password;

    match form.submit(&api) {
        Some(session) => {
            session.save(&conf.session_file)?;
            println!("Logged in as {}", session.username);
            Ok(())
        }
        None => Err(RstodoError::Validation(
            form.error.unwrap_or_else(|| MSG_LOGIN_FAILED.to_string()),
        )),
    }
}

/// Prints the board. Titles whose tasks failed to load still show, as
/// ongoing, and the command fails afterwards.
pub fn cmd_show(conf: &Config) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = Board::new();
    let report = board.refresh_all(&api)?;
    display_board(&board)?;

    if report.is_success() {
        return Ok(());
    }
    for (id, e) in &report.failed {
        eprintln!("Could not load tasks of title {}: {}", id, e);
    }
    Err(RstodoError::Other(format!(
        "tasks of {} could not be loaded",
        pluralise(report.failed.len(), "title")
    )))
}

pub fn cmd_titles(conf: &Config) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    display_titles(&api.get_titles()?)
}

pub fn cmd_lists(conf: &Config, title_id: &TitleId) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = Board::new();
    board.load_titles(&api)?;
    board.open_title(&api, title_id)?;

    let name = board
        .current_title()
        .map(|o| o.name.clone())
        .unwrap_or_else(|| DEFAULT_TITLE_NAME.to_string());
    display_tasks(&name, &board.store().tasks_of(title_id))
}

/// Creates a title with its tasks as the logged-in user
pub fn cmd_add(conf: &Config, title: &str, tasks: &[String]) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let session = Session::load(&conf.session_file).ok_or(RstodoError::NotLoggedIn)?;

    let mut form = AddForm::new();
    form.set_title(title);
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 {
            form.add_entry();
        }
        form.set_entry(i, task.as_str());
    }

    let outcome = form.save(&api, Some(&session), |_| {});
    let message = form
        .message()
        .map(|m| m.text.clone())
        .unwrap_or_default();

    match outcome {
        SaveOutcome::Saved { new_title_id, .. } => {
            match new_title_id {
                Some(id) => println!("{} (title {})", message, id),
                None => println!("{}", message),
            }
            Ok(())
        }
        SaveOutcome::Rejected => Err(RstodoError::Validation(message)),
        SaveOutcome::Failed => Err(RstodoError::Other(message)),
    }
}

fn set_done(conf: &Config, title_id: &TitleId, task_ids: &[TaskId], done: bool) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = load_title(&api, title_id)?;

    for id in task_ids {
        if board.store().task(id).is_none() {
            return Err(RstodoError::TaskNotFound(id.to_string()));
        }
    }

    for id in task_ids {
        let change = board.set_task_done(&api, id, done)?;
        let verb = if done { "Done" } else { "Undone" };
        println!("{} {}", verb, id);
        match change {
            CompletionChange::Completed(t) => println!("Title {} completed", t),
            CompletionChange::Reopened(t) => println!("Title {} reopened", t),
            CompletionChange::Unchanged => {}
        }
    }
    Ok(())
}

pub fn cmd_done(conf: &Config, title_id: &TitleId, task_ids: &[TaskId]) -> Result<()> {
    set_done(conf, title_id, task_ids, true)
}

pub fn cmd_undone(conf: &Config, title_id: &TitleId, task_ids: &[TaskId]) -> Result<()> {
    set_done(conf, title_id, task_ids, false)
}

/// Marks every open task of a title done; fails if any request failed
pub fn cmd_done_all(conf: &Config, title_id: &TitleId) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = load_title(&api, title_id)?;

    let report = board.mark_all_done(&api, title_id)?;
    display_report(&report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(RstodoError::Other(format!(
            "{} could not be marked done",
            pluralise(report.failed.len(), "task")
        )))
    }
}

pub fn cmd_rename_title(conf: &Config, title_id: &TitleId, title: &str) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = Board::new();
    board.load_titles(&api)?;
    board.begin_title_edit(title_id)?;
    if let Some(draft) = board.edit_draft_mut() {
        *draft = title.to_string();
    }
    board.commit_edit(&api)?;
    println!("Renamed title {} to {}", title_id, title);
    Ok(())
}

pub fn cmd_edit_task(conf: &Config, title_id: &TitleId, task_id: &TaskId, desc: &str) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = load_title(&api, title_id)?;
    board.begin_task_edit(task_id)?;
    if let Some(draft) = board.edit_draft_mut() {
        *draft = desc.to_string();
    }
    board.commit_edit(&api)?;
    println!("Updated task {}", task_id);
    Ok(())
}

pub fn cmd_remove_tasks(conf: &Config, task_ids: &[TaskId]) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = Board::new();
    for id in task_ids {
        board.delete_task(&api, id)?;
    }
    println!("Removed {}", pluralise(task_ids.len(), "task"));
    Ok(())
}

/// Deletes titles; the server removes their tasks along with them
pub fn cmd_remove_titles(conf: &Config, title_ids: &[TitleId]) -> Result<()> {
    let api = HttpApi::from_config(conf)?;
    let mut board = Board::new();
    board.load_titles(&api)?;
    for id in title_ids {
        if board.store().title(id).is_none() {
            return Err(RstodoError::TitleNotFound(id.to_string()));
        }
    }
    for id in title_ids {
        board.delete_title(&api, id)?;
    }
    println!("Removed {}", pluralise(title_ids.len(), "title"));
    Ok(())
}
