use crate::board::{Board, MarkAllReport};
use crate::constants::*;
use crate::model::{Task, TaskId, Title, TitleId};
use crate::table::{RowStyle, Table};
use crate::util::{pluralise, stdout_is_tty, terminal_width};
use crate::Result;
use serde::Serialize;

/// A title with its loaded tasks, as printed by `show`
#[derive(Debug, Serialize)]
pub struct TitleView<'a> {
    pub id: &'a TitleId,
    pub title: &'a str,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Serialize)]
pub struct BoardView<'a> {
    pub ongoing: Vec<TitleView<'a>>,
    pub completed: Vec<TitleView<'a>>,
    pub done: Vec<&'a Task>,
}

impl<'a> BoardView<'a> {
    pub fn new(board: &'a Board) -> Self {
        let view = |titles: Vec<&'a Title>| -> Vec<TitleView<'a>> {
            titles
                .into_iter()
                .map(|t| TitleView {
                    id: &t.id,
                    title: &t.title,
                    tasks: board.store().tasks_of(&t.id),
                })
                .collect()
        };

        BoardView {
            ongoing: view(board.ongoing_titles()),
            completed: view(board.completed_titles()),
            done: board.done_tasks(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FailedTask<'a> {
    id: &'a TaskId,
    error: String,
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    title_id: &'a TitleId,
    succeeded: &'a [TaskId],
    failed: Vec<FailedTask<'a>>,
    completed: bool,
}

impl<'a> From<&'a MarkAllReport> for ReportView<'a> {
    fn from(report: &'a MarkAllReport) -> Self {
        ReportView {
            title_id: &report.title_id,
            succeeded: &report.succeeded,
            failed: report
                .failed
                .iter()
                .map(|(id, e)| FailedTask {
                    id,
                    error: e.to_string(),
                })
                .collect(),
            completed: report.completed,
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn task_style(task: &Task) -> RowStyle {
    if task.done {
        RowStyle::fg(FG_DONE)
    } else {
        RowStyle::default()
    }
}

/// Prints the whole board: ongoing and completed titles, then the done pane
pub fn display_board(board: &Board) -> Result<()> {
    let view = BoardView::new(board);
    if !stdout_is_tty() {
        return print_json(&view);
    }

    let mut table = Table::new(terminal_width(), &["ID", "Title", "Progress", "State"]);
    let rows = view
        .ongoing
        .iter()
        .map(|t| (t, "ongoing", FG_ONGOING))
        .chain(view.completed.iter().map(|t| (t, "completed", FG_COMPLETED)));
    for (title, state, fg) in rows {
        let done = title.tasks.iter().filter(|t| t.done).count();
        table.add_row(
            vec![
                title.id.to_string(),
                title.title.to_string(),
                format!("{}/{}", done, title.tasks.len()),
                state.to_string(),
            ],
            RowStyle::fg(fg),
        );
    }

    if table.is_empty() {
        println!("No titles yet. Add one with `rstodo add <title> <task>...`");
        return Ok(());
    }
    table.render();

    if !view.done.is_empty() {
        println!();
        let mut done = Table::new(terminal_width(), &["ID", "Title", "Done"]);
        for task in &view.done {
            let name = board
                .store()
                .title(&task.title_id)
                .map(|t| t.title.as_str())
                .unwrap_or(DEFAULT_TITLE_NAME);
            done.add_row(
                vec![task.id.to_string(), name.to_string(), task.list_desc.clone()],
                task_style(task),
            );
        }
        done.render();
    }

    println!(
        "\n{}, {} completed",
        pluralise(board.titles().len(), "title"),
        view.completed.len()
    );
    Ok(())
}

pub fn display_titles(titles: &[Title]) -> Result<()> {
    if !stdout_is_tty() {
        return print_json(titles);
    }

    let mut table = Table::new(terminal_width(), &["ID", "Title"]);
    for title in titles {
        table.add_row(
            vec![title.id.to_string(), title.title.clone()],
            RowStyle::default(),
        );
    }
    table.render();
    Ok(())
}

/// Prints one title's tasks, open ones first
pub fn display_tasks(name: &str, tasks: &[&Task]) -> Result<()> {
    if !stdout_is_tty() {
        return print_json(tasks);
    }

    println!("{}", name);
    let mut ordered: Vec<&Task> = tasks.to_vec();
    ordered.sort_by_key(|t| t.done);

    let mut table = Table::new(terminal_width(), &["ID", "", "Task"]);
    for task in ordered {
        let check = if task.done { "[x]" } else { "[ ]" };
        table.add_row(
            vec![task.id.to_string(), check.to_string(), task.list_desc.clone()],
            task_style(task),
        );
    }
    table.render();
    Ok(())
}

pub fn display_report(report: &MarkAllReport) -> Result<()> {
    if !stdout_is_tty() {
        return print_json(&ReportView::from(report));
    }

    println!(
        "Marked {} done in title {}",
        pluralise(report.succeeded.len(), "task"),
        report.title_id
    );
    for (id, e) in &report.failed {
        println!("  failed {}: {}", id, e);
    }
    if report.completed {
        println!("Title {} completed", report.title_id);
    }
    Ok(())
}
