// Board - the to-do page: titles, the open task list, edit mode and the done pane
use crate::api::TodoApi;
use crate::constants::*;
use crate::error::{Result, RstodoError};
use crate::model::{Task, TaskId, Title, TitleId};
use crate::store::TodoStore;
use crate::util::is_blank;
use std::thread;
use tracing::{debug, error, info, warn};

/// The title whose task list overlay is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTitle {
    pub id: TitleId,
    pub name: String,
}

/// What is being edited in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Title(TitleId),
    Task(TaskId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub target: EditTarget,
    pub draft: String,
}

/// How a done/undone toggle moved the owning title
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionChange {
    Unchanged,
    Completed(TitleId),
    Reopened(TitleId),
}

/// Outcome of marking every open task of a title done
#[derive(Debug)]
pub struct MarkAllReport {
    pub title_id: TitleId,
    pub succeeded: Vec<TaskId>,
    pub failed: Vec<(TaskId, RstodoError)>,
    /// Whether the title is complete afterwards
    pub completed: bool,
}

impl MarkAllReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of loading every title's tasks
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub loaded: usize,
    /// Titles whose tasks could not be fetched; they show as ongoing
    pub failed: Vec<(TitleId, RstodoError)>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    store: TodoStore,
    open: Option<OpenTitle>,
    editing: Option<EditState>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn titles(&self) -> &[Title] {
        self.store.titles()
    }

    pub fn ongoing_titles(&self) -> Vec<&Title> {
        self.store.ongoing_titles()
    }

    pub fn completed_titles(&self) -> Vec<&Title> {
        self.store.completed_titles()
    }

    pub fn is_completed(&self, title_id: &TitleId) -> bool {
        self.store.is_completed(title_id)
    }

    /// The done pane: tasks of titles that were completed
    pub fn done_tasks(&self) -> Vec<&Task> {
        self.store.done_tasks()
    }

    pub fn current_title(&self) -> Option<&OpenTitle> {
        self.open.as_ref()
    }

    /// Tasks of the title in the overlay not yet moved to the done pane.
    /// Checked tasks stay here until every task of the title is checked.
    pub fn open_list(&self) -> Vec<&Task> {
        match &self.open {
            Some(open) => self.store.open_tasks(&open.id),
            None => Vec::new(),
        }
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut String> {
        self.editing.as_mut().map(|e| &mut e.draft)
    }

    /// Fetches the title list, replacing the local one
    pub fn load_titles<A: TodoApi + ?Sized>(&mut self, api: &A) -> Result<()> {
        let titles = api.get_titles()?;
        debug!(count = titles.len(), "loaded titles");
        self.store.replace_titles(titles);
        if let Some(open) = &self.open {
            if self.store.title(&open.id).is_none() {
                self.open = None;
            }
        }
        Ok(())
    }

    /// Fetches a title's tasks and shows them in the task list overlay
    pub fn open_title<A: TodoApi + ?Sized>(&mut self, api: &A, title_id: &TitleId) -> Result<()> {
        let tasks = api.get_lists(title_id)?;
        debug!(title = %title_id, count = tasks.len(), "loaded tasks");
        self.store.replace_tasks(title_id, tasks);

        let name = self
            .store
            .title(title_id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| DEFAULT_TITLE_NAME.to_string());
        self.open = Some(OpenTitle {
            id: title_id.clone(),
            name,
        });
        Ok(())
    }

    pub fn close_title(&mut self) {
        self.open = None;
    }

    /// Reacts to a title created through the add form: reload, then open it
    pub fn on_title_added<A: TodoApi + ?Sized>(
        &mut self,
        api: &A,
        title_id: Option<&TitleId>,
    ) -> Result<()> {
        self.load_titles(api)?;
        if let Some(id) = title_id {
            self.open_title(api, id)?;
        }
        Ok(())
    }

    /// Loads the titles and then the tasks of every title, one after another.
    ///
    /// Only a failure to fetch the titles is an error. A title whose tasks
    /// fail to load is recorded in the report and the rest still load.
    pub fn refresh_all<A: TodoApi + ?Sized>(&mut self, api: &A) -> Result<RefreshReport> {
        self.load_titles(api)?;
        let ids: Vec<TitleId> = self.store.titles().iter().map(|t| t.id.clone()).collect();

        let mut report = RefreshReport::default();
        for id in ids {
            match api.get_lists(&id) {
                Ok(tasks) => {
                    self.store.replace_tasks(&id, tasks);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!(title = %id, error = %e, "loading tasks failed");
                    report.failed.push((id, e));
                }
            }
        }
        Ok(report)
    }

    /// Checks or unchecks one task, server first.
    ///
    /// Checking the last unchecked task of a title completes it and moves all
    /// of its tasks to the done pane. Unchecking a task moves only that task
    /// back and reopens its title.
    pub fn set_task_done<A: TodoApi + ?Sized>(
        &mut self,
        api: &A,
        task_id: &TaskId,
        done: bool,
    ) -> Result<CompletionChange> {
        let title_id = self
            .store
            .task(task_id)
            .map(|t| t.title_id.clone())
            .ok_or_else(|| RstodoError::TaskNotFound(task_id.to_string()))?;

        if done {
            api.mark_as_done(task_id)?;
        } else {
            api.mark_as_undone(task_id)?;
        }

        let was_completed = self.store.is_completed(&title_id);
        self.store.set_done(task_id, done);
        let is_completed = self.store.file_if_completed(&title_id);

        Ok(match (was_completed, is_completed) {
            (false, true) => {
                info!(title = %title_id, "title completed");
                CompletionChange::Completed(title_id)
            }
            (true, false) => {
                info!(title = %title_id, "title reopened");
                CompletionChange::Reopened(title_id)
            }
            _ => CompletionChange::Unchanged,
        })
    }

    /// Marks every unchecked task of a title done, sending the requests
    /// concurrently.
    ///
    /// Only tasks the server acknowledged are checked locally, and the tasks
    /// move to the done pane only when all of them succeeded. Failures are
    /// collected into the report rather than aborting the rest.
    pub fn mark_all_done<A: TodoApi + ?Sized>(
        &mut self,
        api: &A,
        title_id: &TitleId,
    ) -> Result<MarkAllReport> {
        if self.store.title(title_id).is_none() {
            return Err(RstodoError::TitleNotFound(title_id.to_string()));
        }

        let pending: Vec<TaskId> = self
            .store
            .pending_tasks(title_id)
            .iter()
            .map(|t| t.id.clone())
            .collect();

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();

        for batch in pending.chunks(MAX_PARALLEL_REQUESTS) {
            let results: Vec<(TaskId, Result<()>)> = thread::scope(|s| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|id| (id.clone(), s.spawn(move || api.mark_as_done(id))))
                    .collect();

                handles
                    .into_iter()
                    .map(|(id, handle)| {
                        let result = handle.join().unwrap_or_else(|_| {
                            Err(RstodoError::Other("request worker panicked".to_string()))
                        });
                        (id, result)
                    })
                    .collect()
            });

            for (id, result) in results {
                match result {
                    Ok(()) => {
                        self.store.set_done(&id, true);
                        succeeded.push(id);
                    }
                    Err(e) => {
                        warn!(task = %id, error = %e, "mark as done failed");
                        failed.push((id, e));
                    }
                }
            }
        }

        let completed = self.store.file_if_completed(title_id);
        if failed.is_empty() {
            info!(title = %title_id, count = succeeded.len(), "marked all tasks done");
        } else {
            error!(
                title = %title_id,
                succeeded = succeeded.len(),
                failed = failed.len(),
                "mark all done partially failed"
            );
        }

        Ok(MarkAllReport {
            title_id: title_id.clone(),
            succeeded,
            failed,
            completed,
        })
    }

    /// Enters edit mode for a title, seeding the draft with its current name
    pub fn begin_title_edit(&mut self, title_id: &TitleId) -> Result<()> {
        let title = self
            .store
            .title(title_id)
            .ok_or_else(|| RstodoError::TitleNotFound(title_id.to_string()))?;
        self.editing = Some(EditState {
            target: EditTarget::Title(title_id.clone()),
            draft: title.title.clone(),
        });
        Ok(())
    }

    /// Enters edit mode for a task, seeding the draft with its description
    pub fn begin_task_edit(&mut self, task_id: &TaskId) -> Result<()> {
        let task = self
            .store
            .task(task_id)
            .ok_or_else(|| RstodoError::TaskNotFound(task_id.to_string()))?;
        self.editing = Some(EditState {
            target: EditTarget::Task(task_id.clone()),
            draft: task.list_desc.clone(),
        });
        Ok(())
    }

    /// Leaves edit mode without sending anything
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Sends the draft. Edit mode is left only when the update succeeds.
    pub fn commit_edit<A: TodoApi + ?Sized>(&mut self, api: &A) -> Result<()> {
        let edit = match &self.editing {
            Some(edit) => edit.clone(),
            None => return Ok(()),
        };

        match &edit.target {
            EditTarget::Title(id) => self.rename_title(api, id, &edit.draft)?,
            EditTarget::Task(id) => self.update_task(api, id, &edit.draft)?,
        }

        self.editing = None;
        Ok(())
    }

    pub fn rename_title<A: TodoApi + ?Sized>(
        &mut self,
        api: &A,
        title_id: &TitleId,
        title: &str,
    ) -> Result<()> {
        if is_blank(title) {
            return Err(RstodoError::Validation("title cannot be empty".to_string()));
        }
        api.update_title(title_id, title)?;
        self.store.rename_title(title_id, title);
        if let Some(open) = self.open.as_mut() {
            if &open.id == title_id {
                open.name = title.to_string();
            }
        }
        Ok(())
    }

    pub fn update_task<A: TodoApi + ?Sized>(
        &mut self,
        api: &A,
        task_id: &TaskId,
        list_desc: &str,
    ) -> Result<()> {
        if is_blank(list_desc) {
            return Err(RstodoError::Validation("task cannot be empty".to_string()));
        }
        api.update_list(task_id, list_desc)?;
        self.store.set_description(task_id, list_desc);
        Ok(())
    }

    /// Deletes a task wherever it shows, open list or done pane.
    /// If only checked tasks remain, their title completes.
    pub fn delete_task<A: TodoApi + ?Sized>(&mut self, api: &A, task_id: &TaskId) -> Result<()> {
        api.delete_task(task_id)?;
        if let Some(task) = self.store.remove_task(task_id) {
            self.store.file_if_completed(&task.title_id);
        }
        if matches!(&self.editing, Some(EditState { target: EditTarget::Task(id), .. }) if id == task_id)
        {
            self.editing = None;
        }
        Ok(())
    }

    /// Deletes a title. The server deletes its tasks; locally they are
    /// dropped along with it.
    pub fn delete_title<A: TodoApi + ?Sized>(&mut self, api: &A, title_id: &TitleId) -> Result<()> {
        api.delete_title(title_id)?;
        self.store.remove_title(title_id);
        if self.open.as_ref().is_some_and(|o| &o.id == title_id) {
            self.open = None;
        }
        if matches!(&self.editing, Some(EditState { target: EditTarget::Title(id), .. }) if id == title_id)
        {
            self.editing = None;
        }
        Ok(())
    }
}
