// TodoStore - normalized client-side view of titles and their loaded tasks
use crate::model::{Task, TaskId, Title, TitleId};
use std::collections::{HashMap, HashSet};

/// Titles in server order plus every task fetched so far, keyed by task id.
///
/// Whether a title is complete is never stored; it is computed from the
/// tasks' `done` flags. What is stored is which tasks have been filed into
/// the done pane: a checked task stays in its title's list until the whole
/// title completes, and only then are all of its tasks filed together.
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    titles: Vec<Title>,
    tasks: Vec<Task>,
    tasks_by_id: HashMap<TaskId, usize>,
    loaded_titles: HashSet<TitleId>,
    filed: HashSet<TaskId>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn title(&self, id: &TitleId) -> Option<&Title> {
        self.titles.iter().find(|t| &t.id == id)
    }

    /// Replaces the title list. Tasks of titles that disappeared are dropped.
    pub fn replace_titles(&mut self, titles: Vec<Title>) {
        let known: HashSet<TitleId> = titles.iter().map(|t| t.id.clone()).collect();
        self.titles = titles;
        self.tasks.retain(|t| known.contains(&t.title_id));
        self.loaded_titles.retain(|id| known.contains(id));
        self.rebuild_index();
    }

    /// Renames a title in place; false if it is unknown
    pub fn rename_title(&mut self, id: &TitleId, title: &str) -> bool {
        match self.titles.iter_mut().find(|t| &t.id == id) {
            Some(t) => {
                t.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes a title together with all of its loaded tasks
    pub fn remove_title(&mut self, id: &TitleId) -> Option<Title> {
        let pos = self.titles.iter().position(|t| &t.id == id)?;
        let title = self.titles.remove(pos);
        self.tasks.retain(|t| &t.title_id != id);
        self.loaded_titles.remove(id);
        self.rebuild_index();
        Some(title)
    }

    /// Replaces the loaded tasks of one title with a fresh fetch.
    ///
    /// The fetch was made for `title_id`, so every task is put under it
    /// regardless of what the server echoed back. A title fetched already
    /// complete has its tasks filed straight into the done pane.
    pub fn replace_tasks(&mut self, title_id: &TitleId, tasks: Vec<Task>) {
        self.tasks.retain(|t| &t.title_id != title_id);
        for mut task in tasks {
            task.title_id = title_id.clone();
            // A task id seen under another title moves here
            self.tasks.retain(|t| t.id != task.id);
            self.tasks.push(task);
        }
        self.loaded_titles.insert(title_id.clone());
        self.rebuild_index();
        self.file_if_completed(title_id);
    }

    /// Whether the tasks of a title have been fetched at least once
    pub fn is_loaded(&self, title_id: &TitleId) -> bool {
        self.loaded_titles.contains(title_id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks_by_id.get(id).map(|&idx| &self.tasks[idx])
    }

    fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        match self.tasks_by_id.get(id) {
            Some(&idx) => Some(&mut self.tasks[idx]),
            None => None,
        }
    }

    /// Sets the done flag of a loaded task; false if it is unknown.
    ///
    /// Unchecking a filed task takes it back out of the done pane.
    pub fn set_done(&mut self, id: &TaskId, done: bool) -> bool {
        match self.task_mut(id) {
            Some(task) => {
                task.done = done;
                if !done {
                    self.filed.remove(id);
                }
                true
            }
            None => false,
        }
    }

    /// Files every task of a complete title into the done pane.
    /// Returns whether the title was complete.
    pub fn file_if_completed(&mut self, title_id: &TitleId) -> bool {
        if !self.is_completed(title_id) {
            return false;
        }
        let ids: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|t| &t.title_id == title_id)
            .map(|t| t.id.clone())
            .collect();
        self.filed.extend(ids);
        true
    }

    /// Replaces the description of a loaded task; false if it is unknown
    pub fn set_description(&mut self, id: &TaskId, list_desc: &str) -> bool {
        match self.task_mut(id) {
            Some(task) => {
                task.list_desc = list_desc.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_task(&mut self, id: &TaskId) -> Option<Task> {
        let idx = *self.tasks_by_id.get(id)?;
        let task = self.tasks.remove(idx);
        self.rebuild_index();
        Some(task)
    }

    /// All loaded tasks of a title, done or not, in fetch order
    pub fn tasks_of(&self, title_id: &TitleId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| &t.title_id == title_id)
            .collect()
    }

    /// Tasks of a title not yet filed into the done pane, checked or not
    pub fn open_tasks(&self, title_id: &TitleId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| &t.title_id == title_id && !self.filed.contains(&t.id))
            .collect()
    }

    /// Tasks of a title still unchecked
    pub fn pending_tasks(&self, title_id: &TitleId) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| &t.title_id == title_id && !t.done)
            .collect()
    }

    /// The done pane: every filed task, across all titles
    pub fn done_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.filed.contains(&t.id))
            .collect()
    }

    /// A title is complete iff it has loaded tasks and all of them are done
    pub fn is_completed(&self, title_id: &TitleId) -> bool {
        let tasks = self.tasks_of(title_id);
        !tasks.is_empty() && tasks.iter().all(|t| t.done)
    }

    pub fn completed_titles(&self) -> Vec<&Title> {
        self.titles
            .iter()
            .filter(|t| self.is_completed(&t.id))
            .collect()
    }

    pub fn ongoing_titles(&self) -> Vec<&Title> {
        self.titles
            .iter()
            .filter(|t| !self.is_completed(&t.id))
            .collect()
    }

    fn rebuild_index(&mut self) {
        self.tasks_by_id = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        // Only loaded, checked tasks can sit in the done pane
        let (tasks, index) = (&self.tasks, &self.tasks_by_id);
        self.filed
            .retain(|id| index.get(id).is_some_and(|&idx| tasks[idx].done));
    }
}
