// In-memory TodoApi used by the unit tests
use crate::api::{AddTodoResponse, NewTodo, TodoApi};
use crate::error::{Result, RstodoError};
use crate::model::{Task, TaskId, Title, TitleId};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct FakeState {
    pub users: Vec<(String, String)>,
    pub titles: Vec<Title>,
    pub tasks: Vec<Task>,
    pub next_id: i64,
    /// Every call made, as "METHOD path"
    pub calls: Vec<String>,
    /// Tasks whose mark/update/delete calls fail
    pub failing_tasks: HashSet<TaskId>,
    /// Titles whose get-lists calls fail
    pub failing_titles: HashSet<TitleId>,
    /// When set, every call fails as if the server were unreachable
    pub offline: bool,
    /// When set, add-to-do answers `success: false`
    pub reject_adds: bool,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = FakeApi::default();
        api.state().next_id = 1;
        api
    }

    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.state()
            .users
            .push((username.to_string(), password.to_string()));
        self
    }

    /// Seed a title with tasks, returning its id
    pub fn seed(&self, title: &str, tasks: &[&str]) -> TitleId {
        let mut state = self.state();
        let title_id = TitleId::from(state.next_id);
        state.next_id += 1;
        state.titles.push(Title {
            id: title_id.clone(),
            title: title.to_string(),
        });
        for desc in tasks {
            let id = TaskId::from(state.next_id);
            state.next_id += 1;
            state.tasks.push(Task {
                id,
                list_desc: desc.to_string(),
                title_id: title_id.clone(),
                done: false,
            });
        }
        title_id
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn task_ids(&self, title_id: &TitleId) -> Vec<TaskId> {
        self.state()
            .tasks
            .iter()
            .filter(|t| &t.title_id == title_id)
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn server_task(&self, id: &TaskId) -> Option<Task> {
        self.state().tasks.iter().find(|t| &t.id == id).cloned()
    }

    fn record(&self, call: String) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        state.calls.push(call.clone());
        if state.offline {
            return Err(RstodoError::Other(format!("connection refused: {}", call)));
        }
        Ok(state)
    }

    fn check_task(state: &FakeState, method: &str, path: String, id: &TaskId) -> Result<()> {
        if state.failing_tasks.contains(id) {
            return Err(RstodoError::Status {
                method: method.to_string(),
                path,
                status: 500,
            });
        }
        if !state.tasks.iter().any(|t| &t.id == id) {
            return Err(RstodoError::Status {
                method: method.to_string(),
                path,
                status: 404,
            });
        }
        Ok(())
    }
}

impl TodoApi for FakeApi {
    fn check_user(&self, username: &str, password: &str) -> Result<bool> {
        let state = self.record("POST /check-user".to_string())?;
        Ok(state
            .users
            .iter()
            .any(|(u, p)| u == username && p == password))
    }

    fn add_todo(&self, todo: &NewTodo) -> Result<AddTodoResponse> {
        let mut state = self.record("POST /add-to-do".to_string())?;
        if state.reject_adds {
            return Ok(AddTodoResponse::default());
        }
        let title_id = TitleId::from(state.next_id);
        state.next_id += 1;
        state.titles.push(Title {
            id: title_id.clone(),
            title: todo.title.clone(),
        });
        for desc in &todo.lists {
            let id = TaskId::from(state.next_id);
            state.next_id += 1;
            state.tasks.push(Task {
                id,
                list_desc: desc.clone(),
                title_id: title_id.clone(),
                done: todo.status,
            });
        }
        Ok(AddTodoResponse {
            success: true,
            new_title_id: Some(title_id),
        })
    }

    fn get_titles(&self) -> Result<Vec<Title>> {
        let state = self.record("GET /get-titles".to_string())?;
        Ok(state.titles.clone())
    }

    fn get_lists(&self, title_id: &TitleId) -> Result<Vec<Task>> {
        let path = format!("/get-lists/{}", title_id);
        let state = self.record(format!("GET {}", path))?;
        if state.failing_titles.contains(title_id) {
            return Err(RstodoError::Status {
                method: "GET".to_string(),
                path,
                status: 500,
            });
        }
        Ok(state
            .tasks
            .iter()
            .filter(|t| &t.title_id == title_id)
            .cloned()
            .collect())
    }

    fn mark_as_done(&self, task_id: &TaskId) -> Result<()> {
        let path = format!("/mark-as-done/{}", task_id);
        let mut state = self.record(format!("PUT {}", path))?;
        Self::check_task(&state, "PUT", path, task_id)?;
        if let Some(t) = state.tasks.iter_mut().find(|t| &t.id == task_id) {
            t.done = true;
        }
        Ok(())
    }

    fn mark_as_undone(&self, task_id: &TaskId) -> Result<()> {
        let path = format!("/mark-as-undone/{}", task_id);
        let mut state = self.record(format!("PUT {}", path))?;
        Self::check_task(&state, "PUT", path, task_id)?;
        if let Some(t) = state.tasks.iter_mut().find(|t| &t.id == task_id) {
            t.done = false;
        }
        Ok(())
    }

    fn update_title(&self, title_id: &TitleId, title: &str) -> Result<()> {
        let mut state = self.record(format!("PUT /update-title/{}", title_id))?;
        match state.titles.iter_mut().find(|t| &t.id == title_id) {
            Some(t) => {
                t.title = title.to_string();
                Ok(())
            }
            None => Err(RstodoError::Status {
                method: "PUT".to_string(),
                path: format!("/update-title/{}", title_id),
                status: 404,
            }),
        }
    }

    fn update_list(&self, task_id: &TaskId, list_desc: &str) -> Result<()> {
        let path = format!("/update-list/{}", task_id);
        let mut state = self.record(format!("PUT {}", path))?;
        Self::check_task(&state, "PUT", path, task_id)?;
        if let Some(t) = state.tasks.iter_mut().find(|t| &t.id == task_id) {
            t.list_desc = list_desc.to_string();
        }
        Ok(())
    }

    fn delete_task(&self, task_id: &TaskId) -> Result<()> {
        let path = format!("/delete-task/{}", task_id);
        let mut state = self.record(format!("DELETE {}", path))?;
        Self::check_task(&state, "DELETE", path, task_id)?;
        state.tasks.retain(|t| &t.id != task_id);
        Ok(())
    }

    fn delete_title(&self, title_id: &TitleId) -> Result<()> {
        let mut state = self.record(format!("DELETE /delete-title/{}", title_id))?;
        state.titles.retain(|t| &t.id != title_id);
        state.tasks.retain(|t| &t.title_id != title_id);
        Ok(())
    }
}
