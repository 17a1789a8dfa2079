#![allow(dead_code)]

use serde_json::{Value, json};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Debug, Clone, PartialEq)]
pub struct ServerTask {
    pub id: i64,
    pub list_desc: String,
    pub title_id: i64,
    pub done: bool,
}

/// Everything the fake backend knows
#[derive(Debug, Default)]
pub struct BackendState {
    pub users: Vec<(String, String)>,
    pub titles: Vec<(i64, String)>,
    pub tasks: Vec<ServerTask>,
    pub next_id: i64,
    /// Every request received, as "METHOD /path"
    pub requests: Vec<String>,
    /// Task ids whose mark/update/delete requests answer 500
    pub failing_tasks: HashSet<i64>,
    /// Title ids whose get-lists requests answer 500
    pub failing_titles: HashSet<i64>,
    pub last_add_body: Option<Value>,
}

impl BackendState {
    pub fn title(&self, id: i64) -> Option<&str> {
        self.titles
            .iter()
            .find(|(t, _)| *t == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn task(&self, id: i64) -> Option<&ServerTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_ids(&self, title_id: i64) -> Vec<i64> {
        self.tasks
            .iter()
            .filter(|t| t.title_id == title_id)
            .map(|t| t.id)
            .collect()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests.iter().filter(|r| r.starts_with(prefix)).count()
    }
}

/// A to-do backend served by tiny_http on a random local port
pub struct FakeServer {
    server: Arc<Server>,
    state: Arc<Mutex<BackendState>>,
    handle: Option<JoinHandle<()>>,
    pub url: String,
}

impl FakeServer {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("Failed to start fake server"));
        let url = format!("http://{}", server.server_addr());
        let state = Arc::new(Mutex::new(BackendState {
            users: vec![("ana".to_string(), "s3cret".to_string())],
            next_id: 1,
            ..Default::default()
        }));

        let handle = {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    handle_request(&state, request);
                }
            })
        };

        FakeServer {
            server,
            state,
            handle: Some(handle),
            url,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("Backend state poisoned")
    }

    /// Seeds a title with tasks, returning the title id and task ids
    pub fn seed(&self, title: &str, tasks: &[&str]) -> (i64, Vec<i64>) {
        let mut state = self.state();
        let title_id = state.next_id;
        state.next_id += 1;
        state.titles.push((title_id, title.to_string()));

        let mut ids = Vec::new();
        for desc in tasks {
            let id = state.next_id;
            state.next_id += 1;
            state.tasks.push(ServerTask {
                id,
                list_desc: desc.to_string(),
                title_id,
                done: false,
            });
            ids.push(id);
        }
        (title_id, ids)
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn respond(request: Request, status: u16, body: Value) {
    let header = Header::from_bytes("Content-Type", "application/json").expect("Bad header");
    let response = Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(header);
    let _ = request.respond(response);
}

fn handle_request(state: &Mutex<BackendState>, mut request: Request) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    let method = request.method().clone();
    let path = request.url().to_string();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let id: Option<i64> = segments.get(1).and_then(|s| s.parse().ok());

    let mut state = state.lock().expect("Backend state poisoned");
    state.requests.push(format!("{} {}", method, path));

    let (status, reply) = match (&method, segments[0], id) {
        (Method::Post, "check-user", _) => {
            let username = body["username"].as_str().unwrap_or_default();
            let password = body["password"].as_str().unwrap_or_default();
            let exist = state
                .users
                .iter()
                .any(|(u, p)| u == username && p == password);
            (200, json!({ "exist": exist }))
        }
        (Method::Post, "add-to-do", _) => {
            state.last_add_body = Some(body.clone());
            let title_id = state.next_id;
            state.next_id += 1;
            let title = body["title"].as_str().unwrap_or_default().to_string();
            state.titles.push((title_id, title));
            let done = body["status"].as_bool().unwrap_or(false);
            for desc in body["lists"].as_array().cloned().unwrap_or_default() {
                let id = state.next_id;
                state.next_id += 1;
                state.tasks.push(ServerTask {
                    id,
                    list_desc: desc.as_str().unwrap_or_default().to_string(),
                    title_id,
                    done,
                });
            }
            (200, json!({ "success": true, "newTitleId": title_id }))
        }
        (Method::Get, "get-titles", _) => {
            let titles: Vec<Value> = state
                .titles
                .iter()
                .map(|(id, title)| json!({ "id": id, "title": title }))
                .collect();
            (200, json!({ "titles": titles }))
        }
        (Method::Get, "get-lists", Some(title_id)) if state.failing_titles.contains(&title_id) => {
            (500, json!({ "error": "internal error" }))
        }
        (Method::Get, "get-lists", Some(title_id)) => {
            // status goes out as 0/1, the way the backend stores it
            let lists: Vec<Value> = state
                .tasks
                .iter()
                .filter(|t| t.title_id == title_id)
                .map(|t| {
                    json!({
                        "id": t.id,
                        "list_desc": t.list_desc,
                        "titleId": t.title_id,
                        "status": if t.done { 1 } else { 0 },
                    })
                })
                .collect();
            (200, json!({ "lists": lists }))
        }
        (Method::Put, "mark-as-done" | "mark-as-undone" | "update-list", Some(task_id))
        | (Method::Delete, "delete-task", Some(task_id)) => {
            if state.failing_tasks.contains(&task_id) {
                (500, json!({ "error": "internal error" }))
            } else if state.task(task_id).is_none() {
                (404, json!({ "error": "no such task" }))
            } else {
                match segments[0] {
                    "delete-task" => state.tasks.retain(|t| t.id != task_id),
                    op => {
                        let desc = body["list_desc"].as_str().map(|s| s.to_string());
                        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
                            match op {
                                "mark-as-done" => task.done = true,
                                "mark-as-undone" => task.done = false,
                                _ => {
                                    if let Some(desc) = desc {
                                        task.list_desc = desc;
                                    }
                                }
                            }
                        }
                    }
                }
                (200, json!({ "success": true }))
            }
        }
        (Method::Put, "update-title", Some(title_id)) => {
            let title = body["title"].as_str().unwrap_or_default().to_string();
            match state.titles.iter_mut().find(|(id, _)| *id == title_id) {
                Some(entry) => {
                    entry.1 = title;
                    (200, json!({ "success": true }))
                }
                None => (404, json!({ "error": "no such title" })),
            }
        }
        (Method::Delete, "delete-title", Some(title_id)) => {
            state.titles.retain(|(id, _)| *id != title_id);
            state.tasks.retain(|t| t.title_id != title_id);
            (200, json!({ "success": true }))
        }
        _ => (404, json!({ "error": "not found" })),
    };
    drop(state);

    respond(request, status, reply);
}

pub struct TestCmd {
    home: TempDir,
    endpoint_url: String,
    binary_path: PathBuf,
}

impl TestCmd {
    pub fn new(server: &FakeServer) -> Self {
        TestCmd {
            home: TempDir::new().expect("Failed to create temp directory"),
            endpoint_url: server.url.clone(),
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_rstodo")),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(&self.binary_path)
            .args(args)
            .env("RSTODO_ENDPOINT_URL", &self.endpoint_url)
            .env("RSTODO_HOME", self.home.path())
            .env("RSTODO_LOG", "off")
            .env_remove("RSTODO_FAKE_PTY")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute command");

        TestResult { output }
    }

    /// Logs in as the seeded user
    pub fn login(&self) {
        self.run(&["login", "ana", "--password", "s3cret"])
            .assert_success();
    }
}

pub struct TestResult {
    output: Output,
}

impl TestResult {
    pub fn success(&self) -> bool {
        self.output.status.success()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).to_string()
    }

    pub fn assert_success(&self) {
        if !self.success() {
            panic!(
                "Command failed with status: {:?}\nstdout: {}\nstderr: {}",
                self.output.status,
                self.stdout(),
                self.stderr()
            );
        }
    }

    pub fn assert_failure(&self) {
        if self.success() {
            panic!(
                "Command succeeded when failure was expected\nstdout: {}\nstderr: {}",
                self.stdout(),
                self.stderr()
            );
        }
    }

    pub fn parse_json(&self) -> Value {
        serde_json::from_str(&self.stdout()).expect("Failed to parse JSON output")
    }
}

/// Titles of one section of `show` output ("ongoing" or "completed")
pub fn title_names(board: &Value, section: &str) -> Vec<String> {
    board[section]
        .as_array()
        .map(|titles| {
            titles
                .iter()
                .filter_map(|t| t["title"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Description and checked state of every task of one title in `show` output
pub fn title_tasks(board: &Value, section: &str, title: &str) -> Vec<(String, bool)> {
    board[section]
        .as_array()
        .and_then(|titles| titles.iter().find(|t| t["title"] == title))
        .and_then(|t| t["tasks"].as_array())
        .map(|tasks| {
            tasks
                .iter()
                .map(|t| {
                    (
                        t["list_desc"].as_str().unwrap_or_default().to_string(),
                        t["status"] == true,
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Descriptions in the done pane of `show` output
pub fn done_descs(board: &Value) -> Vec<String> {
    board["done"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|t| t["list_desc"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[macro_export]
macro_rules! test_setup {
    () => {{
        let server = $crate::common::FakeServer::start();
        let cmd = $crate::common::TestCmd::new(&server);
        (server, cmd)
    }};
}
