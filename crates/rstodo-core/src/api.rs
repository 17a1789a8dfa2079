// HTTP client for the remote to-do service
use crate::config::Config;
use crate::constants::*;
use crate::error::{Result, RstodoError};
use crate::model::{Task, TaskId, Title, TitleId};
use reqwest::Method;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Payload for creating a title together with its initial tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTodo {
    pub username: String,
    pub title: String,
    pub lists: Vec<String>,
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddTodoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "newTitleId", default)]
    pub new_title_id: Option<TitleId>,
}

#[derive(Deserialize)]
struct CheckUserResponse {
    #[serde(default)]
    exist: bool,
}

#[derive(Deserialize)]
struct TitlesResponse {
    #[serde(default)]
    titles: Vec<Title>,
}

#[derive(Deserialize)]
struct ListsResponse {
    #[serde(default)]
    lists: Vec<Task>,
}

/// The remote service, one method per endpoint.
///
/// Implementations must be shareable across threads: marking a whole title
/// done fans its requests out over scoped worker threads.
pub trait TodoApi: Sync {
    /// `POST /check-user`, true when the credentials match an existing user
    fn check_user(&self, username: &str, password: &str) -> Result<bool>;

    /// `POST /add-to-do`
    fn add_todo(&self, todo: &NewTodo) -> Result<AddTodoResponse>;

    /// `GET /get-titles`
    fn get_titles(&self) -> Result<Vec<Title>>;

    /// `GET /get-lists/:titleId`
    fn get_lists(&self, title_id: &TitleId) -> Result<Vec<Task>>;

    /// `PUT /mark-as-done/:taskId`
    fn mark_as_done(&self, task_id: &TaskId) -> Result<()>;

    /// `PUT /mark-as-undone/:taskId`
    fn mark_as_undone(&self, task_id: &TaskId) -> Result<()>;

    /// `PUT /update-title/:titleId`
    fn update_title(&self, title_id: &TitleId, title: &str) -> Result<()>;

    /// `PUT /update-list/:listId`
    fn update_list(&self, task_id: &TaskId, list_desc: &str) -> Result<()>;

    /// `DELETE /delete-task/:taskId`
    fn delete_task(&self, task_id: &TaskId) -> Result<()>;

    /// `DELETE /delete-title/:titleId`. The server is expected to delete the
    /// title's tasks along with it.
    fn delete_title(&self, title_id: &TitleId) -> Result<()>;
}

/// `TodoApi` over blocking reqwest
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(RstodoError::Config(format!(
                "endpoint URL cannot be used as a base: {}",
                base
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(HttpApi { client, base })
    }

    pub fn from_config(conf: &Config) -> Result<Self> {
        let base = Url::parse(&conf.endpoint_url)?;
        Self::new(base, conf.timeout)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RstodoError::Config(format!("invalid endpoint URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn call(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<Response> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(%method, %url, status = status.as_u16(), "request rejected");
            return Err(RstodoError::Status {
                method: method.to_string(),
                path: url.path().to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl TodoApi for HttpApi {
    fn check_user(&self, username: &str, password: &str) -> Result<bool> {
        let body = json!({ "username": username, "password": password });
        let response: CheckUserResponse = self
            .call(Method::POST, &[EP_CHECK_USER], Some(body))?
            .json()?;
        Ok(response.exist)
    }

    fn add_todo(&self, todo: &NewTodo) -> Result<AddTodoResponse> {
        let body = serde_json::to_value(todo)?;
        Ok(self.call(Method::POST, &[EP_ADD_TODO], Some(body))?.json()?)
    }

    fn get_titles(&self) -> Result<Vec<Title>> {
        let response: TitlesResponse = self.call(Method::GET, &[EP_GET_TITLES], None)?.json()?;
        Ok(response.titles)
    }

    fn get_lists(&self, title_id: &TitleId) -> Result<Vec<Task>> {
        let response: ListsResponse = self
            .call(Method::GET, &[EP_GET_LISTS, title_id.as_str()], None)?
            .json()?;
        Ok(response.lists)
    }

    fn mark_as_done(&self, task_id: &TaskId) -> Result<()> {
        self.call(Method::PUT, &[EP_MARK_DONE, task_id.as_str()], None)?;
        Ok(())
    }

    fn mark_as_undone(&self, task_id: &TaskId) -> Result<()> {
        self.call(Method::PUT, &[EP_MARK_UNDONE, task_id.as_str()], None)?;
        Ok(())
    }

    fn update_title(&self, title_id: &TitleId, title: &str) -> Result<()> {
        let body = json!({ "title": title });
        self.call(
            Method::PUT,
            &[EP_UPDATE_TITLE, title_id.as_str()],
            Some(body),
        )?;
        Ok(())
    }

    fn update_list(&self, task_id: &TaskId, list_desc: &str) -> Result<()> {
        let body = json!({ "list_desc": list_desc });
        self.call(Method::PUT, &[EP_UPDATE_LIST, task_id.as_str()], Some(body))?;
        Ok(())
    }

    fn delete_task(&self, task_id: &TaskId) -> Result<()> {
        self.call(Method::DELETE, &[EP_DELETE_TASK, task_id.as_str()], None)?;
        Ok(())
    }

    fn delete_title(&self, title_id: &TitleId) -> Result<()> {
        self.call(Method::DELETE, &[EP_DELETE_TITLE, title_id.as_str()], None)?;
        Ok(())
    }
}
