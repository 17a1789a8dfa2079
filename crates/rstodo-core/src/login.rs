use crate::api::TodoApi;
use crate::constants::MSG_LOGIN_FAILED;
use crate::session::Session;
use tracing::{error, info, warn};

/// Username/password entry for the login screen
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Shown under the fields after a failed attempt
    pub error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(username: impl Into<String>) -> Self {
        LoginForm {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Checks the credentials against the server.
    ///
    /// Fields are sent exactly as typed, empty or not. A rejected login and a
    /// failed request look the same to the user.
    pub fn submit<A: TodoApi + ?Sized>(&mut self, api: &A) -> Option<Session> {
        match api.check_user(&self.username, &self.password) {
            Ok(true) => {
                info!(username = %self.username, "logged in");
                self.error = None;
                Some(Session::new(self.username.clone()))
            }
            Ok(false) => {
                warn!(username = %self.username, "credentials rejected");
                self.error = Some(MSG_LOGIN_FAILED.to_string());
                None
            }
            Err(e) => {
                error!(error = %e, "login request failed");
                self.error = Some(MSG_LOGIN_FAILED.to_string());
                None
            }
        }
    }
}
