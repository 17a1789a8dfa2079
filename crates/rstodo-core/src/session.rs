// The logged-in user, persisted between runs
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Who is logged in. Written on successful login and handed explicitly to
/// operations that act on the user's behalf, such as creating a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Session {
            username: username.into(),
        }
    }

    /// Load the session file, if there is a readable one
    pub fn load(session_file: &Path) -> Option<Session> {
        let data = std::fs::read(session_file).ok()?;
        match bincode::deserialize(&data) {
            Ok(session) => {
                debug!(path = %session_file.display(), "loaded session");
                Some(session)
            }
            Err(e) => {
                warn!(path = %session_file.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    /// Save the session, replacing any previous one
    pub fn save(&self, session_file: &Path) -> Result<()> {
        if let Some(parent) = session_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = bincode::serialize(self)?;
        std::fs::write(session_file, data)?;
        Ok(())
    }
}
