use crate::constants::*;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the rstodo client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the to-do API, as given
    pub endpoint_url: String,
    /// Directory holding the session and log files
    pub home: PathBuf,
    /// Path to the persisted login session
    pub session_file: PathBuf,
    /// Path to the TUI log file
    pub log_file: PathBuf,
    /// Overall timeout applied to each request
    pub timeout: Duration,
}

impl Config {
    /// Creates a new Config from environment variables
    pub fn new() -> Self {
        let endpoint_url = env::var(ENV_ENDPOINT_URL)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());

        let home = match env::var(ENV_HOME) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home::home_dir()
                .or_else(|| env::var("HOME").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(HOME_DIR_NAME),
        };

        let timeout = env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Config {
            endpoint_url,
            session_file: home.join(SESSION_FILE_NAME),
            log_file: home.join(LOG_FILE_NAME),
            home,
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
