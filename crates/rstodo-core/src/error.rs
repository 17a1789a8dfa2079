use thiserror::Error;

#[derive(Error, Debug)]
pub enum RstodoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Server returned {status} for {method} {path}")]
    Status {
        method: String,
        path: String,
        status: u16,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in. Run `rstodo login <username>` first")]
    NotLoggedIn,

    #[error("{0}")]
    Validation(String),

    #[error("Title not found: {0}")]
    TitleNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RstodoError>;
