use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

lazy_static! {
    pub static ref FAKE_PTY: bool = env::var(ENV_FAKE_PTY).is_ok();
}

pub const USER_AGENT: &str = concat!("rstodo/", env!("CARGO_PKG_VERSION"));

// Environment variables
pub const ENV_ENDPOINT_URL: &str = "RSTODO_ENDPOINT_URL";
pub const ENV_HOME: &str = "RSTODO_HOME";
pub const ENV_TIMEOUT_SECS: &str = "RSTODO_TIMEOUT_SECS";
pub const ENV_LOG: &str = "RSTODO_LOG";
pub const ENV_FAKE_PTY: &str = "RSTODO_FAKE_PTY";

pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "warn";
pub const HOME_DIR_NAME: &str = ".rstodo";
pub const SESSION_FILE_NAME: &str = "session.bin";
pub const LOG_FILE_NAME: &str = "rstodo.log";

// Endpoint path segments
pub const EP_CHECK_USER: &str = "check-user";
pub const EP_ADD_TODO: &str = "add-to-do";
pub const EP_GET_TITLES: &str = "get-titles";
pub const EP_GET_LISTS: &str = "get-lists";
pub const EP_MARK_DONE: &str = "mark-as-done";
pub const EP_MARK_UNDONE: &str = "mark-as-undone";
pub const EP_UPDATE_TITLE: &str = "update-title";
pub const EP_UPDATE_LIST: &str = "update-list";
pub const EP_DELETE_TASK: &str = "delete-task";
pub const EP_DELETE_TITLE: &str = "delete-title";

// User-facing messages
pub const MSG_LOGIN_FAILED: &str = "Invalid username or password";
pub const MSG_FIELDS_REQUIRED: &str = "All fields are required!";
pub const MSG_ADDED: &str = "Successfully added!";
pub const MSG_SAVE_FAILED: &str = "Error saving task!";
pub const DEFAULT_TITLE_NAME: &str = "Task Details";

/// How long the add form stays visible after a successful save
pub const ADD_DISMISS_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on concurrent requests when marking a whole title done
pub const MAX_PARALLEL_REQUESTS: usize = 8;

// Table rendering
pub const TABLE_MAX_WIDTH: usize = 160;
pub const TABLE_COL_GAP: usize = 2;
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

pub const MODE_HEADER: u8 = 4;

pub const FG_DEFAULT: u8 = 250;
pub const BG_DEFAULT_1: u8 = 233;
pub const BG_DEFAULT_2: u8 = 232;
pub const FG_DONE: u8 = 240;
pub const FG_COMPLETED: u8 = 34;
pub const FG_ONGOING: u8 = 39;
