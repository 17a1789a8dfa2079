pub mod add_form;
pub mod api;
pub mod board;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod login;
pub mod model;
pub mod session;
pub mod store;
pub mod table;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, RstodoError};
