use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

use crate::cli::Cli;

/// Writes the completion script for `shell`
pub fn generate_completions<W: Write>(shell: Shell, buf: &mut W) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "rstodo", buf);
}
