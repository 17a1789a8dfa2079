use crate::Result;
use crate::constants::*;
use std::io::{self, BufRead, IsTerminal, Write};
use terminal_size::{Height, Width};

/// Whether stdout is an interactive terminal (or faked as one for tests)
pub fn stdout_is_tty() -> bool {
    *FAKE_PTY || io::stdout().is_terminal()
}

/// Width of the attached terminal, used to size tables
pub fn terminal_width() -> usize {
    width_or_default(terminal_size::terminal_size())
}

fn width_or_default(size: Option<(Width, Height)>) -> usize {
    match size {
        Some((Width(w), _)) if w > 0 => w as usize,
        _ => DEFAULT_TERMINAL_WIDTH,
    }
}

/// True for empty and whitespace-only strings
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Prints a prompt on stderr and reads one line from stdin, without the newline
pub fn prompt_line(msg: &str) -> Result<String> {
    eprint!("{}: ", msg);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Formats "n thing" / "n things"
pub fn pluralise(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}
