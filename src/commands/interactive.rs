//! Interactive user prompting.
//!
//! Prompts go to stderr so stdout stays clean for `--json` output.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::error::{CampusError, Result};

/// Prompt user for yes/no confirmation
///
/// Returns `true` only for `y` or `Y`.
pub fn confirm(prompt: &str) -> Result<bool> {
    confirm_with(prompt, io::stdin().lock(), io::stderr())
}

fn confirm_with(prompt: &str, mut input: impl BufRead, mut out: impl Write) -> Result<bool> {
    write!(out, "{prompt}? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Prompt for a single line of input, without the trailing newline
pub fn prompt_line(prompt: &str) -> Result<String> {
    prompt_line_with(prompt, io::stdin().lock(), io::stderr())
}

fn prompt_line_with(prompt: &str, mut input: impl BufRead, mut out: impl Write) -> Result<String> {
    write!(out, "{prompt}: ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prompt for a secret without echoing it.
///
/// Falls back to a plain line read when stdin is not a terminal (piped input).
pub fn prompt_secret(prompt: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return prompt_line(prompt);
    }

    eprint!("{prompt}: ");
    io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let secret = read_hidden();
    let restored = terminal::disable_raw_mode();
    eprintln!();

    let secret = secret?;
    restored?;
    Ok(secret)
}

fn read_hidden() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(CampusError::Other("cancelled".to_string()));
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}
