//! Asking the user for an API key when none is configured.

use std::io::{self, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::error::ShellError;

/// Shortest key accepted after trimming.
pub const MIN_CREDENTIAL_LEN: usize = 20;

/// Capability that solicits a credential from the user.
pub trait CredentialPrompt {
    /// Asks for a key. `None` means the user declined or could not be asked.
    fn request_credential(&mut self) -> Option<String>;
}

impl<T: CredentialPrompt + ?Sized> CredentialPrompt for &mut T {
    fn request_credential(&mut self) -> Option<String> {
        (**self).request_credential()
    }
}

/// Never supplies a credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl CredentialPrompt for NoPrompt {
    fn request_credential(&mut self) -> Option<String> {
        None
    }
}

/// Reads a key from the terminal without echoing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

impl CredentialPrompt for ConsolePrompt {
    fn request_credential(&mut self) -> Option<String> {
        if !io::stdin().is_terminal() {
            return None;
        }
        eprint!("\x1b[33mGemini API key not configured.\x1b[0m Enter key (hidden, Esc to skip): ");
        io::stderr().flush().ok();
        match read_hidden() {
            Ok(key) => key,
            Err(error) => {
                tracing::warn!("could not read API key from terminal: {error}");
                None
            }
        }
    }
}

fn read_hidden() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let _guard = RawModeGuard;

    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => {
                    eprint!("\r\n");
                    return Ok(None);
                }
                KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    eprint!("\r\n");
                    return Ok(None);
                }
                KeyCode::Enter => {
                    eprint!("\r\n");
                    return Ok(Some(buffer));
                }
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            }
        }
    }
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Trims `input` and checks it is long enough to be a key.
///
/// # Errors
///
/// Returns [`ShellError::MissingCredential`] when the trimmed key is too short.
pub fn validate_credential(input: &str) -> Result<String, ShellError> {
    let key = input.trim();
    if key.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ShellError::MissingCredential(format!(
            "API key must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }
    Ok(key.to_string())
}
