//! The interactive loop, the one-shot `exec` action and the raw-mode line reader.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;

use crate::{
    credential::CredentialPrompt,
    error::CommandResult,
    history::History,
    render,
    session::{Connector, Session},
    shell::ShellRunner,
};

/// Runs the interactive shell until `exit`, Ctrl-C, Ctrl-D or Esc.
///
/// An interrupt while a command is running ends the process with exit code 0.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub async fn run<C, R, P>(mut session: Session<C, R, P>, stream: bool) -> io::Result<()>
where
    C: Connector,
    R: ShellRunner,
    P: CredentialPrompt,
{
    let profile = session.profile().await;
    print!(
        "{}",
        render::banner(
            env!("CARGO_PKG_VERSION"),
            profile
                .as_ref()
                .map(|profile| (profile.name.as_str(), profile.author.as_str())),
        )
    );

    loop {
        let Some(line) = read_line(render::PROMPT, session.history_mut())? else {
            break;
        };
        if line.trim() == "exit" {
            break;
        }

        tokio::select! {
            _ = execute_with_output(&mut session, &line, stream) => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                info!("interrupted while a command was running");
                std::process::exit(0);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Runs a single command non-interactively, printing its result.
///
/// Returns whether the command succeeded. No interrupt handler is installed here, so Ctrl-C
/// keeps the default signal behavior.
pub async fn exec<C, R, P>(mut session: Session<C, R, P>, command: &str, stream: bool) -> bool
where
    C: Connector,
    R: ShellRunner,
    P: CredentialPrompt,
{
    execute_with_output(&mut session, command, stream)
        .await
        .succeeded
}

async fn execute_with_output<C, R, P>(
    session: &mut Session<C, R, P>,
    line: &str,
    stream: bool,
) -> CommandResult
where
    C: Connector,
    R: ShellRunner,
    P: CredentialPrompt,
{
    if !stream {
        let result = session.execute(line).await;
        if let Some(text) = render::result_text(&result) {
            println!("{text}");
        }
        return result;
    }

    let mut streamed = false;
    let result = session
        .execute_streaming(line, |fragment| {
            streamed = true;
            print!("{}", render::fragment_text(fragment));
            io::stdout().flush().ok();
        })
        .await;

    if streamed {
        println!();
    }
    // streamed answers are already on screen
    if !(streamed && result.succeeded) {
        if let Some(text) = render::result_text(&result) {
            println!("{text}");
        }
    }
    result
}

/// What a key press does to the line being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Edit {
    /// Keep reading.
    Continue,
    /// The line is complete.
    Submit,
    /// Leave the shell.
    Quit,
}

/// Applies one key press to `buffer`, using `history` for Up/Down recall.
fn apply_key(key: KeyEvent, buffer: &mut String, history: &mut History) -> Edit {
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => Edit::Quit,
        KeyCode::Esc => Edit::Quit,
        KeyCode::Enter => Edit::Submit,
        KeyCode::Backspace => {
            buffer.pop();
            Edit::Continue
        }
        KeyCode::Up => {
            if let Some(command) = history.recall_previous() {
                command.clone_into(buffer);
            }
            Edit::Continue
        }
        KeyCode::Down => {
            history.recall_next().clone_into(buffer);
            Edit::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            Edit::Continue
        }
        _ => Edit::Continue,
    }
}

/// Reads one line in raw mode. `None` means the user asked to leave.
fn read_line(prompt: &str, history: &mut History) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    enable_raw_mode()?;
    let _guard = RawModeGuard;

    let mut buffer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match apply_key(key, &mut buffer, history) {
            Edit::Quit => {
                print!("\r\n");
                io::stdout().flush().ok();
                return Ok(None);
            }
            Edit::Submit => {
                print!("\r\n");
                io::stdout().flush().ok();
                return Ok(Some(buffer));
            }
            Edit::Continue => {
                // redraw the whole line; recall can shrink it
                print!("\r\x1b[2K{prompt}{buffer}");
                io::stdout().flush().ok();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(text: &str, buffer: &mut String, history: &mut History) {
        for c in text.chars() {
            apply_key(press(KeyCode::Char(c)), buffer, history);
        }
    }

    #[test]
    fn typing_and_backspace_edit_the_buffer() {
        let mut history = History::new();
        let mut buffer = String::new();
        type_text("lss", &mut buffer, &mut history);
        let edit = apply_key(press(KeyCode::Backspace), &mut buffer, &mut history);
        assert_eq!(edit, Edit::Continue);
        assert_eq!(buffer, "ls");
        let edit = apply_key(press(KeyCode::Enter), &mut buffer, &mut history);
        assert_eq!(edit, Edit::Submit);
    }

    #[test]
    fn up_and_down_recall_history() {
        let mut history = History::new();
        history.append("ls", "a");
        history.append("pwd", "/");
        let mut buffer = String::from("draft");

        apply_key(press(KeyCode::Up), &mut buffer, &mut history);
        assert_eq!(buffer, "pwd");
        apply_key(press(KeyCode::Up), &mut buffer, &mut history);
        assert_eq!(buffer, "ls");
        apply_key(press(KeyCode::Up), &mut buffer, &mut history);
        assert_eq!(buffer, "ls");
        apply_key(press(KeyCode::Down), &mut buffer, &mut history);
        assert_eq!(buffer, "pwd");
        apply_key(press(KeyCode::Down), &mut buffer, &mut history);
        assert_eq!(buffer, "");
    }

    #[test]
    fn control_keys_quit() {
        let mut history = History::new();
        let mut buffer = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(ctrl_c, &mut buffer, &mut history), Edit::Quit);
        assert_eq!(apply_key(ctrl_d, &mut buffer, &mut history), Edit::Quit);
        assert_eq!(apply_key(press(KeyCode::Esc), &mut buffer, &mut history), Edit::Quit);
        assert!(buffer.is_empty());
    }
}
