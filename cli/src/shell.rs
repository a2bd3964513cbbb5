//! Delegation of input lines to the operating system's command interpreter.

use std::{future::Future, io};

use async_process::{Command, Stdio};
use tracing::debug;

use crate::error::{CommandResult, ShellError};

/// Captured result of one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellOutput {
    /// Exit code, `-1` when the child was killed by a signal.
    pub exit_code: i32,
    /// Everything written to stdout.
    pub stdout: String,
    /// Everything written to stderr.
    pub stderr: String,
}

/// Capability that runs a command line and collects its output.
pub trait ShellRunner: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter could not be started.
    fn run(&self, command: &str) -> impl Future<Output = io::Result<ShellOutput>> + Send;
}

impl<T: ShellRunner> ShellRunner for &T {
    fn run(&self, command: &str) -> impl Future<Output = io::Result<ShellOutput>> + Send {
        T::run(self, command)
    }
}

/// Runs commands through the platform shell (`sh -c` or `cmd /C`).
#[derive(Debug, Clone)]
pub struct SystemShell {
    program: String,
    flag: String,
}

impl Default for SystemShell {
    fn default() -> Self {
        if cfg!(windows) {
            Self::with_interpreter("cmd", "/C")
        } else {
            Self::with_interpreter("sh", "-c")
        }
    }
}

impl SystemShell {
    /// The platform default interpreter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `program flag <command>` instead of the platform default.
    pub fn with_interpreter(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }
}

impl ShellRunner for SystemShell {
    async fn run(&self, command: &str) -> io::Result<ShellOutput> {
        debug!(interpreter = %self.program, %command, "spawning shell command");
        let output = Command::new(&self.program)
            .arg(&self.flag)
            .arg(command)
            .stdin(Stdio::inherit())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs `command` and maps the interpreter's outcome onto a [`CommandResult`].
///
/// Exit code 0 yields trimmed stdout; anything else yields trimmed stderr. Empty streams
/// fall back to a fixed message.
pub async fn run_shell(runner: &impl ShellRunner, command: &str) -> CommandResult {
    match runner.run(command).await {
        Ok(output) if output.exit_code == 0 => {
            let stdout = output.stdout.trim();
            if stdout.is_empty() {
                CommandResult::success("Command executed successfully")
            } else {
                CommandResult::success(stdout)
            }
        }
        Ok(output) => {
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("Command failed with code {}", output.exit_code)
            } else {
                stderr.to_string()
            };
            debug!(code = output.exit_code, "shell command failed");
            CommandResult::failure(&ShellError::ShellExecution {
                code: output.exit_code,
                message,
            })
        }
        Err(error) => CommandResult::failure(&ShellError::ShellLaunch(error)),
    }
}
