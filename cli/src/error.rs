//! Failure taxonomy for one routed command, and the result every handler produces.

use std::io;

/// Everything that can go wrong while handling a single input line.
///
/// None of these abort the session: each one is folded into a failed [`CommandResult`].
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// An AI verb was given no argument.
    #[error("{verb} needs an argument. Usage: {usage}")]
    MissingArgument {
        /// The verb that was invoked.
        verb: &'static str,
        /// Usage line shown to the user.
        usage: &'static str,
    },

    /// No usable API key was configured or supplied.
    #[error("AI features are unavailable: {0}")]
    MissingCredential(String),

    /// `vision` was pointed at a path that does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The command interpreter ran the command and reported failure.
    #[error("{message}")]
    ShellExecution {
        /// Interpreter exit code (`-1` when terminated by a signal).
        code: i32,
        /// Trimmed stderr, or a generic message naming the code.
        message: String,
    },

    /// The command interpreter could not be started.
    #[error("failed to launch shell: {0}")]
    ShellLaunch(#[source] io::Error),

    /// The text-generation service returned an error.
    #[error("AI request failed: {0}")]
    RemoteService(String),

    /// Any other I/O problem, such as an unreadable image file.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Stable snake_case label for the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingArgument { .. } => "missing_argument",
            Self::MissingCredential(_) => "missing_credential",
            Self::FileNotFound(_) => "file_not_found",
            Self::ShellExecution { .. } => "shell_execution",
            Self::ShellLaunch(_) => "shell_launch",
            Self::RemoteService(_) => "remote_service",
            Self::Io(_) => "io",
        }
    }

    /// Wraps a provider error as a remote service failure.
    pub fn remote(error: &impl std::error::Error) -> Self {
        Self::RemoteService(error.to_string())
    }
}

/// Outcome of exactly one handler for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub succeeded: bool,
    /// Text shown to the user. On failure this is the human-readable message.
    pub output: String,
    /// Error kind label for failures.
    pub error_detail: Option<String>,
}

impl CommandResult {
    /// A successful result carrying `output`.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
            error_detail: None,
        }
    }

    /// A failed result describing `error`.
    #[must_use]
    pub fn failure(error: &ShellError) -> Self {
        Self {
            succeeded: false,
            output: error.to_string(),
            error_detail: Some(error.kind().to_string()),
        }
    }

    /// The empty successful result produced by blank input.
    #[must_use]
    pub const fn noop() -> Self {
        Self {
            succeeded: true,
            output: String::new(),
            error_detail: None,
        }
    }
}

impl From<ShellError> for CommandResult {
    fn from(error: ShellError) -> Self {
        Self::failure(&error)
    }
}
