//! A command-line shell that forwards ordinary commands to the OS and hands a few verbs
//! to Gemini.
//!
//! ```text
//! input line ─▶ router::route ─┬─ Builtin(verb, arg) ─▶ Session handler ─▶ LanguageModel
//!                              └─ ShellPassthrough   ─▶ ShellRunner
//!                                         │
//!                                         ▼
//!                               CommandResult ─▶ History
//! ```
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=xxx gemsh            # interactive shell
//! gemsh exec explain tar -xzf a.tgz   # one command, exit code 0 or 1
//! RUST_LOG=gemsh=debug gemsh          # diagnostics on stderr
//! ```
//!
//! The session logic is generic over [`session::Connector`], [`shell::ShellRunner`] and
//! [`credential::CredentialPrompt`], so it can run against stubs.

pub mod config;
pub mod credential;
pub mod error;
pub mod history;
pub mod render;
pub mod repl;
pub mod router;
pub mod session;
pub mod shell;
pub mod task;

pub use error::{CommandResult, ShellError};
pub use history::{History, HistoryEntry};
pub use router::{Builtin, Decision, route};
pub use session::{AiSettings, Connector, GeminiConnector, Session};
pub use shell::{ShellOutput, ShellRunner, SystemShell, run_shell};
