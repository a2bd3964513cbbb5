//! Native Gemini provider for `gemsh`.
//!
//! This crate integrates Google’s **Gemini Developer API** with the shared abstractions from
//! `gemsh-core`. Streaming goes through `streamGenerateContent` (server-sent events), blocking
//! calls through `generateContent`. Images attached to user messages are sent as inline data.
//!
//! # Quick start
//!
//! ```no_run
//! use gemsh_core::{LanguageModel, llm::oneshot};
//! use gemsh_gemini::GeminiBackend;
//! use futures_lite::StreamExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gemini = GeminiBackend::new(std::env::var("GEMINI_API_KEY")?);
//! let stream = gemini.respond(oneshot(
//!     "You are a concise assistant.",
//!     "Explain `tar -xzf` in one sentence.",
//! ));
//! futures_lite::pin!(stream);
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(()) }
//! ```

mod client;
mod config;
mod error;
mod llm;
mod types;

pub use client::SseDecoder;
pub use config::{AuthMode, DEFAULT_MODEL, GEMINI_API_BASE_URL, GeminiBackend};
pub use error::GeminiError;

/// Create a Gemini backend configured to use the `gemini-2.0-flash` model.
#[must_use]
pub fn gemini_2_0_flash(key: impl Into<String>) -> GeminiBackend {
    GeminiBackend::new(key).with_text_model("gemini-2.0-flash")
}

/// Create a Gemini backend configured to use the `gemini-2.5-flash` model.
#[must_use]
pub fn gemini_2_5_flash(key: impl Into<String>) -> GeminiBackend {
    GeminiBackend::new(key).with_text_model("gemini-2.5-flash")
}

/// Create a Gemini backend configured to use the `gemini-2.5-pro` model.
#[must_use]
pub fn gemini_2_5_pro(key: impl Into<String>) -> GeminiBackend {
    GeminiBackend::new(key).with_text_model("gemini-2.5-pro")
}
