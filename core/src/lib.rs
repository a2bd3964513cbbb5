//! # gemsh-core
//!
//! `no_std` trait API for the text-generation collaborator used by `gemsh`.
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   gemsh CLI     │───▶│   gemsh-core     │◀───│   Providers     │
//! │                 │    │   (this crate)   │    │                 │
//! │ - explain       │    │ - LanguageModel  │    │ - gemini        │
//! │ - generate      │    │ - LLMResponse    │    │ - test stubs    │
//! │ - summarize     │    │ - Message/Image  │    │                 │
//! │ - vision        │    │                  │    │                 │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`llm`] - requests, messages, parameters and fragment streams.
//! - [`image`] - image payloads for multimodal requests.

#![no_std]
extern crate alloc;

/// Image payloads attached to user messages.
pub mod image;
pub mod llm;

#[doc(inline)]
pub use image::Image;
#[doc(inline)]
pub use llm::LanguageModel;
