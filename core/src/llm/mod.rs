//! # Language models
//!
//! Provider-agnostic request and response types for text generation.
//!
//! - **[`LanguageModel`]** - the trait every provider implements
//! - **[`LLMRequest`]** - messages plus sampling [`Parameters`]
//! - **[`LLMResponse`]** - a stream of text fragments that can also be awaited as a whole
//! - **[`Message`]** - individual conversation turns, optionally carrying images
//!
//! ## Streaming vs. blocking
//!
//! ```rust,ignore
//! use gemsh_core::llm::{LanguageModel, oneshot};
//! use futures_lite::StreamExt;
//!
//! async fn demo(model: impl LanguageModel) -> Result<(), Box<dyn core::error::Error>> {
//!     // Fragments as they arrive.
//!     let mut stream = model.respond(oneshot("Be brief.", "What is a pipe?"));
//!     while let Some(fragment) = stream.next().await {
//!         print!("{}", fragment?);
//!     }
//!
//!     // The whole answer at once.
//!     let answer = model.complete(oneshot("Be brief.", "What is a pipe?")).await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

/// Message types and conversation handling.
pub mod message;
/// Sampling parameters and model metadata.
pub mod model;
mod response;

use alloc::{boxed::Box, string::String, sync::Arc, vec, vec::Vec};
use core::future::{Future, IntoFuture};

use futures_core::Stream;
pub use message::{Message, Role};
pub use model::{Parameters, Profile};
pub use response::{TextFuture, TextStream};

/// Response stream from a language model.
///
/// Yields text fragments in the order the provider emits them. The stream is finite and can
/// only be consumed once. Awaiting the response (through [`IntoFuture`]) drains it and returns
/// the concatenation of every fragment.
pub trait LLMResponse:
    Stream<Item = Result<String, Self::Error>>
    + IntoFuture<Output = Result<String, Self::Error>, IntoFuture: Send>
    + Send
{
    /// The error type returned by this response stream.
    type Error: core::error::Error + Send + Sync + 'static;
}

/// Builder-style request passed into [`LanguageModel::respond`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMRequest {
    messages: Vec<Message>,
    parameters: Parameters,
}

impl LLMRequest {
    /// Creates a request from the provided messages using default parameters.
    pub fn new(messages: impl Into<Vec<Message>>) -> Self {
        Self {
            messages: messages.into(),
            parameters: Parameters::default(),
        }
    }

    /// Overrides the sampling parameters used for this call.
    #[must_use]
    pub const fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the current conversation messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the current parameter snapshot.
    #[must_use]
    pub const fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Whether any message carries an image.
    #[must_use]
    pub fn has_images(&self) -> bool {
        self.messages.iter().any(|message| !message.images().is_empty())
    }

    /// Breaks the request into owned components.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Message>, Parameters) {
        (self.messages, self.parameters)
    }
}

/// Language models for text generation.
///
/// See the [module documentation](crate::llm) for usage.
pub trait LanguageModel: Sized + Send + Sync {
    /// The error type returned by this language model.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Generates a streaming response.
    fn respond(&self, request: LLMRequest) -> impl LLMResponse<Error = Self::Error>;

    /// Generates the full response in one call.
    ///
    /// # Note for Implementors
    /// The default drains [`LanguageModel::respond`]. Providers with a dedicated non-streaming
    /// endpoint should override this.
    fn complete(
        &self,
        request: LLMRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        self.respond(request).into_future()
    }

    /// Returns model metadata.
    fn profile(&self) -> impl Future<Output = Profile> + Send;
}

macro_rules! impl_language_model {
    ($($name:ident),*) => {
        $(
            impl<T: LanguageModel> LanguageModel for $name<T> {
                type Error = T::Error;

                fn respond(&self, request: LLMRequest) -> impl LLMResponse<Error = Self::Error> {
                    T::respond(self, request)
                }

                fn complete(
                    &self,
                    request: LLMRequest,
                ) -> impl Future<Output = Result<String, Self::Error>> + Send {
                    T::complete(self, request)
                }

                fn profile(&self) -> impl Future<Output = Profile> + Send {
                    T::profile(self)
                }
            }
        )*
    };
}

impl<T: LanguageModel> LanguageModel for &T {
    type Error = T::Error;

    fn respond(&self, request: LLMRequest) -> impl LLMResponse<Error = Self::Error> {
        T::respond(self, request)
    }

    fn complete(
        &self,
        request: LLMRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send {
        T::complete(self, request)
    }

    fn profile(&self) -> impl Future<Output = Profile> + Send {
        T::profile(self)
    }
}

impl_language_model!(Arc, Box);

/// Convenience helper that creates a single system + user [`LLMRequest`].
pub fn oneshot(system: impl Into<String>, user: impl Into<String>) -> LLMRequest {
    LLMRequest::new(vec![Message::system(system), Message::user(user)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    #[test]
    fn oneshot_builds_system_then_user() {
        let request = oneshot("be brief", "hello");
        let roles: Vec<_> = request.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert!(!request.has_images());
    }

    #[test]
    fn detects_images() {
        let request = LLMRequest::new(vec![
            Message::user("what is this").with_image(Image::new("image/png", vec![0u8])),
        ]);
        assert!(request.has_images());
    }

    #[test]
    fn parameters_travel_with_request() {
        let request =
            oneshot("s", "u").with_parameters(Parameters::default().temperature(0.7));
        assert_eq!(request.parameters().temperature, Some(0.7));
        let (messages, parameters) = request.into_parts();
        assert_eq!(messages.len(), 2);
        assert_eq!(parameters.top_p, None);
    }
}
