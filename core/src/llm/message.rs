//! Message types for AI language model conversations.
//!
//! Messages are represented as an enum with a variant per role. User messages may carry
//! inline images, which providers with vision support forward alongside the text.

use alloc::{string::String, vec::Vec};

use crate::image::Image;

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// User message - input from human user.
    User,
    /// AI assistant message - responses from the AI.
    Assistant,
    /// System message - context/instructions for the AI.
    System,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// User message with content and optional inline images.
    User {
        /// Text content of the message.
        content: String,
        /// Images attached to the message.
        images: Vec<Image>,
    },
    /// Assistant message.
    Assistant {
        /// Text content of the message.
        content: String,
    },
    /// System message with instructions/context.
    System {
        /// Text content of the message.
        content: String,
    },
}

impl Message {
    /// Returns the message sender role.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::System { .. } => Role::System,
        }
    }

    /// Returns the text content of the message.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. }
            | Self::Assistant { content }
            | Self::System { content } => content,
        }
    }

    /// Returns the images attached to the message (only for User messages).
    #[must_use]
    pub fn images(&self) -> &[Image] {
        match self {
            Self::User { images, .. } => images,
            _ => &[],
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Creates a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Attaches an image to the message (only works for User messages).
    #[must_use]
    pub fn with_image(mut self, image: Image) -> Self {
        if let Self::User { images, .. } = &mut self {
            images.push(image);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn message_creation() {
        let user = Message::user("Hello");
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.content(), "Hello");
        assert!(user.images().is_empty());

        let assistant = Message::assistant("Hi there!");
        assert_eq!(assistant.role(), Role::Assistant);
        assert_eq!(assistant.content(), "Hi there!");

        let system = Message::system("Be helpful");
        assert_eq!(system.role(), Role::System);
        assert_eq!(system.content(), "Be helpful");
    }

    #[test]
    fn image_only_attaches_to_user_messages() {
        let image = Image::new("image/png", vec![1, 2, 3]);

        let user = Message::user("look").with_image(image.clone());
        assert_eq!(user.images(), &[image.clone()]);

        let system = Message::system("look").with_image(image);
        assert!(system.images().is_empty());
    }
}
