use alloc::string::String;

/// Sampling parameters forwarded to the provider.
///
/// Every field is optional; providers omit unset values so their own defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Parameters {
    /// Sampling randomness, usually `0.0..=2.0`.
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold.
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff.
    pub top_k: Option<u32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
}

impl Parameters {
    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling threshold.
    #[must_use]
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the top-k cutoff.
    #[must_use]
    pub const fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Sets the maximum number of generated tokens.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Descriptive metadata about a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Model name as shown to users.
    pub name: String,
    /// Organisation serving the model.
    pub author: String,
    /// Short description.
    pub description: String,
}

impl Profile {
    /// Creates a new profile.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            description: description.into(),
        }
    }
}
