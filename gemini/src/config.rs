use std::{fmt, sync::Arc};

/// Gemini REST base URL used by the Developer API.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const USER_AGENT: &str = "gemsh-gemini/0.1";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Authentication strategy supported by the Gemini backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach `?key=API_KEY` to every request (default).
    Query,
    /// Send the API key via `x-goog-api-key` header.
    Header,
}

/// Native Gemini backend wired up to the `gemsh-core` traits.
#[derive(Clone, Debug)]
pub struct GeminiBackend {
    inner: Arc<GeminiConfig>,
}

impl GeminiBackend {
    /// Create a backend using the default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(GeminiConfig {
                api_key: api_key.into(),
                base_url: GEMINI_API_BASE_URL.to_string(),
                auth: AuthMode::Query,
                text_model: sanitize_model(DEFAULT_MODEL),
                vision_model: None,
                http: reqwest::Client::new(),
            }),
        }
    }

    /// Override the REST base URL (useful for sandboxes or proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).base_url = base_url.into();
        self
    }

    /// Select header-based authentication.
    #[must_use]
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        Arc::make_mut(&mut self.inner).auth = mode;
        self
    }

    /// Override the default chat model.
    #[must_use]
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).text_model = sanitize_model(model);
        self
    }

    /// Use a dedicated model for requests that carry images.
    ///
    /// Without one, image requests go to the text model.
    #[must_use]
    pub fn with_vision_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.inner).vision_model = Some(sanitize_model(model));
        self
    }

    /// The configured text model, without the `models/` prefix.
    #[must_use]
    pub fn text_model(&self) -> &str {
        self.inner.text_model.trim_start_matches("models/")
    }

    pub(crate) fn config(&self) -> Arc<GeminiConfig> {
        self.inner.clone()
    }
}

#[derive(Clone)]
pub struct GeminiConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) auth: AuthMode,
    pub(crate) text_model: String,
    pub(crate) vision_model: Option<String>,
    pub(crate) http: reqwest::Client,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    pub(crate) fn endpoint(&self, suffix: &str) -> String {
        let mut url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            suffix.trim_start_matches('/')
        );
        if self.auth == AuthMode::Query {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("key=");
            url.push_str(&self.api_key);
        }
        url
    }

    pub(crate) fn model_endpoint(&self, model: &str, action: &str) -> String {
        let model = sanitize_model(model);
        self.endpoint(&format!("{model}:{action}"))
    }

    /// Picks the model for a request, routing image requests to the vision model.
    pub(crate) fn model_for(&self, has_images: bool) -> &str {
        if has_images {
            self.vision_model.as_deref().unwrap_or(&self.text_model)
        } else {
            &self.text_model
        }
    }
}

pub fn sanitize_model(model: impl Into<String>) -> String {
    let model = model.into();
    if model.starts_with("models/") {
        model
    } else {
        format!("models/{model}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_auth_appends_key() {
        let backend = GeminiBackend::new("secret").with_base_url("http://localhost:9/v1beta/");
        let cfg = backend.config();
        assert_eq!(
            cfg.model_endpoint("gemini-2.0-flash", "generateContent"),
            "http://localhost:9/v1beta/models/gemini-2.0-flash:generateContent?key=secret"
        );
        assert_eq!(
            cfg.model_endpoint("models/x", "streamGenerateContent?alt=sse"),
            "http://localhost:9/v1beta/models/x:streamGenerateContent?alt=sse&key=secret"
        );
    }

    #[test]
    fn header_auth_keeps_url_clean() {
        let backend = GeminiBackend::new("secret").with_auth_mode(AuthMode::Header);
        let url = backend.config().endpoint("models");
        assert!(!url.contains("secret"));
    }

    #[test]
    fn image_requests_use_vision_model_when_configured() {
        let plain = GeminiBackend::new("k").with_text_model("gemini-2.5-flash");
        assert_eq!(plain.config().model_for(true), "models/gemini-2.5-flash");

        let split = plain.with_vision_model("gemini-2.5-pro");
        let cfg = split.config();
        assert_eq!(cfg.model_for(true), "models/gemini-2.5-pro");
        assert_eq!(cfg.model_for(false), "models/gemini-2.5-flash");
    }

    #[test]
    fn text_model_is_reported_without_prefix() {
        assert_eq!(GeminiBackend::new("k").text_model(), DEFAULT_MODEL);
    }
}
