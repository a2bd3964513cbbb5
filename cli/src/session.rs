//! One interactive run: routing, builtin handlers, history and the AI connection.

use std::{
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use futures_lite::{StreamExt, pin};
use gemsh_core::{
    Image, LanguageModel,
    llm::{LLMRequest, Message, Parameters, Profile},
};
use gemsh_gemini::GeminiBackend;
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    credential::{CredentialPrompt, validate_credential},
    error::{CommandResult, ShellError},
    history::History,
    router::{Builtin, Decision, route},
    shell::{ShellRunner, run_shell},
    task::{AiTask, VISION_INSTRUCTION},
};

/// Usage line for `vision`.
pub const VISION_USAGE: &str = "vision <image path>";

/// Text printed by `help`.
pub const HELP_TEXT: &str = "\
Builtin commands:
  explain <command or concept>   Explain a command, error or idea
  generate <description>         Generate a command or code snippet
  summarize <text>               Summarize text into key points
  vision <image path>            Describe an image (jpg, png, gif, webp)
  clear                          Forget this session's history
  help                           Show this message
  exit                           Leave the shell

Anything else is run by your system shell.
Use Up/Down to recall earlier commands.";

/// Builds a language model once an API key is known.
pub trait Connector: Send + Sync {
    /// The model type produced.
    type Model: LanguageModel;

    /// Connects with `api_key` to the model called `model`.
    fn connect(&self, api_key: &str, model: &str) -> Self::Model;
}

/// Connects to the Gemini Developer API.
#[derive(Debug, Clone, Default)]
pub struct GeminiConnector {
    base_url: Option<String>,
}

impl GeminiConnector {
    /// Uses the public API endpoint.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_url: None }
    }

    /// Sends requests to `base_url` instead.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Connector for GeminiConnector {
    type Model = GeminiBackend;

    fn connect(&self, api_key: &str, model: &str) -> GeminiBackend {
        let backend = GeminiBackend::new(api_key).with_text_model(model);
        match &self.base_url {
            Some(url) => backend.with_base_url(url.clone()),
            None => backend,
        }
    }
}

/// The AI-related part of [`Settings`].
#[derive(Clone, PartialEq)]
pub struct AiSettings {
    /// Key to connect with, if known.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl fmt::Debug for AiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl From<&Settings> for AiSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }
}

/// Whether the session can talk to the model yet.
#[derive(Debug)]
pub enum AiState<M> {
    /// No usable key so far.
    Unconfigured,
    /// Connected.
    Configured {
        /// The connected model.
        model: M,
    },
}

/// A single-threaded shell session.
///
/// Owns the command history and the AI connection. Every input line goes through
/// [`Session::execute`] or [`Session::execute_streaming`], which never fail: problems come
/// back as failed [`CommandResult`]s and the session stays usable.
pub struct Session<C: Connector, R, P> {
    connector: C,
    runner: R,
    prompt: P,
    settings: AiSettings,
    state: AiState<C::Model>,
    history: History,
}

impl<C: Connector, R, P> fmt::Debug for Session<C, R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("settings", &self.settings)
            .field("configured", &matches!(self.state, AiState::Configured { .. }))
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl<C, R, P> Session<C, R, P>
where
    C: Connector,
    R: ShellRunner,
    P: CredentialPrompt,
{
    /// Creates a session, connecting right away if `settings` carries a valid key.
    pub fn new(connector: C, runner: R, prompt: P, settings: AiSettings) -> Self {
        let mut session = Self {
            connector,
            runner,
            prompt,
            settings,
            state: AiState::Unconfigured,
            history: History::new(),
        };

        if let Some(key) = session.settings.api_key.clone() {
            match validate_credential(&key) {
                Ok(key) => session.configure(key),
                Err(error) => warn!("ignoring configured API key: {error}"),
            }
        }
        session
    }

    fn configure(&mut self, api_key: String) {
        let model = self.connector.connect(&api_key, &self.settings.model);
        info!(model = %self.settings.model, "AI features configured");
        self.settings.api_key = Some(api_key);
        self.state = AiState::Configured { model };
    }

    fn ensure_model(&mut self) -> Result<&C::Model, ShellError> {
        if matches!(self.state, AiState::Unconfigured) {
            let supplied = self.prompt.request_credential().ok_or_else(|| {
                ShellError::MissingCredential(
                    "no API key configured; set GEMINI_API_KEY or pass --api-key".into(),
                )
            })?;
            let key = validate_credential(&supplied)?;
            self.configure(key);
        }

        match &self.state {
            AiState::Configured { model } => Ok(model),
            AiState::Unconfigured => Err(ShellError::MissingCredential(
                "model is not configured".into(),
            )),
        }
    }

    const fn parameters(&self) -> Parameters {
        Parameters {
            temperature: Some(self.settings.temperature),
            top_p: None,
            top_k: None,
            max_tokens: None,
        }
    }

    /// Runs one input line, waiting for AI answers as a whole.
    pub async fn execute(&mut self, line: &str) -> CommandResult {
        self.handle(line, None).await
    }

    /// Runs one input line, handing AI text to `on_fragment` as it arrives.
    ///
    /// `explain`, `generate` and `summarize` stream; everything else behaves like
    /// [`Session::execute`]. The returned output is the concatenation of all fragments.
    pub async fn execute_streaming(
        &mut self,
        line: &str,
        mut on_fragment: impl FnMut(&str),
    ) -> CommandResult {
        self.handle(line, Some(&mut on_fragment as &mut dyn FnMut(&str)))
            .await
    }

    async fn handle(
        &mut self,
        line: &str,
        on_fragment: Option<&mut dyn FnMut(&str)>,
    ) -> CommandResult {
        let result = match route(line) {
            Decision::ShellPassthrough(command) => run_shell(&self.runner, &command).await,
            Decision::Builtin(builtin, argument) => {
                debug!(verb = builtin.name(), "dispatching builtin");
                self.builtin(builtin, &argument, on_fragment).await
            }
        };

        self.history.append(line.trim(), result.output.as_str());
        result
    }

    async fn builtin(
        &mut self,
        builtin: Builtin,
        argument: &str,
        on_fragment: Option<&mut dyn FnMut(&str)>,
    ) -> CommandResult {
        match builtin {
            Builtin::Noop => CommandResult::noop(),
            Builtin::Help => CommandResult::success(HELP_TEXT),
            Builtin::Clear => {
                self.history.reset();
                info!("history cleared");
                CommandResult::success("History cleared.")
            }
            Builtin::Explain => self.ask(AiTask::Explain, argument, on_fragment).await,
            Builtin::Generate => self.ask(AiTask::Generate, argument, on_fragment).await,
            Builtin::Summarize => self.ask(AiTask::Summarize, argument, on_fragment).await,
            Builtin::Vision => self.vision(argument).await,
        }
    }

    async fn ask(
        &mut self,
        task: AiTask,
        argument: &str,
        on_fragment: Option<&mut dyn FnMut(&str)>,
    ) -> CommandResult {
        if argument.is_empty() {
            return ShellError::MissingArgument {
                verb: task.verb(),
                usage: task.usage(),
            }
            .into();
        }

        let request = LLMRequest::new(vec![Message::user(task.prompt(argument))])
            .with_parameters(self.parameters());
        let model = match self.ensure_model() {
            Ok(model) => model,
            Err(error) => return error.into(),
        };

        debug!(task = task.verb(), streaming = on_fragment.is_some(), "sending AI request");
        let answer = match on_fragment {
            Some(on_fragment) => forward_fragments(model.respond(request), on_fragment).await,
            None => model.complete(request).await,
        };
        answer.map_or_else(
            |error| ShellError::remote(&error).into(),
            CommandResult::success,
        )
    }

    async fn vision(&mut self, argument: &str) -> CommandResult {
        if argument.is_empty() {
            return ShellError::MissingArgument {
                verb: Builtin::Vision.name(),
                usage: VISION_USAGE,
            }
            .into();
        }

        let path = expand_home(strip_quotes(argument));
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return ShellError::FileNotFound(path.display().to_string()).into();
            }
            Err(error) => return ShellError::Io(error).into(),
        };

        let image = Image::from_extension(path.extension().and_then(OsStr::to_str), data);
        debug!(mime = image.mime_type(), bytes = image.data().len(), "loaded image");
        let request = LLMRequest::new(vec![Message::user(VISION_INSTRUCTION).with_image(image)])
            .with_parameters(self.parameters());

        let model = match self.ensure_model() {
            Ok(model) => model,
            Err(error) => return error.into(),
        };
        match model.complete(request).await {
            Ok(text) => CommandResult::success(text),
            Err(error) => ShellError::remote(&error).into(),
        }
    }

    /// Commands run so far.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Mutable access for recall navigation.
    pub const fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Whether a model is connected.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self.state, AiState::Configured { .. })
    }

    /// Current AI settings.
    #[must_use]
    pub const fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Profile of the connected model, if any.
    pub async fn profile(&self) -> Option<Profile> {
        match &self.state {
            AiState::Configured { model } => Some(model.profile().await),
            AiState::Unconfigured => None,
        }
    }
}

async fn forward_fragments<S, E>(
    stream: S,
    on_fragment: &mut dyn FnMut(&str),
) -> Result<String, E>
where
    S: futures_lite::Stream<Item = Result<String, E>>,
{
    pin!(stream);
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        on_fragment(&fragment);
        text.push_str(&fragment);
    }
    Ok(text)
}

fn strip_quotes(argument: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = argument
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    argument
}

fn expand_home(path: &str) -> PathBuf {
    if let Ok(stripped) = Path::new(path).strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
