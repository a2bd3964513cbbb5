//! Command-line arguments, the optional config file and their merged result.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use gemsh_gemini::DEFAULT_MODEL;
use serde::Deserialize;
use tracing::debug;

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A shell that passes commands to your OS and questions to Gemini.
#[derive(Parser, Debug, Clone)]
#[command(name = "gemsh", version, about)]
pub struct Args {
    /// Gemini API key. Overrides the config file and `GEMINI_API_KEY`.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Model to call.
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 2.0).
    #[arg(short, long, global = true)]
    pub temperature: Option<f32>,

    /// Path to a JSON config file. Defaults to `<config dir>/gemsh/config.json`.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Custom API base URL (proxies, test servers).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Wait for whole answers instead of streaming them.
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Never ask for an API key interactively.
    #[arg(long, global = true)]
    pub no_prompt: bool,

    #[command(subcommand)]
    pub command: Option<Action>,
}

/// What to do once configured.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start the interactive shell (default).
    Start,
    /// Run one command and exit with 0 on success, 1 on failure.
    Exec {
        /// The command line, e.g. `exec explain ls -la`.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

/// Contents of the JSON config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    /// API key.
    pub api_key: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// API base URL.
    pub base_url: Option<String>,
}

/// Problems found while assembling [`Settings`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The config file is not valid JSON for [`ConfigFile`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Temperature outside `0.0..=2.0`.
    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    Temperature(f32),
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// API key, if any source supplied one.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Override for the API base URL.
    pub base_url: Option<String>,
    /// Stream AI answers as they arrive.
    pub stream: bool,
    /// Ask for a key interactively when missing.
    pub prompt_for_key: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: None,
            stream: true,
            prompt_for_key: true,
        }
    }
}

impl Settings {
    /// Merges flags, config file and environment.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named config file is missing, any config file is malformed,
    /// or the temperature is out of range.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => ConfigFile::default(),
            },
        };
        let env_key = std::env::var(API_KEY_ENV).ok();
        Self::resolve(args, file, env_key)
    }

    /// Applies precedence: flag, then config file, then environment, then defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Temperature`] for an out-of-range temperature.
    pub fn resolve(
        args: &Args,
        file: ConfigFile,
        env_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let temperature = args
            .temperature
            .or(file.temperature)
            .unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Temperature(temperature));
        }

        let api_key = args
            .api_key
            .clone()
            .or(file.api_key)
            .or(env_key)
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            api_key,
            model: args.model.clone().or(file.model).unwrap_or(defaults.model),
            temperature,
            base_url: args.base_url.clone().or(file.base_url),
            stream: !args.no_stream,
            prompt_for_key: !args.no_prompt,
        })
    }
}

/// `<config dir>/gemsh/config.json`, when the platform has a config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gemsh").join("config.json"))
}

fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    debug!(path = %path.display(), "loading config file");
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
