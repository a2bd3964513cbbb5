//! `gemsh` binary.
//!
//! ```bash
//! gemsh                      # same as `gemsh start`
//! gemsh --model gemini-2.5-flash start
//! gemsh exec summarize "$(cat notes.txt)"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use gemsh::{
    AiSettings, GeminiConnector, Session, SystemShell,
    config::{Action, Args, Settings},
    credential::{ConsolePrompt, CredentialPrompt, NoPrompt},
    repl,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(&args).context("failed to load configuration")?;
    let action = args.command.unwrap_or(Action::Start);

    let succeeded = if settings.prompt_for_key {
        dispatch(action, &settings, ConsolePrompt).await?
    } else {
        dispatch(action, &settings, NoPrompt).await?
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch<P: CredentialPrompt>(
    action: Action,
    settings: &Settings,
    prompt: P,
) -> Result<bool> {
    let connector = match &settings.base_url {
        Some(url) => GeminiConnector::new().with_base_url(url.clone()),
        None => GeminiConnector::new(),
    };
    let session = Session::new(connector, SystemShell::new(), prompt, AiSettings::from(settings));

    match action {
        Action::Start => {
            repl::run(session, settings.stream)
                .await
                .context("terminal error")?;
            Ok(true)
        }
        Action::Exec { command } => {
            Ok(repl::exec(session, &command.join(" "), settings.stream).await)
        }
    }
}
