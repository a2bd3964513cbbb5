//! ANSI presentation of the banner, prompt and command results.

use crate::error::CommandResult;

/// Prompt shown before each input line.
pub const PROMPT: &str = "\x1b[1;36mgemsh\x1b[0m> ";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Startup banner. `model` is `(name, provider)` when a model is connected.
#[must_use]
pub fn banner(version: &str, model: Option<(&str, &str)>) -> String {
    let status = match model {
        Some((name, provider)) => format!("Model: {name} ({provider})"),
        None => format!("{DIM}AI not configured yet; a key is requested on first use{RESET}"),
    };
    format!(
        "gemsh {version}\n{status}\n{DIM}Type `help` for builtin commands, `exit` to quit.{RESET}\n"
    )
}

/// Colored text for a finished command, or `None` when there is nothing to show.
#[must_use]
pub fn result_text(result: &CommandResult) -> Option<String> {
    if result.output.is_empty() {
        return None;
    }
    Some(if result.succeeded {
        format!("{GREEN}{}{RESET}", result.output)
    } else {
        format!("{RED}Error: {}{RESET}", result.output)
    })
}

/// A fragment of streamed AI output.
#[must_use]
pub fn fragment_text(fragment: &str) -> String {
    format!("{GREEN}{fragment}{RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;

    #[test]
    fn success_is_green_and_failure_red() {
        let ok = result_text(&CommandResult::success("hi")).unwrap();
        assert_eq!(ok, "\x1b[32mhi\x1b[0m");

        let failed =
            result_text(&CommandResult::failure(&ShellError::FileNotFound("x.png".into())))
                .unwrap();
        assert!(failed.starts_with(RED));
        assert!(failed.contains("file not found: x.png"));
    }

    #[test]
    fn empty_output_renders_nothing() {
        assert_eq!(result_text(&CommandResult::noop()), None);
    }

    #[test]
    fn banner_mentions_model_or_missing_key() {
        assert!(banner("0.1.0", Some(("gemini-2.0-flash", "google"))).contains("gemini-2.0-flash"));
        assert!(banner("0.1.0", None).contains("not configured"));
    }
}
