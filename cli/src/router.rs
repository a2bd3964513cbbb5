//! Classifies one input line as a builtin verb or a command for the OS shell.

/// Verbs handled inside the shell instead of by the OS interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Print usage.
    Help,
    /// Explain a command or concept.
    Explain,
    /// Generate a command or snippet.
    Generate,
    /// Summarize a piece of text.
    Summarize,
    /// Describe an image file.
    Vision,
    /// Forget the session history.
    Clear,
    /// Blank input.
    Noop,
}

impl Builtin {
    /// Every builtin, in help order.
    pub const ALL: [Self; 7] = [
        Self::Help,
        Self::Explain,
        Self::Generate,
        Self::Summarize,
        Self::Vision,
        Self::Clear,
        Self::Noop,
    ];

    /// The verb as typed (lowercase). Blank input is `""`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Explain => "explain",
            Self::Generate => "generate",
            Self::Summarize => "summarize",
            Self::Vision => "vision",
            Self::Clear => "clear",
            Self::Noop => "",
        }
    }

    /// Looks up an already lowercased verb.
    #[must_use]
    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == verb)
    }

    /// Whether handling this verb calls the text-generation service.
    #[must_use]
    pub const fn needs_model(self) -> bool {
        matches!(
            self,
            Self::Explain | Self::Generate | Self::Summarize | Self::Vision
        )
    }
}

/// Where an input line goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A builtin verb with its trimmed argument (possibly empty).
    Builtin(Builtin, String),
    /// Anything else, normalized and trimmed, for the OS shell.
    ShellPassthrough(String),
}

/// Routes one line of raw input.
///
/// Runs of `\r`/`\n` collapse to a single space, then the line is split at its first
/// whitespace character. The verb matches case-insensitively and must be a whole token,
/// so `explainer foo` goes to the shell.
#[must_use]
pub fn route(input: &str) -> Decision {
    let normalized = collapse_newlines(input);
    let line = normalized.trim();

    let (verb, argument) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));

    match Builtin::from_verb(&verb.to_lowercase()) {
        Some(builtin) => Decision::Builtin(builtin, argument.trim().to_string()),
        None => Decision::ShellPassthrough(line.to_string()),
    }
}

fn collapse_newlines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_break = false;
    for ch in input.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(builtin: Builtin, argument: &str) -> Decision {
        Decision::Builtin(builtin, argument.to_string())
    }

    #[test]
    fn verb_is_case_insensitive_and_argument_keeps_case() {
        assert_eq!(route("EXPLAIN foo"), builtin(Builtin::Explain, "foo"));
        assert_eq!(
            route("Generate  List Big Files "),
            builtin(Builtin::Generate, "List Big Files")
        );
    }

    #[test]
    fn blank_input_is_noop() {
        assert_eq!(route(""), builtin(Builtin::Noop, ""));
        assert_eq!(route("   "), builtin(Builtin::Noop, ""));
        assert_eq!(route("\r\n"), builtin(Builtin::Noop, ""));
    }

    #[test]
    fn lone_verb_has_empty_argument() {
        assert_eq!(route("help"), builtin(Builtin::Help, ""));
        assert_eq!(route("  clear  "), builtin(Builtin::Clear, ""));
        assert_eq!(route("summarize"), builtin(Builtin::Summarize, ""));
    }

    #[test]
    fn other_input_passes_through_trimmed() {
        assert_eq!(
            route("  ls -la /tmp  "),
            Decision::ShellPassthrough("ls -la /tmp".into())
        );
        assert_eq!(
            route("echo EXPLAIN"),
            Decision::ShellPassthrough("echo EXPLAIN".into())
        );
    }

    #[test]
    fn verbs_match_whole_tokens_only() {
        assert_eq!(
            route("explainer foo"),
            Decision::ShellPassthrough("explainer foo".into())
        );
        assert_eq!(
            route("visionary"),
            Decision::ShellPassthrough("visionary".into())
        );
    }

    #[test]
    fn newlines_collapse_before_splitting() {
        assert_eq!(
            route("explain\r\n\r\nfind . -name x"),
            builtin(Builtin::Explain, "find . -name x")
        );
        assert_eq!(
            route("echo a\n\necho b"),
            Decision::ShellPassthrough("echo a echo b".into())
        );
    }

    #[test]
    fn tab_separates_verb() {
        assert_eq!(route("vision\tcat.png"), builtin(Builtin::Vision, "cat.png"));
    }

    #[test]
    fn only_ai_verbs_need_a_model() {
        let needing: Vec<_> = Builtin::ALL
            .into_iter()
            .filter(|builtin| builtin.needs_model())
            .map(Builtin::name)
            .collect();
        assert_eq!(needing, ["explain", "generate", "summarize", "vision"]);
    }
}
