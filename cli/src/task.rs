//! Instructions sent to the model for each AI verb.

/// Fixed instruction for `vision`.
pub const VISION_INSTRUCTION: &str = "Analyze this image. Describe what it shows, and if it \
contains a terminal, code or an error message, explain what it means and how to fix any problem.";

/// The text-only AI verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTask {
    /// Explain a command or concept.
    Explain,
    /// Produce a command or code.
    Generate,
    /// Condense text to its key points.
    Summarize,
}

impl AiTask {
    /// The verb that triggers this task.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Generate => "generate",
            Self::Summarize => "summarize",
        }
    }

    /// System instruction prefixed to the user's argument.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Explain => {
                "You are a command-line expert. Explain the following concisely and technically. \
                 Prefer short paragraphs and concrete examples."
            }
            Self::Generate => {
                "You are a command-line expert. Generate only the command or code requested, \
                 with minimal explanation. Do not wrap the answer in prose."
            }
            Self::Summarize => {
                "Summarize the following text. Reply with its key points only, as a short list."
            }
        }
    }

    /// Usage line shown when the argument is missing.
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Explain => "explain <command or concept>",
            Self::Generate => "generate <description>",
            Self::Summarize => "summarize <text>",
        }
    }

    /// The full prompt: instruction, blank line, argument.
    #[must_use]
    pub fn prompt(self, argument: &str) -> String {
        format!("{}\n\n{argument}", self.instruction())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_argument() {
        let prompt = AiTask::Explain.prompt("tar -xzf a.tgz");
        assert!(prompt.starts_with(AiTask::Explain.instruction()));
        assert!(prompt.ends_with("\n\ntar -xzf a.tgz"));
    }

    #[test]
    fn instructions_differ_per_task() {
        assert!(AiTask::Explain.instruction().contains("concisely"));
        assert!(AiTask::Generate.instruction().contains("only the command"));
        assert!(AiTask::Summarize.instruction().contains("key points"));
    }

    #[test]
    fn usage_names_the_verb() {
        for task in [AiTask::Explain, AiTask::Generate, AiTask::Summarize] {
            assert!(task.usage().starts_with(task.verb()));
        }
    }
}
