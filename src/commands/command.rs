use crate::commands::error::{CommandError, CommandNotFoundSnafu};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help { topic: Option<String> },
    Tree,
    Pwd,
    Ls { path: Option<String> },
    Cd { path: Option<String> },
    Mk { paths: Vec<String> },
    Rm { paths: Vec<String> },
    Up {
        path: Option<String>,
        attachments: Vec<String>,
    },
}

impl Command {
    /// Builds a command from its words, the first one naming it.
    ///
    /// No words at all asks for help. Attachments are only kept for `up`.
    pub fn parse<S: AsRef<str>>(
        words: &[S],
        attachments: Vec<String>,
    ) -> Result<Self, CommandError> {
        let Some((name, arguments)) = words.split_first() else {
            return Ok(Command::Help { topic: None });
        };
        let first = arguments.first().map(|argument| argument.as_ref().to_string());
        let all = || -> Vec<String> {
            arguments
                .iter()
                .map(|argument| argument.as_ref().to_string())
                .collect()
        };

        let command = match name.as_ref() {
            "help" => Command::Help { topic: first },
            "tree" => Command::Tree,
            "pwd" => Command::Pwd,
            "ls" => Command::Ls { path: first },
            "cd" => Command::Cd { path: first },
            "mk" => Command::Mk { paths: all() },
            "rm" => Command::Rm { paths: all() },
            "up" => Command::Up {
                path: first,
                attachments,
            },
            other => return CommandNotFoundSnafu { command: other }.fail(),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help { .. } => "help",
            Command::Tree => "tree",
            Command::Pwd => "pwd",
            Command::Ls { .. } => "ls",
            Command::Cd { .. } => "cd",
            Command::Mk { .. } => "mk",
            Command::Rm { .. } => "rm",
            Command::Up { .. } => "up",
        }
    }

    /// Whether the tree has to be saved once the command ran.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Cd { .. } | Command::Mk { .. } | Command::Rm { .. } | Command::Up { .. }
        )
    }
}
