use crate::commands::error::CommandError;
use crate::filesystem::{LineDescriptor, TreeError};

/// What a command produced, ready to be rendered.
#[derive(Debug)]
pub struct CommandReport {
    pub command: String,
    pub output: CommandOutput,
}

impl CommandReport {
    pub fn new(command: impl Into<String>, output: CommandOutput) -> Self {
        CommandReport {
            command: command.into(),
            output,
        }
    }

    /// True when nothing the command was asked to do happened.
    pub fn is_failure(&self) -> bool {
        match &self.output {
            CommandOutput::Failed(_) => true,
            CommandOutput::Created(outcome)
            | CommandOutput::Removed(outcome)
            | CommandOutput::Uploaded { outcome, .. } => outcome.is_total_failure(),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub enum CommandOutput {
    Help { topic: String, text: String },
    Tree(TreeView),
    WorkingDirectory(String),
    Listing(Listing),
    Created(BatchOutcome),
    Removed(BatchOutcome),
    Uploaded {
        directory: String,
        outcome: BatchOutcome,
    },
    Failed(CommandError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeView {
    pub pwd: String,
    pub lines: Vec<LineDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: String,
    pub entries: Vec<ListingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub link: Option<String>,
}

impl ListingEntry {
    pub fn is_directory(&self) -> bool {
        self.link.is_none()
    }
}

/// Per-target results of a command that works through several paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub successes: Vec<String>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub target: String,
    pub error: TreeError,
}

impl BatchOutcome {
    pub fn succeeded(&mut self, target: impl Into<String>) {
        self.successes.push(target.into());
    }

    pub fn failed(&mut self, target: impl Into<String>, error: TreeError) {
        self.failures.push(BatchFailure {
            target: target.into(),
            error,
        });
    }

    pub fn is_total_failure(&self) -> bool {
        self.successes.is_empty() && !self.failures.is_empty()
    }
}
