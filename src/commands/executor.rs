use snafu::{OptionExt, ResultExt, ensure};
use tracing::{debug, error, info};

use crate::commands::command::Command;
use crate::commands::error::{
    CommandError, CommandNotFoundSnafu, NoAttachmentsSnafu, NoPathsProvidedSnafu, StoreSnafu,
};
use crate::commands::handlers;
use crate::commands::help;
use crate::commands::report::{CommandOutput, CommandReport};
use crate::filesystem::Tree;
use crate::store::{TenantId, TreeStateStore};

/// Runs commands against a tenant's stored tree: load, run, save.
pub struct CommandExecutor<S> {
    store: S,
}

impl<S: TreeStateStore> CommandExecutor<S> {
    pub fn new(store: S) -> Self {
        CommandExecutor { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn execute(&self, tenant: &TenantId, command: Command) -> CommandReport {
        let name = command.name();
        info!("Executing '{name}' for tenant '{tenant}'");

        let output = match self.run(tenant, command).await {
            Ok(output) => output,
            Err(err) => {
                debug!("'{name}' failed for tenant '{tenant}': {err}");
                CommandOutput::Failed(err)
            }
        };
        CommandReport::new(name, output)
    }

    async fn run(&self, tenant: &TenantId, command: Command) -> Result<CommandOutput, CommandError> {
        match &command {
            Command::Help { topic } => return Self::help(topic.as_deref()),
            Command::Mk { paths } | Command::Rm { paths } => ensure!(
                !paths.is_empty(),
                NoPathsProvidedSnafu {
                    command: command.name(),
                }
            ),
            Command::Up { attachments, .. } => ensure!(!attachments.is_empty(), NoAttachmentsSnafu),
            _ => {}
        }

        let mut tree = self.store.load(tenant).await.context(StoreSnafu)?;
        let mutating = command.is_mutating();
        let output = Self::apply(&mut tree, command);

        if mutating {
            self.persist(tenant, &tree).await;
        }
        output
    }

    fn apply(tree: &mut Tree, command: Command) -> Result<CommandOutput, CommandError> {
        let output = match command {
            Command::Help { topic } => return Self::help(topic.as_deref()),
            Command::Tree => CommandOutput::Tree(handlers::tree_view(tree)),
            Command::Pwd => CommandOutput::WorkingDirectory(handlers::working_directory(tree)),
            Command::Ls { path } => CommandOutput::Listing(handlers::list(tree, path.as_deref())?),
            Command::Cd { path } => {
                CommandOutput::WorkingDirectory(handlers::change_directory(tree, path.as_deref())?)
            }
            Command::Mk { paths } => CommandOutput::Created(handlers::make_directories(tree, &paths)),
            Command::Rm { paths } => CommandOutput::Removed(handlers::remove(tree, &paths)),
            Command::Up { path, attachments } => {
                let (directory, outcome) =
                    handlers::upload(tree, path.as_deref(), &attachments)?;
                CommandOutput::Uploaded { directory, outcome }
            }
        };
        Ok(output)
    }

    fn help(topic: Option<&str>) -> Result<CommandOutput, CommandError> {
        let topic = topic.unwrap_or(help::OVERVIEW_TOPIC);
        let text = if topic == help::OVERVIEW_TOPIC {
            help::overview()
        } else {
            help::topic(topic)
                .context(CommandNotFoundSnafu { command: topic })?
                .to_string()
        };
        Ok(CommandOutput::Help {
            topic: topic.to_string(),
            text,
        })
    }

    /// Saving is best effort: the command already happened in memory and its
    /// report stands either way.
    async fn persist(&self, tenant: &TenantId, tree: &Tree) {
        match self.store.save(tenant, tree).await {
            Ok(()) => debug!("Saved tree of tenant '{tenant}'"),
            Err(err) => error!(
                "Failed to save tree of tenant '{tenant}': {}",
                snafu::Report::from_error(err)
            ),
        }
    }
}
