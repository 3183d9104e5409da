use snafu::Snafu;

use crate::filesystem::TreeError;
use crate::store::StoreError;

/// Failures that end a whole command rather than a single path of it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("No paths provided for {command}"))]
    NoPathsProvidedError { command: String },
    #[snafu(display("Message did not contain any attachments"))]
    NoAttachmentsError,
    #[snafu(display("Command not found: {command}"))]
    CommandNotFoundError { command: String },
    #[snafu(transparent)]
    TreeError { source: TreeError },
    #[snafu(display("Failed to load the stored tree"))]
    StoreError { source: StoreError },
}
