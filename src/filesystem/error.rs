use snafu::Snafu;

/// Recoverable failures of a single path operation.
///
/// None of these abort a batch command: the caller records the failure next to
/// the path that caused it and carries on with the remaining paths.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("No such file or folder: {path}"))]
    NodeNotFoundError { path: String },
    #[snafu(display("Already exists: {path}"))]
    NodeExistsError { path: String },
    #[snafu(display("Cannot create node {name} under {parent}: is file"))]
    CreateUnderFileError { name: String, parent: String },
    #[snafu(display("Cannot remove root directory"))]
    CannotRemoveRootError,
    #[snafu(display("Cannot cd to previous directory from root"))]
    CdPastRootError,
    #[snafu(display("Cannot cd to {path}: is not a directory"))]
    CdToNonDirectoryError { path: String },
    #[snafu(display("Cannot ls {path}: is not a directory"))]
    ListNonDirectoryError { path: String },
    #[snafu(display("Bad filepath {path}: {reason}"))]
    InvalidPathError { path: String, reason: String },
}
