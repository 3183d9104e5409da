mod command;
mod error;
mod executor;
mod handlers;
mod help;
mod report;

pub use command::Command;
pub use error::CommandError;
pub use executor::CommandExecutor;
pub use report::{
    BatchOutcome, CommandOutput, CommandReport, Listing, ListingEntry, TreeView,
};
