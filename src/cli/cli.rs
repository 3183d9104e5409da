use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Keeps a virtual folder tree per tenant and files attachment links inside it.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The command followed by its arguments, e.g. `mk docs/specs`
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The directory holding `folderbot.yaml`, store paths are relative to it
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Whose tree the command runs against
    #[clap(long, short, default_value = "local")]
    pub tenant: String,

    /// An attachment link to file with `up`, may be repeated
    #[clap(long = "attach", short, value_name = "LINK")]
    pub attachments: Vec<String>,
}
