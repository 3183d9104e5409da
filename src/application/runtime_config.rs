use std::path::PathBuf;

use crate::cli::Cli;
use crate::store::TenantId;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub tenant: TenantId,
    /// The command name followed by its arguments.
    pub words: Vec<String>,
    pub attachments: Vec<String>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            tenant: TenantId::from(cli.tenant),
            words: cli.command,
            attachments: cli.attachments,
        }
    }
}
