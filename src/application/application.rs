use snafu::prelude::*;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::commands::{Command, CommandExecutor, CommandOutput, CommandReport};
use crate::config::{Settings, SettingsError};
use crate::presentation::Renderer;
use crate::store::FileTreeStore;

const FALLBACK_COMMAND_NAME: &str = "folderbot";

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let (report, rendered) = Self::execute(&runtime_config).await?;

        if report.is_failure() {
            eprintln!("{rendered}");
        } else {
            println!("{rendered}");
        }
        Ok(())
    }

    /// Runs one command against the tenant's stored tree and renders its report.
    pub async fn execute(
        runtime_config: &RuntimeConfig,
    ) -> Result<(CommandReport, String), ApplicationError> {
        let settings = Settings::read(&runtime_config.root)
            .await
            .context(SettingsSnafu)?;
        debug!("Loaded settings: {settings:?}");

        let report = match Command::parse(
            runtime_config.words.as_slice(),
            runtime_config.attachments.clone(),
        ) {
            Ok(command) => {
                let store = FileTreeStore::from_settings(&runtime_config.root, &settings.store);
                CommandExecutor::new(store)
                    .execute(&runtime_config.tenant, command)
                    .await
            }
            Err(err) => {
                let name = runtime_config
                    .words
                    .first()
                    .map_or(FALLBACK_COMMAND_NAME, String::as_str);
                CommandReport::new(name, CommandOutput::Failed(err))
            }
        };

        let rendered = Renderer::new(&settings.ls).render(&report);
        Ok((report, rendered))
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while reading settings"))]
    SettingsError { source: SettingsError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SETTINGS_FILE_NAME;
    use crate::store::TenantId;
    use tempfile::TempDir;

    fn runtime_config(root: &TempDir, tenant: &str, words: &[&str]) -> RuntimeConfig {
        colored::control::set_override(false);
        RuntimeConfig {
            root: root.path().to_path_buf(),
            tenant: TenantId::from(tenant),
            words: words.iter().map(|word| word.to_string()).collect(),
            attachments: Vec::new(),
        }
    }

    #[compio::test]
    async fn commands_share_state_through_the_store() {
        let root = TempDir::new().unwrap();

        let (created, _) = Application::execute(&runtime_config(&root, "guild", &["mk", "a/b"]))
            .await
            .unwrap();
        assert!(!created.is_failure());

        let (_, rendered) = Application::execute(&runtime_config(&root, "guild", &["tree"]))
            .await
            .unwrap();
        assert_eq!(rendered, "Current directory: /\n/\n  ┗ a\n    ┗ b (empty)");
    }

    #[compio::test]
    async fn tenants_do_not_see_each_other() {
        let root = TempDir::new().unwrap();

        Application::execute(&runtime_config(&root, "first", &["mk", "mine"]))
            .await
            .unwrap();
        let (_, rendered) = Application::execute(&runtime_config(&root, "second", &["ls"]))
            .await
            .unwrap();
        assert_eq!(rendered, "ls: /\n(empty)");
    }

    #[compio::test]
    async fn unknown_commands_are_failed_reports() {
        let root = TempDir::new().unwrap();
        let (report, rendered) = Application::execute(&runtime_config(&root, "guild", &["lsa"]))
            .await
            .unwrap();
        assert!(report.is_failure());
        assert_eq!(rendered, "error: lsa: Command not found: lsa");
    }

    #[compio::test]
    async fn listing_columns_come_from_settings() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(SETTINGS_FILE_NAME), "ls:\n  columns: 1\n").unwrap();

        Application::execute(&runtime_config(&root, "guild", &["mk", "a", "b"]))
            .await
            .unwrap();
        let (_, rendered) = Application::execute(&runtime_config(&root, "guild", &["ls"]))
            .await
            .unwrap();
        assert_eq!(rendered, "ls: /\na/\nb/");
    }

    #[compio::test]
    async fn broken_settings_stop_the_application() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join(SETTINGS_FILE_NAME), "- not\n- a map\n").unwrap();

        let result = Application::execute(&runtime_config(&root, "guild", &["pwd"])).await;
        assert!(matches!(result, Err(ApplicationError::SettingsError { .. })));
    }
}
