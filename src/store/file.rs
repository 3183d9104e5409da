use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::config::StoreSettings;
use crate::filesystem::Tree;
use crate::store::error::{CreateDirectorySnafu, ReadSnafu, StoreError, WriteSnafu};
use crate::store::{TenantId, TreeStateStore, snapshot};

const SNAPSHOT_EXTENSION: &str = "tree";

/// Keeps one compressed snapshot file per tenant inside a single directory.
#[derive(Debug, Clone)]
pub struct FileTreeStore {
    directory: PathBuf,
    compression_level: i32,
}

impl FileTreeStore {
    pub fn new(directory: impl Into<PathBuf>, compression_level: i32) -> Self {
        FileTreeStore {
            directory: directory.into(),
            compression_level,
        }
    }

    pub fn from_settings(root: &Path, settings: &StoreSettings) -> Self {
        Self::new(root.join(&settings.directory), settings.compression_level)
    }

    pub fn snapshot_path(&self, tenant: &TenantId) -> PathBuf {
        self.directory
            .join(format!("{:016x}.{SNAPSHOT_EXTENSION}", tenant.fingerprint()))
    }
}

impl TreeStateStore for FileTreeStore {
    async fn load(&self, tenant: &TenantId) -> Result<Tree, StoreError> {
        let path = self.snapshot_path(tenant);
        debug!("Reading tree of tenant '{tenant}' from {}", path.display());

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No stored tree for tenant '{tenant}', starting fresh");
                return Ok(Tree::new());
            }
            Err(err) => return Err(err).context(ReadSnafu { path: path.clone() }),
        };

        let tree = snapshot::decode(tenant, &bytes)?;
        debug!("Loaded {} nodes for tenant '{tenant}'", tree.len());
        Ok(tree)
    }

    async fn save(&self, tenant: &TenantId, tree: &Tree) -> Result<(), StoreError> {
        fs::create_dir_all(&self.directory)
            .await
            .context(CreateDirectorySnafu {
                path: self.directory.clone(),
            })?;

        let bytes = snapshot::encode(tenant, tree, self.compression_level)?;
        let path = self.snapshot_path(tenant);
        let size = bytes.len();
        fs::write(&path, bytes)
            .await
            .0
            .context(WriteSnafu { path: path.clone() })?;

        debug!("Wrote {size} bytes for tenant '{tenant}' to {}", path.display());
        Ok(())
    }
}
