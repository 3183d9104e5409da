use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::filesystem::Tree;
use crate::store::error::StoreError;
use crate::store::{TenantId, TreeStateStore};

/// Keeps trees in memory. Saves can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    trees: RefCell<HashMap<TenantId, Tree>>,
    failing_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryTreeStore {
    pub fn fail_saves(&self) {
        self.failing_saves.set(true);
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn stored(&self, tenant: &TenantId) -> Option<Tree> {
        self.trees.borrow().get(tenant).cloned()
    }
}

impl TreeStateStore for MemoryTreeStore {
    async fn load(&self, tenant: &TenantId) -> Result<Tree, StoreError> {
        Ok(self.stored(tenant).unwrap_or_default())
    }

    async fn save(&self, tenant: &TenantId, tree: &Tree) -> Result<(), StoreError> {
        if self.failing_saves.get() {
            return Err(StoreError::WriteError {
                path: PathBuf::from(tenant.as_str()),
                source: std::io::Error::other("store is read-only"),
            });
        }
        self.trees.borrow_mut().insert(tenant.clone(), tree.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
