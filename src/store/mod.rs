//! Persistence of tenant trees.

mod error;
mod file;
#[cfg(test)]
mod memory;
mod snapshot;
mod tenant;

pub use error::StoreError;
pub use file::FileTreeStore;
#[cfg(test)]
pub use memory::MemoryTreeStore;
pub use tenant::TenantId;

use crate::filesystem::Tree;

/// Loads and saves whole trees keyed by tenant.
pub trait TreeStateStore {
    /// Returns a fresh tree when nothing has been stored for `tenant` yet.
    async fn load(&self, tenant: &TenantId) -> Result<Tree, StoreError>;
    /// Replaces whatever was stored for `tenant`.
    async fn save(&self, tenant: &TenantId, tree: &Tree) -> Result<(), StoreError>;
}
