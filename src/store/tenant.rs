use std::hash::Hasher;

use derive_more::{Display, From};
use metrohash::MetroHash64;

/// Identifies whose tree a command operates on.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable 64-bit MetroHash of the id, used to name per-tenant storage.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = MetroHash64::default();
        hasher.write(self.0.as_bytes());
        hasher.finish()
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        TenantId(id.to_string())
    }
}
