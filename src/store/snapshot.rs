//! On-disk snapshot format: zstd over bincode of `(version, tenant, tree)`.

use snafu::{ResultExt, ensure};

use crate::filesystem::Tree;
use crate::store::TenantId;
use crate::store::error::{
    CompressSnafu, DecodeSnafu, DecompressSnafu, EncodeSnafu, InconsistentTreeSnafu, StoreError,
    TenantMismatchSnafu, UnsupportedVersionSnafu,
};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Upper bound on what a snapshot may ask the decoder to allocate.
const DECODE_LIMIT: usize = 64 * 1024 * 1024;

pub fn encode(tenant: &TenantId, tree: &Tree, compression_level: i32) -> Result<Vec<u8>, StoreError> {
    let encoded = bincode::encode_to_vec(
        (SNAPSHOT_VERSION, tenant.as_str(), tree),
        bincode::config::standard(),
    )
    .context(EncodeSnafu)?;
    zstd::encode_all(encoded.as_slice(), compression_level).context(CompressSnafu)
}

/// Decodes a snapshot and refuses anything that was not written for `tenant`
/// by this format version, or whose tree does not hold together.
pub fn decode(tenant: &TenantId, bytes: &[u8]) -> Result<Tree, StoreError> {
    let decompressed = zstd::decode_all(bytes).context(DecompressSnafu)?;
    let ((version, stored_tenant, tree), _): ((u32, String, Tree), usize) =
        bincode::decode_from_slice(
            &decompressed,
            bincode::config::standard().with_limit::<DECODE_LIMIT>(),
        )
        .context(DecodeSnafu)?;

    ensure!(
        version == SNAPSHOT_VERSION,
        UnsupportedVersionSnafu {
            found: version,
            expected: SNAPSHOT_VERSION,
        }
    );
    ensure!(
        stored_tenant == tenant.as_str(),
        TenantMismatchSnafu {
            expected: tenant.as_str(),
            found: stored_tenant,
        }
    );
    ensure!(
        tree.is_consistent(),
        InconsistentTreeSnafu {
            tenant: tenant.as_str(),
        }
    );

    Ok(tree)
}
