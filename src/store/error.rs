use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Failed to read tree snapshot {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create snapshot directory {}", path.display()))]
    CreateDirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write tree snapshot {}", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to compress tree snapshot"))]
    CompressError { source: std::io::Error },
    #[snafu(display("Failed to decompress tree snapshot"))]
    DecompressError { source: std::io::Error },
    #[snafu(display("Failed to encode tree snapshot"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to decode tree snapshot"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Snapshot format version {found} is not supported, expected {expected}"))]
    UnsupportedVersionError { found: u32, expected: u32 },
    #[snafu(display("Snapshot belongs to tenant '{found}', expected '{expected}'"))]
    TenantMismatchError { expected: String, found: String },
    #[snafu(display("Snapshot of tenant '{tenant}' holds an inconsistent tree"))]
    InconsistentTreeError { tenant: String },
}
