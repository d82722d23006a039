use media_catalog_sources::CodecError;
use std::path::PathBuf;

/// Errors reported by the record store, watchlists and the collection manager
///
/// None of these are raised for an empty result.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A collection file exists but could not be read or parsed
    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("A watchlist named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("Invalid watchlist name: \"{0}\"")]
    InvalidName(String),

    #[error("Watchlist index {index} is out of range ({len} watchlists)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Record {0} is not in the catalog")]
    UnknownRecord(String),

    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("No records found in {}", .0.display())]
    EmptyImport(PathBuf),

    /// Persisting a collection failed; the in-memory state is still authoritative
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl CatalogError {
    pub fn load(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::Load { path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::Write { path: path.into(), source }
    }
}
