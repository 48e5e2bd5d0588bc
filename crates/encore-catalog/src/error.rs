//! Error types for the catalog layer.

/// Errors that can occur while scanning the media directory.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading the media directory or one of its entries failed.
    /// A *missing* directory is not an error — it yields an empty catalog.
    #[error("media scan failed: {0}")]
    Io(#[from] std::io::Error),
}
