//! Catalog error types

use contracts::ProviderError;
use thiserror::Error;

/// Catalog resolution error
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// Dialog enumeration failed
    #[error("dialog enumeration failed: {0}")]
    Enumeration(#[from] ProviderError),
}

impl CatalogError {
    /// Whether the provider session is unusable
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Enumeration(e) => e.is_fatal(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CatalogError>;
