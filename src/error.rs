//! Error taxonomy for listing management.
//!
//! Statistics that lack enough samples are not errors: they come back as
//! `None` from the analysis functions. The variants here cover the cases
//! where an operation on the collection is refused.

use thiserror::Error;

/// Errors raised while creating, removing or restoring listings.
#[derive(Debug, Error)]
pub enum MarketError {
    /// No responsible-party name was set before creating a record.
    #[error("Responsible name is required before adding a listing")]
    MissingIdentity,

    /// The condominium key was empty.
    #[error("Condominium name is required")]
    MissingCondominium,

    /// An import payload was not a JSON array of listings.
    #[error("Malformed import: {0}")]
    MalformedImport(String),

    /// No record with the given id exists in the current snapshot.
    #[error("Listing not found: {0}")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding the stored collection failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used by the store and the listing book.
pub type MarketResult<T> = Result<T, MarketError>;
