//! Error type for store, export and settings operations

use std::fmt;
use thiserror::Error;

/// The kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Request,
    Evidence,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "Project"),
            EntityKind::Request => write!(f, "Request"),
            EntityKind::Evidence => write!(f, "Evidence"),
        }
    }
}

/// Errors raised by the entity store and the operations built on it.
///
/// None of these leave the store's collections partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required field is empty or out of range
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An update or delete referenced an id that is not in the collection
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A create referenced a parent that does not exist
    #[error("Invalid reference to {kind}: {id}")]
    InvalidReference { kind: EntityKind, id: String },

    /// CSV export was requested but no request is fulfilled
    #[error("Tidak ada data untuk diunduh.")]
    EmptyExport,
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        log::warn!("{} not found: {}", kind, id);
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
