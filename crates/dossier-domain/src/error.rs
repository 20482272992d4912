//! Error types for domain invariants

use crate::entity::EntityStatus;
use thiserror::Error;

/// Violations of domain invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A status change that would skip or regress the pipeline order
    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition {
        /// Entity identifier
        id: String,
        /// Current status
        from: EntityStatus,
        /// Requested status
        to: EntityStatus,
    },

    /// Only scrape-terminal records may be fed back as fresh input
    #[error("Entity {id} cannot be requeued from status {status}")]
    NotRequeueable {
        /// Entity identifier
        id: String,
        /// Current status
        status: EntityStatus,
    },

    /// Identifiers must be non-empty
    #[error("Entity identifier must not be empty")]
    EmptyIdentifier,
}
