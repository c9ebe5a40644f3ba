//! Error taxonomy shared by the storage and lifecycle layers.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenience alias for results produced by the core crate.
pub type RentalResult<T> = Result<T, RentalError>;

/// Failures surfaced by record storage, entity conversion and contract handling.
#[derive(Debug, Error)]
pub enum RentalError {
    /// A backing file or directory could not be opened, written or renamed.
    #[error("file unavailable: {}", path.display())]
    FileUnavailable {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A record did not match the shape of the entity it was converted into.
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord {
        /// Entity kind, e.g. `car`.
        kind: &'static str,
        /// Human readable reason.
        reason: String,
    },
    /// A token, license plate, phone number or contract name lookup missed.
    #[error("{what} not found: {token}")]
    NotFound {
        /// What was searched for.
        what: &'static str,
        /// The token that did not match.
        token: String,
    },
    /// A contract file name that does not follow `surname_plate_YYYY_MM_DD_HH_MM`.
    #[error("invalid contract name '{0}'")]
    InvalidContractName(String),
    /// An active contract with the same name already exists.
    #[error("contract '{0}' already exists")]
    ContractExists(String),
    /// The username exists but the password does not match.
    #[error("invalid credentials for user '{0}'")]
    InvalidCredentials(String),
}

impl RentalError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(what: &'static str, token: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            token: token.into(),
        }
    }

    /// Whether this error is a lookup miss the caller may retry with new input.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
