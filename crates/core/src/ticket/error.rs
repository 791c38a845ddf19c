//! Error types for ticket space operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors underlying the boolean fast paths of [`TicketSpace`](super::TicketSpace).
#[derive(Debug, Error)]
pub enum TicketError {
    /// The ticket directory could not be created.
    #[error("Failed to create ticket directory: {path}")]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ticket has no usable base name (empty, `.`, `..` or a bare root).
    #[error("Invalid ticket: {0:?}")]
    InvalidTicket(String),

    /// The string is not a canonical ticket identifier.
    #[error("Malformed ticket identifier: {0:?}")]
    MalformedId(String),

    /// Failed to create the ticketed file.
    #[error("Failed to create ticket file: {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open the ticketed file.
    #[error("Failed to open ticket file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy bytes into or out of the ticketed file.
    #[error("Failed to copy ticket data for {path}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the ticketed file.
    #[error("Failed to remove ticket file: {path}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the ticket directory.
    #[error("Failed to scan ticket directory: {path}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TicketError {
    /// Returns true if the underlying cause is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            TicketError::Setup { source, .. }
            | TicketError::Create { source, .. }
            | TicketError::Open { source, .. }
            | TicketError::Copy { source, .. }
            | TicketError::Remove { source, .. }
            | TicketError::Scan { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            TicketError::InvalidTicket(_) | TicketError::MalformedId(_) => false,
        }
    }
}
