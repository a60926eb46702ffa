use std::fmt;

/// Errors produced by the store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested `(species, id)` is not in the directory.
    #[error("not found")]
    NotFound,

    /// File content cannot be interpreted: a bad line at startup, a short
    /// read, or a deserialise failure on a live payload.
    #[error("corrupt data{}: {reason}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Corrupt { line: Option<usize>, reason: String },

    /// Underlying read/write/rename/sync failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `Index` called twice for the same `(species, index_name)`.
    #[error("index {index_name:?} already registered for species {species}")]
    Conflict { species: String, index_name: String },

    /// Caller-side misuse, reported immediately without mutating state.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl Error {
    pub fn corrupt(line: Option<usize>, reason: impl fmt::Display) -> Self {
        Error::Corrupt { line, reason: reason.to_string() }
    }
}
