//! Error types for the diff engine, transactions, and drivers.

use stela_sql::CompileError;

/// An opaque transport/driver failure.
///
/// Drivers wrap their client library's error type so the diff engine
/// never depends on a concrete database client.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct DriverError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>);

impl DriverError {
    /// Creates a driver error from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Errors raised while computing a schema diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The desired table definition cannot be diffed against: empty
    /// column or key sets mean the caller wants table removal, which is
    /// a different path. Never reported as an empty change list.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
}

/// Errors raised while applying a change list transactionally.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Another transaction is in flight on this connection. Calls fail
    /// fast instead of queuing.
    #[error("a transaction is already active on this connection")]
    AlreadyActive,

    /// Starting or finishing the transaction failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A statement inside the transaction failed; the transaction was
    /// rolled back before this error surfaced.
    #[error("statement failed: {statement}")]
    StatementFailed {
        /// The statement that failed.
        statement: String,
        /// The driver failure.
        #[source]
        cause: DriverError,
    },

    /// The rollback after a failed statement itself failed. Both causes
    /// are preserved.
    #[error("rollback failed after `{original}`")]
    RollbackFailed {
        /// The failure that triggered the rollback.
        original: Box<TransactionError>,
        /// The rollback failure.
        #[source]
        cause: DriverError,
    },
}

/// Umbrella error for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Expression/DDL compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Diff computation failed.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Transactional apply failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A driver call outside a transaction failed.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Result alias for schema operations.
pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
