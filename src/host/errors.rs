//! Host platform error types.

use thiserror::Error;

/// Errors surfaced by a [`TableHost`](super::TableHost) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No table with the given id exists.
    #[error("table not found: '{table_id}'")]
    TableNotFound { table_id: String },

    /// The field id does not belong to the table.
    #[error("field '{field_id}' not found in table '{table_id}'")]
    UnknownField { table_id: String, field_id: String },

    /// The record id does not belong to the table.
    #[error("record '{record_id}' not found in table '{table_id}'")]
    UnknownRecord { table_id: String, record_id: String },

    /// Any other failure reported by the host bridge.
    #[error("host call failed: {reason}")]
    Bridge { reason: String },
}
