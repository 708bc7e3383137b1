//! Host table platform boundary.
//!
//! The workflow never talks to a concrete table application. Everything it
//! needs from the host (selection, schema lookup, cell reads and writes,
//! attachment URL issuance) goes through the [`TableHost`] trait.
//!
//! - `types`: selection, schema, rich text and attachment shapes
//! - `errors`: host-level error type
//! - `memory`: an in-memory host backed by a JSON snapshot

pub mod errors;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use tokio::sync::watch;

pub use errors::HostError;
pub use memory::{HostSnapshot, MemoryHost};
pub use types::{Attachment, FieldMeta, Segment, Selection, TableInfo};

/// Operations consumed from the host table platform.
///
/// Field lookup by name is exact-match and case-sensitive. Cell values are
/// exchanged as raw JSON: text cells as segment arrays, attachment cells as
/// arrays of `{token, ...}` objects.
#[async_trait]
pub trait TableHost: Send + Sync {
    /// Point-in-time read of the current selection.
    async fn get_selection(&self) -> Result<Selection, HostError>;

    /// Subscribe to selection changes. The receiver always holds the most
    /// recent selection; intermediate values may be skipped.
    fn selection_changes(&self) -> watch::Receiver<Selection>;

    async fn get_table(&self, table_id: &str) -> Result<TableInfo, HostError>;

    /// Look up a field by its display name. `Ok(None)` when no field carries
    /// that exact name.
    async fn get_field_by_name(
        &self,
        table_id: &str,
        name: &str,
    ) -> Result<Option<FieldMeta>, HostError>;

    async fn get_cell_value(
        &self,
        table_id: &str,
        field_id: &str,
        record_id: &str,
    ) -> Result<Option<serde_json::Value>, HostError>;

    async fn set_cell_value(
        &self,
        table_id: &str,
        field_id: &str,
        record_id: &str,
        value: serde_json::Value,
    ) -> Result<(), HostError>;

    /// Issue a temporary fetch URL for an attachment. `Ok(None)` (or an empty
    /// string) when the host cannot issue one.
    async fn get_attachment_url(
        &self,
        table_id: &str,
        token: &str,
        field_id: &str,
        record_id: &str,
    ) -> Result<Option<String>, HostError>;
}
