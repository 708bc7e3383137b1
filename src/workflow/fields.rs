//! Label-based field resolution and text cell reads.
//!
//! Labels, not ids, are the contract with the operator, so every call goes
//! back to the host. Nothing is cached: a renamed column is picked up on the
//! next call and a missing one fails immediately.

use super::errors::WorkflowError;
use super::types::FieldRef;
use crate::host::types::rich_text_to_string;
use crate::host::TableHost;

/// Resolve a field id from its exact, case-sensitive label.
pub async fn resolve_field(
    host: &dyn TableHost,
    table_id: &str,
    label: &str,
) -> Result<FieldRef, WorkflowError> {
    let field = host
        .get_field_by_name(table_id, label)
        .await?
        .ok_or_else(|| WorkflowError::FieldNotFound {
            label: label.to_string(),
        })?;
    tracing::debug!(table_id, label, field_id = %field.id, "resolved field");
    Ok(FieldRef {
        label: label.to_string(),
        id: field.id,
    })
}

/// Read a rich text cell as plain text (`""` when absent or empty).
pub async fn read_text(
    host: &dyn TableHost,
    table_id: &str,
    field: &FieldRef,
    record_id: &str,
) -> Result<String, WorkflowError> {
    let value = host.get_cell_value(table_id, &field.id, record_id).await?;
    Ok(rich_text_to_string(value.as_ref()))
}
