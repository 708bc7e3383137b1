//! Write-back of the extracted answer.

use super::errors::WorkflowError;
use super::types::FieldRef;
use crate::host::types::string_to_rich_text;
use crate::host::TableHost;

/// Overwrite a text cell with `text` as a single rich text segment.
///
/// No read-modify-write: whatever the cell held before is replaced.
pub async fn commit(
    host: &dyn TableHost,
    table_id: &str,
    field: &FieldRef,
    record_id: &str,
    text: &str,
) -> Result<(), WorkflowError> {
    host.set_cell_value(table_id, &field.id, record_id, string_to_rich_text(text))
        .await?;
    tracing::info!(
        table_id,
        record_id,
        field = %field.label,
        chars = text.chars().count(),
        "wrote extraction result"
    );
    Ok(())
}
