//! Attachment lookup and URL resolution.

use super::errors::WorkflowError;
use super::types::{FieldRef, LocatedAttachment};
use crate::host::types::first_attachment;
use crate::host::TableHost;

/// Find the record's first attachment and a temporary URL for it.
///
/// Attachments after the first are ignored. The URL is assumed to stay valid
/// for one subsequent request; it is never refreshed.
pub async fn locate_attachment(
    host: &dyn TableHost,
    table_id: &str,
    field: &FieldRef,
    record_id: &str,
) -> Result<LocatedAttachment, WorkflowError> {
    let value = host.get_cell_value(table_id, &field.id, record_id).await?;

    let Some(first) = first_attachment(value.as_ref()) else {
        let empty = match value.as_ref() {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::Array(list)) => list.is_empty(),
            Some(_) => false,
        };
        if !empty {
            tracing::warn!(field = %field.label, "attachment cell has unexpected shape");
        }
        return Err(WorkflowError::NoAttachment {
            label: field.label.clone(),
        });
    };

    let url = host
        .get_attachment_url(table_id, &first.token, &field.id, record_id)
        .await?
        .filter(|u| !u.is_empty())
        .ok_or(WorkflowError::UrlResolutionFailed)?;

    Ok(LocatedAttachment {
        token: first.token,
        url,
    })
}
