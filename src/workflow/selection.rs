//! Selection tracking for the passive name display.
//!
//! A background task follows the host's selection-change stream and keeps a
//! `watch` channel holding the latest [`DisplayName`]. Refresh failures are
//! logged and swallowed: the display keeps its previous value and nothing
//! else in the workflow is affected.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::errors::WorkflowError;
use super::fields::{read_text, resolve_field};
use super::types::DisplayName;
use crate::host::{Selection, TableHost};

/// Point-in-time read of the host selection.
pub async fn current_selection(host: &dyn TableHost) -> Result<Selection, WorkflowError> {
    Ok(host.get_selection().await?)
}

/// Resolve what the name label should show for the current selection.
pub async fn resolve_display_name(
    host: &dyn TableHost,
    name_label: &str,
) -> Result<DisplayName, WorkflowError> {
    let selection = current_selection(host).await?;
    let Some((table_id, record_id)) = selection.ids() else {
        return Ok(DisplayName::NothingSelected);
    };
    let table = host.get_table(table_id).await?;
    let field = resolve_field(host, &table.id, name_label).await?;
    let text = read_text(host, &table.id, &field, record_id).await?;
    Ok(DisplayName::from_text(text))
}

/// Recompute the display and publish it. Errors leave the display untouched.
pub async fn refresh_display(
    host: &dyn TableHost,
    name_label: &str,
    display: &watch::Sender<DisplayName>,
) {
    match resolve_display_name(host, name_label).await {
        Ok(name) => {
            display.send_if_modified(|current| {
                if *current == name {
                    false
                } else {
                    *current = name;
                    true
                }
            });
        }
        Err(e) => tracing::warn!(error = %e, "failed to refresh selected name"),
    }
}

/// Handle to the background selection follower.
///
/// Dropping the handle unsubscribes from the host's change stream.
pub struct SelectionTracker {
    display: watch::Receiver<DisplayName>,
    task: JoinHandle<()>,
}

impl SelectionTracker {
    /// Start following the host's selection. The first refresh runs
    /// immediately, then once per host notification.
    pub fn spawn(host: Arc<dyn TableHost>, name_label: impl Into<String>) -> Self {
        let name_label = name_label.into();
        let (tx, rx) = watch::channel(DisplayName::NothingSelected);
        let mut changes = host.selection_changes();

        let task = tokio::spawn(async move {
            loop {
                refresh_display(host.as_ref(), &name_label, &tx).await;
                // Notifications that arrive mid-refresh collapse into one.
                if changes.changed().await.is_err() {
                    tracing::debug!("selection stream closed, tracker stopping");
                    break;
                }
            }
        });

        Self { display: rx, task }
    }

    /// The most recently resolved display name.
    pub fn current(&self) -> DisplayName {
        self.display.borrow().clone()
    }

    /// A receiver that wakes on every display change.
    pub fn subscribe(&self) -> watch::Receiver<DisplayName> {
        self.display.clone()
    }
}

impl Drop for SelectionTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
