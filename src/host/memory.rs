//! In-memory [`TableHost`] backed by a JSON snapshot.
//!
//! Used as the host double in tests and by the command-line runner, which
//! loads a snapshot file, runs the workflow against it and writes the
//! snapshot back.
//!
//! Snapshot layout:
//!
//! ```json
//! {
//!   "selection": {"tableId": "T1", "recordId": "R1"},
//!   "tables": {
//!     "T1": {
//!       "name": "People",
//!       "fields": [{"id": "fld_name", "name": "姓名"}],
//!       "records": {"R1": {"fld_name": [{"type": "text", "text": "张三"}]}},
//!       "attachmentUrls": {"tok1": "https://files/1.pdf"}
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::errors::HostError;
use super::types::{FieldMeta, Selection, TableInfo};
use super::TableHost;

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Serializable state of a [`MemoryHost`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub tables: BTreeMap<String, TableSnapshot>,
}

/// One table inside a [`HostSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldMeta>,
    /// record id → field id → cell value.
    #[serde(default)]
    pub records: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    /// attachment token → temporary URL.
    #[serde(default)]
    pub attachment_urls: BTreeMap<String, String>,
}

impl TableSnapshot {
    fn check_field(&self, table_id: &str, field_id: &str) -> Result<(), HostError> {
        if self.fields.iter().any(|f| f.id == field_id) {
            Ok(())
        } else {
            Err(HostError::UnknownField {
                table_id: table_id.to_string(),
                field_id: field_id.to_string(),
            })
        }
    }
}

// ─── MemoryHost ──────────────────────────────────────────────────────────────

pub struct MemoryHost {
    state: Mutex<HostSnapshot>,
    selection_tx: watch::Sender<Selection>,
    writes: AtomicUsize,
}

impl MemoryHost {
    pub fn new(snapshot: HostSnapshot) -> Self {
        let (selection_tx, _) = watch::channel(snapshot.selection.clone());
        Self {
            state: Mutex::new(snapshot),
            selection_tx,
            writes: AtomicUsize::new(0),
        }
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let raw = std::fs::read_to_string(path).map_err(|e| HostError::Bridge {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        let snapshot: HostSnapshot =
            serde_json::from_str(&raw).map_err(|e| HostError::Bridge {
                reason: format!("failed to parse snapshot {}: {e}", path.display()),
            })?;
        Ok(Self::new(snapshot))
    }

    /// Write the current state back to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<(), HostError> {
        let json = serde_json::to_string_pretty(&self.snapshot()).map_err(|e| {
            HostError::Bridge {
                reason: format!("failed to serialize snapshot: {e}"),
            }
        })?;
        std::fs::write(path, json).map_err(|e| HostError::Bridge {
            reason: format!("failed to write {}: {e}", path.display()),
        })
    }

    pub fn snapshot(&self) -> HostSnapshot {
        self.lock().clone()
    }

    /// Change the selection and notify subscribers.
    pub fn select(&self, selection: Selection) {
        self.lock().selection = selection.clone();
        self.selection_tx.send_replace(selection);
    }

    /// Number of successful `set_cell_value` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Rename a field in place, keeping its id.
    pub fn rename_field(&self, table_id: &str, field_id: &str, new_name: &str) {
        let mut state = self.lock();
        if let Some(field) = state
            .tables
            .get_mut(table_id)
            .and_then(|t| t.fields.iter_mut().find(|f| f.id == field_id))
        {
            field.name = new_name.to_string();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HostSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn table<'a>(state: &'a HostSnapshot, table_id: &str) -> Result<&'a TableSnapshot, HostError> {
    state.tables.get(table_id).ok_or_else(|| HostError::TableNotFound {
        table_id: table_id.to_string(),
    })
}

#[async_trait]
impl TableHost for MemoryHost {
    async fn get_selection(&self) -> Result<Selection, HostError> {
        Ok(self.lock().selection.clone())
    }

    fn selection_changes(&self) -> watch::Receiver<Selection> {
        self.selection_tx.subscribe()
    }

    async fn get_table(&self, table_id: &str) -> Result<TableInfo, HostError> {
        let state = self.lock();
        let t = table(&state, table_id)?;
        Ok(TableInfo {
            id: table_id.to_string(),
            name: t.name.clone(),
        })
    }

    async fn get_field_by_name(
        &self,
        table_id: &str,
        name: &str,
    ) -> Result<Option<FieldMeta>, HostError> {
        let state = self.lock();
        let t = table(&state, table_id)?;
        Ok(t.fields.iter().find(|f| f.name == name).cloned())
    }

    async fn get_cell_value(
        &self,
        table_id: &str,
        field_id: &str,
        record_id: &str,
    ) -> Result<Option<serde_json::Value>, HostError> {
        let state = self.lock();
        let t = table(&state, table_id)?;
        t.check_field(table_id, field_id)?;
        let record = t.records.get(record_id).ok_or_else(|| HostError::UnknownRecord {
            table_id: table_id.to_string(),
            record_id: record_id.to_string(),
        })?;
        Ok(record.get(field_id).cloned())
    }

    async fn set_cell_value(
        &self,
        table_id: &str,
        field_id: &str,
        record_id: &str,
        value: serde_json::Value,
    ) -> Result<(), HostError> {
        let mut state = self.lock();
        let t = state
            .tables
            .get_mut(table_id)
            .ok_or_else(|| HostError::TableNotFound {
                table_id: table_id.to_string(),
            })?;
        t.check_field(table_id, field_id)?;
        let record = t
            .records
            .get_mut(record_id)
            .ok_or_else(|| HostError::UnknownRecord {
                table_id: table_id.to_string(),
                record_id: record_id.to_string(),
            })?;
        record.insert(field_id.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_attachment_url(
        &self,
        table_id: &str,
        token: &str,
        field_id: &str,
        _record_id: &str,
    ) -> Result<Option<String>, HostError> {
        let state = self.lock();
        let t = table(&state, table_id)?;
        t.check_field(table_id, field_id)?;
        Ok(t.attachment_urls.get(token).cloned())
    }
}
