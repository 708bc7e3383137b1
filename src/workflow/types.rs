//! Shared types across the workflow.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::WorkflowError;
use crate::messages::Locale;

/// A field resolved by label for the duration of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub label: String,
    pub id: String,
}

/// The first attachment of a record and its temporary fetch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAttachment {
    pub token: String,
    pub url: String,
}

// ─── Display ─────────────────────────────────────────────────────────────────

/// What the passive name label shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayName {
    NothingSelected,
    NoName,
    Name(String),
}

impl DisplayName {
    pub fn from_text(text: String) -> Self {
        if text.is_empty() {
            DisplayName::NoName
        } else {
            DisplayName::Name(text)
        }
    }

    pub fn render(&self, locale: Locale) -> String {
        match self {
            DisplayName::NothingSelected => locale.nothing_selected().to_string(),
            DisplayName::NoName => locale.no_name().to_string(),
            DisplayName::Name(name) => name.clone(),
        }
    }
}

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient, non-blocking message for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

// ─── Run state ───────────────────────────────────────────────────────────────

/// Orchestrator state. At most one run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { run_id: Uuid },
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running { .. })
    }
}

/// A completed extraction, written back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub table_id: String,
    pub record_id: String,
    /// The trimmed answer exactly as written.
    pub value: String,
    /// `false` when the answer is the no-match sentinel.
    pub matched: bool,
}

/// Result of one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Extraction),
    /// A run was already in flight; nothing happened.
    Skipped,
    Failed(WorkflowError),
}
