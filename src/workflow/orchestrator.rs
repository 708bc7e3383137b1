//! Extraction run orchestration.
//!
//! One trigger runs the full pipeline for the selected record:
//!
//! 1. Selection → table and record ids
//! 2. Name field → subject name
//! 3. Attachment field → first attachment's fetch URL
//! 4. Info notice, then the remote extraction call (bounded by a deadline)
//! 5. Identifier field → write-back
//! 6. Success notice (matched or no-match variant)
//!
//! Steps run strictly in order and the first failure ends the run. Because the
//! write is the last step, a failed run never leaves a partial write behind.
//!
//! The run guard is a `watch` channel holding [`RunState`]. The Idle→Running
//! transition happens atomically inside `send_if_modified`, so a second
//! trigger during a run is rejected without any rendering layer involved, and
//! a UI can subscribe to the same channel to show its busy affordance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use super::attachment::locate_attachment;
use super::commit::commit;
use super::errors::WorkflowError;
use super::fields::{read_text, resolve_field};
use super::notices::NoticeSink;
use super::selection::current_selection;
use super::types::{Extraction, Notice, NoticeLevel, RunOutcome, RunState};
use crate::config::{ExtractorConfig, FieldLabels};
use crate::host::TableHost;
use crate::inference::Extractor;
use crate::messages::Locale;

/// Per-deployment knobs the orchestrator needs.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub fields: FieldLabels,
    pub locale: Locale,
    /// Deadline for the remote extraction call.
    pub remote_timeout: Duration,
}

impl WorkflowSettings {
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self {
            fields: config.fields.clone(),
            locale: config.locale,
            remote_timeout: config.model.request_timeout(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

/// Resets the run state to `Idle` when the run ends, however it ends.
struct RunGuard<'a> {
    state: &'a watch::Sender<RunState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(RunState::Idle);
    }
}

pub struct ExtractionWorkflow {
    host: Arc<dyn TableHost>,
    extractor: Arc<dyn Extractor>,
    notices: Arc<dyn NoticeSink>,
    settings: WorkflowSettings,
    state: watch::Sender<RunState>,
}

impl ExtractionWorkflow {
    pub fn new(
        host: Arc<dyn TableHost>,
        extractor: Arc<dyn Extractor>,
        notices: Arc<dyn NoticeSink>,
        settings: WorkflowSettings,
    ) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            host,
            extractor,
            notices,
            settings,
            state,
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Subscribe to run-state changes (for a busy indicator).
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Run the extraction for the selected record.
    ///
    /// Returns [`RunOutcome::Skipped`] without side effects when a run is
    /// already in flight. Failures are reported through the notice sink and
    /// the log and never propagate further.
    pub async fn trigger(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let Some(_guard) = self.try_begin(run_id) else {
            tracing::debug!("extraction already running, trigger ignored");
            return RunOutcome::Skipped;
        };

        tracing::info!(%run_id, "extraction run started");
        self.run_and_report(run_id).await
    }

    async fn run_and_report(&self, run_id: Uuid) -> RunOutcome {
        let locale = self.settings.locale;

        match self.run().await {
            Ok(extraction) => {
                let message = if extraction.matched {
                    locale.extraction_succeeded()
                } else {
                    locale.extraction_no_match()
                };
                tracing::info!(
                    %run_id,
                    table_id = %extraction.table_id,
                    record_id = %extraction.record_id,
                    matched = extraction.matched,
                    "extraction run completed"
                );
                self.notify(NoticeLevel::Success, message);
                RunOutcome::Completed(extraction)
            }
            Err(e) => {
                tracing::error!(%run_id, error = %e, "extraction run failed");
                let message = format!("{}{}", locale.error_prefix(), e.operator_message(locale));
                self.notify(NoticeLevel::Error, message);
                RunOutcome::Failed(e)
            }
        }
    }

    /// Idle → Running, atomically. `None` if already running.
    fn try_begin(&self, run_id: Uuid) -> Option<RunGuard<'_>> {
        let started = self.state.send_if_modified(|state| match state {
            RunState::Idle => {
                *state = RunState::Running { run_id };
                true
            }
            RunState::Running { .. } => false,
        });
        started.then_some(RunGuard { state: &self.state })
    }

    async fn run(&self) -> Result<Extraction, WorkflowError> {
        let host = self.host.as_ref();
        let labels = &self.settings.fields;
        let locale = self.settings.locale;

        let selection = current_selection(host).await?;
        let (table_id, record_id) = selection.ids().ok_or(WorkflowError::NoSelection)?;
        let table = host.get_table(table_id).await?;
        let table_id = table.id.as_str();

        let name_field = resolve_field(host, table_id, &labels.name).await?;
        let name = read_text(host, table_id, &name_field, record_id).await?;
        if name.is_empty() {
            return Err(WorkflowError::EmptyName);
        }

        let attachment_field = resolve_field(host, table_id, &labels.attachment).await?;
        let attachment = locate_attachment(host, table_id, &attachment_field, record_id).await?;

        self.notify(NoticeLevel::Info, locale.extraction_started());

        let answer = self.extract_with_deadline(&name, &attachment.url).await?;

        let id_field = resolve_field(host, table_id, &labels.identifier).await?;
        commit(host, table_id, &id_field, record_id, &answer).await?;

        let matched = answer != locale.no_match_sentinel();
        Ok(Extraction {
            table_id: table_id.to_string(),
            record_id: record_id.to_string(),
            value: answer,
            matched,
        })
    }

    async fn extract_with_deadline(&self, name: &str, url: &str) -> Result<String, WorkflowError> {
        let deadline = self.settings.remote_timeout;
        match tokio::time::timeout(deadline, self.extractor.extract(name, url)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(WorkflowError::Timeout {
                duration_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.notify(Notice::new(level, message));
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
