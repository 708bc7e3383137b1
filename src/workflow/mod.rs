//! Extraction workflow: the single-record pipeline and its supporting pieces.
//!
//! Submodules:
//! - `selection`: Selection tracking and the passive name display
//! - `fields`: Label → field id resolution, text cell reads
//! - `attachment`: First-attachment lookup and fetch URL resolution
//! - `commit`: Rich text write-back of the answer
//! - `orchestrator`: Run sequencing, Idle/Running guard, notices
//! - `notices`: Notice sinks for the operator surface
//! - `types`: Shared types across the workflow
//! - `errors`: Workflow-level error type

pub mod attachment;
pub mod commit;
pub mod errors;
pub mod fields;
pub mod notices;
pub mod orchestrator;
pub mod selection;
pub mod types;

// Re-exports for convenience
pub use errors::WorkflowError;
pub use notices::{ChannelNotices, CollectingNotices, LogNotices, NoticeSink};
pub use orchestrator::{ExtractionWorkflow, WorkflowSettings};
pub use selection::SelectionTracker;
pub use types::{
    DisplayName, Extraction, FieldRef, LocatedAttachment, Notice, NoticeLevel, RunOutcome,
    RunState,
};
