//! Workflow error types.

use thiserror::Error;

use crate::host::HostError;
use crate::inference::InferenceError;
use crate::messages::Locale;

/// Every way an extraction run can fail.
///
/// All variants are recovered at the orchestrator boundary and turned into a
/// single operator notice; none is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The selection lacks a table id or a record id.
    #[error("no record selected")]
    NoSelection,

    /// No field on the table carries this exact label.
    #[error("field not found: '{label}'")]
    FieldNotFound { label: String },

    /// The name cell is empty.
    #[error("name field is empty")]
    EmptyName,

    /// The attachment cell is absent or holds no usable first attachment.
    #[error("record has no attachment in '{label}'")]
    NoAttachment { label: String },

    /// The host returned no fetch URL for the attachment.
    #[error("failed to resolve attachment URL")]
    UrlResolutionFailed,

    /// The remote service reported an error (or could not be reached).
    #[error("remote error: {message}")]
    RemoteError { message: String },

    /// The response envelope did not have the expected structure.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The remote call exceeded its deadline.
    #[error("remote call timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// A host call (table lookup, cell read or write) failed.
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl From<InferenceError> for WorkflowError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::MalformedResponse { reason } => {
                WorkflowError::MalformedResponse { reason }
            }
            InferenceError::Timeout { duration_ms } => WorkflowError::Timeout { duration_ms },
            other => WorkflowError::RemoteError {
                message: other.remote_message(),
            },
        }
    }
}

impl WorkflowError {
    /// Human-readable text for the operator, in the operator's language.
    ///
    /// Remote errors are passed through verbatim.
    pub fn operator_message(&self, locale: Locale) -> String {
        match (self, locale) {
            (WorkflowError::RemoteError { message }, _) => message.clone(),

            (WorkflowError::NoSelection, Locale::Zh) => "请先选中一行".into(),
            (WorkflowError::NoSelection, Locale::En) => "Select a row first".into(),

            (WorkflowError::FieldNotFound { label }, Locale::Zh) => {
                format!("找不到字段“{label}”")
            }
            (WorkflowError::FieldNotFound { label }, Locale::En) => {
                format!("Field \"{label}\" does not exist")
            }

            (WorkflowError::EmptyName, Locale::Zh) => "该行姓名为空".into(),
            (WorkflowError::EmptyName, Locale::En) => "The name in this row is empty".into(),

            (WorkflowError::NoAttachment { label }, Locale::Zh) => format!("该行没有{label}附件"),
            (WorkflowError::NoAttachment { label }, Locale::En) => {
                format!("This row has no attachment in \"{label}\"")
            }

            (WorkflowError::UrlResolutionFailed, Locale::Zh) => "获取附件链接失败".into(),
            (WorkflowError::UrlResolutionFailed, Locale::En) => {
                "Could not get a link for the attachment".into()
            }

            (WorkflowError::MalformedResponse { reason }, Locale::Zh) => {
                format!("AI 返回格式异常：{reason}")
            }
            (WorkflowError::MalformedResponse { reason }, Locale::En) => {
                format!("Unexpected model response: {reason}")
            }

            (WorkflowError::Timeout { duration_ms }, Locale::Zh) => {
                format!("AI 请求超时（{duration_ms} 毫秒）")
            }
            (WorkflowError::Timeout { duration_ms }, Locale::En) => {
                format!("The model did not answer within {duration_ms}ms")
            }

            (WorkflowError::Host(e), Locale::Zh) => format!("表格操作失败：{e}"),
            (WorkflowError::Host(e), Locale::En) => format!("Table operation failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_message_passes_through() {
        let err = WorkflowError::from(InferenceError::RemoteError {
            message: "quota exceeded".into(),
        });
        assert_eq!(
            err,
            WorkflowError::RemoteError {
                message: "quota exceeded".into()
            }
        );
        assert_eq!(err.operator_message(Locale::Zh), "quota exceeded");
        assert_eq!(err.operator_message(Locale::En), "quota exceeded");
    }

    #[test]
    fn test_inference_error_mapping() {
        assert_eq!(
            WorkflowError::from(InferenceError::Timeout { duration_ms: 10 }),
            WorkflowError::Timeout { duration_ms: 10 }
        );
        assert!(matches!(
            WorkflowError::from(InferenceError::MalformedResponse {
                reason: "empty choices array".into()
            }),
            WorkflowError::MalformedResponse { .. }
        ));
        assert_eq!(
            WorkflowError::from(InferenceError::HttpError {
                status: 503,
                body: "busy".into()
            }),
            WorkflowError::RemoteError {
                message: "HTTP 503: busy".into()
            }
        );
    }

    #[test]
    fn test_field_not_found_names_label() {
        let err = WorkflowError::FieldNotFound {
            label: "身份证号".into(),
        };
        assert!(err.operator_message(Locale::Zh).contains("身份证号"));
        assert!(err.to_string().contains("身份证号"));
    }

    #[test]
    fn test_no_attachment_names_configured_column() {
        let err = WorkflowError::NoAttachment {
            label: "工商档案".into(),
        };
        assert_eq!(err.operator_message(Locale::Zh), "该行没有工商档案附件");
        assert_eq!(
            err.operator_message(Locale::En),
            "This row has no attachment in \"工商档案\""
        );

        let err = WorkflowError::NoAttachment {
            label: "Scans".into(),
        };
        assert_eq!(err.operator_message(Locale::Zh), "该行没有Scans附件");
    }

    #[test]
    fn test_host_error_converts() {
        let err: WorkflowError = HostError::TableNotFound {
            table_id: "T9".into(),
        }
        .into();
        assert!(err.operator_message(Locale::En).contains("T9"));
    }
}
