pub mod config;
pub mod host;
pub mod inference;
pub mod logging;
pub mod messages;
pub mod workflow;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use config::ExtractorConfig;
use host::TableHost;
use inference::{ExtractionClient, InferenceError};
use workflow::{ExtractionWorkflow, NoticeSink, WorkflowSettings};

pub use logging::{init_tracing, LogTarget};

/// Return the platform-standard data directory for id-extractor.
///
/// - macOS: `~/Library/Application Support/id-extractor/`
/// - Windows: `{FOLDERID_RoamingAppData}\id-extractor\`
/// - Linux: `$XDG_DATA_HOME/id-extractor/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.id-extractor/` only if none of the above can be resolved.
pub fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("id-extractor");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".id-extractor")
}

/// Wire a workflow to the configured remote model.
pub fn build_workflow(
    config: &ExtractorConfig,
    host: Arc<dyn TableHost>,
    notices: Arc<dyn NoticeSink>,
) -> Result<ExtractionWorkflow, InferenceError> {
    let client = ExtractionClient::from_config(&config.model, config.locale)?;
    Ok(ExtractionWorkflow::new(
        host,
        Arc::new(client),
        notices,
        WorkflowSettings::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_is_named() {
        let dir = data_dir();
        let name = dir.file_name().unwrap().to_string_lossy();
        assert!(name == "id-extractor" || name == ".id-extractor");
    }

    #[tokio::test]
    async fn test_build_workflow_uses_config_settings() {
        let mut config = ExtractorConfig::default();
        config.model.api_key = "k".into();
        config.model.endpoint_id = "ep".into();
        config.model.request_timeout_secs = 7;
        let host = Arc::new(host::MemoryHost::new(host::HostSnapshot::default()));
        let wf = build_workflow(&config, host, Arc::new(workflow::LogNotices)).unwrap();
        assert_eq!(wf.settings().remote_timeout, std::time::Duration::from_secs(7));
        assert_eq!(wf.settings().fields.name, "姓名");
    }
}
