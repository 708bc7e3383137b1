//! Deployment configuration loading and validation.
//!
//! Reads `id-extractor.yaml` and resolves environment variables. When no file
//! is present the configuration is assembled from `ARK_API_KEY` and
//! `ARK_ENDPOINT_ID` with defaults for everything else.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::messages::Locale;

/// Name of the configuration file searched for on disk.
pub const CONFIG_FILE_NAME: &str = "id-extractor.yaml";

/// Env var that points directly at a configuration file.
pub const CONFIG_PATH_ENV: &str = "ID_EXTRACTOR_CONFIG";

pub const API_KEY_ENV: &str = "ARK_API_KEY";
pub const ENDPOINT_ID_ENV: &str = "ARK_ENDPOINT_ID";

const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find id-extractor.yaml")]
    NotFound,

    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

// ─── Public Types ────────────────────────────────────────────────────────────

/// Remote model endpoint settings. The credential is redacted from `Debug`.
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub api_key: String,
    /// Model or endpoint identifier sent as the request's `model`.
    #[serde(default)]
    pub endpoint_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint_id", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint_id: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Column labels the workflow resolves on every run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldLabels {
    #[serde(default = "default_name_label")]
    pub name: String,
    #[serde(default = "default_attachment_label")]
    pub attachment: String,
    #[serde(default = "default_identifier_label")]
    pub identifier: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            name: default_name_label(),
            attachment: default_attachment_label(),
            identifier: default_identifier_label(),
        }
    }
}

/// Top-level configuration (mirrors `id-extractor.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub fields: FieldLabels,
    #[serde(default)]
    pub locale: Locale,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_name_label() -> String {
    "姓名".to_string()
}
fn default_attachment_label() -> String {
    "工商档案".to_string()
}
fn default_identifier_label() -> String {
    "身份证号".to_string()
}

impl ExtractorConfig {
    /// Build a configuration from `ARK_API_KEY` / `ARK_ENDPOINT_ID` only.
    pub fn from_env() -> Self {
        Self {
            model: ModelConfig {
                api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
                endpoint_id: std::env::var(ENDPOINT_ID_ENV).unwrap_or_default(),
                ..ModelConfig::default()
            },
            ..Self::default()
        }
    }

    /// Reject configurations that cannot produce a working request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.api_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: format!("model.api_key is empty (set {API_KEY_ENV})"),
            });
        }
        if self.model.endpoint_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                reason: format!("model.endpoint_id is empty (set {ENDPOINT_ID_ENV})"),
            });
        }
        if self.model.request_timeout_secs == 0 || self.model.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "timeouts must be greater than zero".into(),
            });
        }
        for (key, label) in [
            ("fields.name", &self.fields.name),
            ("fields.attachment", &self.fields.attachment),
            ("fields.identifier", &self.fields.identifier),
        ] {
            if label.is_empty() {
                return Err(ConfigError::Invalid {
                    reason: format!("{key} is empty"),
                });
            }
        }
        Ok(())
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Locate the configuration file.
///
/// Checks `ID_EXTRACTOR_CONFIG` first, then walks upward from `start`.
pub fn find_config_path(start: &Path) -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let candidate = PathBuf::from(expand_tilde(&path));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(ConfigError::NotFound)
}

/// Load and parse a configuration file.
///
/// Performs environment-variable interpolation on `${VAR_NAME}` and
/// `${VAR_NAME:-default}` before parsing.
pub fn load_config(path: &Path) -> Result<ExtractorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_config(&raw)
}

/// Parse configuration text (after env interpolation).
pub fn parse_config(raw: &str) -> Result<ExtractorConfig, ConfigError> {
    let interpolated = interpolate_env_vars(raw);
    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
        reason: e.to_string(),
    })
}

/// Resolve the effective configuration.
///
/// An explicit path must exist and parse. Without one, a discovered file is
/// used when present, otherwise the environment.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ExtractorConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    match find_config_path(&cwd) {
        Ok(path) => {
            tracing::info!(path = %path.display(), "loading configuration file");
            load_config(&path)
        }
        Err(ConfigError::NotFound) => {
            tracing::info!("no configuration file found, using environment");
            Ok(ExtractorConfig::from_env())
        }
        Err(e) => Err(e),
    }
}

// ─── Env-var interpolation ───────────────────────────────────────────────────

/// Expand `${VAR}` and `${VAR:-default}` references in raw config text.
///
/// `${VAR}` becomes the variable's value, or nothing when unset. With `:-`
/// the default applies when the variable is unset or empty, as in POSIX
/// shells, and a leading `~` in the default is expanded. An unterminated
/// `${` is copied through unchanged.
fn interpolate_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let Some(end) = body.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        out.push_str(&lookup_var(&body[..end]));
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    out
}

fn lookup_var(expr: &str) -> String {
    let (name, default) = match expr.split_once(":-") {
        Some((name, default)) => (name, Some(default)),
        None => (expr, None),
    };
    let value = std::env::var(name.trim()).ok();
    match (value, default) {
        (Some(v), Some(_)) if !v.is_empty() => v,
        (Some(v), None) => v,
        (_, Some(default)) => expand_tilde(default),
        (None, None) => String::new(),
    }
}

/// Expand `~` or a leading `~/` to the home directory. `~user` forms are
/// left alone.
fn expand_tilde(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ExtractorConfig {
        ExtractorConfig {
            model: ModelConfig {
                api_key: "sk-test".into(),
                endpoint_id: "ep-123".into(),
                ..ModelConfig::default()
            },
            ..ExtractorConfig::default()
        }
    }

    #[test]
    fn test_interpolate_env_vars_with_default() {
        std::env::remove_var("__ID_EXTRACTOR_MISSING_VAR__");
        let result = interpolate_env_vars("${__ID_EXTRACTOR_MISSING_VAR__:-fallback}");
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_interpolate_env_vars_with_value() {
        std::env::set_var("__ID_EXTRACTOR_SET_VAR__", "ep-live");
        let result = interpolate_env_vars("endpoint_id: ${__ID_EXTRACTOR_SET_VAR__}");
        assert_eq!(result, "endpoint_id: ep-live");
        std::env::remove_var("__ID_EXTRACTOR_SET_VAR__");
    }

    #[test]
    fn test_interpolate_no_vars() {
        let input = "plain: $text";
        assert_eq!(interpolate_env_vars(input), input);
    }

    #[test]
    fn test_interpolate_empty_var_takes_default() {
        std::env::set_var("__ID_EXTRACTOR_EMPTY_VAR__", "");
        assert_eq!(
            interpolate_env_vars("base_url: ${__ID_EXTRACTOR_EMPTY_VAR__:-http://localhost:9000}"),
            "base_url: http://localhost:9000"
        );
        assert_eq!(interpolate_env_vars("k: ${__ID_EXTRACTOR_EMPTY_VAR__}"), "k: ");
        std::env::remove_var("__ID_EXTRACTOR_EMPTY_VAR__");
    }

    #[test]
    fn test_interpolate_unterminated_reference_is_literal() {
        assert_eq!(interpolate_env_vars("a: ${OPEN"), "a: ${OPEN");
        std::env::remove_var("__ID_EXTRACTOR_MISSING_VAR_2__");
        assert_eq!(
            interpolate_env_vars("${__ID_EXTRACTOR_MISSING_VAR_2__:-x}/${TAIL"),
            "x/${TAIL"
        );
    }

    #[test]
    fn test_expand_tilde() {
        let result = expand_tilde("~/cfg.yaml");
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("/cfg.yaml"));
        assert_eq!(expand_tilde("~alice/cfg.yaml"), "~alice/cfg.yaml");
        assert_eq!(expand_tilde("/etc/cfg.yaml"), "/etc/cfg.yaml");
    }

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let config = parse_config("model:\n  api_key: k\n  endpoint_id: ep\n").unwrap();
        assert_eq!(config.model.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model.request_timeout_secs, 60);
        assert_eq!(config.fields, FieldLabels::default());
        assert_eq!(config.fields.identifier, "身份证号");
        assert_eq!(config.locale, Locale::Zh);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_labels_and_locale() {
        let yaml = r#"
            model:
              api_key: k
              endpoint_id: ep
              base_url: "http://localhost:9000/v1/"
            fields:
              name: Name
              attachment: Attachment
              identifier: Identifier
            locale: en
        "#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.fields.name, "Name");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(
            config.model.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn test_validate_rejects_missing_secrets() {
        let mut config = valid();
        config.model.api_key = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = valid();
        config.model.endpoint_id = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = valid();
        config.model.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", valid().model);
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("ep-123"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "model:\n  api_key: k\n  endpoint_id: ep\nlocale: en\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.model.endpoint_id, "ep");
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_find_config_path_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "locale: zh\n").unwrap();
        let found = find_config_path(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = parse_config("model: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
