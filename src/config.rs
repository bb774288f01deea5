//! Configuration for the completion backend.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file by the binary. The backend implementation is chosen here, once, so the
//! rest of the pipeline never branches on mock mode.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{CompletionBackend, MockBackend, OpenAiBackend, DEFAULT_BASE_URL};
use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV: &str = "MODEL";
pub const USE_MOCK_ENV: &str = "USE_MOCK_LLM";
pub const MOCK_RECORD_ENV: &str = "MOCK_LLM_RECORD_FILE";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Per-call completion settings. Immutable for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub model: String,
    pub use_mock: bool,
    pub mock_record_path: Option<PathBuf>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            use_mock: false,
            mock_record_path: None,
        }
    }
}

/// Interpret an environment flag; "1", "true", "yes" and "on" enable it.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Everything needed to construct a completion backend.
#[derive(Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub completion: CompletionConfig,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, treating empty values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: get(API_KEY_ENV),
            base_url: get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            completion: CompletionConfig {
                model: get(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                use_mock: get(USE_MOCK_ENV).map(|v| is_truthy(&v)).unwrap_or(false),
                mock_record_path: get(MOCK_RECORD_ENV).map(PathBuf::from),
            },
        }
    }

    /// Override the model, e.g. from a command-line flag.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.completion.model = model;
        }
        self
    }

    /// Force mock mode on. Passing `false` keeps the configured value.
    pub fn with_mock(mut self, force: bool) -> Self {
        if force {
            self.completion.use_mock = true;
        }
        self
    }

    pub fn completion_config(&self) -> CompletionConfig {
        self.completion.clone()
    }

    /// Construct the backend selected by these settings.
    ///
    /// Without mock mode an API key is required; its absence is reported here,
    /// before any request is attempted.
    pub fn backend(&self) -> Result<Arc<dyn CompletionBackend>, ConfigError> {
        if self.completion.use_mock {
            warn!("Mock mode enabled; completions will not reach the model");
            return Ok(Arc::new(MockBackend::from_record_file(
                self.completion.mock_record_path.as_deref(),
            )));
        }

        let api_key = self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        let backend = OpenAiBackend::new(&self.base_url, api_key)?;
        info!(
            "Using completion endpoint {} with model {}",
            backend.endpoint(),
            self.completion.model
        );
        Ok(Arc::new(backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_is_truthy() {
        for value in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(is_truthy(value), "{value} should be truthy");
        }
        for value in ["0", "false", "no", "", "maybe"] {
            assert!(!is_truthy(value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]);
        assert!(s.api_key.is_none());
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.completion_config(), CompletionConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let s = settings(&[
            (API_KEY_ENV, "sk-123"),
            (BASE_URL_ENV, "http://localhost:8080/v1"),
            (MODEL_ENV, "gpt-4o-mini"),
            (USE_MOCK_ENV, "true"),
            (MOCK_RECORD_ENV, "fixtures/llm.txt"),
        ]);
        assert_eq!(s.api_key.as_deref(), Some("sk-123"));
        assert_eq!(s.base_url, "http://localhost:8080/v1");
        assert_eq!(s.completion.model, "gpt-4o-mini");
        assert!(s.completion.use_mock);
        assert_eq!(
            s.completion.mock_record_path,
            Some(PathBuf::from("fixtures/llm.txt"))
        );
    }

    #[test]
    fn test_empty_values_are_unset() {
        let s = settings(&[(API_KEY_ENV, ""), (MODEL_ENV, "  ")]);
        assert!(s.api_key.is_none());
        assert_eq!(s.completion.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[(MODEL_ENV, "gpt-4o-mini")])
            .with_model(Some("o3".to_string()))
            .with_mock(true);
        assert_eq!(s.completion.model, "o3");
        assert!(s.completion.use_mock);

        let s = settings(&[(USE_MOCK_ENV, "1")]).with_model(None).with_mock(false);
        assert_eq!(s.completion.model, DEFAULT_MODEL);
        assert!(s.completion.use_mock);
    }

    #[test]
    fn test_missing_api_key_is_fatal_without_mock() {
        let s = settings(&[]);
        assert!(matches!(s.backend(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_mock_needs_no_api_key() {
        let s = settings(&[(USE_MOCK_ENV, "yes")]);
        assert!(s.backend().is_ok());
    }

    #[test]
    fn test_live_backend_with_key() {
        let s = settings(&[(API_KEY_ENV, "sk-123")]);
        assert!(s.backend().is_ok());

        let s = settings(&[(API_KEY_ENV, "sk-123"), (BASE_URL_ENV, "::nope::")]);
        assert!(matches!(
            s.backend(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }
}
