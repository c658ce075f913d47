use crate::errors::{ExtractionError, ExtractionResult};
use crate::models::backend::Credential;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// API base URL, `BPA_API_URL` or [`DEFAULT_API_URL`]
pub static API_URL: Lazy<String> =
    Lazy::new(|| env::var("BPA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()));

/// Session token from `BPA_API_TOKEN`, if set
pub static API_TOKEN: Lazy<Option<String>> =
    Lazy::new(|| env::var("BPA_API_TOKEN").ok().filter(|t| !t.trim().is_empty()));

/// Where the backend lives and which session to use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.clone(),
            token: API_TOKEN.clone(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Bearer credential for the configured token
    pub fn credential(&self) -> Option<Credential> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Credential::bearer)
    }

    /// Base URL normalized with a trailing slash so relative joins append
    pub fn base_url(&self) -> ExtractionResult<Url> {
        let trimmed = self.api_url.trim();
        if trimmed.is_empty() {
            return Err(ExtractionError::Config("API URL is empty".to_string()));
        }
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Ok(Url::parse(&normalized)?)
    }
}

/// Pacing and log shaping for the extraction console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Pause that keeps the connect phase visible
    pub connect_pause_ms: u64,
    /// Pause between the synthesized phases after the download
    pub step_pause_ms: u64,
    /// Warnings logged individually after a successful run
    pub warning_log_cap: usize,
    /// Correction types listed in the process phase
    pub top_correction_types: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            connect_pause_ms: 500,
            step_pause_ms: 300,
            warning_log_cap: 3,
            top_correction_types: 3,
        }
    }
}

impl TrackerConfig {
    pub fn connect_pause(&self) -> Duration {
        Duration::from_millis(self.connect_pause_ms)
    }

    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8000/api");
        let url = config.base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("biserver/test-connection").unwrap().as_str(),
            "http://localhost:8000/api/biserver/test-connection"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ClientConfig::new("").base_url().is_err());
        assert!(ClientConfig::new("not a url").base_url().is_err());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = ClientConfig::new("http://h/api").with_token("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_credential_from_token() {
        let config = ClientConfig::new("http://h/api");
        assert!(config.credential().is_none());
        assert!(config.clone().with_token("  ").credential().is_none());
        assert_eq!(
            config.with_token(" abc ").credential(),
            Some(Credential::bearer("abc"))
        );
    }

    #[test]
    fn test_tracker_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.connect_pause(), Duration::from_millis(500));
        assert_eq!(config.step_pause(), Duration::from_millis(300));
        assert_eq!(config.warning_log_cap, 3);

        let partial: TrackerConfig = serde_json::from_str(r#"{"step_pause_ms": 0}"#).unwrap();
        assert_eq!(partial.step_pause_ms, 0);
        assert_eq!(partial.connect_pause_ms, 500);
    }
}
