use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub outreach: OutreachConfig,
}

#[derive(Deserialize, Clone)]
pub struct OracleConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Manual Debug impl to avoid leaking the API key
impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    /// host:port of a Chrome started with `--remote-debugging-port`.
    #[serde(default = "default_debug_endpoint")]
    pub debug_endpoint: String,
    /// Local chromedriver binary. When unset, a driver must already listen on `driver_url`.
    #[serde(default)]
    pub driver_path: Option<PathBuf>,
    #[serde(default = "default_driver_url")]
    pub driver_url: String,
    #[serde(default = "default_page_load_wait_secs")]
    pub page_load_wait_secs: u64,
    #[serde(default = "default_profile_load_delay_secs")]
    pub profile_load_delay_secs: u64,
    #[serde(default = "default_search_load_delay_secs")]
    pub search_load_delay_secs: u64,
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_endpoint: default_debug_endpoint(),
            driver_path: None,
            driver_url: default_driver_url(),
            page_load_wait_secs: default_page_load_wait_secs(),
            profile_load_delay_secs: default_profile_load_delay_secs(),
            search_load_delay_secs: default_search_load_delay_secs(),
            max_search_results: default_max_search_results(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutreachConfig {
    #[serde(default = "default_profiles_file")]
    pub profiles_file: PathBuf,
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
    #[serde(default = "default_pacing_min_ms")]
    pub pacing_min_ms: u64,
    #[serde(default = "default_pacing_max_ms")]
    pub pacing_max_ms: u64,
    #[serde(default = "default_send_delay_min_ms")]
    pub send_delay_min_ms: u64,
    #[serde(default = "default_send_delay_max_ms")]
    pub send_delay_max_ms: u64,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            profiles_file: default_profiles_file(),
            audit_log: None,
            pacing_min_ms: default_pacing_min_ms(),
            pacing_max_ms: default_pacing_max_ms(),
            send_delay_min_ms: default_send_delay_min_ms(),
            send_delay_max_ms: default_send_delay_max_ms(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_debug_endpoint() -> String {
    "127.0.0.1:9222".to_string()
}

fn default_driver_url() -> String {
    "http://127.0.0.1:9515".to_string()
}

fn default_page_load_wait_secs() -> u64 {
    10
}

fn default_profile_load_delay_secs() -> u64 {
    3
}

fn default_search_load_delay_secs() -> u64 {
    3
}

fn default_max_search_results() -> usize {
    5
}

fn default_profiles_file() -> PathBuf {
    PathBuf::from("linkedin_profiles.json")
}

fn default_pacing_min_ms() -> u64 {
    2_000
}

fn default_pacing_max_ms() -> u64 {
    5_000
}

fn default_send_delay_min_ms() -> u64 {
    3_000
}

fn default_send_delay_max_ms() -> u64 {
    7_000
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("linkreach").required(false));
        }

        // Environment variable overrides with LINKREACH_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("LINKREACH")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// The LLM key, or a configuration error naming the variable to set.
    pub fn oracle_api_key(&self) -> Result<&str> {
        match self.oracle.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(AppError::Config(
                "oracle API key is not set (set LINKREACH_ORACLE__API_KEY or oracle.api_key)"
                    .to_string(),
            )),
        }
    }
}

impl BrowserConfig {
    pub fn page_load_wait(&self) -> Duration {
        Duration::from_secs(self.page_load_wait_secs)
    }

    pub fn profile_load_delay(&self) -> Duration {
        Duration::from_secs(self.profile_load_delay_secs)
    }

    pub fn search_load_delay(&self) -> Duration {
        Duration::from_secs(self.search_load_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_pacing() {
        let config = AppConfig::default();
        assert_eq!(config.browser.debug_endpoint, "127.0.0.1:9222");
        assert_eq!(config.browser.max_search_results, 5);
        assert_eq!(config.outreach.send_delay_min_ms, 3_000);
        assert_eq!(config.outreach.send_delay_max_ms, 7_000);
        assert_eq!(
            config.outreach.profiles_file,
            PathBuf::from("linkedin_profiles.json")
        );
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = AppConfig::default();
        let err = config.oracle_api_key().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("LINKREACH_ORACLE__API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_config_error() {
        let mut config = AppConfig::default();
        config.oracle.api_key = Some("   ".to_string());
        assert!(config.oracle_api_key().is_err());

        config.oracle.api_key = Some("sk-test".to_string());
        assert_eq!(config.oracle_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = OracleConfig::default();
        config.api_key = Some("sk-secret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkreach.toml");
        std::fs::write(
            &path,
            r#"
[oracle]
api_key = "sk-file"
model = "claude-test"

[outreach]
profiles_file = "leads.json"
pacing_min_ms = 0
pacing_max_ms = 0
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(config.oracle.model, "claude-test");
        assert_eq!(config.oracle_api_key().unwrap(), "sk-file");
        assert_eq!(config.outreach.profiles_file, PathBuf::from("leads.json"));
        assert_eq!(config.outreach.pacing_max_ms, 0);
        assert_eq!(config.browser.page_load_wait_secs, 10);
    }
}
