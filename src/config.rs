use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, Result};

/// Program configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worksection login page.
    pub login_url: String,
    /// Explicit Chrome/Edge binary; `None` lets chromiumoxide auto-detect.
    pub chrome_executable: Option<String>,
    /// Leave secondary tabs open after a batch (for manual inspection).
    pub keep_tabs_open: bool,
    /// Fallback wait for view-layer rendering that exposes no readiness signal.
    pub settle_delay_ms: u64,
    /// Inter-keystroke delay when typing into the login form.
    pub type_delay_ms: u64,
    /// Bounded wait for a selector to appear.
    pub element_timeout_ms: u64,
    /// Bounded wait for a navigation to reach network-idle.
    pub navigation_timeout_ms: u64,
    /// Quiet window for the network-idle heuristic.
    pub network_quiet_ms: u64,
    /// Directory holding the users.json store.
    pub storage_dir: String,
    /// Folder scanned for pending batch TOML files.
    pub report_folder: String,
    /// Credentials older than this are treated as expired.
    pub credential_max_age_days: i64,
    // --- LLM provider chain ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// Local g4f fallback server (POST {base}/chat).
    pub g4f_server_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: "https://netronic.worksection.com/login/".to_string(),
            chrome_executable: None,
            keep_tabs_open: false,
            settle_delay_ms: 2000,
            type_delay_ms: 10,
            element_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
            network_quiet_ms: 500,
            storage_dir: "storage".to_string(),
            report_folder: "pending_reports".to_string(),
            credential_max_age_days: 30,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            g4f_server_url: "http://localhost:5000".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            login_url: std::env::var("LOGIN_URL").unwrap_or(default.login_url),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            keep_tabs_open: std::env::var("KEEP_TABS_OPEN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.keep_tabs_open),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_ms),
            type_delay_ms: std::env::var("TYPE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.type_delay_ms),
            element_timeout_ms: std::env::var("ELEMENT_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.element_timeout_ms),
            navigation_timeout_ms: std::env::var("NAVIGATION_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.navigation_timeout_ms),
            network_quiet_ms: std::env::var("NETWORK_QUIET_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.network_quiet_ms),
            storage_dir: std::env::var("STORAGE_DIR").unwrap_or(default.storage_dir),
            report_folder: std::env::var("REPORT_FOLDER").unwrap_or(default.report_folder),
            credential_max_age_days: std::env::var("CREDENTIAL_MAX_AGE_DAYS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.credential_max_age_days),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            g4f_server_url: std::env::var("G4F_SERVER_URL").unwrap_or(default.g4f_server_url),
        }
    }

    /// Load from a TOML file; missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Storage {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| AppError::Toml {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// `config.toml` if present, otherwise environment variables.
    pub fn load() -> Result<Self> {
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else {
            Ok(Self::from_env())
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn type_delay(&self) -> Duration {
        Duration::from_millis(self.type_delay_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn network_quiet(&self) -> Duration {
        Duration::from_millis(self.network_quiet_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_worksection_login() {
        let config = Config::default();
        assert!(config.login_url.ends_with("/login/"));
        assert!(!config.keep_tabs_open);
        assert_eq!(config.credential_max_age_days, 30);
    }

    #[test]
    fn from_file_accepts_partial_toml() {
        let dir = std::env::temp_dir().join("bug_report_submit_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "keep_tabs_open = true\nsettle_delay_ms = 500\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.keep_tabs_open);
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
        // untouched keys keep their defaults
        assert_eq!(config.type_delay_ms, Config::default().type_delay_ms);
    }
}
