//! Application configuration structures.
//!
//! The watched source (target URL, allowed host, selectors) and the storage
//! key are configuration values rather than constants, so additional boards
//! can be watched by pointing the same pipeline at a different config file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Watched job board settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Snapshot storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Email notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            return Err(AppError::validation("source.url is empty"));
        }
        if self.source.allowed_host.trim().is_empty() {
            return Err(AppError::validation("source.allowed_host is empty"));
        }
        if self.source.selectors.listing_selector.trim().is_empty() {
            return Err(AppError::validation("source.selectors.listing_selector is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.storage.snapshot_key.trim().is_empty() {
            return Err(AppError::validation("storage.snapshot_key is empty"));
        }
        if self.notify.smtp_port == 0 {
            return Err(AppError::validation("notify.smtp_port must be > 0"));
        }
        Ok(())
    }
}

/// Watched job board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Page to scrape
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Requests outside this host are refused
    #[serde(default = "defaults::allowed_host")]
    pub allowed_host: String,

    /// Accept an empty scrape result even when the stored snapshot is
    /// non-empty. Off by default so a degraded fetch cannot overwrite a
    /// good baseline with nothing.
    #[serde(default)]
    pub allow_empty: bool,

    /// CSS selectors for extracting listings
    #[serde(default)]
    pub selectors: JobSelectors,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            allowed_host: defaults::allowed_host(),
            allow_empty: false,
            selectors: JobSelectors::default(),
        }
    }
}

/// CSS selectors for extracting job listings from the board page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSelectors {
    /// Selector for each listing element on the page
    #[serde(default = "defaults::listing_selector")]
    pub listing_selector: String,

    /// Selector for the title element within a listing
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Selector for the location element within a listing
    #[serde(default = "defaults::location_selector")]
    pub location_selector: String,

    /// Selector for the link element within a listing
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::attr_name")]
    pub attr_name: String,
}

impl Default for JobSelectors {
    fn default() -> Self {
        Self {
            listing_selector: defaults::listing_selector(),
            title_selector: defaults::title_selector(),
            location_selector: defaults::location_selector(),
            link_selector: defaults::link_selector(),
            attr_name: defaults::attr_name(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key under which the snapshot is stored (also the working file name)
    #[serde(default = "defaults::snapshot_key")]
    pub snapshot_key: String,

    /// Directory for the local working file written each run
    #[serde(default = "defaults::work_dir")]
    pub work_dir: PathBuf,

    /// Root directory for the local store (CLI runs)
    #[serde(default = "defaults::local_dir")]
    pub local_dir: PathBuf,
}

impl StorageConfig {
    /// Path of the local working file for the current run.
    pub fn work_file(&self) -> PathBuf {
        self.work_dir.join(&self.snapshot_key)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_key: defaults::snapshot_key(),
            work_dir: defaults::work_dir(),
            local_dir: defaults::local_dir(),
        }
    }
}

/// Email notification settings.
///
/// The SMTP password itself never lives in the config file; it is resolved
/// at startup from Secrets Manager (lambda) or the environment (CLI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Sender address (also the SMTP username)
    #[serde(default = "defaults::notify_address")]
    pub from: String,

    /// Recipient address
    #[serde(default = "defaults::notify_address")]
    pub to: String,

    /// Fixed subject line
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// SMTP relay host
    #[serde(default = "defaults::smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port (STARTTLS)
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Name of the secret holding the SMTP password
    #[serde(default = "defaults::secret_name")]
    pub secret_name: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            from: defaults::notify_address(),
            to: defaults::notify_address(),
            subject: defaults::subject(),
            smtp_host: defaults::smtp_host(),
            smtp_port: defaults::smtp_port(),
            secret_name: defaults::secret_name(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn source_url() -> String {
        "https://job-boards.greenhouse.io/defenseunicorns".to_string()
    }

    pub fn allowed_host() -> String {
        "job-boards.greenhouse.io".to_string()
    }

    pub fn listing_selector() -> String {
        ".job-post".to_string()
    }

    pub fn title_selector() -> String {
        "p.body.body--medium".to_string()
    }

    pub fn location_selector() -> String {
        "p.body.body__secondary.body--metadata".to_string()
    }

    pub fn link_selector() -> String {
        "a".to_string()
    }

    pub fn attr_name() -> String {
        "href".to_string()
    }

    pub fn user_agent() -> String {
        "jobwatch/0.1 (+https://github.com/jobwatch)".to_string()
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn snapshot_key() -> String {
        "jobs.json".to_string()
    }

    pub fn work_dir() -> PathBuf {
        PathBuf::from(".")
    }

    pub fn local_dir() -> PathBuf {
        PathBuf::from("storage")
    }

    pub fn notify_address() -> String {
        "alerts@example.com".to_string()
    }

    pub fn subject() -> String {
        "Job Board Change".to_string()
    }

    pub fn smtp_host() -> String {
        "smtp.gmail.com".to_string()
    }

    pub fn smtp_port() -> u16 {
        587
    }

    pub fn secret_name() -> String {
        "SMTP_APP_PASSWORD".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.source.selectors.listing_selector, ".job-post");
        assert_eq!(config.storage.snapshot_key, "jobs.json");
        assert!(!config.source.allow_empty);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
            [source]
            url = "https://boards.example.com/acme"
            allowed_host = "boards.example.com"

            [http]
            timeout_secs = 10
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source.url, "https://boards.example.com/acme");
        assert_eq!(config.http.timeout_secs, 10);
        // Untouched sections keep their defaults
        assert_eq!(config.notify.smtp_port, 587);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = Config::default();
        config.source.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_work_file_joins_key() {
        let storage = StorageConfig {
            work_dir: PathBuf::from("/tmp"),
            ..StorageConfig::default()
        };
        assert_eq!(storage.work_file(), PathBuf::from("/tmp/jobs.json"));
    }
}
