// src/config.rs

//! Configuration loading utilities.
//!
//! CLI runs load a TOML file from disk. Lambda runs start from defaults,
//! apply environment overrides, and resolve the bucket name and SMTP
//! password from Parameter Store and Secrets Manager.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// SSM parameter holding the snapshot bucket name.
pub const BUCKET_PARAMETER: &str = "/jobwatch/s3BucketName";

/// Load configuration from a TOML file.
///
/// Falls back to defaults if loading fails.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path);
    config.validate()?;
    Ok(config)
}

/// Build configuration for the Lambda environment.
///
/// Starts from defaults and applies environment variable overrides.
pub fn load_lambda_config() -> Result<Config> {
    let mut config = Config::default();

    if let Ok(url) = std::env::var("SOURCE_URL") {
        config.source.url = url;
    }
    if let Ok(host) = std::env::var("ALLOWED_HOST") {
        config.source.allowed_host = host;
    }
    if let Ok(allow) = std::env::var("ALLOW_EMPTY_FETCH") {
        config.source.allow_empty = matches!(allow.as_str(), "1" | "true" | "TRUE" | "True");
    }
    if let Ok(timeout) = std::env::var("HTTP_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.http.timeout_secs = secs;
        }
    }
    if let Ok(key) = std::env::var("SNAPSHOT_KEY") {
        config.storage.snapshot_key = key;
    }
    // Lambda's writable filesystem is /tmp
    config.storage.work_dir = std::env::var("WORK_DIR")
        .unwrap_or_else(|_| "/tmp".to_string())
        .into();
    if let Ok(from) = std::env::var("NOTIFY_FROM") {
        config.notify.from = from;
    }
    if let Ok(to) = std::env::var("NOTIFY_TO") {
        config.notify.to = to;
    }
    if let Ok(name) = std::env::var("SMTP_SECRET_NAME") {
        config.notify.secret_name = name;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(feature = "lambda")]
pub use aws::{resolve_bucket_name, resolve_smtp_password};

#[cfg(feature = "lambda")]
mod aws {
    use tracing::info;

    use crate::error::{AppError, Result};

    /// Resolve the snapshot bucket name from Parameter Store.
    ///
    /// The bucket is provisioned out-of-band; a missing parameter means no
    /// run can proceed, so this is fatal.
    pub async fn resolve_bucket_name(
        client: &aws_sdk_ssm::Client,
        parameter_name: &str,
    ) -> Result<String> {
        let output = client
            .get_parameter()
            .name(parameter_name)
            .with_decryption(false)
            .send()
            .await
            .map_err(|e| {
                AppError::config(format!(
                    "failed to read parameter {parameter_name}: {}",
                    e.into_service_error()
                ))
            })?;

        let bucket = output
            .parameter()
            .and_then(|p| p.value())
            .ok_or_else(|| AppError::config(format!("parameter {parameter_name} has no value")))?
            .to_string();

        info!("Resolved snapshot bucket from {}", parameter_name);
        Ok(bucket)
    }

    /// Resolve the SMTP password from Secrets Manager.
    pub async fn resolve_smtp_password(
        client: &aws_sdk_secretsmanager::Client,
        secret_name: &str,
    ) -> Result<String> {
        let output = client
            .get_secret_value()
            .secret_id(secret_name)
            .send()
            .await
            .map_err(|e| {
                AppError::config(format!(
                    "failed to read secret {secret_name}: {}",
                    e.into_service_error()
                ))
            })?;

        output
            .secret_string()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::config(format!("secret {secret_name} has no string value")))
    }
}
