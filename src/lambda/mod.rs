// src/lambda/mod.rs

//! AWS Lambda handler for the watcher.
//!
//! The function runs on a cron trigger. Each invocation:
//! 1. Resolves the snapshot bucket from Parameter Store
//! 2. Resolves the SMTP password from Secrets Manager
//! 3. Runs one watch cycle against S3-backed snapshot storage

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{BUCKET_PARAMETER, load_lambda_config, resolve_bucket_name, resolve_smtp_password};
use crate::error::Result;
use crate::notify::EmailNotifier;
use crate::pipeline::{RunOutcome, run_watch};
use crate::services::JobScraper;
use crate::storage::S3Store;

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    /// Skip email delivery even if changes are detected
    #[serde(default)]
    pub dry_run: bool,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct WatchResponse {
    /// Whether the run completed
    pub success: bool,

    /// Terminal state of the run
    pub outcome: String,

    /// Number of changes detected (0 unless the outcome is "changed")
    pub changes: usize,

    /// Whether a notification was delivered
    pub notified: bool,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<WatchRequest>,
) -> std::result::Result<WatchResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!("Starting watch run: dry_run={}", request.dry_run);

    match run(&request).await {
        Ok(mut response) => {
            response.success = true;
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Watch run completed: {} ({} changes) in {}ms",
                response.outcome, response.changes, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            error!("Watch run failed: {}", e);
            Ok(WatchResponse {
                success: false,
                outcome: "aborted".to_string(),
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal run logic.
async fn run(request: &WatchRequest) -> Result<WatchResponse> {
    let config = load_lambda_config()?;

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let ssm = aws_sdk_ssm::Client::new(&sdk_config);
    let bucket = resolve_bucket_name(&ssm, BUCKET_PARAMETER).await?;
    let store = S3Store::new(aws_sdk_s3::Client::new(&sdk_config), bucket);

    let scraper = JobScraper::new(config.source.clone(), &config.http)?;

    let outcome = if request.dry_run {
        let notifier = crate::notify::NoopNotifier;
        run_watch(&config, &scraper, &store, &notifier).await?
    } else {
        let secrets = aws_sdk_secretsmanager::Client::new(&sdk_config);
        let password = resolve_smtp_password(&secrets, &config.notify.secret_name).await?;
        let notifier = EmailNotifier::new(config.notify.clone(), password)?;
        run_watch(&config, &scraper, &store, &notifier).await?
    };

    Ok(describe(outcome, request.dry_run))
}

fn describe(outcome: RunOutcome, dry_run: bool) -> WatchResponse {
    match outcome {
        RunOutcome::BaselineCreated { count } => WatchResponse {
            outcome: format!("baseline_created ({count} listings)"),
            ..Default::default()
        },
        RunOutcome::Unchanged { .. } => WatchResponse {
            outcome: "unchanged".to_string(),
            ..Default::default()
        },
        RunOutcome::EmptyRejected { previous_count } => WatchResponse {
            outcome: format!("empty_fetch_rejected (snapshot has {previous_count})"),
            ..Default::default()
        },
        RunOutcome::Changed { diff, notified } => WatchResponse {
            outcome: "changed".to_string(),
            changes: diff.change_count(),
            // A dry run suppresses delivery, so it never counts as notified
            // even though the no-op backend reports success.
            notified: notified && !dry_run,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::JobDiff;

    #[test]
    fn test_watch_request_defaults() {
        let req: WatchRequest = serde_json::from_str("{}").unwrap();
        assert!(!req.dry_run);
    }

    #[test]
    fn test_watch_request_with_options() {
        let req: WatchRequest = serde_json::from_str(r#"{"dry_run": true}"#).unwrap();
        assert!(req.dry_run);
    }

    fn changed_outcome() -> RunOutcome {
        let diff = JobDiff {
            added: vec![crate::models::Job {
                title: "A".to_string(),
                location: "L".to_string(),
                url: "u".to_string(),
            }],
            ..JobDiff::default()
        };
        RunOutcome::Changed {
            diff,
            notified: true,
        }
    }

    #[test]
    fn test_describe_changed() {
        let response = describe(changed_outcome(), false);
        assert_eq!(response.outcome, "changed");
        assert_eq!(response.changes, 1);
        assert!(response.notified);
    }

    #[test]
    fn test_describe_dry_run_never_reports_notified() {
        // The no-op backend returns Ok, but nothing was delivered.
        let response = describe(changed_outcome(), true);
        assert_eq!(response.outcome, "changed");
        assert!(!response.notified);
    }
}
