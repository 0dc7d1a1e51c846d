//! Lambda entry point for the jobwatch watcher.
//!
//! This binary runs on AWS Lambda with a cron trigger.
//!
//! ## Environment Variables
//!
//! - `SOURCE_URL`: Board page to watch
//! - `ALLOWED_HOST`: Host restriction for outbound fetches
//! - `ALLOW_EMPTY_FETCH`: Accept an empty scrape over a non-empty snapshot
//! - `SNAPSHOT_KEY`: S3 key for the snapshot (default: `jobs.json`)
//! - `WORK_DIR`: Writable directory for the working file (default: `/tmp`)
//! - `NOTIFY_FROM` / `NOTIFY_TO`: Email identity
//! - `SMTP_SECRET_NAME`: Secrets Manager secret holding the SMTP password
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

#[cfg(feature = "lambda")]
use lambda_runtime::service_fn;
#[cfg(feature = "lambda")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("jobwatch Lambda starting...");

    lambda_runtime::run(service_fn(jobwatch::lambda::handler)).await
}

#[cfg(not(feature = "lambda"))]
fn main() {
    eprintln!("This binary requires the 'lambda' feature.");
    eprintln!("Build with: cargo build --bin jobwatch-lambda --features lambda");
    std::process::exit(1);
}
