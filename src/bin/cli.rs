//! jobwatch CLI
//!
//! Local execution entry point. For AWS Lambda, use `jobwatch-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobwatch::{
    config::load_config,
    error::{AppError, Result},
    models::Job,
    notify::{EmailNotifier, NoopNotifier, Notifier},
    pipeline::{RunOutcome, run_watch},
    services::{JobScraper, JobSource},
    storage::{LocalStore, SnapshotStore},
};

/// jobwatch - Job Board Change Watcher
#[derive(Parser, Debug)]
#[command(name = "jobwatch", version, about = "Job board change watcher")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, default_value = "jobwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one watch cycle against the local snapshot store
    Watch {
        /// Send email on changes (requires SMTP_PASSWORD in the environment)
        #[arg(long)]
        notify: bool,
    },

    /// Fetch and print the current listings without touching the snapshot
    Fetch,

    /// Validate the configuration file
    Validate,

    /// Show the stored snapshot
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Watch { notify } => {
            let scraper = JobScraper::new(config.source.clone(), &config.http)?;
            let store = LocalStore::new(&config.storage.local_dir);

            let notifier: Box<dyn Notifier> = if notify {
                let password = std::env::var("SMTP_PASSWORD").map_err(|_| {
                    AppError::config("--notify requires SMTP_PASSWORD in the environment")
                })?;
                Box::new(EmailNotifier::new(config.notify.clone(), password)?)
            } else {
                Box::new(NoopNotifier)
            };

            let outcome = run_watch(&config, &scraper, &store, notifier.as_ref()).await?;
            match outcome {
                RunOutcome::BaselineCreated { count } => {
                    println!("Baseline created with {count} listings.");
                }
                RunOutcome::Unchanged { count } => {
                    println!("No changes ({count} listings).");
                }
                RunOutcome::EmptyRejected { previous_count } => {
                    println!(
                        "Empty fetch rejected; snapshot of {previous_count} listings kept."
                    );
                }
                RunOutcome::Changed { diff, notified } => {
                    println!("{}", diff.render());
                    println!(
                        "{} changes detected; notification {}.",
                        diff.change_count(),
                        if notified { "sent" } else { "suppressed or failed" }
                    );
                }
            }
        }

        Command::Fetch => {
            let scraper = JobScraper::new(config.source.clone(), &config.http)?;
            let jobs = scraper.fetch().await?;
            print_jobs(&jobs);
        }

        Command::Validate => {
            config.validate()?;
            println!("Configuration OK: watching {}", config.source.url);
        }

        Command::Info => {
            let store = LocalStore::new(&config.storage.local_dir);
            let key = &config.storage.snapshot_key;
            match store.get(key).await? {
                None => println!("No snapshot at {}", store.location(key)),
                Some(bytes) => {
                    let jobs: Vec<Job> = serde_json::from_slice(&bytes)?;
                    println!("Snapshot at {} ({} listings):", store.location(key), jobs.len());
                    print_jobs(&jobs);
                }
            }
        }
    }

    Ok(())
}

fn print_jobs(jobs: &[Job]) {
    for (i, job) in jobs.iter().enumerate() {
        println!("{}. {}", i + 1, job.format("{title} - {location}\n   {url}"));
    }
    if jobs.is_empty() {
        println!("(no listings)");
    }
}
