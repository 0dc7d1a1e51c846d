//! Data models for the watcher.

pub mod config;
pub mod job;

pub use config::{Config, HttpConfig, JobSelectors, NotifyConfig, SourceConfig, StorageConfig};
pub use job::Job;
