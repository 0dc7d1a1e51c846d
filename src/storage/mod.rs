//! Snapshot storage abstractions.
//!
//! A snapshot is the serialized job collection last known to the watcher,
//! stored as opaque bytes under a single fixed key. Exactly one snapshot
//! exists per key; writes are last-write-wins and no history is kept.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the stored snapshot bytes.
    ///
    /// Returns `Ok(None)` if the key has never been written. Transient
    /// access failures are errors, never `None`, so a flaky store can't be
    /// mistaken for "no baseline yet".
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the stored snapshot.
    ///
    /// Durability is confirmed before returning: once `put` succeeds,
    /// subsequent `get` calls observe the new value.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of a key, for log output.
    fn location(&self, key: &str) -> String;
}
