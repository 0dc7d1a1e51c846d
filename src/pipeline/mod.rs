//! Pipeline entry points for watcher operations.
//!
//! - `diff`: structural comparison of two stored snapshots
//! - `watch`: the fetch → compare → persist → notify cycle

pub mod diff;
pub mod watch;

pub use diff::{JobDiff, diff_snapshots};
pub use watch::{RunOutcome, run_watch};
