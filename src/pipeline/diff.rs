//! Diff calculation between job snapshots.
//!
//! Snapshots are compared structurally, aligned by posting URL rather than
//! by byte position, so serialization formatting and element order never
//! register as changes. Only real content differences (added or removed
//! postings, changed fields) survive into the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Job;

/// A single field that changed on an existing posting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldChange {
    /// Posting URL the change belongs to
    pub url: String,
    /// Field name ("title" or "location")
    pub field: String,
    /// Value in the previous snapshot
    pub previous: String,
    /// Value in the current snapshot
    pub current: String,
}

/// Structural difference between two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobDiff {
    /// Postings present now but not before
    pub added: Vec<Job>,
    /// Postings present before but gone now
    pub removed: Vec<Job>,
    /// Field-level changes on postings present in both
    pub changed: Vec<FieldChange>,
}

impl JobDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.changed.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }

    /// Render the diff as line-oriented text for display.
    ///
    /// The output is plain text suitable for a monospace block.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        for job in &self.added {
            lines.push(format!("+ {} ({}) {}", job.title, job.location, job.url));
        }
        for job in &self.removed {
            lines.push(format!("- {} ({}) {}", job.title, job.location, job.url));
        }
        for change in &self.changed {
            lines.push(format!(
                "~ {}: {} \"{}\" -> \"{}\"",
                change.url, change.field, change.previous, change.current
            ));
        }

        lines.join("\n")
    }
}

/// Calculate the structural diff between previous and current listings.
pub fn calculate_diff(previous: &[Job], current: &[Job]) -> JobDiff {
    let prev_map: HashMap<&str, &Job> = previous.iter().map(|j| (j.key(), j)).collect();
    let curr_map: HashMap<&str, &Job> = current.iter().map(|j| (j.key(), j)).collect();

    // Added: in current but not in previous. Iterate the slices, not the
    // maps, so output order follows the snapshot order.
    let added: Vec<Job> = current
        .iter()
        .filter(|j| !prev_map.contains_key(j.key()))
        .cloned()
        .collect();

    // Removed: in previous but not in current
    let removed: Vec<Job> = previous
        .iter()
        .filter(|j| !curr_map.contains_key(j.key()))
        .cloned()
        .collect();

    // Changed: in both but with a differing field
    let mut changed = Vec::new();
    for prev in previous {
        let Some(curr) = curr_map.get(prev.key()) else {
            continue;
        };
        if prev.title != curr.title {
            changed.push(FieldChange {
                url: prev.url.clone(),
                field: "title".to_string(),
                previous: prev.title.clone(),
                current: curr.title.clone(),
            });
        }
        if prev.location != curr.location {
            changed.push(FieldChange {
                url: prev.url.clone(),
                field: "location".to_string(),
                previous: prev.location.clone(),
                current: curr.location.clone(),
            });
        }
    }

    JobDiff {
        added,
        removed,
        changed,
    }
}

/// Compare two serialized snapshots.
///
/// Byte-identical inputs short-circuit to an empty diff without parsing.
/// Otherwise both sides are deserialized and compared structurally, so a
/// formatting-only difference (key order, whitespace, element order) still
/// produces an empty diff.
pub fn diff_snapshots(previous: &[u8], current: &[u8]) -> Result<JobDiff> {
    if previous == current {
        return Ok(JobDiff::default());
    }

    let prev: Vec<Job> = serde_json::from_slice(previous)?;
    let curr: Vec<Job> = serde_json::from_slice(current)?;
    Ok(calculate_diff(&prev, &curr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(title: &str, location: &str, url: &str) -> Job {
        Job {
            title: title.to_string(),
            location: location.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_no_changes() {
        let prev = vec![make_job("A", "L1", "u1"), make_job("B", "L2", "u2")];
        let curr = prev.clone();

        let diff = calculate_diff(&prev, &curr);
        assert!(!diff.has_changes());
        assert_eq!(diff.change_count(), 0);
    }

    #[test]
    fn test_reflexive_on_empty() {
        let jobs: Vec<Job> = Vec::new();
        let diff = calculate_diff(&jobs, &jobs);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_additions() {
        let prev = vec![make_job("A", "L1", "u1")];
        let curr = vec![make_job("A", "L1", "u1"), make_job("B", "L2", "u2")];

        let diff = calculate_diff(&prev, &curr);
        assert!(diff.has_changes());
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].title, "B");
        assert!(diff.removed.is_empty());
        assert!(diff.changed.is_empty());

        let rendered = diff.render();
        assert!(rendered.contains("B"));
        assert!(rendered.contains("L2"));
        assert!(rendered.contains("u2"));
    }

    #[test]
    fn test_removals() {
        let prev = vec![make_job("A", "L1", "u1"), make_job("B", "L2", "u2")];
        let curr = vec![make_job("A", "L1", "u1")];

        let diff = calculate_diff(&prev, &curr);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].url, "u2");
    }

    #[test]
    fn test_field_changes() {
        let prev = vec![make_job("Engineer", "Austin", "u1")];
        let curr = vec![make_job("Senior Engineer", "Remote", "u1")];

        let diff = calculate_diff(&prev, &curr);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.changed.len(), 2);
        assert_eq!(diff.changed[0].field, "title");
        assert_eq!(diff.changed[0].previous, "Engineer");
        assert_eq!(diff.changed[0].current, "Senior Engineer");
        assert_eq!(diff.changed[1].field, "location");
    }

    #[test]
    fn test_mixed_changes() {
        let prev = vec![
            make_job("Keep", "L1", "u1"),
            make_job("Old Title", "L2", "u2"),
            make_job("Gone", "L3", "u3"),
        ];
        let curr = vec![
            make_job("Keep", "L1", "u1"),
            make_job("New Title", "L2", "u2"),
            make_job("Fresh", "L4", "u4"),
        ];

        let diff = calculate_diff(&prev, &curr);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].url, "u4");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].url, "u3");
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].current, "New Title");
    }

    #[test]
    fn test_reordering_is_not_a_change() {
        // Element order is not semantically meaningful: the same set of
        // postings in a different sequence is an empty diff by contract.
        let prev = vec![make_job("A", "L1", "u1"), make_job("B", "L2", "u2")];
        let curr = vec![make_job("B", "L2", "u2"), make_job("A", "L1", "u1")];

        let diff = calculate_diff(&prev, &curr);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_diff_snapshots_identical_bytes_skip_parse() {
        // Not even valid JSON: the byte pre-check must short-circuit.
        let bytes = b"not json at all";
        let diff = diff_snapshots(bytes, bytes).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_diff_snapshots_formatting_only() {
        let jobs = vec![make_job("A", "L1", "u1")];
        let compact = serde_json::to_vec(&jobs).unwrap();
        let pretty = serde_json::to_vec_pretty(&jobs).unwrap();
        assert_ne!(compact, pretty);

        let diff = diff_snapshots(&compact, &pretty).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_diff_snapshots_change_branch() {
        let prev = serde_json::to_vec_pretty(&vec![make_job("A", "L1", "u1")]).unwrap();
        let curr = serde_json::to_vec_pretty(&vec![
            make_job("A", "L1", "u1"),
            make_job("B", "L2", "u2"),
        ])
        .unwrap();

        let diff = diff_snapshots(&prev, &curr).unwrap();
        assert!(diff.has_changes());
        let rendered = diff.render();
        assert!(rendered.contains("B") && rendered.contains("L2") && rendered.contains("u2"));
    }

    #[test]
    fn test_diff_snapshots_malformed_json_is_error() {
        assert!(diff_snapshots(b"[]", b"{broken").is_err());
    }

    #[test]
    fn test_empty_to_full_and_back() {
        let none: Vec<Job> = vec![];
        let some = vec![make_job("A", "L1", "u1")];

        let grow = calculate_diff(&none, &some);
        assert_eq!(grow.added.len(), 1);
        assert!(grow.removed.is_empty());

        let shrink = calculate_diff(&some, &none);
        assert!(shrink.added.is_empty());
        assert_eq!(shrink.removed.len(), 1);
    }
}
