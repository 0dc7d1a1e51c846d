//! Job listing data structure.

use serde::{Deserialize, Serialize};

/// A single job posting scraped from the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    /// Posting title
    pub title: String,

    /// Office or remote location
    pub location: String,

    /// Full URL to the posting
    pub url: String,
}

impl Job {
    /// Stable identifier used to align jobs across snapshots.
    ///
    /// The posting URL is the intended unique key; uniqueness is not
    /// enforced, duplicates keep the last occurrence during alignment.
    pub fn key(&self) -> &str {
        &self.url
    }

    /// Format the job for display using a template.
    ///
    /// Supported placeholders: `{title}`, `{location}`, `{url}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{title}", &self.title)
            .replace("{location}", &self.location)
            .replace("{url}", &self.url)
    }
}
