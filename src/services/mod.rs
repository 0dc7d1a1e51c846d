//! Services for fetching job listings.

pub mod jobs;

pub use jobs::{JobScraper, JobSource};
