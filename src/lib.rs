// src/lib.rs

//! jobwatch library
//!
//! Periodically scrapes a job board, compares the result against the last
//! stored snapshot, and sends an email notification when listings change.

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "lambda")]
pub mod lambda;
