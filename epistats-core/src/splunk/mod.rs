//! Splunk search API integration
//!
//! This module covers the outbound side of a refresh cycle:
//! - [`SplunkClient`] issues one parametrized search per metric
//! - [`parse_results`] normalizes the newline-delimited response bodies
//!   into [`QueryResult`] lists, most-recent-first

pub mod client;
pub mod response;

pub use client::SplunkClient;
pub use response::{parse_results, QueryResult};
