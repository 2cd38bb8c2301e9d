//! Command-line front end for waitlist registration reconciliation.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
