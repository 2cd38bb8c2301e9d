//! Registry ingestion.
//!
//! Reads a waitlist registry CSV into [`Registration`](waitlist_model::Registration)
//! values: headers are matched to logical fields through built-in registry
//! aliases or configured overrides, dates are parsed from the layouts
//! registries export, and rows outside the study population are dropped.

mod columns;
mod dates;
mod error;
mod filter;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Columns ===
pub use columns::{ColumnMap, Field, normalize_header, parse_overrides};

// === Values ===
pub use dates::{InvalidDate, is_null, parse_date};

// === Loading ===
pub use filter::{Candidate, Exclusion, PopulationFilter};
pub use loader::{LoadOptions, LoadedRegistry, load_registrations, read_registrations};
