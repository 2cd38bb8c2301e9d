//! Export of reconciled waitlist records.
//!
//! Records become a polars frame written as CSV; the run report is written
//! as JSON next to it. Identifiers can be pseudonymized on the way out.

pub mod error;
pub mod export;
pub mod frame;
pub mod pseudonym;

pub use error::{ExportError, Result};
pub use export::{
    ExportOptions, ExportedFiles, RECORDS_FILE, REPORT_FILE, write_outputs, write_records_csv,
};
pub use frame::{RECORD_COLUMNS, REGISTRATION_ID_SEPARATOR, records_frame};
pub use pseudonym::{IdKind, PSEUDONYM_LEN, Pseudonymizer};
