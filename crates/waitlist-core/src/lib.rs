//! Registration reconciliation engine.
//!
//! Turns a patient registry's waitlist registrations into one canonical
//! record per distinct waitlist episode per patient.

pub mod checks;
pub mod classify;
pub mod collapse;
pub mod end_date;
pub mod episode;
pub mod error;
pub mod fill;
pub mod merge;
pub mod partition;
pub mod pipeline;

pub use classify::{Classification, ListPartitions, classify_patient, classify_registrations};
pub use collapse::{Collapsed, collapse, collapse_episodes, derive_outcome};
pub use end_date::{Resolution, resolve_end_date, resolve_end_dates};
pub use episode::{
    EpisodeRow, EpisodeState, assign_episodes, group_patient_episodes, listing_windows,
    scan_episodes,
};
pub use error::ReconcileError;
pub use merge::{listing_record, merge_dataset};
pub use pipeline::{ReconcileOptions, Reconciliation, reconcile};
