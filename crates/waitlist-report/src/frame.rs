//! Canonical records as a polars frame.

use polars::prelude::*;

use waitlist_model::{CanonicalRecord, RegistrationId};

use crate::error::Result;
use crate::pseudonym::Pseudonymizer;

/// Output columns, in order.
pub const RECORD_COLUMNS: [&str; 14] = [
    "patient_id",
    "registration_id",
    "list_type",
    "episode_number",
    "min_list_date",
    "waitlist_end_date",
    "last_wait_date",
    "wait_days",
    "outcome",
    "transplant_date",
    "donor_type",
    "donor_id",
    "removal_code",
    "registration_ids",
];

/// Separator between contributing registration ids in one cell.
pub const REGISTRATION_ID_SEPARATOR: &str = ";";

/// Build the output frame, one row per record. Dates are ISO strings and
/// wait time is whole days.
pub fn records_frame(
    records: &[CanonicalRecord],
    pseudonymizer: Option<&Pseudonymizer>,
) -> Result<DataFrame> {
    let patient = |record: &CanonicalRecord| match pseudonymizer {
        Some(p) => p.patient(&record.patient_id),
        None => record.patient_id.to_string(),
    };
    let registration = |id: &RegistrationId| match pseudonymizer {
        Some(p) => p.registration(id),
        None => id.to_string(),
    };
    let text = |f: fn(&CanonicalRecord) -> String| -> Vec<String> { records.iter().map(f).collect() };
    let optional = |f: fn(&CanonicalRecord) -> Option<String>| -> Vec<Option<String>> {
        records.iter().map(f).collect()
    };

    let columns = vec![
        Series::new(
            RECORD_COLUMNS[0].into(),
            records.iter().map(patient).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            RECORD_COLUMNS[1].into(),
            records
                .iter()
                .map(|r| registration(&r.registration_id))
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(RECORD_COLUMNS[2].into(), text(|r| r.list_type.to_string())).into_column(),
        Series::new(
            RECORD_COLUMNS[3].into(),
            records.iter().map(|r| r.episode_number).collect::<Vec<u32>>(),
        )
        .into_column(),
        Series::new(RECORD_COLUMNS[4].into(), text(|r| r.min_list_date.to_string())).into_column(),
        Series::new(RECORD_COLUMNS[5].into(), text(|r| r.waitlist_end_date.to_string()))
            .into_column(),
        Series::new(RECORD_COLUMNS[6].into(), text(|r| r.last_wait_date.to_string()))
            .into_column(),
        Series::new(
            RECORD_COLUMNS[7].into(),
            records.iter().map(|r| r.wait_days).collect::<Vec<i64>>(),
        )
        .into_column(),
        Series::new(RECORD_COLUMNS[8].into(), text(|r| r.outcome.to_string())).into_column(),
        Series::new(
            RECORD_COLUMNS[9].into(),
            optional(|r| r.transplant_date.map(|d| d.to_string())),
        )
        .into_column(),
        Series::new(RECORD_COLUMNS[10].into(), optional(|r| r.donor_type.clone())).into_column(),
        Series::new(RECORD_COLUMNS[11].into(), optional(|r| r.donor_id.clone())).into_column(),
        Series::new(RECORD_COLUMNS[12].into(), optional(|r| r.removal_code.clone()))
            .into_column(),
        Series::new(
            RECORD_COLUMNS[13].into(),
            records
                .iter()
                .map(|r| {
                    r.registration_ids
                        .iter()
                        .map(|id| registration(id))
                        .collect::<Vec<_>>()
                        .join(REGISTRATION_ID_SEPARATOR)
                })
                .collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    Ok(DataFrame::new(columns)?)
}
