//! Post-merge data-quality checks. Findings are warnings; records are kept as
//! computed.

use std::collections::{BTreeMap, BTreeSet};

use waitlist_model::{CanonicalRecord, PatientId, ReconcileWarning, WarningKind};

/// Flag records whose wait time came out negative.
pub fn check_wait_times(records: &[CanonicalRecord]) -> Vec<ReconcileWarning> {
    records
        .iter()
        .filter(|record| record.wait_days < 0)
        .map(|record| {
            let message = if record.outcome.is_transplant() {
                format!(
                    "{} outcome with negative wait time of {} days (listed {}, transplant {})",
                    record.outcome,
                    record.wait_days,
                    record.min_list_date,
                    record
                        .transplant_date
                        .map_or_else(|| "-".to_string(), |date| date.to_string()),
                )
            } else {
                format!(
                    "negative wait time of {} days (listed {}, exit {})",
                    record.wait_days, record.min_list_date, record.last_wait_date
                )
            };
            ReconcileWarning {
                kind: WarningKind::InconsistentOutcome,
                patient_id: record.patient_id.clone(),
                registration_id: Some(record.registration_id.clone()),
                message,
            }
        })
        .collect()
}

/// Flag patients whose recorded transplant dates outnumber the transplant
/// dates left on their output records.
pub fn check_transplant_merges(
    records: &[CanonicalRecord],
    transplant_date_counts: &BTreeMap<PatientId, usize>,
) -> Vec<ReconcileWarning> {
    let mut kept: BTreeMap<&PatientId, BTreeSet<_>> = BTreeMap::new();
    for record in records {
        let dates = kept.entry(&record.patient_id).or_default();
        if let Some(date) = record.transplant_date {
            dates.insert(date);
        }
    }
    kept.into_iter()
        .filter_map(|(patient_id, dates)| {
            let recorded = transplant_date_counts.get(patient_id).copied()?;
            (recorded > dates.len()).then(|| ReconcileWarning {
                kind: WarningKind::MergedTransplantDates,
                patient_id: patient_id.clone(),
                registration_id: None,
                message: format!(
                    "{recorded} distinct transplant dates recorded, {} kept after reconciliation",
                    dates.len()
                ),
            })
        })
        .collect()
}
