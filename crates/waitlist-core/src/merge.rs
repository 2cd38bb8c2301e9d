use std::collections::BTreeSet;

use waitlist_model::{CanonicalRecord, ClassifiedRegistration, DonorCodes, PatientId};

use crate::collapse::{derive_outcome, normalize_code, wait_days};

/// Canonical record for a single or sequential registration.
///
/// These records never pass through the collapser, so `last_wait_date` is
/// back-filled from the registration's own waitlist end date.
pub fn listing_record(row: &ClassifiedRegistration, codes: &DonorCodes) -> CanonicalRecord {
    let registration = row.registration();
    let donor_type = normalize_code(registration.donor_type.as_deref());
    let removal_code = normalize_code(registration.removal_code.as_deref());
    let last_wait_date = row.waitlist_end_date();
    CanonicalRecord {
        patient_id: row.patient_id().clone(),
        registration_id: row.registration_id().clone(),
        list_type: row.list_type,
        episode_number: 0,
        min_list_date: row.list_date(),
        waitlist_end_date: row.waitlist_end_date(),
        last_wait_date,
        wait_days: wait_days(
            row.list_date(),
            last_wait_date,
            registration.transplant_date,
            0,
        ),
        outcome: derive_outcome(donor_type.as_deref(), removal_code.as_deref(), codes),
        transplant_date: registration.transplant_date,
        donor_type,
        donor_id: normalize_code(registration.donor_id.as_deref()),
        removal_code,
        registration_ids: vec![row.registration_id().clone()],
    }
}

/// Union single, sequential and collapsed records into one dataset.
///
/// Patients listed in `excluded` (failed elsewhere in the run) are dropped
/// from every partition. The result is ordered by patient, list date and
/// registration id.
pub fn merge_dataset(
    single: &[ClassifiedRegistration],
    sequential: &[ClassifiedRegistration],
    collapsed: Vec<CanonicalRecord>,
    excluded: &BTreeSet<PatientId>,
    codes: &DonorCodes,
) -> Vec<CanonicalRecord> {
    let mut records: Vec<CanonicalRecord> = single
        .iter()
        .chain(sequential)
        .filter(|row| !excluded.contains(row.patient_id()))
        .map(|row| listing_record(row, codes))
        .chain(
            collapsed
                .into_iter()
                .filter(|record| !excluded.contains(&record.patient_id)),
        )
        .collect();
    records.sort_by(|a, b| {
        a.patient_id
            .cmp(&b.patient_id)
            .then_with(|| a.min_list_date.cmp(&b.min_list_date))
            .then_with(|| a.registration_id.cmp(&b.registration_id))
    });
    records
}
