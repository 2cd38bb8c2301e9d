//! Episode collapsing: one canonical record per (patient, episode).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use waitlist_model::{
    CanonicalRecord, ClassifiedRegistration, DonorCodes, ListType, Outcome, PatientFailure,
    PatientId, Registration,
};

use crate::error::ReconcileError;
use crate::fill::fill_backward;
use crate::partition::partition_by_patient;

/// Treat blank codes as missing.
pub fn normalize_code(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Derive the outcome of a record.
///
/// Donor type takes precedence over removal code, which takes precedence
/// over censoring.
pub fn derive_outcome(
    donor_type: Option<&str>,
    removal_code: Option<&str>,
    codes: &DonorCodes,
) -> Outcome {
    match donor_type {
        Some(donor) if codes.is_deceased(donor) => Outcome::Ddkt,
        Some(donor) if codes.is_living(donor) => Outcome::Ldkt,
        _ if removal_code.is_some() => Outcome::RemovedOrDied,
        _ => Outcome::Censored,
    }
}

/// Wait time in days.
///
/// Measured to the transplant for episodes (episode number above 0) that
/// carry a transplant date, and to the last wait date otherwise.
pub fn wait_days(
    min_list_date: NaiveDate,
    last_wait_date: NaiveDate,
    transplant_date: Option<NaiveDate>,
    episode_number: u32,
) -> i64 {
    let end = match transplant_date {
        Some(transplant) if episode_number != 0 => transplant,
        _ => last_wait_date,
    };
    (end - min_list_date).num_days()
}

/// Collapse one episode's rows into a canonical record.
///
/// Rows are expected in episode scan order (by waitlist end date). Outcome
/// fields are filled from the bottom of the episode upward and then read
/// from the first row.
pub fn collapse(
    episode: &[ClassifiedRegistration],
    codes: &DonorCodes,
) -> Result<CanonicalRecord, ReconcileError> {
    let Some(first) = episode.first() else {
        return Err(ReconcileError::EmptyEpisode {
            patient_id: None,
            episode_number: 0,
        });
    };
    let last_wait_date = episode
        .iter()
        .map(ClassifiedRegistration::waitlist_end_date)
        .max()
        .ok_or_else(|| ReconcileError::EmptyEpisode {
            patient_id: Some(first.patient_id().clone()),
            episode_number: first.episode_number,
        })?;
    let min_list_date = episode
        .iter()
        .map(ClassifiedRegistration::list_date)
        .min()
        .unwrap_or_else(|| first.list_date());

    let transplant_dates = fill_backward(&column(episode, |r| r.transplant_date));
    let donor_types =
        fill_backward(&column(episode, |r| normalize_code(r.donor_type.as_deref())));
    let donor_ids = fill_backward(&column(episode, |r| normalize_code(r.donor_id.as_deref())));
    let removal_codes =
        fill_backward(&column(episode, |r| normalize_code(r.removal_code.as_deref())));

    let transplant_date = transplant_dates.first().copied().flatten();
    let donor_type = donor_types.into_iter().next().flatten();
    let donor_id = donor_ids.into_iter().next().flatten();
    let removal_code = removal_codes.into_iter().next().flatten();

    let episode_number = first.episode_number;
    let outcome = derive_outcome(donor_type.as_deref(), removal_code.as_deref(), codes);
    let wait = wait_days(min_list_date, last_wait_date, transplant_date, episode_number);
    let clamped_wait_date = match transplant_date {
        Some(transplant) if transplant < last_wait_date => transplant,
        _ => last_wait_date,
    };

    Ok(CanonicalRecord {
        patient_id: first.patient_id().clone(),
        registration_id: first.registration_id().clone(),
        list_type: ListType::Concurrent,
        episode_number,
        min_list_date,
        waitlist_end_date: last_wait_date,
        last_wait_date: clamped_wait_date,
        wait_days: wait,
        outcome,
        transplant_date,
        donor_type,
        donor_id,
        removal_code,
        registration_ids: episode
            .iter()
            .map(|r| r.registration_id().clone())
            .collect(),
    })
}

fn column<T>(
    episode: &[ClassifiedRegistration],
    field: impl Fn(&Registration) -> Option<T>,
) -> Vec<Option<T>> {
    episode.iter().map(|r| field(r.registration())).collect()
}

/// Output of the collapse stage.
#[derive(Debug, Clone, Default)]
pub struct Collapsed {
    pub records: Vec<CanonicalRecord>,
    pub failures: Vec<PatientFailure>,
}

/// Collapse every (patient, episode) group of concurrent registrations.
///
/// Input rows must already carry episode numbers, in scan order within each
/// patient. A failing episode excludes the whole patient, and the other
/// patients are still collapsed.
pub fn collapse_episodes(
    concurrent: Vec<ClassifiedRegistration>,
    codes: &DonorCodes,
) -> Collapsed {
    let mut collapsed = Collapsed::default();
    for (patient_id, rows) in partition_by_patient(concurrent, |r| r.patient_id()) {
        match collapse_patient(&patient_id, &rows, codes) {
            Ok(records) => collapsed.records.extend(records),
            Err(error) => {
                debug!(
                    kind = %error.kind(),
                    registrations = rows.len(),
                    "episode collapse failed"
                );
                collapsed.failures.push(PatientFailure {
                    patient_id,
                    kind: error.kind(),
                    registration_ids: rows.iter().map(|r| r.registration_id().clone()).collect(),
                    message: error.to_string(),
                });
            }
        }
    }
    collapsed
}

fn collapse_patient(
    patient_id: &PatientId,
    rows: &[ClassifiedRegistration],
    codes: &DonorCodes,
) -> Result<Vec<CanonicalRecord>, ReconcileError> {
    let mut episodes: BTreeMap<u32, Vec<ClassifiedRegistration>> = BTreeMap::new();
    for row in rows {
        episodes
            .entry(row.episode_number)
            .or_default()
            .push(row.clone());
    }
    episodes
        .into_iter()
        .map(|(episode_number, episode)| {
            collapse(&episode, codes).map_err(|error| match error {
                ReconcileError::EmptyEpisode { .. } => ReconcileError::EmptyEpisode {
                    patient_id: Some(patient_id.clone()),
                    episode_number,
                },
                other => other,
            })
        })
        .collect()
}
