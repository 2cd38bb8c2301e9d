//! End-to-end reconciliation run.
//!
//! Stages run to completion over the whole collection, one after another:
//! resolve end dates, classify, number episodes, collapse episodes, merge.
//! Per-patient failures are collected into the report and the patient is
//! left out of the output; other patients are unaffected.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use waitlist_model::{
    CanonicalRecord, ClassifiedRegistration, DonorCodes, ListType, ListTypeCounts, Outcome,
    PatientId, ReconcileReport, Registration,
};

use crate::checks::{check_transplant_merges, check_wait_times};
use crate::classify::classify_registrations;
use crate::collapse::collapse_episodes;
use crate::end_date::resolve_end_dates;
use crate::episode::assign_episodes;
use crate::merge::merge_dataset;

/// Options for a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    pub donor_codes: DonorCodes,
}

impl ReconcileOptions {
    #[must_use]
    pub fn with_donor_codes(mut self, donor_codes: DonorCodes) -> Self {
        self.donor_codes = donor_codes;
        self
    }
}

/// Output of a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub records: Vec<CanonicalRecord>,
    pub report: ReconcileReport,
}

/// Reconcile a registry extract into one canonical record per episode.
pub fn reconcile(registrations: &[Registration], options: &ReconcileOptions) -> Reconciliation {
    let codes = &options.donor_codes;
    let mut report = ReconcileReport {
        input_registrations: registrations.len(),
        input_patients: registrations
            .iter()
            .map(|r| &r.patient_id)
            .collect::<BTreeSet<_>>()
            .len(),
        ..ReconcileReport::default()
    };

    let start = Instant::now();
    let resolution = info_span!("resolve").in_scope(|| resolve_end_dates(registrations));
    info!(
        resolved = resolution.resolved.len(),
        failed_patients = resolution.failures.len(),
        duration_ms = start.elapsed().as_millis(),
        "end dates resolved"
    );
    report.failures.extend(resolution.failures);

    let start = Instant::now();
    let classification =
        info_span!("classify").in_scope(|| classify_registrations(resolution.resolved));
    let (patients, listings) = count_list_types(&classification.registrations);
    report.patients = patients;
    report.registrations = listings;
    info!(
        single = listings.single,
        sequential = listings.sequential,
        concurrent = listings.concurrent,
        duration_ms = start.elapsed().as_millis(),
        "registrations classified"
    );
    let transplant_date_counts = classification.transplant_date_counts.clone();
    let partitions = classification.partition();

    let start = Instant::now();
    let grouped = info_span!("group").in_scope(|| assign_episodes(partitions.concurrent));
    info!(
        registrations = grouped.len(),
        episodes = count_episodes(&grouped),
        duration_ms = start.elapsed().as_millis(),
        "episodes assigned"
    );

    let start = Instant::now();
    let collapsed = info_span!("collapse").in_scope(|| collapse_episodes(grouped, codes));
    report.episodes_collapsed = collapsed.records.len();
    info!(
        episodes = collapsed.records.len(),
        failed_patients = collapsed.failures.len(),
        duration_ms = start.elapsed().as_millis(),
        "episodes collapsed"
    );
    let excluded: BTreeSet<PatientId> = collapsed
        .failures
        .iter()
        .map(|failure| failure.patient_id.clone())
        .collect();
    report.failures.extend(collapsed.failures);

    let start = Instant::now();
    let records = info_span!("merge").in_scope(|| {
        merge_dataset(
            &partitions.single,
            &partitions.sequential,
            collapsed.records,
            &excluded,
            codes,
        )
    });
    info!(
        records = records.len(),
        duration_ms = start.elapsed().as_millis(),
        "dataset merged"
    );

    report.warnings.extend(check_wait_times(&records));
    report
        .warnings
        .extend(check_transplant_merges(&records, &transplant_date_counts));
    for failure in &report.failures {
        warn!(
            kind = %failure.kind,
            registrations = failure.registration_ids.len(),
            "patient excluded from reconciliation"
        );
    }
    if !report.warnings.is_empty() {
        warn!(warnings = report.warnings.len(), "reconciliation produced warnings");
    }

    report.output_records = records.len();
    report.outcomes = count_outcomes(&records);
    report.failures.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
    Reconciliation { records, report }
}

/// Registration counts per list type, and counts of patients holding at
/// least one registration of each type.
fn count_list_types(registrations: &[ClassifiedRegistration]) -> (ListTypeCounts, ListTypeCounts) {
    let mut listings = ListTypeCounts::default();
    let mut seen: BTreeMap<ListType, BTreeSet<&PatientId>> = BTreeMap::new();
    for registration in registrations {
        listings.increment(registration.list_type);
        seen.entry(registration.list_type)
            .or_default()
            .insert(registration.patient_id());
    }
    let patients_of = |list_type| seen.get(&list_type).map_or(0, BTreeSet::len);
    let patients = ListTypeCounts {
        single: patients_of(ListType::Single),
        sequential: patients_of(ListType::Sequential),
        concurrent: patients_of(ListType::Concurrent),
    };
    (patients, listings)
}

fn count_episodes(registrations: &[ClassifiedRegistration]) -> usize {
    registrations
        .iter()
        .map(|r| (r.patient_id(), r.episode_number))
        .collect::<BTreeSet<_>>()
        .len()
}

fn count_outcomes(records: &[CanonicalRecord]) -> BTreeMap<Outcome, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.outcome).or_insert(0) += 1;
    }
    counts
}
