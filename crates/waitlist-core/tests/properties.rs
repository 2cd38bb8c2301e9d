//! Property tests over generated well-formed registries.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};
use proptest::prelude::*;

use waitlist_core::{
    ReconcileOptions, assign_episodes, classify_registrations, reconcile, resolve_end_dates,
};
use waitlist_model::{ListType, PatientId, Registration, RegistrationId, WarningKind};

/// (list day offset, exit kind, days on the list)
type Listing = (i64, u8, i64);

/// (days since the previous episode ended, listings as (offset, days on the
/// list), exit kind)
type Episode = (i64, Vec<(i64, i64)>, u8);

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).expect("valid date")
}

fn registry() -> impl Strategy<Value = Vec<Vec<Listing>>> {
    prop::collection::vec(
        prop::collection::vec((0i64..2000, 0u8..3, 1i64..900), 1..6),
        1..8,
    )
}

/// Patients made of episodes that follow each other. Listings inside an
/// episode may leave the list before the next one is listed; a transplant
/// falls after every listing of its episode and ends the others.
fn episodic_registry() -> impl Strategy<Value = Vec<Vec<Episode>>> {
    prop::collection::vec(
        prop::collection::vec(
            (
                1i64..200,
                prop::collection::vec((0i64..150, 1i64..400), 1..5),
                0u8..3,
            ),
            1..4,
        ),
        1..6,
    )
}

fn build_episodic(patients: &[Vec<Episode>]) -> Vec<Registration> {
    let mut registrations = Vec::new();
    for (p, episodes) in patients.iter().enumerate() {
        let patient_id = PatientId::new(format!("P{p}")).expect("patient id");
        let mut cursor = base_date();
        let mut r = 0;
        for (gap, listings, kind) in episodes {
            let start = cursor + TimeDelta::days(*gap);
            let transplant = start + TimeDelta::days(150 + listings[0].1);
            for (idx, &(offset, days)) in listings.iter().enumerate() {
                let registration_id =
                    RegistrationId::new(format!("P{p}-R{r}")).expect("registration id");
                r += 1;
                let list_date = start + TimeDelta::days(offset);
                let end = list_date + TimeDelta::days(days);
                let registration =
                    Registration::new(patient_id.clone(), registration_id, list_date);
                let (registration, exit) = match kind {
                    0 if idx == 0 => {
                        let donor = if days % 2 == 0 { "C" } else { "L" };
                        (registration.with_transplant(transplant, donor), transplant)
                    }
                    0 => {
                        let removed = end.min(transplant);
                        (registration.with_removal(removed, "4"), removed)
                    }
                    1 => (registration.with_removal(end, "13"), end),
                    _ => (registration.with_status_dates(Some(end), None), end),
                };
                cursor = cursor.max(exit);
                registrations.push(registration);
            }
        }
    }
    registrations
}

fn build(patients: &[Vec<Listing>]) -> Vec<Registration> {
    let mut registrations = Vec::new();
    for (p, listings) in patients.iter().enumerate() {
        let patient_id = PatientId::new(format!("P{p}")).expect("patient id");
        for (r, &(offset, kind, days)) in listings.iter().enumerate() {
            let registration_id =
                RegistrationId::new(format!("P{p}-R{r}")).expect("registration id");
            let list_date = base_date() + TimeDelta::days(offset);
            let end = list_date + TimeDelta::days(days);
            let registration = Registration::new(patient_id.clone(), registration_id, list_date);
            registrations.push(match kind {
                0 => registration.with_transplant(end, if days % 2 == 0 { "C" } else { "L" }),
                1 => registration.with_removal(end, "13"),
                _ => registration.with_status_dates(Some(end), None),
            });
        }
    }
    registrations
}

proptest! {
    #[test]
    fn every_registration_is_covered_once(patients in registry()) {
        let registrations = build(&patients);
        let result = reconcile(&registrations, &ReconcileOptions::default());
        prop_assert!(result.report.failures.is_empty());

        let mut covered: Vec<RegistrationId> = result
            .records
            .iter()
            .flat_map(|record| record.registration_ids.iter().cloned())
            .collect();
        covered.sort();
        let mut expected: Vec<RegistrationId> = registrations
            .iter()
            .map(|registration| registration.registration_id.clone())
            .collect();
        expected.sort();
        prop_assert_eq!(covered, expected);
    }

    #[test]
    fn wait_times_are_never_negative(patients in registry()) {
        let result = reconcile(&build(&patients), &ReconcileOptions::default());
        for record in &result.records {
            prop_assert!(record.wait_days >= 0, "{:?}", record);
        }
        let inconsistent = result
            .report
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::InconsistentOutcome)
            .count();
        prop_assert_eq!(inconsistent, 0);
    }

    #[test]
    fn episode_numbers_start_at_one_and_step_by_one(patients in registry()) {
        let resolution = resolve_end_dates(&build(&patients));
        let concurrent = classify_registrations(resolution.resolved).partition().concurrent;
        let mut numbers: BTreeMap<PatientId, Vec<u32>> = BTreeMap::new();
        for row in assign_episodes(concurrent) {
            numbers.entry(row.patient_id().clone()).or_default().push(row.episode_number);
        }
        for sequence in numbers.values() {
            prop_assert_eq!(sequence.first().copied(), Some(1));
            for pair in sequence.windows(2) {
                prop_assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1, "{:?}", sequence);
            }
        }
    }

    #[test]
    fn single_registrations_keep_their_own_window(patients in registry()) {
        let result = reconcile(&build(&patients), &ReconcileOptions::default());
        for record in result.records.iter().filter(|r| r.list_type == ListType::Single) {
            prop_assert_eq!(record.episode_number, 0);
            prop_assert_eq!(record.registration_ids.len(), 1);
            prop_assert_eq!(record.last_wait_date, record.waitlist_end_date);
            prop_assert_eq!(
                record.wait_days,
                (record.waitlist_end_date - record.min_list_date).num_days()
            );
        }
    }

    #[test]
    fn sequential_records_overlap_nothing(patients in registry()) {
        let result = reconcile(&build(&patients), &ReconcileOptions::default());
        for record in result.records.iter().filter(|r| r.list_type == ListType::Sequential) {
            for other in result.records.iter().filter(|o| {
                o.patient_id == record.patient_id && o.registration_id != record.registration_id
            }) {
                prop_assert!(!record.overlaps(other), "{:?} overlaps {:?}", record, other);
            }
        }
    }

    #[test]
    fn records_of_a_patient_never_overlap(patients in episodic_registry()) {
        let result = reconcile(&build_episodic(&patients), &ReconcileOptions::default());
        prop_assert!(result.report.failures.is_empty());
        prop_assert!(result.report.warnings.is_empty(), "{:?}", result.report.warnings);
        for (idx, record) in result.records.iter().enumerate() {
            for other in result.records[idx + 1..]
                .iter()
                .filter(|o| o.patient_id == record.patient_id)
            {
                prop_assert!(!record.overlaps(other), "{:?} overlaps {:?}", record, other);
            }
        }
    }

    #[test]
    fn wait_and_transplant_stay_inside_the_window(patients in episodic_registry()) {
        let result = reconcile(&build_episodic(&patients), &ReconcileOptions::default());
        for record in &result.records {
            let (start, end) = record.window();
            prop_assert!(record.wait_days >= 0, "{:?}", record);
            prop_assert!(record.wait_days <= (end - start).num_days(), "{:?}", record);
            if let Some(transplant) = record.transplant_date {
                prop_assert!(start <= transplant && transplant <= end, "{:?}", record);
            }
        }
    }
}
