//! Single / sequential / concurrent classification.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use waitlist_model::{ClassifiedRegistration, ListType, PatientId, ResolvedRegistration};

use crate::partition::partition_by_patient;

/// Output of the classification stage.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Classified registrations, per patient in list-date order.
    pub registrations: Vec<ClassifiedRegistration>,
    /// Distinct non-null transplant dates recorded per patient.
    pub transplant_date_counts: BTreeMap<PatientId, usize>,
}

/// Classified registrations split by list type.
#[derive(Debug, Clone, Default)]
pub struct ListPartitions {
    pub single: Vec<ClassifiedRegistration>,
    pub sequential: Vec<ClassifiedRegistration>,
    pub concurrent: Vec<ClassifiedRegistration>,
}

impl Classification {
    pub fn partition(self) -> ListPartitions {
        let mut partitions = ListPartitions::default();
        for registration in self.registrations {
            match registration.list_type {
                ListType::Single => partitions.single.push(registration),
                ListType::Sequential => partitions.sequential.push(registration),
                ListType::Concurrent => partitions.concurrent.push(registration),
            }
        }
        partitions
    }
}

/// Order registrations by list date, ties by registration id.
pub fn list_order(left: &ResolvedRegistration, right: &ResolvedRegistration) -> Ordering {
    left.list_date()
        .cmp(&right.list_date())
        .then_with(|| left.registration_id().cmp(right.registration_id()))
}

/// Classify every resolved registration, one patient at a time.
pub fn classify_registrations(resolved: Vec<ResolvedRegistration>) -> Classification {
    let mut classification = Classification::default();
    for (patient_id, group) in partition_by_patient(resolved, |r| r.patient_id()) {
        classification
            .transplant_date_counts
            .insert(patient_id, distinct_transplant_dates(&group));
        classification.registrations.extend(classify_patient(group));
    }
    classification
}

/// Count the distinct transplant dates recorded across a patient's registrations.
pub fn distinct_transplant_dates(group: &[ResolvedRegistration]) -> usize {
    group
        .iter()
        .filter_map(|r| r.registration.transplant_date)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Label one patient's registrations.
///
/// A registration is concurrent when it was listed before an earlier
/// registration left the list, or left the list after the next registration
/// was listed. "Earlier" uses the latest end date seen so far, so a long
/// registration still overlaps every registration listed inside its window.
pub fn classify_patient(mut group: Vec<ResolvedRegistration>) -> Vec<ClassifiedRegistration> {
    group.sort_by(list_order);
    if group.len() == 1 {
        return group
            .into_iter()
            .map(|resolved| ClassifiedRegistration {
                resolved,
                list_type: ListType::Single,
                episode_number: 0,
            })
            .collect();
    }

    let next_list_dates: Vec<Option<NaiveDate>> = group
        .iter()
        .skip(1)
        .map(|r| Some(r.list_date()))
        .chain(std::iter::once(None))
        .collect();

    group
        .into_iter()
        .zip(next_list_dates)
        .scan(None::<NaiveDate>, |latest_end, (resolved, next_list_date)| {
            let starts_before_previous_end =
                latest_end.is_some_and(|end| resolved.list_date() < end);
            let ends_after_next_start =
                next_list_date.is_some_and(|next| resolved.waitlist_end_date > next);
            let list_type = if starts_before_previous_end || ends_after_next_start {
                ListType::Concurrent
            } else {
                ListType::Sequential
            };
            *latest_end = Some(
                latest_end.map_or(resolved.waitlist_end_date, |end| {
                    end.max(resolved.waitlist_end_date)
                }),
            );
            Some(ClassifiedRegistration {
                resolved,
                list_type,
                episode_number: 0,
            })
        })
        .collect()
}
