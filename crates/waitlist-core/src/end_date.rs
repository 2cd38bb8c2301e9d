//! Waitlist exit date resolution.

use chrono::NaiveDate;
use tracing::debug;

use waitlist_model::{PatientFailure, Registration, ResolvedRegistration};

use crate::error::ReconcileError;
use crate::partition::partition_by_patient;

/// Derive the date a registration left the waitlist.
///
/// First available wins: transplant date, removal date, the last inactive
/// status date when strictly later than the last active one, the last active
/// status date, then the last inactive status date. `None` means no candidate
/// field is populated.
pub fn resolve_end_date(registration: &Registration) -> Option<NaiveDate> {
    if let Some(date) = registration.transplant_date {
        return Some(date);
    }
    if let Some(date) = registration.removal_date {
        return Some(date);
    }
    match (
        registration.last_active_status_date,
        registration.last_inactive_status_date,
    ) {
        (Some(active), Some(inactive)) if inactive > active => Some(inactive),
        (Some(active), _) => Some(active),
        (None, inactive) => inactive,
    }
}

/// Output of the end-date stage.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved registrations, grouped by patient in patient id order.
    pub resolved: Vec<ResolvedRegistration>,
    pub failures: Vec<PatientFailure>,
}

/// Resolve end dates for every registration.
///
/// A patient with any unresolvable registration is excluded as a whole and
/// reported as a `MissingDate` failure.
pub fn resolve_end_dates(registrations: &[Registration]) -> Resolution {
    let mut resolution = Resolution::default();
    for (patient_id, group) in partition_by_patient(registrations, |r| &r.patient_id) {
        let num_listings = group.len();
        match resolve_patient(&group, num_listings) {
            Ok(resolved) => resolution.resolved.extend(resolved),
            Err(error) => {
                debug!(registrations = num_listings, "patient has unresolvable end date");
                resolution.failures.push(PatientFailure {
                    patient_id,
                    kind: error.kind(),
                    registration_ids: group.iter().map(|r| r.registration_id.clone()).collect(),
                    message: error.to_string(),
                });
            }
        }
    }
    resolution
}

fn resolve_patient(
    group: &[&Registration],
    num_listings: usize,
) -> Result<Vec<ResolvedRegistration>, ReconcileError> {
    group
        .iter()
        .map(|registration| {
            let waitlist_end_date =
                resolve_end_date(registration).ok_or_else(|| ReconcileError::MissingDate {
                    patient_id: registration.patient_id.clone(),
                    registration_id: registration.registration_id.clone(),
                })?;
            Ok(ResolvedRegistration {
                registration: (*registration).clone(),
                waitlist_end_date,
                num_listings,
            })
        })
        .collect()
}
