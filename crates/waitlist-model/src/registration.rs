//! Registration records as they move through the reconciliation stages.
//!
//! Each stage wraps the previous stage's record and adds the fields it
//! derives, so a [`ClassifiedRegistration`] still carries the source
//! [`Registration`] unchanged.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, RegistrationId};

/// One waitlist registration (listing event) from the source registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub patient_id: PatientId,
    pub registration_id: RegistrationId,
    pub list_date: NaiveDate,
    pub removal_date: Option<NaiveDate>,
    pub removal_code: Option<String>,
    pub last_active_status_date: Option<NaiveDate>,
    pub last_inactive_status_date: Option<NaiveDate>,
    pub transplant_date: Option<NaiveDate>,
    pub donor_type: Option<String>,
    pub donor_id: Option<String>,
}

impl Registration {
    /// Create a registration with only the required fields set.
    pub fn new(patient_id: PatientId, registration_id: RegistrationId, list_date: NaiveDate) -> Self {
        Self {
            patient_id,
            registration_id,
            list_date,
            removal_date: None,
            removal_code: None,
            last_active_status_date: None,
            last_inactive_status_date: None,
            transplant_date: None,
            donor_type: None,
            donor_id: None,
        }
    }

    /// Set the removal date and removal code.
    #[must_use]
    pub fn with_removal(mut self, date: NaiveDate, code: impl Into<String>) -> Self {
        self.removal_date = Some(date);
        self.removal_code = Some(code.into());
        self
    }

    /// Set the transplant date and donor type.
    #[must_use]
    pub fn with_transplant(mut self, date: NaiveDate, donor_type: impl Into<String>) -> Self {
        self.transplant_date = Some(date);
        self.donor_type = Some(donor_type.into());
        self
    }

    /// Set the donor identifier.
    #[must_use]
    pub fn with_donor_id(mut self, donor_id: impl Into<String>) -> Self {
        self.donor_id = Some(donor_id.into());
        self
    }

    /// Set the last active and last inactive status dates.
    #[must_use]
    pub fn with_status_dates(
        mut self,
        active: Option<NaiveDate>,
        inactive: Option<NaiveDate>,
    ) -> Self {
        self.last_active_status_date = active;
        self.last_inactive_status_date = inactive;
        self
    }
}

/// A registration with its waitlist exit date resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRegistration {
    pub registration: Registration,
    pub waitlist_end_date: NaiveDate,
    /// Number of registrations sharing this registration's patient id.
    pub num_listings: usize,
}

impl ResolvedRegistration {
    pub fn patient_id(&self) -> &PatientId {
        &self.registration.patient_id
    }

    pub fn registration_id(&self) -> &RegistrationId {
        &self.registration.registration_id
    }

    pub fn list_date(&self) -> NaiveDate {
        self.registration.list_date
    }
}

/// How a registration relates to the patient's other registrations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    /// The patient's only registration.
    Single,
    /// Overlaps a neighboring registration of the same patient.
    Concurrent,
    /// Does not overlap any neighboring registration.
    Sequential,
}

impl ListType {
    pub const ALL: [ListType; 3] = [Self::Single, Self::Sequential, Self::Concurrent];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Concurrent => "concurrent",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved registration labelled with its list type and episode.
///
/// `episode_number` is 0 for single and sequential registrations; concurrent
/// registrations are numbered from 1 per patient by the episode grouper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRegistration {
    pub resolved: ResolvedRegistration,
    pub list_type: ListType,
    pub episode_number: u32,
}

impl ClassifiedRegistration {
    pub fn registration(&self) -> &Registration {
        &self.resolved.registration
    }

    pub fn patient_id(&self) -> &PatientId {
        self.resolved.patient_id()
    }

    pub fn registration_id(&self) -> &RegistrationId {
        self.resolved.registration_id()
    }

    pub fn list_date(&self) -> NaiveDate {
        self.resolved.list_date()
    }

    pub fn waitlist_end_date(&self) -> NaiveDate {
        self.resolved.waitlist_end_date
    }

    pub fn transplant_date(&self) -> Option<NaiveDate> {
        self.resolved.registration.transplant_date
    }
}
