use std::fmt;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, RegistrationId};
use crate::registration::ListType;

/// Final waitlist outcome of a canonical record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Outcome {
    /// Deceased-donor kidney transplant.
    #[serde(rename = "DDKT")]
    Ddkt,
    /// Living-donor kidney transplant.
    #[serde(rename = "LDKT")]
    Ldkt,
    /// Removed from the waitlist (including death) without a transplant.
    #[serde(rename = "removed/died")]
    RemovedOrDied,
    /// Still listed when observation ended.
    #[serde(rename = "censored")]
    Censored,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Self::Ddkt, Self::Ldkt, Self::RemovedOrDied, Self::Censored];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ddkt => "DDKT",
            Self::Ldkt => "LDKT",
            Self::RemovedOrDied => "removed/died",
            Self::Censored => "censored",
        }
    }

    /// Whether the outcome is a transplant.
    #[must_use]
    pub const fn is_transplant(&self) -> bool {
        matches!(self, Self::Ddkt | Self::Ldkt)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One analysis-ready observation: a single or sequential registration, or
/// one collapsed episode of concurrent registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub patient_id: PatientId,
    /// The record's own registration, or the first registration of the episode.
    pub registration_id: RegistrationId,
    pub list_type: ListType,
    pub episode_number: u32,
    pub min_list_date: NaiveDate,
    /// Latest waitlist exit date of the contributing registrations.
    pub waitlist_end_date: NaiveDate,
    /// Episode exit date used for analysis.
    pub last_wait_date: NaiveDate,
    pub wait_days: i64,
    pub outcome: Outcome,
    pub transplant_date: Option<NaiveDate>,
    pub donor_type: Option<String>,
    pub donor_id: Option<String>,
    pub removal_code: Option<String>,
    /// Every input registration folded into this record.
    pub registration_ids: Vec<RegistrationId>,
}

impl CanonicalRecord {
    pub fn wait_time(&self) -> TimeDelta {
        TimeDelta::days(self.wait_days)
    }

    /// Closed waitlist window `[min_list_date, last_wait_date]`.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        (self.min_list_date, self.last_wait_date)
    }

    pub fn overlaps(&self, other: &CanonicalRecord) -> bool {
        let (start, end) = self.window();
        let (other_start, other_end) = other.window();
        start < other_end && other_start < end
    }
}
