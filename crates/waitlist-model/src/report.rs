use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, RegistrationId};
use crate::record::Outcome;
use crate::registration::ListType;

/// Why a patient could not be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A registration has no resolvable waitlist end date.
    MissingDate,
    /// An episode has no rows or no resolvable end date.
    EmptyEpisode,
}

impl FailureKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MissingDate => "MissingDate",
            Self::EmptyEpisode => "EmptyEpisode",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A patient excluded from the output, with the registrations it held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFailure {
    pub patient_id: PatientId,
    pub kind: FailureKind,
    pub registration_ids: Vec<RegistrationId>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A record's wait time came out negative.
    InconsistentOutcome,
    /// Distinct transplant dates were merged into fewer transplant episodes.
    MergedTransplantDates,
}

impl WarningKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InconsistentOutcome => "InconsistentOutcome",
            Self::MergedTransplantDates => "MergedTransplantDates",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A data-quality finding that does not exclude the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileWarning {
    pub kind: WarningKind,
    pub patient_id: PatientId,
    pub registration_id: Option<RegistrationId>,
    pub message: String,
}

/// Counts keyed by list type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTypeCounts {
    pub single: usize,
    pub sequential: usize,
    pub concurrent: usize,
}

impl ListTypeCounts {
    pub fn get(&self, list_type: ListType) -> usize {
        match list_type {
            ListType::Single => self.single,
            ListType::Sequential => self.sequential,
            ListType::Concurrent => self.concurrent,
        }
    }

    pub fn increment(&mut self, list_type: ListType) {
        match list_type {
            ListType::Single => self.single += 1,
            ListType::Sequential => self.sequential += 1,
            ListType::Concurrent => self.concurrent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.single + self.sequential + self.concurrent
    }
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub input_patients: usize,
    pub input_registrations: usize,
    /// Patients holding at least one registration of each list type.
    pub patients: ListTypeCounts,
    pub registrations: ListTypeCounts,
    pub episodes_collapsed: usize,
    pub output_records: usize,
    pub outcomes: BTreeMap<Outcome, usize>,
    pub failures: Vec<PatientFailure>,
    pub warnings: Vec<ReconcileWarning>,
}

impl ReconcileReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn outcome_count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Failure counts grouped by kind.
    pub fn failures_by_kind(&self) -> BTreeMap<FailureKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }
}
