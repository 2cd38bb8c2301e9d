//! Study population filter applied while loading.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Population criteria. Every unset criterion accepts all rows; a row that
/// lacks the attribute an active criterion tests is excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationFilter {
    /// Earliest accepted list date, inclusive.
    pub list_date_from: Option<NaiveDate>,
    /// Latest accepted list date, inclusive.
    pub list_date_to: Option<NaiveDate>,
    /// Organ code, compared case-insensitively.
    pub organ: Option<String>,
    /// Minimum age at listing, in years.
    pub min_age: Option<f64>,
}

/// Why a row was left out of the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Exclusion {
    ListedBeforeWindow,
    ListedAfterWindow,
    Organ,
    Age,
}

impl Exclusion {
    pub const ALL: [Exclusion; 4] = [
        Self::ListedBeforeWindow,
        Self::ListedAfterWindow,
        Self::Organ,
        Self::Age,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ListedBeforeWindow => "listed before window",
            Self::ListedAfterWindow => "listed after window",
            Self::Organ => "organ",
            Self::Age => "age at listing",
        }
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Population attributes of one source row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub list_date: NaiveDate,
    pub organ: Option<&'a str>,
    pub age_at_listing: Option<f64>,
}

impl PopulationFilter {
    pub fn is_active(&self) -> bool {
        self.list_date_from.is_some()
            || self.list_date_to.is_some()
            || self.organ.is_some()
            || self.min_age.is_some()
    }

    /// First criterion the candidate fails, if any.
    pub fn check(&self, candidate: &Candidate<'_>) -> Option<Exclusion> {
        if self.list_date_from.is_some_and(|from| candidate.list_date < from) {
            return Some(Exclusion::ListedBeforeWindow);
        }
        if self.list_date_to.is_some_and(|to| candidate.list_date > to) {
            return Some(Exclusion::ListedAfterWindow);
        }
        if let Some(organ) = self.organ.as_deref() {
            let matches = candidate
                .organ
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(organ.trim()));
            if !matches {
                return Some(Exclusion::Organ);
            }
        }
        if let Some(min_age) = self.min_age {
            if !candidate.age_at_listing.is_some_and(|age| age >= min_age) {
                return Some(Exclusion::Age);
            }
        }
        None
    }
}
