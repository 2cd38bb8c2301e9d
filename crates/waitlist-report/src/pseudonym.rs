//! Keyed pseudonyms for exported identifiers.

use sha2::{Digest, Sha256};

use waitlist_model::{PatientId, ReconcileReport, RegistrationId};

/// Hex characters kept from each digest.
pub const PSEUDONYM_LEN: usize = 16;

const SEPARATOR: u8 = 0x1f;

/// Identifier namespaces. Each kind hashes under its own prefix, so a patient
/// and a registration with the same raw id get different pseudonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Patient,
    Registration,
}

impl IdKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Registration => "registration",
        }
    }
}

/// Deterministic pseudonyms under an explicit seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pseudonymizer {
    seed: String,
}

impl Pseudonymizer {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// `hex(sha256(seed, kind, id))`, fields joined by the unit separator and
    /// truncated to [`PSEUDONYM_LEN`] characters.
    pub fn pseudonym(&self, kind: IdKind, id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update([SEPARATOR]);
        hasher.update(kind.prefix().as_bytes());
        hasher.update([SEPARATOR]);
        hasher.update(id.as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(PSEUDONYM_LEN);
        digest
    }

    pub fn patient(&self, id: &PatientId) -> String {
        self.pseudonym(IdKind::Patient, id.as_str())
    }

    pub fn registration(&self, id: &RegistrationId) -> String {
        self.pseudonym(IdKind::Registration, id.as_str())
    }

    /// Copy of `report` with every identifier replaced.
    pub fn report(&self, report: &ReconcileReport) -> ReconcileReport {
        let mut report = report.clone();
        for failure in &mut report.failures {
            failure.patient_id = self.patient_id(&failure.patient_id);
            for registration_id in &mut failure.registration_ids {
                *registration_id = self.registration_id(registration_id);
            }
            failure.message = format!(
                "{} ({} registrations)",
                failure.kind,
                failure.registration_ids.len()
            );
        }
        for warning in &mut report.warnings {
            warning.patient_id = self.patient_id(&warning.patient_id);
            warning.registration_id = warning
                .registration_id
                .as_ref()
                .map(|id| self.registration_id(id));
        }
        report
    }

    fn patient_id(&self, id: &PatientId) -> PatientId {
        PatientId::new(self.patient(id)).unwrap_or_else(|_| id.clone())
    }

    fn registration_id(&self, id: &RegistrationId) -> RegistrationId {
        RegistrationId::new(self.registration(id)).unwrap_or_else(|_| id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudonyms_are_stable_per_seed() {
        let first = Pseudonymizer::new("study-42");
        let again = Pseudonymizer::new("study-42");
        let other = Pseudonymizer::new("study-43");
        let id = PatientId::new("100").expect("patient id");

        assert_eq!(first.patient(&id), again.patient(&id));
        assert_ne!(first.patient(&id), other.patient(&id));
        assert_eq!(first.patient(&id).len(), PSEUDONYM_LEN);
        assert!(first.patient(&id).chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn kinds_do_not_collide() {
        let pseudonymizer = Pseudonymizer::new("seed");
        assert_ne!(
            pseudonymizer.pseudonym(IdKind::Patient, "100"),
            pseudonymizer.pseudonym(IdKind::Registration, "100")
        );
    }
}
