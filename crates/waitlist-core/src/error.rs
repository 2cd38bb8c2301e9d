use thiserror::Error;

use waitlist_model::{FailureKind, PatientId, RegistrationId};

/// Per-patient reconciliation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error(
        "registration {registration_id} of patient {patient_id} has no resolvable waitlist end date"
    )]
    MissingDate {
        patient_id: PatientId,
        registration_id: RegistrationId,
    },

    #[error("episode {episode_number} has no rows with a resolvable waitlist end date")]
    EmptyEpisode {
        patient_id: Option<PatientId>,
        episode_number: u32,
    },
}

impl ReconcileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingDate { .. } => FailureKind::MissingDate,
            Self::EmptyEpisode { .. } => FailureKind::EmptyEpisode,
        }
    }

    pub fn patient_id(&self) -> Option<&PatientId> {
        match self {
            Self::MissingDate { patient_id, .. } => Some(patient_id),
            Self::EmptyEpisode { patient_id, .. } => patient_id.as_ref(),
        }
    }
}
