//! Data model for waitlist registration reconciliation.

pub mod codes;
pub mod error;
pub mod ids;
pub mod record;
pub mod registration;
pub mod report;

pub use codes::{DEFAULT_DECEASED_DONOR_CODE, DEFAULT_LIVING_DONOR_CODE, DonorCodes};
pub use error::{ModelError, Result};
pub use ids::{PatientId, RegistrationId};
pub use record::{CanonicalRecord, Outcome};
pub use registration::{ClassifiedRegistration, ListType, Registration, ResolvedRegistration};
pub use report::{
    FailureKind, ListTypeCounts, PatientFailure, ReconcileReport, ReconcileWarning, WarningKind,
};
