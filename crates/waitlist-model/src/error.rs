use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid patient id: {0:?}")]
    InvalidPatientId(String),
    #[error("invalid registration id: {0:?}")]
    InvalidRegistrationId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
