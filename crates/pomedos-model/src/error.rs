use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid cause of death: {0:?}")]
    InvalidCause(String),
    #[error("invalid year: {0:?}")]
    InvalidYear(String),
    #[error("invalid sex label: {0:?}")]
    InvalidSex(String),
    #[error("unrecognized age bracket label: {0:?}")]
    InvalidBracketLabel(String),
    #[error("invalid age range: upper bound {high} must exceed lower bound {low}")]
    InvalidAgeRange { low: u32, high: u32 },
    #[error("bracket alignment failed: {reason}")]
    BracketAlignment { reason: String },
}

impl ModelError {
    pub(crate) fn alignment(reason: impl Into<String>) -> Self {
        Self::BracketAlignment {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
