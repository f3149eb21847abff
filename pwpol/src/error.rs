use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] pwpolcore::error::BackendError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("invalid policy window: {0}; allowed values: 0, 30, 60, 90, 120, 180, 360")]
    InvalidMaxAge(i64),
    #[error("invalid due_soon_days value: {0}; must be between 0 and 30")]
    InvalidDueSoon(i64),
}
