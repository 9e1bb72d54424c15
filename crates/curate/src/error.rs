use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validator could not be invoked: {0}")]
    ValidatorInvocation(String),

    #[error("failed to persist repaired rule: {0}")]
    Persist(String),
}
