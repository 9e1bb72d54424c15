use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Decode(String),

    #[error("missing required configuration: {0}")]
    MissingConfig(String),

    #[error("{0}")]
    Other(String),
}
