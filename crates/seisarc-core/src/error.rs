use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeisarcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("driver error: {0}")]
    Driver(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("object with publicID '{0}' exists already")]
    DuplicatePublicId(String),

    #[error("parent object with publicID '{0}' has not been found in the database")]
    ParentNotFound(String),

    #[error("object with publicID '{0}' has not been found in the database")]
    ObjectNotFound(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SeisarcError>;
