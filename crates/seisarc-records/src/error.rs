use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),
}

pub type Result<T> = std::result::Result<T, RecordError>;
