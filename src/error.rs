use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed package database: {0}")]
    MalformedDatabase(String),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DoctorError>;
