// Domain-level errors for saved-location workflows.

use std::fmt;

#[derive(Debug)]
pub enum LocationError {
    BlankName,
    IndexOutOfRange { index: usize, len: usize },
    NotConfirmed,
    Storage(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::BlankName => write!(f, "location name must not be blank"),
            LocationError::IndexOutOfRange { index, len } => {
                write!(f, "location index {index} out of range ({len} saved)")
            }
            LocationError::NotConfirmed => write!(f, "deletion requires confirmation"),
            LocationError::Storage(message) => write!(f, "failed to persist locations: {message}"),
        }
    }
}

impl std::error::Error for LocationError {}
