use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Provider faults, pre-classified into the two buckets the Conversation
/// Runner's retry policy cares about (spec §4.2).
#[derive(Debug)]
pub enum Error {
    /// Network blip, HTTP 429, or 5xx — worth retrying.
    Transient(String),
    /// 4xx (other than 429) or a schema violation in the response — retrying
    /// cannot help.
    Permanent(String),
}

impl Error {
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Transient(msg) | Error::Permanent(msg) => msg,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transient(msg) => write!(f, "transient provider error: {}", msg),
            Error::Permanent(msg) => write!(f, "permanent provider error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
